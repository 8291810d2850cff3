//! Login and the current-user lookup.

use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use warung_core::validation::validate_credentials;
use warung_core::PublicUser;
use warung_db::{verify_password, DbError};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::extract::AppJson;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct UserBody {
    pub user: PublicUser,
}

/// `POST /auth/login`
///
/// Unknown usernames and wrong passwords get the same 401.
pub async fn login(
    State(state): State<AppState>,
    AppJson(request): AppJson<LoginRequest>,
) -> ApiResult<AppJson<LoginResponse>> {
    validate_credentials(&request.username, &request.password)?;

    let user = state.db.users().find_by_username(request.username.trim()).await?;
    let Some(user) = user.filter(|u| verify_password(&request.password, &u.password_hash)) else {
        warn!(username = %request.username, "Login rejected");
        return Err(ApiError::invalid_credentials());
    };

    let public = PublicUser::from(&user);
    let token = state.jwt.issue(&public)?;
    info!(user_id = user.id, role = %user.role, "User logged in");

    Ok(AppJson(LoginResponse {
        token,
        user: public,
    }))
}

/// `GET /auth/me`
pub async fn me(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> ApiResult<AppJson<UserBody>> {
    // A token can outlive its user.
    let user = match state.db.users().get(principal.id).await {
        Ok(user) => user,
        Err(DbError::NotFound { .. }) => return Err(ApiError::invalid_token()),
        Err(e) => return Err(e.into()),
    };

    Ok(AppJson(UserBody {
        user: PublicUser::from(&user),
    }))
}
