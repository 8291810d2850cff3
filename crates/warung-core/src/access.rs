//! # Access Rules
//!
//! The role check half of the access gate. Token verification lives in the
//! API crate; once a token is verified it becomes a [`Principal`] and every
//! authorization decision goes through [`require_role`].
//!
//! ```text
//!   bearer token ──► verify (apps/api) ──► Principal { id, username, role }
//!                                                    │
//!                                  require_role(&principal, Role::Admin)
//!                                                    │
//!                                       ┌────────────┴────────────┐
//!                                       ▼                         ▼
//!                                     Allow                 Forbidden (403)
//! ```
//!
//! There is no role hierarchy: a role satisfies only itself.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::{PublicUser, Role};

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

impl Principal {
    #[inline]
    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }
}

impl From<PublicUser> for Principal {
    fn from(user: PublicUser) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
        }
    }
}

impl From<&Principal> for PublicUser {
    fn from(principal: &Principal) -> Self {
        Self {
            id: principal.id,
            username: principal.username.clone(),
            role: principal.role,
        }
    }
}

/// Allows the call iff the principal carries exactly `role`.
pub fn require_role(principal: &Principal, role: Role) -> CoreResult<()> {
    if principal.has_role(role) {
        Ok(())
    } else {
        Err(CoreError::Forbidden { required: role })
    }
}
