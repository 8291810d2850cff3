//! Daily, monthly and yearly summaries. Admin only.

use axum::extract::State;
use serde::Deserialize;

use warung_core::report::{DailySummary, MonthlySummary, YearlySummary};
use warung_core::validation::{parse_date, parse_month, parse_year};

use crate::auth::AdminUser;
use crate::error::ApiResult;
use crate::extract::{AppJson, AppQuery};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DailyQuery {
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    pub year: Option<String>,
    pub month: Option<String>,
}

/// `GET /sales/daily?date=YYYY-MM-DD`
pub async fn daily(
    State(state): State<AppState>,
    _admin: AdminUser,
    AppQuery(query): AppQuery<DailyQuery>,
) -> ApiResult<AppJson<DailySummary>> {
    let date = parse_date("date", query.date.as_deref())?;
    let summary = state.db.reports().daily_summary(date, state.report_offset).await?;
    Ok(AppJson(summary))
}

/// `GET /sales/monthly?year=&month=`
pub async fn monthly(
    State(state): State<AppState>,
    _admin: AdminUser,
    AppQuery(query): AppQuery<PeriodQuery>,
) -> ApiResult<AppJson<MonthlySummary>> {
    let year = parse_year(query.year.as_deref())?;
    let month = parse_month(query.month.as_deref())?;
    let summary = state
        .db
        .reports()
        .monthly_summary(year, month, state.report_offset)
        .await?;
    Ok(AppJson(summary))
}

/// `GET /sales/yearly?year=`
pub async fn yearly(
    State(state): State<AppState>,
    _admin: AdminUser,
    AppQuery(query): AppQuery<PeriodQuery>,
) -> ApiResult<AppJson<YearlySummary>> {
    let year = parse_year(query.year.as_deref())?;
    let summary = state.db.reports().yearly_summary(year, state.report_offset).await?;
    Ok(AppJson(summary))
}
