use crate::{
    services::reporting::{Dashboard, PeriodSummary, TopSeller},
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Query, State},
    response::Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

#[derive(Debug, Deserialize, Default)]
pub struct DailyQuery {
    /// Defaults to today.
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct WindowQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct TopSellersQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub limit: Option<usize>,
}

pub async fn daily_summary(
    State(state): State<AppState>,
    Query(query): Query<DailyQuery>,
) -> ApiResult<PeriodSummary> {
    let date = query.date.unwrap_or_else(|| state.clock.today());
    Ok(Json(ApiResponse::success(
        state.services.reporting.daily_summary(date).await?,
    )))
}

pub async fn period_summary(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
) -> ApiResult<PeriodSummary> {
    Ok(Json(ApiResponse::success(
        state
            .services
            .reporting
            .period_summary(query.from, query.to)
            .await?,
    )))
}

pub async fn top_sellers(
    State(state): State<AppState>,
    Query(query): Query<TopSellersQuery>,
) -> ApiResult<Vec<TopSeller>> {
    let limit = query.limit.unwrap_or(10).min(100);
    Ok(Json(ApiResponse::success(
        state
            .services
            .reporting
            .top_sellers(query.from, query.to, limit)
            .await?,
    )))
}

pub async fn dashboard(State(state): State<AppState>) -> ApiResult<Dashboard> {
    Ok(Json(ApiResponse::success(
        state.services.reporting.dashboard().await?,
    )))
}
