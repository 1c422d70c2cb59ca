use crate::{
    entities::stock_take::StockTakeKind,
    handlers::{clamp_paging, paginate, ActorId},
    services::stock_taking::{CountInput, Sheet, StockTakeListQuery, StockTakeResponse},
    ApiResponse, ApiResult, AppState, PaginatedResponse,
};
use axum::{
    extract::{Query, State},
    response::Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SheetQuery {
    pub kind: StockTakeKind,
}

#[derive(Debug, Deserialize)]
pub struct RecordCountsRequest {
    pub kind: StockTakeKind,
    pub counts: Vec<CountInput>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub kind: Option<StockTakeKind>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

pub async fn sheet(
    State(state): State<AppState>,
    Query(query): Query<SheetQuery>,
) -> ApiResult<Sheet> {
    Ok(Json(ApiResponse::success(
        state.services.stock_taking.sheet(query.kind).await?,
    )))
}

pub async fn record_counts(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Json(payload): Json<RecordCountsRequest>,
) -> ApiResult<Vec<StockTakeResponse>> {
    let recorded = state
        .services
        .stock_taking
        .record_counts(&actor, payload.kind, payload.counts)
        .await?;
    Ok(Json(ApiResponse::success(recorded)))
}

pub async fn list_takes(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<StockTakeResponse>> {
    let (page, limit) = clamp_paging(&state.config, query.page, query.limit);
    let (items, total) = state
        .services
        .stock_taking
        .list_takes(StockTakeListQuery {
            kind: query.kind,
            from: query.from,
            to: query.to,
            page,
            limit,
        })
        .await?;
    Ok(Json(ApiResponse::success(paginate(items, total, page, limit))))
}
