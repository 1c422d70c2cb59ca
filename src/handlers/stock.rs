use crate::{
    entities::stock_movement,
    handlers::{clamp_paging, paginate, ActorId},
    services::skus::SkuResponse,
    services::stock_ledger::{ExpectedQuantity, MovementResponse, RecordMovementRequest},
    ApiResponse, ApiResult, AppState, PaginatedResponse,
};
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct AdjustRequest {
    pub delta: Decimal,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PagingQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ExpiringQuery {
    pub within_days: Option<i64>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct ExpectedQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct MovementRow {
    pub id: Uuid,
    pub sku_id: Uuid,
    pub kind: String,
    pub quantity: Decimal,
    pub reference: Option<String>,
    pub actor_id: String,
    pub occurred_at: chrono::DateTime<chrono::Utc>,
}

impl From<stock_movement::Model> for MovementRow {
    fn from(model: stock_movement::Model) -> Self {
        Self {
            id: model.id,
            sku_id: model.sku_id,
            kind: model.kind.to_string(),
            quantity: model.quantity,
            reference: model.reference,
            actor_id: model.actor_id,
            occurred_at: model.occurred_at,
        }
    }
}

pub async fn record_movement(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Json(payload): Json<RecordMovementRequest>,
) -> ApiResult<MovementResponse> {
    let movement = state
        .services
        .stock_ledger
        .record_movement(&actor, payload)
        .await?;
    Ok(Json(ApiResponse::success(movement)))
}

pub async fn adjust_stock(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Path(sku_id): Path<Uuid>,
    Json(payload): Json<AdjustRequest>,
) -> ApiResult<MovementResponse> {
    let movement = state
        .services
        .stock_ledger
        .adjust(&actor, sku_id, payload.delta, payload.reason)
        .await?;
    Ok(Json(ApiResponse::success(movement)))
}

pub async fn sku_movements(
    State(state): State<AppState>,
    Path(sku_id): Path<Uuid>,
    Query(query): Query<PagingQuery>,
) -> ApiResult<PaginatedResponse<MovementRow>> {
    let (page, limit) = clamp_paging(&state.config, query.page, query.limit);
    let (movements, total) = state
        .services
        .stock_ledger
        .movements_for_sku(sku_id, page, limit)
        .await?;
    let items = movements.into_iter().map(MovementRow::from).collect();
    Ok(Json(ApiResponse::success(paginate(items, total, page, limit))))
}

pub async fn expected_quantity(
    State(state): State<AppState>,
    Path(sku_id): Path<Uuid>,
    Query(query): Query<ExpectedQuery>,
) -> ApiResult<ExpectedQuantity> {
    let (from, to) = crate::services::window_bounds(query.from, query.to);
    let expected = state
        .services
        .stock_ledger
        .expected_quantity(sku_id, from, to)
        .await?;
    Ok(Json(ApiResponse::success(expected)))
}

pub async fn low_stock(
    State(state): State<AppState>,
    Query(query): Query<PagingQuery>,
) -> ApiResult<PaginatedResponse<SkuResponse>> {
    let (page, limit) = clamp_paging(&state.config, query.page, query.limit);
    let (skus, total) = state.services.stock_ledger.low_stock(page, limit).await?;
    let items = skus.into_iter().map(SkuResponse::from).collect();
    Ok(Json(ApiResponse::success(paginate(items, total, page, limit))))
}

pub async fn expiring(
    State(state): State<AppState>,
    Query(query): Query<ExpiringQuery>,
) -> ApiResult<PaginatedResponse<SkuResponse>> {
    let (page, limit) = clamp_paging(&state.config, query.page, query.limit);
    let horizon = query
        .within_days
        .unwrap_or(state.config.expiry_horizon_days);
    let (skus, total) = state
        .services
        .stock_ledger
        .expiring(horizon, page, limit)
        .await?;
    let items = skus.into_iter().map(SkuResponse::from).collect();
    Ok(Json(ApiResponse::success(paginate(items, total, page, limit))))
}
