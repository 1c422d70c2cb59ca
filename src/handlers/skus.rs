use crate::{
    handlers::{clamp_paging, paginate, ActorId},
    services::skus::{CreateSkuRequest, SkuListQuery, SkuResponse, UpdateSkuRequest},
    ApiResponse, ApiResult, AppState, PaginatedResponse,
};
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize, Default)]
pub struct ListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub active_only: Option<bool>,
}

pub async fn create_sku(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Json(payload): Json<CreateSkuRequest>,
) -> ApiResult<SkuResponse> {
    let created = state.services.skus.create(&actor, payload).await?;
    Ok(Json(ApiResponse::success(created)))
}

pub async fn get_sku(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<SkuResponse> {
    Ok(Json(ApiResponse::success(state.services.skus.get(id).await?)))
}

pub async fn get_sku_by_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<SkuResponse> {
    Ok(Json(ApiResponse::success(
        state.services.skus.by_code(&code).await?,
    )))
}

pub async fn list_skus(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<SkuResponse>> {
    let (page, limit) = clamp_paging(&state.config, query.page, query.limit);
    let (items, total) = state
        .services
        .skus
        .list(SkuListQuery {
            search: query.search,
            category: query.category,
            active_only: query.active_only,
            page,
            limit,
        })
        .await?;
    Ok(Json(ApiResponse::success(paginate(items, total, page, limit))))
}

pub async fn update_sku(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSkuRequest>,
) -> ApiResult<SkuResponse> {
    let updated = state.services.skus.update(&actor, id, payload).await?;
    Ok(Json(ApiResponse::success(updated)))
}

pub async fn deactivate_sku(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Path(id): Path<Uuid>,
) -> ApiResult<SkuResponse> {
    let updated = state.services.skus.deactivate(&actor, id).await?;
    Ok(Json(ApiResponse::success(updated)))
}
