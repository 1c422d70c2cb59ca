use crate::{
    entities::return_request::{ReturnDirection, ReturnStatus},
    handlers::{clamp_paging, paginate, ActorId},
    services::returns::{CreateReturnRequest, ReturnListQuery, ReturnResponse, ReturnSummary},
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
    pub status: Option<ReturnStatus>,
    pub direction: Option<ReturnDirection>,
}

pub async fn create_return(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Json(payload): Json<CreateReturnRequest>,
) -> ApiResult<ReturnResponse> {
    let created = state.services.returns.create_return(&actor, payload).await?;
    Ok(Json(ApiResponse::success(created)))
}

pub async fn get_return(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<ReturnResponse> {
    Ok(Json(ApiResponse::success(
        state.services.returns.get_return(id).await?,
    )))
}

pub async fn list_returns(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<ReturnSummary>> {
    let (page, limit) = clamp_paging(&state.config, query.page, query.limit);
    let (items, total) = state
        .services
        .returns
        .list_returns(ReturnListQuery {
            status: query.status,
            direction: query.direction,
            page,
            limit,
        })
        .await?;
    Ok(Json(ApiResponse::success(paginate(items, total, page, limit))))
}

pub async fn approve_return(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Path(id): Path<Uuid>,
) -> ApiResult<ReturnResponse> {
    let updated = state.services.returns.approve(&actor, id).await?;
    Ok(Json(ApiResponse::success(updated)))
}

pub async fn reject_return(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Path(id): Path<Uuid>,
) -> ApiResult<ReturnResponse> {
    let updated = state.services.returns.reject(&actor, id).await?;
    Ok(Json(ApiResponse::success(updated)))
}
