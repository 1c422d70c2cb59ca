use crate::{
    handlers::{clamp_paging, paginate, ActorId},
    services::parties::{CreatePartyRequest, PartyListQuery, PartyResponse},
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
}

pub async fn create_customer(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Json(payload): Json<CreatePartyRequest>,
) -> ApiResult<PartyResponse> {
    let customer = state
        .services
        .parties
        .create_customer(&actor, payload)
        .await?;
    Ok(Json(ApiResponse::success(customer)))
}

pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<PartyResponse> {
    Ok(Json(ApiResponse::success(
        state.services.parties.get_customer(id).await?,
    )))
}

pub async fn list_customers(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<PartyResponse>> {
    let (page, limit) = clamp_paging(&state.config, query.page, query.limit);
    let (items, total) = state
        .services
        .parties
        .list_customers(PartyListQuery {
            search: query.search,
            page,
            limit,
        })
        .await?;
    Ok(Json(ApiResponse::success(paginate(items, total, page, limit))))
}
