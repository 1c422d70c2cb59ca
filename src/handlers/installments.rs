use crate::{
    entities::installment_plan::PlanStatus,
    handlers::{clamp_paging, paginate, ActorId},
    services::installments::{ApplyPaymentRequest, PaymentResponse, PlanListQuery, PlanResponse},
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
    pub status: Option<PlanStatus>,
    pub customer_id: Option<Uuid>,
    pub due_within_days: Option<i64>,
}

pub async fn get_plan(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<PlanResponse> {
    Ok(Json(ApiResponse::success(
        state.services.installments.get_plan(id).await?,
    )))
}

pub async fn list_plans(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<PlanResponse>> {
    let (page, limit) = clamp_paging(&state.config, query.page, query.limit);
    let (items, total) = state
        .services
        .installments
        .list_plans(PlanListQuery {
            status: query.status,
            customer_id: query.customer_id,
            due_within_days: query.due_within_days,
            page,
            limit,
        })
        .await?;
    Ok(Json(ApiResponse::success(paginate(items, total, page, limit))))
}

pub async fn apply_payment(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Path(id): Path<Uuid>,
    Json(payload): Json<ApplyPaymentRequest>,
) -> ApiResult<PlanResponse> {
    let plan = state
        .services
        .installments
        .apply_payment(&actor, id, payload)
        .await?;
    Ok(Json(ApiResponse::success(plan)))
}

pub async fn list_payments(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<PaymentResponse>> {
    Ok(Json(ApiResponse::success(
        state.services.installments.payments_for_plan(id).await?,
    )))
}
