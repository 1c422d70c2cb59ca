use crate::{
    handlers::{clamp_paging, paginate, ActorId},
    services::purchases::{CreatePurchaseInvoiceRequest, PurchaseInvoiceResponse, PurchaseListQuery},
    services::sales::{InvoiceSummary, InvoiceTotals},
    ApiResponse, ApiResult, AppState, PaginatedResponse,
};
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize, Default)]
pub struct ListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub supplier_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct InvoiceListing {
    #[serde(flatten)]
    pub page: PaginatedResponse<InvoiceSummary>,
    pub totals: InvoiceTotals,
}

pub async fn create_invoice(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Json(payload): Json<CreatePurchaseInvoiceRequest>,
) -> ApiResult<PurchaseInvoiceResponse> {
    let invoice = state
        .services
        .purchases
        .create_invoice(&actor, payload)
        .await?;
    Ok(Json(ApiResponse::success(invoice)))
}

pub async fn get_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<PurchaseInvoiceResponse> {
    Ok(Json(ApiResponse::success(
        state.services.purchases.get_invoice(id).await?,
    )))
}

pub async fn list_invoices(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<InvoiceListing> {
    let (page, limit) = clamp_paging(&state.config, query.page, query.limit);
    let (items, total, totals) = state
        .services
        .purchases
        .list_invoices(PurchaseListQuery {
            from: query.from,
            to: query.to,
            supplier_id: query.supplier_id,
            page,
            limit,
        })
        .await?;
    Ok(Json(ApiResponse::success(InvoiceListing {
        page: paginate(items, total, page, limit),
        totals,
    })))
}
