use crate::{
    handlers::{clamp_paging, paginate, ActorId},
    services::sales::{
        CreateSalesInvoiceRequest, InvoiceListQuery, InvoiceSummary, InvoiceTotals,
        SalesInvoiceResponse,
    },
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
    pub customer_id: Option<Uuid>,
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
    Json(payload): Json<CreateSalesInvoiceRequest>,
) -> ApiResult<SalesInvoiceResponse> {
    let invoice = state.services.sales.create_invoice(&actor, payload).await?;
    Ok(Json(ApiResponse::success(invoice)))
}

pub async fn get_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<SalesInvoiceResponse> {
    Ok(Json(ApiResponse::success(
        state.services.sales.get_invoice(id).await?,
    )))
}

pub async fn list_invoices(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<InvoiceListing> {
    let (page, limit) = clamp_paging(&state.config, query.page, query.limit);
    let (items, total, totals) = state
        .services
        .sales
        .list_invoices(InvoiceListQuery {
            from: query.from,
            to: query.to,
            customer_id: query.customer_id,
            page,
            limit,
        })
        .await?;
    Ok(Json(ApiResponse::success(InvoiceListing {
        page: paginate(items, total, page, limit),
        totals,
    })))
}
