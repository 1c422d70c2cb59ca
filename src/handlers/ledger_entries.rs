use crate::{
    entities::ledger_entry::EntryType,
    handlers::{clamp_paging, paginate, ActorId},
    services::ledger_entries::{
        EntryListQuery, EntryTotals, LedgerEntryResponse, RecordEntryRequest,
    },
    ApiResponse, ApiResult, AppState, PaginatedResponse,
};
use axum::{
    extract::{Query, State},
    response::Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Default)]
pub struct ListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub entry_type: Option<EntryType>,
    pub branch_code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EntryListing {
    #[serde(flatten)]
    pub page: PaginatedResponse<LedgerEntryResponse>,
    pub totals: EntryTotals,
}

pub async fn record_entry(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Json(payload): Json<RecordEntryRequest>,
) -> ApiResult<LedgerEntryResponse> {
    let entry = state
        .services
        .ledger_entries
        .record_entry(&actor, payload)
        .await?;
    Ok(Json(ApiResponse::success(entry)))
}

pub async fn list_entries(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<EntryListing> {
    let (page, limit) = clamp_paging(&state.config, query.page, query.limit);
    let (items, total, totals) = state
        .services
        .ledger_entries
        .list_entries(EntryListQuery {
            from: query.from,
            to: query.to,
            entry_type: query.entry_type,
            branch_code: query.branch_code,
            page,
            limit,
        })
        .await?;
    Ok(Json(ApiResponse::success(EntryListing {
        page: paginate(items, total, page, limit),
        totals,
    })))
}
