//! Free-form credit/debit bookkeeping entries, independent of invoices.

use crate::{
    clock::SharedClock,
    db::DbPool,
    entities::ledger_entry::{self, Entity as LedgerEntity, EntryType},
    errors::ServiceError,
    events::{Event, EventSender},
    services::window_bounds,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct RecordEntryRequest {
    pub branch_code: Option<String>,
    pub entry_type: EntryType,
    pub amount: Decimal,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    pub reference: Option<String>,
    /// Defaults to the clock's now.
    pub entry_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Default)]
pub struct EntryListQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub entry_type: Option<EntryType>,
    pub branch_code: Option<String>,
    pub page: u64,
    pub limit: u64,
}

#[derive(Debug, Serialize)]
pub struct LedgerEntryResponse {
    pub id: Uuid,
    pub branch_code: Option<String>,
    pub entry_type: EntryType,
    pub amount: Decimal,
    pub description: String,
    pub reference: Option<String>,
    pub entry_date: DateTime<Utc>,
    pub created_by: String,
}

impl From<ledger_entry::Model> for LedgerEntryResponse {
    fn from(model: ledger_entry::Model) -> Self {
        Self {
            id: model.id,
            branch_code: model.branch_code,
            entry_type: model.entry_type,
            amount: model.amount,
            description: model.description,
            reference: model.reference,
            entry_date: model.entry_date,
            created_by: model.created_by,
        }
    }
}

/// Window totals over the filtered entries.
#[derive(Debug, Serialize)]
pub struct EntryTotals {
    pub credit_total: Decimal,
    pub debit_total: Decimal,
    /// credit − debit.
    pub net: Decimal,
}

#[derive(Clone)]
pub struct LedgerEntryService {
    db_pool: Arc<DbPool>,
    clock: SharedClock,
    event_sender: Option<Arc<EventSender>>,
}

impl LedgerEntryService {
    pub fn new(
        db_pool: Arc<DbPool>,
        clock: SharedClock,
        event_sender: Option<Arc<EventSender>>,
    ) -> Self {
        Self {
            db_pool,
            clock,
            event_sender,
        }
    }

    async fn emit(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(event) {
                warn!(error = %e, "Failed to send ledger entry event");
            }
        }
    }

    #[instrument(skip(self, request), fields(entry_type = %request.entry_type, amount = %request.amount))]
    pub async fn record_entry(
        &self,
        actor_id: &str,
        request: RecordEntryRequest,
    ) -> Result<LedgerEntryResponse, ServiceError> {
        request.validate()?;
        if request.amount <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Entry amount must be positive".into(),
            ));
        }

        let db = &*self.db_pool;
        let now = self.clock.now();
        let model = ledger_entry::ActiveModel {
            id: Set(Uuid::new_v4()),
            branch_code: Set(request.branch_code),
            entry_type: Set(request.entry_type),
            amount: Set(request.amount),
            description: Set(request.description.trim().to_string()),
            reference: Set(request.reference),
            entry_date: Set(request.entry_date.unwrap_or(now)),
            created_by: Set(actor_id.to_string()),
            created_at: Set(now),
        }
        .insert(db)
        .await?;

        info!(entry_id = %model.id, entry_type = %model.entry_type, "Ledger entry recorded");
        self.emit(Event::LedgerEntryRecorded(model.id)).await;

        Ok(model.into())
    }

    #[instrument(skip(self, query))]
    pub async fn list_entries(
        &self,
        query: EntryListQuery,
    ) -> Result<(Vec<LedgerEntryResponse>, u64, EntryTotals), ServiceError> {
        let db = &*self.db_pool;
        let mut finder = LedgerEntity::find();
        if let (Some(from), Some(to)) = (query.from, query.to) {
            let (start, end) = window_bounds(from, to);
            finder = finder
                .filter(ledger_entry::Column::EntryDate.gte(start))
                .filter(ledger_entry::Column::EntryDate.lt(end));
        }
        if let Some(entry_type) = query.entry_type {
            finder = finder.filter(ledger_entry::Column::EntryType.eq(entry_type));
        }
        if let Some(branch_code) = &query.branch_code {
            finder = finder.filter(ledger_entry::Column::BranchCode.eq(branch_code.clone()));
        }

        let all = finder.clone().all(db).await?;
        let credit_total: Decimal = all
            .iter()
            .filter(|e| e.entry_type == EntryType::Credit)
            .map(|e| e.amount)
            .sum();
        let debit_total: Decimal = all
            .iter()
            .filter(|e| e.entry_type == EntryType::Debit)
            .map(|e| e.amount)
            .sum();

        let paginator = finder
            .order_by_desc(ledger_entry::Column::EntryDate)
            .paginate(db, query.limit);
        let total = paginator.num_items().await?;
        let entries = paginator.fetch_page(query.page.saturating_sub(1)).await?;

        Ok((
            entries.into_iter().map(LedgerEntryResponse::from).collect(),
            total,
            EntryTotals {
                credit_total,
                debit_total,
                net: credit_total - debit_total,
            },
        ))
    }
}
