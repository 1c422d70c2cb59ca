//! Stock-taking sheets: comparing a physical count against the ledger's
//! expected quantity for a window. Recording a count never mutates the
//! ledger; discrepancies are fixed with a separate manual adjustment.

use crate::{
    clock::SharedClock,
    db::DbPool,
    entities::sku::{self, Entity as SkuEntity},
    entities::stock_movement::{self, Entity as MovementEntity},
    entities::stock_take::{self, Entity as StockTakeEntity, StockTakeKind},
    errors::ServiceError,
    events::{Event, EventSender},
    services::window_bounds,
};
use chrono::{Datelike, DateTime, Days, Months, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CountInput {
    pub sku_id: Uuid,
    pub counted_quantity: Decimal,
}

#[derive(Debug, Deserialize, Default)]
pub struct StockTakeListQuery {
    pub kind: Option<StockTakeKind>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub page: u64,
    pub limit: u64,
}

#[derive(Debug, Serialize)]
pub struct SheetRow {
    pub sku_id: Uuid,
    pub code: String,
    pub name: String,
    pub unit: Option<String>,
    pub expected_quantity: Decimal,
}

#[derive(Debug, Serialize)]
pub struct Sheet {
    pub kind: StockTakeKind,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub rows: Vec<SheetRow>,
}

#[derive(Debug, Serialize)]
pub struct StockTakeResponse {
    pub id: Uuid,
    pub sku_id: Uuid,
    pub kind: StockTakeKind,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub expected_quantity: Decimal,
    pub counted_quantity: Decimal,
    pub difference: Decimal,
    pub taken_by: String,
    pub taken_at: DateTime<Utc>,
}

impl From<stock_take::Model> for StockTakeResponse {
    fn from(model: stock_take::Model) -> Self {
        Self {
            id: model.id,
            sku_id: model.sku_id,
            kind: model.kind,
            window_start: model.window_start,
            window_end: model.window_end,
            expected_quantity: model.expected_quantity,
            counted_quantity: model.counted_quantity,
            difference: model.difference,
            taken_by: model.taken_by,
            taken_at: model.taken_at,
        }
    }
}

/// Daily sheets cover today; monthly sheets the current calendar month.
pub(crate) fn take_window(kind: StockTakeKind, today: NaiveDate) -> (NaiveDate, NaiveDate) {
    match kind {
        StockTakeKind::Daily => (today, today),
        StockTakeKind::Monthly => {
            let start = today.with_day(1).unwrap_or(today);
            let end = start
                .checked_add_months(Months::new(1))
                .and_then(|d| d.checked_sub_days(Days::new(1)))
                .unwrap_or(today);
            (start, end)
        }
    }
}

/// Signed movement sum for a SKU up to the end of the window: opening balance
/// plus the window's movements, which with signed storage is one sum.
async fn expected_at<C: ConnectionTrait>(
    conn: &C,
    sku_id: Uuid,
    window_end_exclusive: DateTime<Utc>,
) -> Result<Decimal, ServiceError> {
    let movements = MovementEntity::find()
        .filter(stock_movement::Column::SkuId.eq(sku_id))
        .filter(stock_movement::Column::OccurredAt.lt(window_end_exclusive))
        .all(conn)
        .await?;
    Ok(movements.iter().map(|m| m.quantity).sum())
}

#[derive(Clone)]
pub struct StockTakingService {
    db_pool: Arc<DbPool>,
    clock: SharedClock,
    event_sender: Option<Arc<EventSender>>,
}

impl StockTakingService {
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
                warn!(error = %e, "Failed to send stock take event");
            }
        }
    }

    /// Builds the counting sheet: every active SKU with its expected quantity
    /// over the kind's window.
    #[instrument(skip(self))]
    pub async fn sheet(&self, kind: StockTakeKind) -> Result<Sheet, ServiceError> {
        let db = &*self.db_pool;
        let (window_start, window_end) = take_window(kind, self.clock.today());
        let (_, end_exclusive) = window_bounds(window_start, window_end);

        let skus = SkuEntity::find()
            .filter(sku::Column::IsActive.eq(true))
            .order_by_asc(sku::Column::Code)
            .all(db)
            .await?;

        let mut rows = Vec::with_capacity(skus.len());
        for sku_model in skus {
            let expected = expected_at(db, sku_model.id, end_exclusive).await?;
            rows.push(SheetRow {
                sku_id: sku_model.id,
                code: sku_model.code,
                name: sku_model.name,
                unit: sku_model.unit,
                expected_quantity: expected,
            });
        }

        Ok(Sheet {
            kind,
            window_start,
            window_end,
            rows,
        })
    }

    /// Records counted quantities against the kind's window. Inserts one
    /// StockTake row per SKU with the counted-minus-expected difference.
    #[instrument(skip(self, counts), fields(count = counts.len()))]
    pub async fn record_counts(
        &self,
        actor_id: &str,
        kind: StockTakeKind,
        counts: Vec<CountInput>,
    ) -> Result<Vec<StockTakeResponse>, ServiceError> {
        if counts.is_empty() {
            return Err(ServiceError::ValidationError(
                "Stock take needs at least one counted SKU".into(),
            ));
        }
        for count in &counts {
            if count.counted_quantity < Decimal::ZERO {
                return Err(ServiceError::ValidationError(format!(
                    "Counted quantity for SKU {} must not be negative",
                    count.sku_id
                )));
            }
        }

        let db = &*self.db_pool;
        let now = self.clock.now();
        let (window_start, window_end) = take_window(kind, self.clock.today());
        let (_, end_exclusive) = window_bounds(window_start, window_end);
        let txn = db.begin().await?;

        let mut recorded = Vec::with_capacity(counts.len());
        for count in &counts {
            if SkuEntity::find_by_id(count.sku_id).one(&txn).await?.is_none() {
                return Err(ServiceError::NotFound(format!(
                    "SKU {} not found",
                    count.sku_id
                )));
            }
            let expected = expected_at(&txn, count.sku_id, end_exclusive).await?;
            let difference = count.counted_quantity - expected;

            let row = stock_take::ActiveModel {
                id: Set(Uuid::new_v4()),
                sku_id: Set(count.sku_id),
                kind: Set(kind),
                window_start: Set(window_start),
                window_end: Set(window_end),
                expected_quantity: Set(expected),
                counted_quantity: Set(count.counted_quantity),
                difference: Set(difference),
                taken_by: Set(actor_id.to_string()),
                taken_at: Set(now),
            }
            .insert(&txn)
            .await?;
            recorded.push(row);
        }

        txn.commit().await?;

        info!(kind = %kind, rows = recorded.len(), "Stock take recorded");
        for row in &recorded {
            self.emit(Event::StockTakeRecorded {
                sku_id: row.sku_id,
                difference: row.difference,
            })
            .await;
        }

        Ok(recorded.into_iter().map(StockTakeResponse::from).collect())
    }

    #[instrument(skip(self, query))]
    pub async fn list_takes(
        &self,
        query: StockTakeListQuery,
    ) -> Result<(Vec<StockTakeResponse>, u64), ServiceError> {
        let db = &*self.db_pool;
        let mut finder = StockTakeEntity::find();
        if let Some(kind) = query.kind {
            finder = finder.filter(stock_take::Column::Kind.eq(kind));
        }
        if let Some(from) = query.from {
            finder = finder.filter(stock_take::Column::WindowStart.gte(from));
        }
        if let Some(to) = query.to {
            finder = finder.filter(stock_take::Column::WindowEnd.lte(to));
        }
        let paginator = finder
            .order_by_desc(stock_take::Column::TakenAt)
            .paginate(db, query.limit);
        let total = paginator.num_items().await?;
        let takes = paginator.fetch_page(query.page.saturating_sub(1)).await?;
        Ok((
            takes.into_iter().map(StockTakeResponse::from).collect(),
            total,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn daily_window_is_a_single_day() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        assert_eq!(take_window(StockTakeKind::Daily, today), (today, today));
    }

    #[test]
    fn monthly_window_spans_the_calendar_month() {
        let today = NaiveDate::from_ymd_opt(2026, 2, 10).unwrap();
        let (start, end) = take_window(StockTakeKind::Monthly, today);
        assert_eq!(start, NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2026, 2, 28).unwrap());
    }

    #[test]
    fn monthly_window_handles_31_day_months() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 31).unwrap();
        let (start, end) = take_window(StockTakeKind::Monthly, today);
        assert_eq!(start, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2026, 1, 31).unwrap());
    }
}
