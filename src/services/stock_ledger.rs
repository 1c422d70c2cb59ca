//! Append-only stock ledger.
//!
//! Every quantity change goes through [`apply_movement`] inside the caller's
//! transaction, which inserts the movement row and updates the SKU's
//! materialized `quantity_on_hand` together. The materialized field therefore
//! always equals the signed sum of the SKU's movements.

use crate::{
    clock::SharedClock,
    db::DbPool,
    entities::sku::{self, Entity as SkuEntity},
    entities::stock_movement::{self, Entity as MovementEntity, MovementKind},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Days, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    prelude::Expr, ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct RecordMovementRequest {
    pub sku_id: Uuid,
    pub kind: MovementKind,
    /// Magnitude; the kind decides the stored sign.
    pub quantity: Decimal,
    pub reference: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MovementResponse {
    pub id: Uuid,
    pub sku_id: Uuid,
    pub kind: MovementKind,
    pub quantity: Decimal,
    pub reference: Option<String>,
    pub actor_id: String,
    pub occurred_at: DateTime<Utc>,
    /// SKU on-hand after this movement was applied.
    pub quantity_on_hand: Decimal,
}

/// Breakdown returned by [`StockLedgerService::expected_quantity`].
#[derive(Debug, Serialize)]
pub struct ExpectedQuantity {
    pub sku_id: Uuid,
    /// Signed sum of movements strictly before the window.
    pub opening_balance: Decimal,
    pub inbound: Decimal,
    pub outbound: Decimal,
    pub returned: Decimal,
    /// opening + inbound + outbound + returned (all signed).
    pub expected: Decimal,
}

/// Applies one signed movement to a SKU inside `txn`: inserts the ledger row
/// and writes the new materialized quantity. Rejects with
/// `InsufficientStock` when the result would be negative.
pub(crate) async fn apply_movement(
    txn: &DatabaseTransaction,
    actor_id: &str,
    sku_model: sku::Model,
    kind: MovementKind,
    signed_quantity: Decimal,
    reference: Option<String>,
    occurred_at: DateTime<Utc>,
) -> Result<(stock_movement::Model, sku::Model), ServiceError> {
    let new_on_hand = sku_model.quantity_on_hand + signed_quantity;
    if new_on_hand < Decimal::ZERO {
        return Err(ServiceError::InsufficientStock(format!(
            "SKU {} ({}) has {} on hand, movement of {} would go negative",
            sku_model.code, sku_model.name, sku_model.quantity_on_hand, signed_quantity
        )));
    }

    let movement = stock_movement::ActiveModel {
        id: Set(Uuid::new_v4()),
        sku_id: Set(sku_model.id),
        kind: Set(kind),
        quantity: Set(signed_quantity),
        reference: Set(reference),
        actor_id: Set(actor_id.to_string()),
        occurred_at: Set(occurred_at),
    }
    .insert(txn)
    .await?;

    let sku_id = sku_model.id;
    let mut sku_active: sku::ActiveModel = sku_model.into();
    sku_active.quantity_on_hand = Set(new_on_hand);
    sku_active.updated_at = Set(Some(occurred_at));
    let updated_sku = sku_active.update(txn).await.map_err(|e| {
        error!(error = %e, sku_id = %sku_id, "Failed to update materialized quantity");
        ServiceError::DatabaseError(e)
    })?;

    Ok((movement, updated_sku))
}

/// Maintains the movement ledger and answers quantity questions.
#[derive(Clone)]
pub struct StockLedgerService {
    db_pool: Arc<DbPool>,
    clock: SharedClock,
    event_sender: Option<Arc<EventSender>>,
}

impl StockLedgerService {
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
                warn!(error = %e, "Failed to send stock ledger event");
            }
        }
    }

    async fn emit_movement_events(&self, movement: &stock_movement::Model, sku: &sku::Model) {
        self.emit(Event::MovementRecorded {
            movement_id: movement.id,
            sku_id: sku.id,
            quantity: movement.quantity,
        })
        .await;
        if sku.is_low_stock() {
            self.emit(Event::LowStock {
                sku_id: sku.id,
                quantity_on_hand: sku.quantity_on_hand,
                reorder_level: sku.reorder_level,
            })
            .await;
        }
    }

    /// Records an In or Out movement. Return movements are written only by
    /// the returns workflow.
    #[instrument(skip(self, request), fields(sku_id = %request.sku_id, kind = %request.kind))]
    pub async fn record_movement(
        &self,
        actor_id: &str,
        request: RecordMovementRequest,
    ) -> Result<MovementResponse, ServiceError> {
        if request.kind == MovementKind::Return {
            return Err(ServiceError::ValidationError(
                "Return movements are recorded through the returns workflow".into(),
            ));
        }
        if request.quantity <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Movement quantity must be positive".into(),
            ));
        }

        let db = &*self.db_pool;
        let txn = db.begin().await?;

        let sku_model = find_active_sku(&txn, request.sku_id).await?;

        let signed = match request.kind {
            MovementKind::In => request.quantity,
            MovementKind::Out => -request.quantity,
            MovementKind::Return => unreachable!("rejected above"),
        };

        let now = self.clock.now();
        let (movement, updated_sku) = apply_movement(
            &txn,
            actor_id,
            sku_model,
            request.kind,
            signed,
            request.reference,
            now,
        )
        .await?;

        txn.commit().await?;

        info!(
            movement_id = %movement.id,
            sku_id = %movement.sku_id,
            quantity = %movement.quantity,
            "Stock movement recorded"
        );
        self.emit_movement_events(&movement, &updated_sku).await;

        Ok(to_response(movement, &updated_sku))
    }

    /// Manual correction: positive delta books an In, negative an Out of the
    /// magnitude. Subject to the same sufficiency check as any Out.
    #[instrument(skip(self), fields(sku_id = %sku_id, delta = %delta))]
    pub async fn adjust(
        &self,
        actor_id: &str,
        sku_id: Uuid,
        delta: Decimal,
        reason: Option<String>,
    ) -> Result<MovementResponse, ServiceError> {
        if delta.is_zero() {
            return Err(ServiceError::ValidationError(
                "Adjustment delta must be non-zero".into(),
            ));
        }
        let kind = if delta > Decimal::ZERO {
            MovementKind::In
        } else {
            MovementKind::Out
        };
        self.record_movement(
            actor_id,
            RecordMovementRequest {
                sku_id,
                kind,
                quantity: delta.abs(),
                reference: reason.or_else(|| Some("manual adjustment".into())),
            },
        )
        .await
    }

    /// Ledger truth: the signed sum of every movement for the SKU.
    #[instrument(skip(self), fields(sku_id = %sku_id))]
    pub async fn current_quantity(&self, sku_id: Uuid) -> Result<Decimal, ServiceError> {
        let db = &*self.db_pool;
        let movements = MovementEntity::find()
            .filter(stock_movement::Column::SkuId.eq(sku_id))
            .all(db)
            .await?;
        Ok(movements.iter().map(|m| m.quantity).sum())
    }

    /// Opening balance before `from` plus the signed per-kind sums within
    /// `[from, to)`.
    #[instrument(skip(self), fields(sku_id = %sku_id))]
    pub async fn expected_quantity(
        &self,
        sku_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<ExpectedQuantity, ServiceError> {
        let db = &*self.db_pool;
        let movements = MovementEntity::find()
            .filter(stock_movement::Column::SkuId.eq(sku_id))
            .filter(stock_movement::Column::OccurredAt.lt(to))
            .all(db)
            .await?;

        let mut opening = Decimal::ZERO;
        let mut inbound = Decimal::ZERO;
        let mut outbound = Decimal::ZERO;
        let mut returned = Decimal::ZERO;
        for movement in &movements {
            if movement.occurred_at < from {
                opening += movement.quantity;
            } else {
                match movement.kind {
                    MovementKind::In => inbound += movement.quantity,
                    MovementKind::Out => outbound += movement.quantity,
                    MovementKind::Return => returned += movement.quantity,
                }
            }
        }

        Ok(ExpectedQuantity {
            sku_id,
            opening_balance: opening,
            inbound,
            outbound,
            returned,
            expected: opening + inbound + outbound + returned,
        })
    }

    /// Newest-first movement history for a SKU.
    #[instrument(skip(self), fields(sku_id = %sku_id))]
    pub async fn movements_for_sku(
        &self,
        sku_id: Uuid,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<stock_movement::Model>, u64), ServiceError> {
        let db = &*self.db_pool;
        if SkuEntity::find_by_id(sku_id).one(db).await?.is_none() {
            return Err(ServiceError::NotFound(format!("SKU {} not found", sku_id)));
        }

        let paginator = MovementEntity::find()
            .filter(stock_movement::Column::SkuId.eq(sku_id))
            .order_by_desc(stock_movement::Column::OccurredAt)
            .paginate(db, limit);
        let total = paginator.num_items().await?;
        let movements = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((movements, total))
    }

    /// Active SKUs at or below their reorder level.
    #[instrument(skip(self))]
    pub async fn low_stock(
        &self,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<sku::Model>, u64), ServiceError> {
        let db = &*self.db_pool;
        let paginator = SkuEntity::find()
            .filter(sku::Column::IsActive.eq(true))
            .filter(
                Expr::col(sku::Column::QuantityOnHand).lte(Expr::col(sku::Column::ReorderLevel)),
            )
            .order_by_asc(sku::Column::Code)
            .paginate(db, limit);
        let total = paginator.num_items().await?;
        let skus = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((skus, total))
    }

    /// Active SKUs with stock on hand whose expiry date falls within the
    /// horizon.
    #[instrument(skip(self))]
    pub async fn expiring(
        &self,
        within_days: i64,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<sku::Model>, u64), ServiceError> {
        if within_days < 0 {
            return Err(ServiceError::ValidationError(
                "Expiry horizon must not be negative".into(),
            ));
        }
        let db = &*self.db_pool;
        let horizon = self
            .clock
            .today()
            .checked_add_days(Days::new(within_days as u64))
            .unwrap_or_else(|| self.clock.today());

        let paginator = SkuEntity::find()
            .filter(sku::Column::IsActive.eq(true))
            .filter(sku::Column::ExpiryDate.is_not_null())
            .filter(sku::Column::ExpiryDate.lte(horizon))
            .filter(sku::Column::QuantityOnHand.gt(Decimal::ZERO))
            .order_by_asc(sku::Column::ExpiryDate)
            .paginate(db, limit);
        let total = paginator.num_items().await?;
        let skus = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((skus, total))
    }
}

/// Fetches a SKU for a mutation, requiring it to exist and be active.
pub(crate) async fn find_active_sku(
    txn: &DatabaseTransaction,
    sku_id: Uuid,
) -> Result<sku::Model, ServiceError> {
    let sku_model = SkuEntity::find_by_id(sku_id)
        .one(txn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("SKU {} not found", sku_id)))?;
    if !sku_model.is_active {
        return Err(ServiceError::ValidationError(format!(
            "SKU {} ({}) is deactivated",
            sku_model.code, sku_model.name
        )));
    }
    Ok(sku_model)
}

fn to_response(movement: stock_movement::Model, sku: &sku::Model) -> MovementResponse {
    MovementResponse {
        id: movement.id,
        sku_id: movement.sku_id,
        kind: movement.kind,
        quantity: movement.quantity,
        reference: movement.reference,
        actor_id: movement.actor_id,
        occurred_at: movement.occurred_at,
        quantity_on_hand: sku.quantity_on_hand,
    }
}
