//! Returns workflow. Creating a return is effect-free; the stock and balance
//! effect happens exactly once, at approval, inside one transaction.

use crate::{
    clock::SharedClock,
    db::DbPool,
    entities::customer::Entity as CustomerEntity,
    entities::purchase_invoice,
    entities::return_line::{self, Entity as ReturnLineEntity},
    entities::return_request::{self, Entity as ReturnEntity, ReturnDirection, ReturnStatus},
    entities::sales_invoice, entities::sales_invoice_line,
    entities::purchase_invoice_line,
    entities::stock_movement::MovementKind,
    entities::supplier::Entity as SupplierEntity,
    errors::ServiceError,
    events::{Event, EventSender},
    services::stock_ledger::{apply_movement, find_active_sku},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ReturnLineInput {
    pub sku_id: Uuid,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct CreateReturnRequest {
    pub direction: ReturnDirection,
    pub invoice_id: Uuid,
    pub counterparty_id: Uuid,
    pub reason: Option<String>,
    /// When omitted, lines are prefilled from the source invoice.
    pub lines: Option<Vec<ReturnLineInput>>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ReturnListQuery {
    pub status: Option<ReturnStatus>,
    pub direction: Option<ReturnDirection>,
    pub page: u64,
    pub limit: u64,
}

#[derive(Debug, Serialize)]
pub struct ReturnLineResponse {
    pub sku_id: Uuid,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

#[derive(Debug, Serialize)]
pub struct ReturnResponse {
    pub id: Uuid,
    pub direction: ReturnDirection,
    pub status: ReturnStatus,
    pub invoice_id: Uuid,
    pub counterparty_id: Uuid,
    pub reason: Option<String>,
    pub total_amount: Decimal,
    pub requested_by: String,
    pub requested_at: DateTime<Utc>,
    pub decided_by: Option<String>,
    pub decided_at: Option<DateTime<Utc>>,
    pub lines: Vec<ReturnLineResponse>,
}

#[derive(Debug, Serialize)]
pub struct ReturnSummary {
    pub id: Uuid,
    pub direction: ReturnDirection,
    pub status: ReturnStatus,
    pub invoice_id: Uuid,
    pub counterparty_id: Uuid,
    pub total_amount: Decimal,
    pub requested_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
}

impl From<return_request::Model> for ReturnSummary {
    fn from(model: return_request::Model) -> Self {
        Self {
            id: model.id,
            direction: model.direction,
            status: model.status,
            invoice_id: model.invoice_id,
            counterparty_id: model.counterparty_id,
            total_amount: model.total_amount,
            requested_at: model.requested_at,
            decided_at: model.decided_at,
        }
    }
}

#[derive(Clone)]
pub struct ReturnService {
    db_pool: Arc<DbPool>,
    clock: SharedClock,
    event_sender: Option<Arc<EventSender>>,
}

impl ReturnService {
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
                warn!(error = %e, "Failed to send return event");
            }
        }
    }

    /// Creates a Pending return. No stock or balance effect until approval.
    #[instrument(skip(self, request), fields(direction = %request.direction, invoice_id = %request.invoice_id))]
    pub async fn create_return(
        &self,
        actor_id: &str,
        request: CreateReturnRequest,
    ) -> Result<ReturnResponse, ServiceError> {
        let db = &*self.db_pool;
        let now = self.clock.now();
        let txn = db.begin().await?;

        match request.direction {
            ReturnDirection::Sales => {
                if CustomerEntity::find_by_id(request.counterparty_id)
                    .one(&txn)
                    .await?
                    .is_none()
                {
                    return Err(ServiceError::NotFound(format!(
                        "Customer {} not found",
                        request.counterparty_id
                    )));
                }
            }
            ReturnDirection::Purchase => {
                if SupplierEntity::find_by_id(request.counterparty_id)
                    .one(&txn)
                    .await?
                    .is_none()
                {
                    return Err(ServiceError::NotFound(format!(
                        "Supplier {} not found",
                        request.counterparty_id
                    )));
                }
            }
        }

        // The source invoice must exist on the matching side; prefill lines
        // from it when the caller sent none.
        let lines = match request.direction {
            ReturnDirection::Sales => {
                let invoice = sales_invoice::Entity::find_by_id(request.invoice_id)
                    .one(&txn)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!(
                            "Sales invoice {} not found",
                            request.invoice_id
                        ))
                    })?;
                match request.lines {
                    Some(lines) => lines,
                    None => sales_invoice_line::Entity::find()
                        .filter(sales_invoice_line::Column::InvoiceId.eq(invoice.id))
                        .all(&txn)
                        .await?
                        .into_iter()
                        .map(|line| ReturnLineInput {
                            sku_id: line.sku_id,
                            quantity: line.quantity,
                            unit_price: line.unit_price,
                        })
                        .collect(),
                }
            }
            ReturnDirection::Purchase => {
                let invoice = purchase_invoice::Entity::find_by_id(request.invoice_id)
                    .one(&txn)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!(
                            "Purchase invoice {} not found",
                            request.invoice_id
                        ))
                    })?;
                match request.lines {
                    Some(lines) => lines,
                    None => purchase_invoice_line::Entity::find()
                        .filter(purchase_invoice_line::Column::InvoiceId.eq(invoice.id))
                        .all(&txn)
                        .await?
                        .into_iter()
                        .map(|line| ReturnLineInput {
                            sku_id: line.sku_id,
                            quantity: line.quantity,
                            unit_price: line.unit_price,
                        })
                        .collect(),
                }
            }
        };

        if lines.is_empty() {
            return Err(ServiceError::ValidationError(
                "Return must have at least one line".into(),
            ));
        }
        let mut total = Decimal::ZERO;
        for line in &lines {
            if line.quantity <= Decimal::ZERO {
                return Err(ServiceError::ValidationError(format!(
                    "Return quantity for SKU {} must be positive",
                    line.sku_id
                )));
            }
            if line.unit_price < Decimal::ZERO {
                return Err(ServiceError::ValidationError(format!(
                    "Return unit price for SKU {} must not be negative",
                    line.sku_id
                )));
            }
            total += line.quantity * line.unit_price;
        }

        let return_model = return_request::ActiveModel {
            id: Set(Uuid::new_v4()),
            direction: Set(request.direction),
            status: Set(ReturnStatus::Pending),
            invoice_id: Set(request.invoice_id),
            counterparty_id: Set(request.counterparty_id),
            reason: Set(request.reason),
            total_amount: Set(total),
            requested_by: Set(actor_id.to_string()),
            requested_at: Set(now),
            decided_by: Set(None),
            decided_at: Set(None),
        }
        .insert(&txn)
        .await?;

        let mut line_responses = Vec::with_capacity(lines.len());
        for line in &lines {
            return_line::ActiveModel {
                id: Set(Uuid::new_v4()),
                return_id: Set(return_model.id),
                sku_id: Set(line.sku_id),
                quantity: Set(line.quantity),
                unit_price: Set(line.unit_price),
            }
            .insert(&txn)
            .await?;
            line_responses.push(ReturnLineResponse {
                sku_id: line.sku_id,
                quantity: line.quantity,
                unit_price: line.unit_price,
                line_total: line.quantity * line.unit_price,
            });
        }

        txn.commit().await?;

        info!(return_id = %return_model.id, total = %total, "Return requested");
        self.emit(Event::ReturnRequested(return_model.id)).await;

        Ok(to_response(return_model, line_responses))
    }

    /// Approves a Pending return and applies its stock effect exactly once.
    /// Sales-direction lines go back into stock (+q); Purchase-direction
    /// lines leave stock (−q) and are subject to the sufficiency check.
    #[instrument(skip(self), fields(return_id = %return_id))]
    pub async fn approve(&self, actor_id: &str, return_id: Uuid) -> Result<ReturnResponse, ServiceError> {
        let db = &*self.db_pool;
        let now = self.clock.now();
        let txn = db.begin().await?;

        let return_model = find_pending(&txn, return_id).await?;
        let lines = ReturnLineEntity::find()
            .filter(return_line::Column::ReturnId.eq(return_id))
            .all(&txn)
            .await?;

        let mut touched_skus = Vec::with_capacity(lines.len());
        for line in &lines {
            let signed = match return_model.direction {
                ReturnDirection::Sales => line.quantity,
                ReturnDirection::Purchase => -line.quantity,
            };
            let sku_model = find_active_sku(&txn, line.sku_id).await?;
            let (_, updated_sku) = apply_movement(
                &txn,
                actor_id,
                sku_model,
                MovementKind::Return,
                signed,
                Some(format!("return {}", return_id)),
                now,
            )
            .await?;
            touched_skus.push(updated_sku);
        }

        let mut active: return_request::ActiveModel = return_model.into();
        active.status = Set(ReturnStatus::Approved);
        active.decided_by = Set(Some(actor_id.to_string()));
        active.decided_at = Set(Some(now));
        let updated = active.update(&txn).await?;

        txn.commit().await?;

        info!(return_id = %return_id, "Return approved");
        self.emit(Event::ReturnApproved(return_id)).await;
        for sku_model in &touched_skus {
            if sku_model.is_low_stock() {
                self.emit(Event::LowStock {
                    sku_id: sku_model.id,
                    quantity_on_hand: sku_model.quantity_on_hand,
                    reorder_level: sku_model.reorder_level,
                })
                .await;
            }
        }

        Ok(to_response(updated, line_responses(lines)))
    }

    /// Rejects a Pending return. Terminal; nothing beyond the status changes.
    #[instrument(skip(self), fields(return_id = %return_id))]
    pub async fn reject(&self, actor_id: &str, return_id: Uuid) -> Result<ReturnResponse, ServiceError> {
        let db = &*self.db_pool;
        let now = self.clock.now();
        let txn = db.begin().await?;

        let return_model = find_pending(&txn, return_id).await?;
        let lines = ReturnLineEntity::find()
            .filter(return_line::Column::ReturnId.eq(return_id))
            .all(&txn)
            .await?;

        let mut active: return_request::ActiveModel = return_model.into();
        active.status = Set(ReturnStatus::Rejected);
        active.decided_by = Set(Some(actor_id.to_string()));
        active.decided_at = Set(Some(now));
        let updated = active.update(&txn).await?;

        txn.commit().await?;

        info!(return_id = %return_id, "Return rejected");
        self.emit(Event::ReturnRejected(return_id)).await;

        Ok(to_response(updated, line_responses(lines)))
    }

    #[instrument(skip(self), fields(return_id = %return_id))]
    pub async fn get_return(&self, return_id: Uuid) -> Result<ReturnResponse, ServiceError> {
        let db = &*self.db_pool;
        let return_model = ReturnEntity::find_by_id(return_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Return {} not found", return_id)))?;
        let lines = ReturnLineEntity::find()
            .filter(return_line::Column::ReturnId.eq(return_id))
            .all(db)
            .await?;
        Ok(to_response(return_model, line_responses(lines)))
    }

    #[instrument(skip(self, query))]
    pub async fn list_returns(
        &self,
        query: ReturnListQuery,
    ) -> Result<(Vec<ReturnSummary>, u64), ServiceError> {
        let db = &*self.db_pool;
        let mut finder = ReturnEntity::find();
        if let Some(status) = query.status {
            finder = finder.filter(return_request::Column::Status.eq(status));
        }
        if let Some(direction) = query.direction {
            finder = finder.filter(return_request::Column::Direction.eq(direction));
        }
        let paginator = finder
            .order_by_desc(return_request::Column::RequestedAt)
            .paginate(db, query.limit);
        let total = paginator.num_items().await?;
        let returns = paginator.fetch_page(query.page.saturating_sub(1)).await?;
        Ok((returns.into_iter().map(ReturnSummary::from).collect(), total))
    }
}

/// Loads a return for a decision; Approved and Rejected are terminal.
async fn find_pending(
    txn: &DatabaseTransaction,
    return_id: Uuid,
) -> Result<return_request::Model, ServiceError> {
    let return_model = ReturnEntity::find_by_id(return_id)
        .one(txn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Return {} not found", return_id)))?;
    if !return_model.is_pending() {
        return Err(ServiceError::InvalidOperation(format!(
            "Return {} is already {}",
            return_id, return_model.status
        )));
    }
    Ok(return_model)
}

fn line_responses(lines: Vec<return_line::Model>) -> Vec<ReturnLineResponse> {
    lines
        .into_iter()
        .map(|line| ReturnLineResponse {
            sku_id: line.sku_id,
            quantity: line.quantity,
            unit_price: line.unit_price,
            line_total: line.line_total(),
        })
        .collect()
}

fn to_response(model: return_request::Model, lines: Vec<ReturnLineResponse>) -> ReturnResponse {
    ReturnResponse {
        id: model.id,
        direction: model.direction,
        status: model.status,
        invoice_id: model.invoice_id,
        counterparty_id: model.counterparty_id,
        reason: model.reason,
        total_amount: model.total_amount,
        requested_by: model.requested_by,
        requested_at: model.requested_at,
        decided_by: model.decided_by,
        decided_at: model.decided_at,
        lines,
    }
}
