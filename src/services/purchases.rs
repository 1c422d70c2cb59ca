//! Purchase invoicing: the mirror of the sales side with In movements (no
//! sufficiency check) and the supplier's payable balance.

use crate::{
    clock::SharedClock,
    db::DbPool,
    entities::purchase_invoice::{self, Entity as InvoiceEntity},
    entities::purchase_invoice_line::{self, Entity as LineEntity},
    entities::stock_movement::MovementKind,
    entities::supplier::{self, Entity as SupplierEntity},
    errors::ServiceError,
    events::{Event, EventSender},
    services::sales::{
        next_invoice_number, validate_lines, InvoiceLineInput, InvoiceLineResponse,
        InvoiceSummary, InvoiceTotals,
    },
    services::settlement::{self, SettlementStatus},
    services::stock_ledger::{apply_movement, find_active_sku},
    services::window_bounds,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

const PURCHASE_NUMBER_PREFIX: &str = "PI-";

#[derive(Debug, Deserialize)]
pub struct CreatePurchaseInvoiceRequest {
    pub supplier_id: Uuid,
    pub lines: Vec<InvoiceLineInput>,
    #[serde(default)]
    pub amount_paid: Decimal,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PurchaseListQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub supplier_id: Option<Uuid>,
    pub page: u64,
    pub limit: u64,
}

#[derive(Debug, Serialize)]
pub struct PurchaseInvoiceResponse {
    pub id: Uuid,
    pub invoice_number: String,
    pub supplier_id: Uuid,
    pub issued_at: DateTime<Utc>,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub balance: Decimal,
    pub settlement: SettlementStatus,
    pub notes: Option<String>,
    pub lines: Vec<InvoiceLineResponse>,
}

impl From<purchase_invoice::Model> for InvoiceSummary {
    fn from(model: purchase_invoice::Model) -> Self {
        let balance = model.balance();
        Self {
            id: model.id,
            invoice_number: model.invoice_number,
            counterparty_id: model.supplier_id,
            issued_at: model.issued_at,
            total_amount: model.total_amount,
            paid_amount: model.paid_amount,
            balance,
            settlement: settlement::classify(model.total_amount, model.paid_amount),
        }
    }
}

#[derive(Clone)]
pub struct PurchaseService {
    db_pool: Arc<DbPool>,
    clock: SharedClock,
    event_sender: Option<Arc<EventSender>>,
}

impl PurchaseService {
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
                warn!(error = %e, "Failed to send purchase event");
            }
        }
    }

    #[instrument(skip(self, request), fields(supplier_id = %request.supplier_id, line_count = request.lines.len()))]
    pub async fn create_invoice(
        &self,
        actor_id: &str,
        request: CreatePurchaseInvoiceRequest,
    ) -> Result<PurchaseInvoiceResponse, ServiceError> {
        let total = validate_lines(&request.lines)?;
        if request.amount_paid < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Paid amount must not be negative".into(),
            ));
        }

        let db = &*self.db_pool;
        let now = self.clock.now();
        let txn = db.begin().await?;

        let supplier_model = SupplierEntity::find_by_id(request.supplier_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Supplier {} not found", request.supplier_id))
            })?;

        let prefix = format!(
            "{}{}",
            PURCHASE_NUMBER_PREFIX,
            self.clock.today().format("%Y%m%d")
        );
        let invoice_number = next_invoice_number::<_, InvoiceEntity, _>(
            &txn,
            purchase_invoice::Column::InvoiceNumber,
            &prefix,
            |m: &purchase_invoice::Model| m.invoice_number.as_str(),
        )
        .await?;

        let invoice = purchase_invoice::ActiveModel {
            id: Set(Uuid::new_v4()),
            invoice_number: Set(invoice_number.clone()),
            supplier_id: Set(request.supplier_id),
            issued_at: Set(now),
            total_amount: Set(total),
            paid_amount: Set(request.amount_paid),
            notes: Set(request.notes),
            created_by: Set(actor_id.to_string()),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let mut line_responses = Vec::with_capacity(request.lines.len());
        for line in &request.lines {
            purchase_invoice_line::ActiveModel {
                id: Set(Uuid::new_v4()),
                invoice_id: Set(invoice.id),
                sku_id: Set(line.sku_id),
                quantity: Set(line.quantity),
                unit_price: Set(line.unit_price),
            }
            .insert(&txn)
            .await?;

            let sku_model = find_active_sku(&txn, line.sku_id).await?;
            let sku_code = sku_model.code.clone();
            apply_movement(
                &txn,
                actor_id,
                sku_model,
                MovementKind::In,
                line.quantity,
                Some(invoice_number.clone()),
                now,
            )
            .await?;

            line_responses.push(InvoiceLineResponse {
                sku_id: line.sku_id,
                sku_code,
                quantity: line.quantity,
                unit_price: line.unit_price,
                line_total: line.quantity * line.unit_price,
            });
        }

        // The unpaid part of the invoice becomes payable to the supplier.
        let invoice_balance = total - request.amount_paid;
        if !invoice_balance.is_zero() {
            let new_balance = supplier_model.balance + invoice_balance;
            let mut supplier_active: supplier::ActiveModel = supplier_model.into();
            supplier_active.balance = Set(new_balance);
            supplier_active.updated_at = Set(Some(now));
            supplier_active.update(&txn).await?;
        }

        txn.commit().await?;

        info!(
            invoice_id = %invoice.id,
            invoice_number = %invoice.invoice_number,
            total = %total,
            "Purchase invoice created"
        );
        self.emit(Event::PurchaseInvoiceCreated(invoice.id)).await;

        Ok(PurchaseInvoiceResponse {
            id: invoice.id,
            invoice_number: invoice.invoice_number,
            supplier_id: invoice.supplier_id,
            issued_at: invoice.issued_at,
            total_amount: invoice.total_amount,
            paid_amount: invoice.paid_amount,
            balance: settlement::balance(invoice.total_amount, invoice.paid_amount),
            settlement: settlement::classify(invoice.total_amount, invoice.paid_amount),
            notes: invoice.notes,
            lines: line_responses,
        })
    }

    #[instrument(skip(self), fields(invoice_id = %invoice_id))]
    pub async fn get_invoice(
        &self,
        invoice_id: Uuid,
    ) -> Result<PurchaseInvoiceResponse, ServiceError> {
        let db = &*self.db_pool;
        let invoice = InvoiceEntity::find_by_id(invoice_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Purchase invoice {} not found", invoice_id))
            })?;

        let lines = LineEntity::find()
            .filter(purchase_invoice_line::Column::InvoiceId.eq(invoice_id))
            .find_also_related(crate::entities::sku::Entity)
            .all(db)
            .await?;

        let balance = invoice.balance();
        Ok(PurchaseInvoiceResponse {
            id: invoice.id,
            invoice_number: invoice.invoice_number,
            supplier_id: invoice.supplier_id,
            issued_at: invoice.issued_at,
            total_amount: invoice.total_amount,
            paid_amount: invoice.paid_amount,
            balance,
            settlement: settlement::classify(invoice.total_amount, invoice.paid_amount),
            notes: invoice.notes,
            lines: lines
                .into_iter()
                .map(|(line, sku_model)| InvoiceLineResponse {
                    sku_id: line.sku_id,
                    sku_code: sku_model.map(|s| s.code).unwrap_or_default(),
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    line_total: line.line_total(),
                })
                .collect(),
        })
    }

    #[instrument(skip(self, query))]
    pub async fn list_invoices(
        &self,
        query: PurchaseListQuery,
    ) -> Result<(Vec<InvoiceSummary>, u64, InvoiceTotals), ServiceError> {
        let db = &*self.db_pool;
        let mut finder = InvoiceEntity::find();
        if let (Some(from), Some(to)) = (query.from, query.to) {
            let (start, end) = window_bounds(from, to);
            finder = finder
                .filter(purchase_invoice::Column::IssuedAt.gte(start))
                .filter(purchase_invoice::Column::IssuedAt.lt(end));
        }
        if let Some(supplier_id) = query.supplier_id {
            finder = finder.filter(purchase_invoice::Column::SupplierId.eq(supplier_id));
        }

        let all = finder
            .clone()
            .order_by_desc(purchase_invoice::Column::IssuedAt)
            .all(db)
            .await?;
        let totals = InvoiceTotals {
            gross: all.iter().map(|i| i.total_amount).sum(),
            paid: all.iter().map(|i| i.paid_amount).sum(),
            outstanding: all.iter().map(|i| i.balance()).sum(),
        };

        let paginator = finder
            .order_by_desc(purchase_invoice::Column::IssuedAt)
            .paginate(db, query.limit);
        let total_count = paginator.num_items().await?;
        let page = paginator.fetch_page(query.page.saturating_sub(1)).await?;

        Ok((
            page.into_iter().map(InvoiceSummary::from).collect(),
            total_count,
            totals,
        ))
    }
}
