//! Sales invoicing. One transaction covers the invoice, its lines, the Out
//! movements, the customer balance, and the optional installment plan; any
//! failure rolls the whole sale back.

use crate::{
    clock::SharedClock,
    db::DbPool,
    entities::customer::{self, Entity as CustomerEntity},
    entities::sales_invoice::{self, Entity as InvoiceEntity},
    entities::sales_invoice_line::{self, Entity as LineEntity},
    entities::sku,
    entities::stock_movement::MovementKind,
    errors::ServiceError,
    events::{Event, EventSender},
    services::installments::{create_plan_in_txn, InstallmentRequest},
    services::settlement::{self, SettlementStatus},
    services::stock_ledger::{apply_movement, find_active_sku},
    services::window_bounds,
};
use chrono::{DateTime, NaiveDate, Utc};
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
pub struct InvoiceLineInput {
    pub sku_id: Uuid,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct CreateSalesInvoiceRequest {
    pub customer_id: Uuid,
    pub lines: Vec<InvoiceLineInput>,
    #[serde(default)]
    pub amount_paid: Decimal,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
    pub installment: Option<InstallmentRequest>,
}

#[derive(Debug, Deserialize, Default)]
pub struct InvoiceListQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub customer_id: Option<Uuid>,
    pub page: u64,
    pub limit: u64,
}

#[derive(Debug, Serialize)]
pub struct InvoiceLineResponse {
    pub sku_id: Uuid,
    pub sku_code: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

#[derive(Debug, Serialize)]
pub struct SalesInvoiceResponse {
    pub id: Uuid,
    pub invoice_number: String,
    pub customer_id: Uuid,
    pub issued_at: DateTime<Utc>,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub balance: Decimal,
    pub settlement: SettlementStatus,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
    pub lines: Vec<InvoiceLineResponse>,
    pub installment_plan_id: Option<Uuid>,
}

/// Totals over whatever window/filter a listing used.
#[derive(Debug, Serialize)]
pub struct InvoiceTotals {
    pub gross: Decimal,
    pub paid: Decimal,
    pub outstanding: Decimal,
}

#[derive(Debug, Serialize)]
pub struct InvoiceSummary {
    pub id: Uuid,
    pub invoice_number: String,
    pub counterparty_id: Uuid,
    pub issued_at: DateTime<Utc>,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub balance: Decimal,
    pub settlement: SettlementStatus,
}

impl From<sales_invoice::Model> for InvoiceSummary {
    fn from(model: sales_invoice::Model) -> Self {
        let balance = model.balance();
        Self {
            id: model.id,
            invoice_number: model.invoice_number,
            counterparty_id: model.customer_id,
            issued_at: model.issued_at,
            total_amount: model.total_amount,
            paid_amount: model.paid_amount,
            balance,
            settlement: settlement::classify(model.total_amount, model.paid_amount),
        }
    }
}

/// Derives the next date-scoped invoice number inside the transaction, e.g.
/// `202601070001` or `PI-202601070003`.
pub(crate) async fn next_invoice_number<C, E, M>(
    txn: &C,
    number_column: E::Column,
    prefix: &str,
    extract: impl Fn(&M) -> &str,
) -> Result<String, ServiceError>
where
    C: ConnectionTrait,
    E: EntityTrait<Model = M>,
    M: sea_orm::ModelTrait<Entity = E>,
{
    let latest = E::find()
        .filter(number_column.starts_with(prefix))
        .order_by_desc(number_column)
        .one(txn)
        .await?;

    let next_seq = latest
        .as_ref()
        .map(|model| extract(model))
        .and_then(|number| number.strip_prefix(prefix))
        .and_then(|suffix| suffix.parse::<u32>().ok())
        .unwrap_or(0)
        + 1;

    Ok(format!("{}{:04}", prefix, next_seq))
}

/// Validates the shared line shape for invoices and returns the total.
pub(crate) fn validate_lines(lines: &[InvoiceLineInput]) -> Result<Decimal, ServiceError> {
    if lines.is_empty() {
        return Err(ServiceError::ValidationError(
            "Invoice must have at least one line".into(),
        ));
    }
    let mut total = Decimal::ZERO;
    for line in lines {
        if line.quantity <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(format!(
                "Line quantity for SKU {} must be positive",
                line.sku_id
            )));
        }
        if line.unit_price < Decimal::ZERO {
            return Err(ServiceError::ValidationError(format!(
                "Line unit price for SKU {} must not be negative",
                line.sku_id
            )));
        }
        total += line.quantity * line.unit_price;
    }
    Ok(total)
}

#[derive(Clone)]
pub struct SalesService {
    db_pool: Arc<DbPool>,
    clock: SharedClock,
    event_sender: Option<Arc<EventSender>>,
}

impl SalesService {
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
                warn!(error = %e, "Failed to send sales event");
            }
        }
    }

    #[instrument(skip(self, request), fields(customer_id = %request.customer_id, line_count = request.lines.len()))]
    pub async fn create_invoice(
        &self,
        actor_id: &str,
        request: CreateSalesInvoiceRequest,
    ) -> Result<SalesInvoiceResponse, ServiceError> {
        let total = validate_lines(&request.lines)?;
        if request.amount_paid < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Paid amount must not be negative".into(),
            ));
        }

        // Required up front: the down payment for installment sales, the full
        // total otherwise. Nothing persists when the payment falls short.
        let required = match &request.installment {
            Some(plan) => {
                if plan.down_payment < Decimal::ZERO || plan.down_payment > total {
                    return Err(ServiceError::ValidationError(
                        "Down payment must be between zero and the invoice total".into(),
                    ));
                }
                plan.down_payment
            }
            None => total,
        };
        if request.amount_paid < required {
            return Err(ServiceError::ValidationError(format!(
                "Insufficient payment: {} received, {} required",
                request.amount_paid, required
            )));
        }

        let db = &*self.db_pool;
        let now = self.clock.now();
        let txn = db.begin().await?;

        let customer_model = CustomerEntity::find_by_id(request.customer_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Customer {} not found", request.customer_id))
            })?;

        let paid_on_invoice = match &request.installment {
            // The bank pays the shop out in full immediately.
            Some(plan) if plan.kind == crate::entities::installment_plan::PlanKind::Bank => total,
            Some(plan) => plan.down_payment,
            None => request.amount_paid,
        };

        let prefix = self.clock.today().format("%Y%m%d").to_string();
        let invoice_number = next_invoice_number::<_, InvoiceEntity, _>(
            &txn,
            sales_invoice::Column::InvoiceNumber,
            &prefix,
            |m: &sales_invoice::Model| m.invoice_number.as_str(),
        )
        .await?;

        let invoice = sales_invoice::ActiveModel {
            id: Set(Uuid::new_v4()),
            invoice_number: Set(invoice_number.clone()),
            customer_id: Set(request.customer_id),
            issued_at: Set(now),
            total_amount: Set(total),
            paid_amount: Set(paid_on_invoice),
            payment_method: Set(request.payment_method),
            notes: Set(request.notes),
            created_by: Set(actor_id.to_string()),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let mut line_responses = Vec::with_capacity(request.lines.len());
        let mut touched_skus: Vec<sku::Model> = Vec::with_capacity(request.lines.len());
        for line in &request.lines {
            sales_invoice_line::ActiveModel {
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
            let (_, updated_sku) = apply_movement(
                &txn,
                actor_id,
                sku_model,
                MovementKind::Out,
                -line.quantity,
                Some(invoice_number.clone()),
                now,
            )
            .await?;
            touched_skus.push(updated_sku);

            line_responses.push(InvoiceLineResponse {
                sku_id: line.sku_id,
                sku_code,
                quantity: line.quantity,
                unit_price: line.unit_price,
                line_total: line.quantity * line.unit_price,
            });
        }

        // Outstanding balance accrues on the customer's receivable.
        let invoice_balance = total - paid_on_invoice;
        if !invoice_balance.is_zero() {
            let new_balance = customer_model.balance + invoice_balance;
            let mut customer_active: customer::ActiveModel = customer_model.into();
            customer_active.balance = Set(new_balance);
            customer_active.updated_at = Set(Some(now));
            customer_active.update(&txn).await?;
        }

        let plan = match &request.installment {
            Some(plan_request) => Some(
                create_plan_in_txn(
                    &txn,
                    actor_id,
                    request.customer_id,
                    invoice.id,
                    total,
                    plan_request,
                    now,
                )
                .await?,
            ),
            None => None,
        };

        txn.commit().await?;

        info!(
            invoice_id = %invoice.id,
            invoice_number = %invoice.invoice_number,
            total = %total,
            "Sales invoice created"
        );
        self.emit(Event::SalesInvoiceCreated(invoice.id)).await;
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
        if let Some(plan_model) = &plan {
            self.emit(Event::InstallmentPlanOpened(plan_model.id)).await;
        }

        Ok(SalesInvoiceResponse {
            id: invoice.id,
            invoice_number: invoice.invoice_number,
            customer_id: invoice.customer_id,
            issued_at: invoice.issued_at,
            total_amount: invoice.total_amount,
            paid_amount: invoice.paid_amount,
            balance: settlement::balance(invoice.total_amount, invoice.paid_amount),
            settlement: settlement::classify(invoice.total_amount, invoice.paid_amount),
            payment_method: invoice.payment_method,
            notes: invoice.notes,
            lines: line_responses,
            installment_plan_id: plan.map(|p| p.id),
        })
    }

    #[instrument(skip(self), fields(invoice_id = %invoice_id))]
    pub async fn get_invoice(&self, invoice_id: Uuid) -> Result<SalesInvoiceResponse, ServiceError> {
        let db = &*self.db_pool;
        let invoice = InvoiceEntity::find_by_id(invoice_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Sales invoice {} not found", invoice_id))
            })?;

        let lines = LineEntity::find()
            .filter(sales_invoice_line::Column::InvoiceId.eq(invoice_id))
            .find_also_related(crate::entities::sku::Entity)
            .all(db)
            .await?;

        let plan = crate::entities::installment_plan::Entity::find()
            .filter(
                crate::entities::installment_plan::Column::SalesInvoiceId.eq(invoice_id),
            )
            .one(db)
            .await?;

        let balance = invoice.balance();
        Ok(SalesInvoiceResponse {
            id: invoice.id,
            invoice_number: invoice.invoice_number,
            customer_id: invoice.customer_id,
            issued_at: invoice.issued_at,
            total_amount: invoice.total_amount,
            paid_amount: invoice.paid_amount,
            balance,
            settlement: settlement::classify(invoice.total_amount, invoice.paid_amount),
            payment_method: invoice.payment_method,
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
            installment_plan_id: plan.map(|p| p.id),
        })
    }

    /// Newest-first listing with gross/paid/outstanding totals over the
    /// filtered set.
    #[instrument(skip(self, query))]
    pub async fn list_invoices(
        &self,
        query: InvoiceListQuery,
    ) -> Result<(Vec<InvoiceSummary>, u64, InvoiceTotals), ServiceError> {
        let db = &*self.db_pool;
        let mut finder = InvoiceEntity::find();
        if let (Some(from), Some(to)) = (query.from, query.to) {
            let (start, end) = window_bounds(from, to);
            finder = finder
                .filter(sales_invoice::Column::IssuedAt.gte(start))
                .filter(sales_invoice::Column::IssuedAt.lt(end));
        }
        if let Some(customer_id) = query.customer_id {
            finder = finder.filter(sales_invoice::Column::CustomerId.eq(customer_id));
        }

        let all = finder
            .clone()
            .order_by_desc(sales_invoice::Column::IssuedAt)
            .all(db)
            .await?;
        let totals = InvoiceTotals {
            gross: all.iter().map(|i| i.total_amount).sum(),
            paid: all.iter().map(|i| i.paid_amount).sum(),
            outstanding: all.iter().map(|i| i.balance()).sum(),
        };

        let paginator = finder
            .order_by_desc(sales_invoice::Column::IssuedAt)
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
