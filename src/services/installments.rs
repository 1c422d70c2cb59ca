//! Installment plans and the payment state machine.
//!
//! Plans are created inside the sales invoice transaction; payments arrive
//! later through [`InstallmentService::apply_payment`]. Payment records are
//! immutable and the plan's remaining balance never goes negative.

use crate::{
    clock::{add_months, SharedClock},
    db::DbPool,
    entities::installment_payment::{self, Entity as PaymentEntity},
    entities::installment_plan::{self, Entity as PlanEntity, PlanKind, PlanStatus},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Plan parameters carried on a sales invoice request.
#[derive(Debug, Deserialize)]
pub struct InstallmentRequest {
    pub kind: PlanKind,
    pub down_payment: Decimal,
    pub months: i32,
}

#[derive(Debug, Deserialize)]
pub struct ApplyPaymentRequest {
    pub amount: Decimal,
    pub method: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PlanListQuery {
    pub status: Option<PlanStatus>,
    pub customer_id: Option<Uuid>,
    /// Only plans whose next due date falls within this many days.
    pub due_within_days: Option<i64>,
    pub page: u64,
    pub limit: u64,
}

#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub sales_invoice_id: Uuid,
    pub kind: PlanKind,
    pub status: PlanStatus,
    pub total_amount: Decimal,
    pub down_payment: Decimal,
    pub remaining_amount: Decimal,
    pub months_left: i32,
    pub monthly_amount: Decimal,
    pub next_due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<installment_plan::Model> for PlanResponse {
    fn from(model: installment_plan::Model) -> Self {
        Self {
            id: model.id,
            customer_id: model.customer_id,
            sales_invoice_id: model.sales_invoice_id,
            kind: model.kind,
            status: model.status,
            total_amount: model.total_amount,
            down_payment: model.down_payment,
            remaining_amount: model.remaining_amount,
            months_left: model.months_left,
            monthly_amount: model.monthly_amount,
            next_due_date: model.next_due_date,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub amount: Decimal,
    pub method: Option<String>,
    pub notes: Option<String>,
    pub paid_at: DateTime<Utc>,
    pub recorded_by: String,
}

impl From<installment_payment::Model> for PaymentResponse {
    fn from(model: installment_payment::Model) -> Self {
        Self {
            id: model.id,
            plan_id: model.plan_id,
            amount: model.amount,
            method: model.method,
            notes: model.notes,
            paid_at: model.paid_at,
            recorded_by: model.recorded_by,
        }
    }
}

/// Initial figures for a new plan.
#[derive(Debug, PartialEq)]
pub(crate) struct PlanTerms {
    pub remaining: Decimal,
    pub months_left: i32,
    pub monthly: Decimal,
    pub status: PlanStatus,
    pub next_due: Option<DateTime<Utc>>,
}

/// Derives the opening terms. Bank plans are collected in full at creation;
/// the others owe `total - down` split over the month count.
pub(crate) fn plan_terms(
    kind: PlanKind,
    total: Decimal,
    down_payment: Decimal,
    months: i32,
    now: DateTime<Utc>,
) -> PlanTerms {
    if kind == PlanKind::Bank {
        return PlanTerms {
            remaining: Decimal::ZERO,
            months_left: 0,
            monthly: Decimal::ZERO,
            status: PlanStatus::BankCollected,
            next_due: None,
        };
    }

    let remaining = total - down_payment;
    if remaining <= Decimal::ZERO {
        return PlanTerms {
            remaining: Decimal::ZERO,
            months_left: 0,
            monthly: Decimal::ZERO,
            status: PlanStatus::Completed,
            next_due: None,
        };
    }

    let monthly = if months > 0 {
        (remaining / Decimal::from(months)).round_dp(2)
    } else {
        remaining
    };
    PlanTerms {
        remaining,
        months_left: months.max(0),
        monthly,
        status: PlanStatus::Active,
        next_due: Some(add_months(now, 1)),
    }
}

/// Creates the plan (and, for Bank plans, the up-front payment record) inside
/// the sales invoice transaction.
pub(crate) async fn create_plan_in_txn(
    txn: &DatabaseTransaction,
    actor_id: &str,
    customer_id: Uuid,
    sales_invoice_id: Uuid,
    total: Decimal,
    request: &InstallmentRequest,
    now: DateTime<Utc>,
) -> Result<installment_plan::Model, ServiceError> {
    if request.down_payment < Decimal::ZERO || request.down_payment > total {
        return Err(ServiceError::ValidationError(
            "Down payment must be between zero and the invoice total".into(),
        ));
    }
    if request.months < 0 {
        return Err(ServiceError::ValidationError(
            "Month count must not be negative".into(),
        ));
    }

    let terms = plan_terms(request.kind, total, request.down_payment, request.months, now);

    let plan = installment_plan::ActiveModel {
        id: Set(Uuid::new_v4()),
        customer_id: Set(customer_id),
        sales_invoice_id: Set(sales_invoice_id),
        kind: Set(request.kind),
        status: Set(terms.status),
        total_amount: Set(total),
        down_payment: Set(request.down_payment),
        remaining_amount: Set(terms.remaining),
        months_left: Set(terms.months_left),
        monthly_amount: Set(terms.monthly),
        next_due_date: Set(terms.next_due),
        created_by: Set(actor_id.to_string()),
        created_at: Set(now),
    }
    .insert(txn)
    .await?;

    // The bank settles the financed balance immediately; keep that on record
    // as one payment so the plan's history adds up.
    if request.kind == PlanKind::Bank {
        let bank_covered = total - request.down_payment;
        if bank_covered > Decimal::ZERO {
            installment_payment::ActiveModel {
                id: Set(Uuid::new_v4()),
                plan_id: Set(plan.id),
                amount: Set(bank_covered),
                method: Set(Some("bank".into())),
                notes: Set(Some("bank collection at plan creation".into())),
                paid_at: Set(now),
                recorded_by: Set(actor_id.to_string()),
            }
            .insert(txn)
            .await?;
        }
    }

    Ok(plan)
}

#[derive(Clone)]
pub struct InstallmentService {
    db_pool: Arc<DbPool>,
    clock: SharedClock,
    event_sender: Option<Arc<EventSender>>,
}

impl InstallmentService {
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
                warn!(error = %e, "Failed to send installment event");
            }
        }
    }

    /// Applies one payment: remaining drops (floored at zero), the month
    /// counter decrements, and the plan completes when either reaches zero.
    #[instrument(skip(self, request), fields(plan_id = %plan_id, amount = %request.amount))]
    pub async fn apply_payment(
        &self,
        actor_id: &str,
        plan_id: Uuid,
        request: ApplyPaymentRequest,
    ) -> Result<PlanResponse, ServiceError> {
        if request.amount <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Payment amount must be positive".into(),
            ));
        }

        let db = &*self.db_pool;
        let now = self.clock.now();
        let txn = db.begin().await?;

        let plan = PlanEntity::find_by_id(plan_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Installment plan {} not found", plan_id))
            })?;
        if !plan.accepts_payments() {
            return Err(ServiceError::InvalidOperation(format!(
                "Installment plan {} is {} and no longer accepts payments",
                plan_id, plan.status
            )));
        }

        let remaining = (plan.remaining_amount - request.amount).max(Decimal::ZERO);
        let months_left = (plan.months_left - 1).max(0);
        let completed = remaining.is_zero() || months_left == 0;
        let monthly = if completed || months_left == 0 {
            Decimal::ZERO
        } else {
            (remaining / Decimal::from(months_left)).round_dp(2)
        };
        let next_due = if completed { None } else { Some(add_months(now, 1)) };

        installment_payment::ActiveModel {
            id: Set(Uuid::new_v4()),
            plan_id: Set(plan.id),
            amount: Set(request.amount),
            method: Set(request.method),
            notes: Set(request.notes),
            paid_at: Set(now),
            recorded_by: Set(actor_id.to_string()),
        }
        .insert(&txn)
        .await?;

        let mut active: installment_plan::ActiveModel = plan.into();
        active.remaining_amount = Set(remaining);
        active.months_left = Set(months_left);
        active.monthly_amount = Set(monthly);
        active.next_due_date = Set(next_due);
        active.status = Set(if completed {
            PlanStatus::Completed
        } else {
            PlanStatus::Active
        });
        let updated = active.update(&txn).await?;

        txn.commit().await?;

        info!(
            plan_id = %plan_id,
            amount = %request.amount,
            remaining = %updated.remaining_amount,
            status = %updated.status,
            "Installment payment applied"
        );
        self.emit(Event::InstallmentPaymentApplied {
            plan_id,
            amount: request.amount,
        })
        .await;
        if updated.status == PlanStatus::Completed {
            self.emit(Event::InstallmentPlanCompleted(plan_id)).await;
        }

        Ok(updated.into())
    }

    #[instrument(skip(self), fields(plan_id = %plan_id))]
    pub async fn get_plan(&self, plan_id: Uuid) -> Result<PlanResponse, ServiceError> {
        let db = &*self.db_pool;
        PlanEntity::find_by_id(plan_id)
            .one(db)
            .await?
            .map(PlanResponse::from)
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Installment plan {} not found", plan_id))
            })
    }

    #[instrument(skip(self, query))]
    pub async fn list_plans(
        &self,
        query: PlanListQuery,
    ) -> Result<(Vec<PlanResponse>, u64), ServiceError> {
        let db = &*self.db_pool;
        let mut finder = PlanEntity::find();
        if let Some(status) = query.status {
            finder = finder.filter(installment_plan::Column::Status.eq(status));
        }
        if let Some(customer_id) = query.customer_id {
            finder = finder.filter(installment_plan::Column::CustomerId.eq(customer_id));
        }
        if let Some(days) = query.due_within_days {
            if days < 0 {
                return Err(ServiceError::ValidationError(
                    "due_within_days must not be negative".into(),
                ));
            }
            let horizon = self.clock.now() + Duration::days(days);
            finder = finder
                .filter(installment_plan::Column::NextDueDate.is_not_null())
                .filter(installment_plan::Column::NextDueDate.lte(horizon));
        }

        let paginator = finder
            .order_by_desc(installment_plan::Column::CreatedAt)
            .paginate(db, query.limit);
        let total = paginator.num_items().await?;
        let plans = paginator.fetch_page(query.page.saturating_sub(1)).await?;
        Ok((plans.into_iter().map(PlanResponse::from).collect(), total))
    }

    #[instrument(skip(self), fields(plan_id = %plan_id))]
    pub async fn payments_for_plan(
        &self,
        plan_id: Uuid,
    ) -> Result<Vec<PaymentResponse>, ServiceError> {
        let db = &*self.db_pool;
        if PlanEntity::find_by_id(plan_id).one(db).await?.is_none() {
            return Err(ServiceError::NotFound(format!(
                "Installment plan {} not found",
                plan_id
            )));
        }
        let payments = PaymentEntity::find()
            .filter(installment_payment::Column::PlanId.eq(plan_id))
            .order_by_asc(installment_payment::Column::PaidAt)
            .all(db)
            .await?;
        Ok(payments.into_iter().map(PaymentResponse::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
    }

    #[test]
    fn standard_plan_splits_remaining_over_months() {
        let terms = plan_terms(PlanKind::Standard, dec!(600), dec!(100), 5, at());
        assert_eq!(terms.remaining, dec!(500));
        assert_eq!(terms.months_left, 5);
        assert_eq!(terms.monthly, dec!(100.00));
        assert_eq!(terms.status, PlanStatus::Active);
        assert_eq!(terms.next_due, Some(add_months(at(), 1)));
    }

    #[test]
    fn monthly_amount_rounds_to_two_decimals() {
        let terms = plan_terms(PlanKind::Standard, dec!(1000), dec!(0), 3, at());
        assert_eq!(terms.monthly, dec!(333.33));
        // monthly * months never exceeds remaining by more than a cent
        let overshoot = terms.monthly * Decimal::from(terms.months_left) - terms.remaining;
        assert!(overshoot.abs() <= dec!(0.01));
    }

    #[test]
    fn zero_months_puts_whole_remaining_in_one_installment() {
        let terms = plan_terms(PlanKind::Promissory, dec!(300), dec!(50), 0, at());
        assert_eq!(terms.remaining, dec!(250));
        assert_eq!(terms.months_left, 0);
        assert_eq!(terms.monthly, dec!(250));
        assert_eq!(terms.status, PlanStatus::Active);
    }

    #[test]
    fn full_down_payment_completes_at_creation() {
        let terms = plan_terms(PlanKind::Standard, dec!(400), dec!(400), 6, at());
        assert_eq!(terms.remaining, Decimal::ZERO);
        assert_eq!(terms.months_left, 0);
        assert_eq!(terms.monthly, Decimal::ZERO);
        assert_eq!(terms.status, PlanStatus::Completed);
        assert_eq!(terms.next_due, None);
    }

    #[test]
    fn bank_plan_is_collected_in_full_at_creation() {
        let terms = plan_terms(PlanKind::Bank, dec!(900), dec!(100), 12, at());
        assert_eq!(terms.remaining, Decimal::ZERO);
        assert_eq!(terms.months_left, 0);
        assert_eq!(terms.monthly, Decimal::ZERO);
        assert_eq!(terms.status, PlanStatus::BankCollected);
        assert_eq!(terms.next_due, None);
    }

    mod properties {
        use super::*;
        use assert_matches::assert_matches;
        use proptest::prelude::*;

        fn money() -> impl Strategy<Value = Decimal> {
            (0i64..=100_000_000).prop_map(|cents| Decimal::new(cents, 2))
        }

        proptest! {
            #[test]
            fn remaining_is_never_negative(
                total in money(),
                down in money(),
                months in 0i32..=60,
            ) {
                let terms = plan_terms(PlanKind::Standard, total, down, months, at());
                prop_assert!(terms.remaining >= Decimal::ZERO);
                prop_assert!(terms.monthly >= Decimal::ZERO);
                prop_assert!(terms.months_left >= 0);
            }

            #[test]
            fn active_plans_schedule_covers_the_balance(
                total in money(),
                down in money(),
                months in 1i32..=60,
            ) {
                let terms = plan_terms(PlanKind::Standard, total, down, months, at());
                if terms.status == PlanStatus::Active {
                    assert_matches!(terms.next_due, Some(_));
                    // Rounding shifts each installment by at most half a cent.
                    let scheduled = terms.monthly * Decimal::from(terms.months_left);
                    let drift = (scheduled - terms.remaining).abs();
                    prop_assert!(drift <= Decimal::new(terms.months_left as i64, 2));
                } else {
                    prop_assert_eq!(terms.remaining, Decimal::ZERO);
                    assert_matches!(terms.next_due, None);
                }
            }

            #[test]
            fn bank_plans_never_carry_a_balance(
                total in money(),
                down in money(),
                months in 0i32..=60,
            ) {
                let terms = plan_terms(PlanKind::Bank, total, down, months, at());
                prop_assert_eq!(terms.status, PlanStatus::BankCollected);
                prop_assert_eq!(terms.remaining, Decimal::ZERO);
                assert_matches!(terms.next_due, None);
            }
        }
    }
}
