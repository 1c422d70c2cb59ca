//! Read-only period rollups for dashboards and reports.
//!
//! One canonical rule set: net sales = gross sales − approved sales-direction
//! return totals, reported unclamped (a negative net is information), and
//! percent change is computed from the same unclamped figures.

use crate::{
    clock::SharedClock,
    db::DbPool,
    entities::installment_plan::{self, Entity as PlanEntity, PlanStatus},
    entities::purchase_invoice::{self, Entity as PurchaseEntity},
    entities::return_request::{self, Entity as ReturnEntity, ReturnDirection, ReturnStatus},
    entities::sales_invoice::{self, Entity as SalesEntity},
    entities::sales_invoice_line::{self, Entity as SalesLineEntity},
    entities::sku::{self, Entity as SkuEntity},
    errors::ServiceError,
    services::window_bounds,
};
use chrono::{Datelike, Days, Months, NaiveDate};
use rust_decimal::Decimal;
use sea_orm::{prelude::Expr, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Percent change between two periods, rounded to 2 decimals. Both zero means
/// no change (0); growth from zero reports 100.
pub fn percent_change(current: Decimal, previous: Decimal) -> Decimal {
    if current.is_zero() && previous.is_zero() {
        Decimal::ZERO
    } else if previous.is_zero() {
        Decimal::ONE_HUNDRED
    } else {
        ((current - previous) / previous * Decimal::ONE_HUNDRED).round_dp(2)
    }
}

#[derive(Debug, Serialize)]
pub struct PeriodSummary {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub gross_sales: Decimal,
    pub sales_collected: Decimal,
    pub sales_outstanding: Decimal,
    pub invoice_count: u64,
    pub purchases_total: Decimal,
    pub purchases_paid: Decimal,
    pub purchases_outstanding: Decimal,
    pub purchase_invoice_count: u64,
    /// Approved sales-direction returns decided in the window.
    pub returns_total: Decimal,
    pub returns_count: u64,
    /// gross_sales − returns_total, unclamped.
    pub net_sales: Decimal,
}

#[derive(Debug, Serialize)]
pub struct TopSeller {
    pub sku_id: Uuid,
    pub code: String,
    pub name: String,
    pub quantity_sold: Decimal,
    pub revenue: Decimal,
}

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub today: PeriodSummary,
    pub yesterday: PeriodSummary,
    pub net_sales_change_pct: Decimal,
    pub purchases_change_pct: Decimal,
    pub invoice_count_change_pct: Decimal,
    pub low_stock_count: u64,
    pub pending_returns_count: u64,
    pub active_plans_count: u64,
    pub active_plans_remaining: Decimal,
    pub month_top_sellers: Vec<TopSeller>,
}

#[derive(Clone)]
pub struct ReportingService {
    db_pool: Arc<DbPool>,
    clock: SharedClock,
}

impl ReportingService {
    pub fn new(db_pool: Arc<DbPool>, clock: SharedClock) -> Self {
        Self { db_pool, clock }
    }

    /// Folds invoices and approved returns within the inclusive date window.
    #[instrument(skip(self))]
    pub async fn period_summary(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<PeriodSummary, ServiceError> {
        if from > to {
            return Err(ServiceError::ValidationError(
                "Window start must not be after its end".into(),
            ));
        }
        let db = &*self.db_pool;
        let (start, end) = window_bounds(from, to);

        let sales = SalesEntity::find()
            .filter(sales_invoice::Column::IssuedAt.gte(start))
            .filter(sales_invoice::Column::IssuedAt.lt(end))
            .all(db)
            .await?;
        let purchases = PurchaseEntity::find()
            .filter(purchase_invoice::Column::IssuedAt.gte(start))
            .filter(purchase_invoice::Column::IssuedAt.lt(end))
            .all(db)
            .await?;
        let sales_returns = ReturnEntity::find()
            .filter(return_request::Column::Status.eq(ReturnStatus::Approved))
            .filter(return_request::Column::Direction.eq(ReturnDirection::Sales))
            .filter(return_request::Column::DecidedAt.gte(start))
            .filter(return_request::Column::DecidedAt.lt(end))
            .all(db)
            .await?;

        let gross_sales: Decimal = sales.iter().map(|i| i.total_amount).sum();
        let returns_total: Decimal = sales_returns.iter().map(|r| r.total_amount).sum();

        Ok(PeriodSummary {
            from,
            to,
            gross_sales,
            sales_collected: sales.iter().map(|i| i.paid_amount).sum(),
            sales_outstanding: sales.iter().map(|i| i.balance()).sum(),
            invoice_count: sales.len() as u64,
            purchases_total: purchases.iter().map(|i| i.total_amount).sum(),
            purchases_paid: purchases.iter().map(|i| i.paid_amount).sum(),
            purchases_outstanding: purchases.iter().map(|i| i.balance()).sum(),
            purchase_invoice_count: purchases.len() as u64,
            returns_total,
            returns_count: sales_returns.len() as u64,
            net_sales: gross_sales - returns_total,
        })
    }

    pub async fn daily_summary(&self, date: NaiveDate) -> Result<PeriodSummary, ServiceError> {
        self.period_summary(date, date).await
    }

    /// SKUs ranked by summed sales quantity in the window, descending. Ties
    /// keep first-sold order.
    #[instrument(skip(self))]
    pub async fn top_sellers(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        limit: usize,
    ) -> Result<Vec<TopSeller>, ServiceError> {
        let db = &*self.db_pool;
        let (start, end) = window_bounds(from, to);

        let lines = SalesLineEntity::find()
            .find_also_related(SalesEntity)
            .filter(sales_invoice::Column::IssuedAt.gte(start))
            .filter(sales_invoice::Column::IssuedAt.lt(end))
            .all(db)
            .await?;

        let mut order: Vec<Uuid> = Vec::new();
        let mut tally: HashMap<Uuid, (Decimal, Decimal)> = HashMap::new();
        for (line, _) in &lines {
            let entry = tally.entry(line.sku_id).or_insert_with(|| {
                order.push(line.sku_id);
                (Decimal::ZERO, Decimal::ZERO)
            });
            entry.0 += line.quantity;
            entry.1 += line.line_total();
        }

        // Stable sort keeps insertion order between equal quantities.
        let mut ranked: Vec<(Uuid, Decimal, Decimal)> = order
            .into_iter()
            .filter_map(|sku_id| tally.get(&sku_id).map(|&(q, r)| (sku_id, q, r)))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(limit);

        let sku_ids: Vec<Uuid> = ranked.iter().map(|(id, _, _)| *id).collect();
        let skus: HashMap<Uuid, sku::Model> = SkuEntity::find()
            .filter(sku::Column::Id.is_in(sku_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

        Ok(ranked
            .into_iter()
            .map(|(sku_id, quantity_sold, revenue)| {
                let (code, name) = skus
                    .get(&sku_id)
                    .map(|s| (s.code.clone(), s.name.clone()))
                    .unwrap_or_default();
                TopSeller {
                    sku_id,
                    code,
                    name,
                    quantity_sold,
                    revenue,
                }
            })
            .collect())
    }

    /// Today vs yesterday plus the operational counters the landing screen
    /// shows.
    #[instrument(skip(self))]
    pub async fn dashboard(&self) -> Result<Dashboard, ServiceError> {
        let db = &*self.db_pool;
        let today = self.clock.today();
        let yesterday = today
            .checked_sub_days(Days::new(1))
            .unwrap_or(today);

        let today_summary = self.daily_summary(today).await?;
        let yesterday_summary = self.daily_summary(yesterday).await?;

        let low_stock_count = SkuEntity::find()
            .filter(sku::Column::IsActive.eq(true))
            .filter(
                Expr::col(sku::Column::QuantityOnHand).lte(Expr::col(sku::Column::ReorderLevel)),
            )
            .count(db)
            .await?;
        let pending_returns_count = ReturnEntity::find()
            .filter(return_request::Column::Status.eq(ReturnStatus::Pending))
            .count(db)
            .await?;
        let active_plans = PlanEntity::find()
            .filter(installment_plan::Column::Status.eq(PlanStatus::Active))
            .all(db)
            .await?;

        let month_start = today.with_day(1).unwrap_or(today);
        let month_end = month_start
            .checked_add_months(Months::new(1))
            .and_then(|d| d.checked_sub_days(Days::new(1)))
            .unwrap_or(today);
        let month_top_sellers = self.top_sellers(month_start, month_end, 5).await?;

        Ok(Dashboard {
            net_sales_change_pct: percent_change(
                today_summary.net_sales,
                yesterday_summary.net_sales,
            ),
            purchases_change_pct: percent_change(
                today_summary.purchases_total,
                yesterday_summary.purchases_total,
            ),
            invoice_count_change_pct: percent_change(
                Decimal::from(today_summary.invoice_count),
                Decimal::from(yesterday_summary.invoice_count),
            ),
            today: today_summary,
            yesterday: yesterday_summary,
            low_stock_count,
            pending_returns_count,
            active_plans_count: active_plans.len() as u64,
            active_plans_remaining: active_plans.iter().map(|p| p.remaining_amount).sum(),
            month_top_sellers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use test_case::test_case;

    #[test_case(dec!(0), dec!(0), dec!(0); "both zero")]
    #[test_case(dec!(5), dec!(0), dec!(100); "growth from zero")]
    #[test_case(dec!(150), dec!(100), dec!(50.00); "fifty percent up")]
    #[test_case(dec!(50), dec!(100), dec!(-50.00); "fifty percent down")]
    #[test_case(dec!(0), dec!(80), dec!(-100.00); "collapse to zero")]
    fn percent_change_cases(current: Decimal, previous: Decimal, expected: Decimal) {
        assert_eq!(percent_change(current, previous), expected);
    }

    #[test]
    fn percent_change_rounds_to_two_decimals() {
        assert_eq!(percent_change(dec!(100), dec!(300)), dec!(-66.67));
        assert_eq!(percent_change(dec!(110), dec!(90)), dec!(22.22));
    }

    #[test]
    fn percent_change_handles_negative_net_figures() {
        // An unclamped negative net sales still yields a defined change.
        assert_eq!(percent_change(dec!(-50), dec!(100)), dec!(-150.00));
    }
}
