use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// How the installment balance is financed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum PlanKind {
    /// Customer pays the shop monthly.
    #[sea_orm(string_value = "Standard")]
    Standard,
    /// A bank settles the full balance up front and collects from the
    /// customer itself.
    #[sea_orm(string_value = "Bank")]
    Bank,
    /// Balance covered by promissory notes; only the down payment is cash.
    #[sea_orm(string_value = "Promissory")]
    Promissory,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum PlanStatus {
    #[sea_orm(string_value = "Active")]
    Active,
    #[sea_orm(string_value = "Completed")]
    Completed,
    /// Terminal from creation: the bank collected the balance in full.
    #[sea_orm(string_value = "BankCollected")]
    BankCollected,
}

/// An installment plan attached to a sales invoice.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "installment_plans")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub customer_id: Uuid,
    pub sales_invoice_id: Uuid,

    pub kind: PlanKind,
    pub status: PlanStatus,

    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub total_amount: Decimal,

    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub down_payment: Decimal,

    /// Never negative; 0 once the plan completes.
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub remaining_amount: Decimal,

    pub months_left: i32,

    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub monthly_amount: Decimal,

    pub next_due_date: Option<DateTime<Utc>>,

    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::installment_payment::Entity")]
    Payments,
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id"
    )]
    Customer,
    #[sea_orm(
        belongs_to = "super::sales_invoice::Entity",
        from = "Column::SalesInvoiceId",
        to = "super::sales_invoice::Column::Id"
    )]
    SalesInvoice,
}

impl Related<super::installment_payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Only Active plans accept payments.
    pub fn accepts_payments(&self) -> bool {
        self.status == PlanStatus::Active
    }
}
