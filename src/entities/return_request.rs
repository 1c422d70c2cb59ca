use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Which way the goods travel when the return is approved.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum ReturnDirection {
    /// Customer returns goods to the shop: stock goes up.
    #[sea_orm(string_value = "Sales")]
    Sales,
    /// Shop returns goods to a supplier: stock goes down.
    #[sea_orm(string_value = "Purchase")]
    Purchase,
}

/// Pending is the only non-terminal state. Approval applies the stock effect
/// exactly once; Approved and Rejected never transition again.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum ReturnStatus {
    #[sea_orm(string_value = "Pending")]
    Pending,
    #[sea_orm(string_value = "Approved")]
    Approved,
    #[sea_orm(string_value = "Rejected")]
    Rejected,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "returns")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub direction: ReturnDirection,
    pub status: ReturnStatus,

    /// The invoice the goods came from (sales invoice for Sales direction,
    /// purchase invoice for Purchase direction).
    pub invoice_id: Uuid,

    /// Customer or supplier, depending on direction.
    pub counterparty_id: Uuid,

    pub reason: Option<String>,

    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub total_amount: Decimal,

    pub requested_by: String,
    pub requested_at: DateTime<Utc>,

    pub decided_by: Option<String>,
    pub decided_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::return_line::Entity")]
    Lines,
}

impl Related<super::return_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_pending(&self) -> bool {
        self.status == ReturnStatus::Pending
    }
}
