use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum StockTakeKind {
    #[sea_orm(string_value = "Daily")]
    Daily,
    #[sea_orm(string_value = "Monthly")]
    Monthly,
}

/// One counted SKU during a stock take. Recording a count never touches the
/// movement ledger; discrepancies are corrected by a separate manual
/// adjustment.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_takes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub sku_id: Uuid,
    pub kind: StockTakeKind,

    pub window_start: NaiveDate,
    pub window_end: NaiveDate,

    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub expected_quantity: Decimal,

    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub counted_quantity: Decimal,

    /// counted minus expected.
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub difference: Decimal,

    pub taken_by: String,
    pub taken_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sku::Entity",
        from = "Column::SkuId",
        to = "super::sku::Column::Id"
    )]
    Sku,
}

impl Related<super::sku::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sku.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
