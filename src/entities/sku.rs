use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A stock keeping unit. `quantity_on_hand` is materialized from the movement
/// ledger and must never be written outside a transaction that also records
/// the movement.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "skus")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Unique merchant-facing code.
    pub code: String,

    pub name: String,
    pub category: Option<String>,

    /// Unit label for quantities (piece, kg, box).
    pub unit: Option<String>,

    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub quantity_on_hand: Decimal,

    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub purchase_price: Decimal,

    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub sale_price: Decimal,

    /// On-hand at or below this level flags the SKU for reorder.
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub reorder_level: Decimal,

    pub supplier_id: Option<Uuid>,
    pub expiry_date: Option<NaiveDate>,
    pub barcode: Option<String>,
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,

    /// Optimistic concurrency guard for metadata updates.
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::stock_movement::Entity")]
    StockMovements,
}

impl Related<super::stock_movement::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockMovements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Whether on-hand has fallen to the reorder threshold.
    pub fn is_low_stock(&self) -> bool {
        self.quantity_on_hand <= self.reorder_level
    }
}
