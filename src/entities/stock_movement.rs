use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Movement kinds. `In` rows carry positive quantities, `Out` rows negative,
/// `Return` rows either sign depending on the return direction.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum MovementKind {
    #[sea_orm(string_value = "In")]
    In,
    #[sea_orm(string_value = "Out")]
    Out,
    #[sea_orm(string_value = "Return")]
    Return,
}

/// One append-only ledger row. The signed sum of a SKU's rows is the ground
/// truth for its on-hand quantity.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_movements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub sku_id: Uuid,
    pub kind: MovementKind,

    /// Signed quantity delta applied to the SKU.
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub quantity: Decimal,

    /// Free-text link to the causing document (invoice number, return id).
    pub reference: Option<String>,

    pub actor_id: String,
    pub occurred_at: DateTime<Utc>,
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
