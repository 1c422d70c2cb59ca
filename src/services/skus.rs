//! SKU catalog. Creation seeds stock through an opening In movement rather
//! than writing the materialized quantity directly; later corrections go
//! through the ledger's `adjust`. Metadata updates carry a version for
//! optimistic concurrency and never touch quantity.

use crate::{
    clock::SharedClock,
    db::DbPool,
    entities::sku::{self, Entity as SkuEntity},
    entities::stock_movement::MovementKind,
    errors::ServiceError,
    events::{Event, EventSender},
    services::stock_ledger::apply_movement,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSkuRequest {
    #[validate(length(min = 1, message = "SKU code is required"))]
    pub code: String,
    #[validate(length(min = 1, message = "SKU name is required"))]
    pub name: String,
    pub category: Option<String>,
    pub unit: Option<String>,
    /// Booked as an opening In movement when positive.
    #[serde(default)]
    pub opening_quantity: Decimal,
    #[serde(default)]
    pub purchase_price: Decimal,
    #[serde(default)]
    pub sale_price: Decimal,
    #[serde(default)]
    pub reorder_level: Decimal,
    pub supplier_id: Option<Uuid>,
    pub expiry_date: Option<NaiveDate>,
    pub barcode: Option<String>,
}

/// Metadata-only update; there is deliberately no quantity field here.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSkuRequest {
    /// Version the caller read; mismatch means someone else changed the SKU.
    pub version: i32,
    pub name: Option<String>,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub purchase_price: Option<Decimal>,
    pub sale_price: Option<Decimal>,
    pub reorder_level: Option<Decimal>,
    pub supplier_id: Option<Uuid>,
    pub expiry_date: Option<NaiveDate>,
    pub barcode: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct SkuListQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub active_only: Option<bool>,
    pub page: u64,
    pub limit: u64,
}

#[derive(Debug, Serialize)]
pub struct SkuResponse {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub quantity_on_hand: Decimal,
    pub purchase_price: Decimal,
    pub sale_price: Decimal,
    pub reorder_level: Decimal,
    pub supplier_id: Option<Uuid>,
    pub expiry_date: Option<NaiveDate>,
    pub barcode: Option<String>,
    pub is_active: bool,
    pub is_low_stock: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub version: i32,
}

impl From<sku::Model> for SkuResponse {
    fn from(model: sku::Model) -> Self {
        let is_low_stock = model.is_low_stock();
        Self {
            id: model.id,
            code: model.code,
            name: model.name,
            category: model.category,
            unit: model.unit,
            quantity_on_hand: model.quantity_on_hand,
            purchase_price: model.purchase_price,
            sale_price: model.sale_price,
            reorder_level: model.reorder_level,
            supplier_id: model.supplier_id,
            expiry_date: model.expiry_date,
            barcode: model.barcode,
            is_active: model.is_active,
            is_low_stock,
            created_at: model.created_at,
            updated_at: model.updated_at,
            version: model.version,
        }
    }
}

#[derive(Clone)]
pub struct SkuService {
    db_pool: Arc<DbPool>,
    clock: SharedClock,
    event_sender: Option<Arc<EventSender>>,
}

impl SkuService {
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
                warn!(error = %e, "Failed to send SKU event");
            }
        }
    }

    #[instrument(skip(self, request), fields(code = %request.code))]
    pub async fn create(
        &self,
        actor_id: &str,
        request: CreateSkuRequest,
    ) -> Result<SkuResponse, ServiceError> {
        request.validate()?;
        if request.opening_quantity < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Opening quantity must not be negative".into(),
            ));
        }
        if request.purchase_price < Decimal::ZERO || request.sale_price < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Prices must not be negative".into(),
            ));
        }

        let db = &*self.db_pool;
        let now = self.clock.now();
        let txn = db.begin().await?;

        let code = request.code.trim().to_string();
        let existing = SkuEntity::find()
            .filter(sku::Column::Code.eq(code.clone()))
            .one(&txn)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::ValidationError(format!(
                "SKU code {} already exists",
                code
            )));
        }

        let sku_model = sku::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(code),
            name: Set(request.name.trim().to_string()),
            category: Set(request.category),
            unit: Set(request.unit),
            quantity_on_hand: Set(Decimal::ZERO),
            purchase_price: Set(request.purchase_price),
            sale_price: Set(request.sale_price),
            reorder_level: Set(request.reorder_level),
            supplier_id: Set(request.supplier_id),
            expiry_date: Set(request.expiry_date),
            barcode: Set(request.barcode),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(None),
            version: Set(1),
        }
        .insert(&txn)
        .await?;

        let sku_model = if request.opening_quantity > Decimal::ZERO {
            let (_, updated) = apply_movement(
                &txn,
                actor_id,
                sku_model,
                MovementKind::In,
                request.opening_quantity,
                Some("opening stock".into()),
                now,
            )
            .await?;
            updated
        } else {
            sku_model
        };

        txn.commit().await?;

        info!(sku_id = %sku_model.id, code = %sku_model.code, "SKU created");
        self.emit(Event::SkuCreated(sku_model.id)).await;

        Ok(sku_model.into())
    }

    #[instrument(skip(self), fields(sku_id = %sku_id))]
    pub async fn get(&self, sku_id: Uuid) -> Result<SkuResponse, ServiceError> {
        let db = &*self.db_pool;
        SkuEntity::find_by_id(sku_id)
            .one(db)
            .await?
            .map(SkuResponse::from)
            .ok_or_else(|| ServiceError::NotFound(format!("SKU {} not found", sku_id)))
    }

    #[instrument(skip(self))]
    pub async fn by_code(&self, code: &str) -> Result<SkuResponse, ServiceError> {
        let db = &*self.db_pool;
        SkuEntity::find()
            .filter(sku::Column::Code.eq(code))
            .one(db)
            .await?
            .map(SkuResponse::from)
            .ok_or_else(|| ServiceError::NotFound(format!("SKU with code {} not found", code)))
    }

    #[instrument(skip(self, query))]
    pub async fn list(&self, query: SkuListQuery) -> Result<(Vec<SkuResponse>, u64), ServiceError> {
        let db = &*self.db_pool;
        let mut finder = SkuEntity::find();

        if query.active_only.unwrap_or(true) {
            finder = finder.filter(sku::Column::IsActive.eq(true));
        }
        if let Some(category) = &query.category {
            finder = finder.filter(sku::Column::Category.eq(category.clone()));
        }
        if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", search);
            finder = finder.filter(
                Condition::any()
                    .add(sku::Column::Code.like(pattern.clone()))
                    .add(sku::Column::Name.like(pattern.clone()))
                    .add(sku::Column::Barcode.like(pattern)),
            );
        }

        let paginator = finder.order_by_asc(sku::Column::Code).paginate(db, query.limit);
        let total = paginator.num_items().await?;
        let skus = paginator.fetch_page(query.page.saturating_sub(1)).await?;
        Ok((skus.into_iter().map(SkuResponse::from).collect(), total))
    }

    /// Metadata update with an optimistic version check.
    #[instrument(skip(self, request), fields(sku_id = %sku_id, version = request.version))]
    pub async fn update(
        &self,
        actor_id: &str,
        sku_id: Uuid,
        request: UpdateSkuRequest,
    ) -> Result<SkuResponse, ServiceError> {
        request.validate()?;
        if request.purchase_price.is_some_and(|p| p < Decimal::ZERO)
            || request.sale_price.is_some_and(|p| p < Decimal::ZERO)
        {
            return Err(ServiceError::ValidationError(
                "Prices must not be negative".into(),
            ));
        }

        let db = &*self.db_pool;
        let txn = db.begin().await?;

        let sku_model = SkuEntity::find_by_id(sku_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("SKU {} not found", sku_id)))?;
        if sku_model.version != request.version {
            return Err(ServiceError::ConcurrentModification(sku_id));
        }

        let next_version = sku_model.version + 1;
        let mut active: sku::ActiveModel = sku_model.into();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if let Some(category) = request.category {
            active.category = Set(Some(category));
        }
        if let Some(unit) = request.unit {
            active.unit = Set(Some(unit));
        }
        if let Some(price) = request.purchase_price {
            active.purchase_price = Set(price);
        }
        if let Some(price) = request.sale_price {
            active.sale_price = Set(price);
        }
        if let Some(level) = request.reorder_level {
            active.reorder_level = Set(level);
        }
        if let Some(supplier_id) = request.supplier_id {
            active.supplier_id = Set(Some(supplier_id));
        }
        if let Some(expiry) = request.expiry_date {
            active.expiry_date = Set(Some(expiry));
        }
        if let Some(barcode) = request.barcode {
            active.barcode = Set(Some(barcode));
        }
        active.version = Set(next_version);
        active.updated_at = Set(Some(self.clock.now()));

        let updated = active.update(&txn).await?;
        txn.commit().await?;

        info!(sku_id = %sku_id, actor_id = %actor_id, "SKU updated");
        self.emit(Event::SkuUpdated(sku_id)).await;

        Ok(updated.into())
    }

    /// Soft delete: the SKU stops accepting movements and invoice lines but
    /// its history stays queryable.
    #[instrument(skip(self), fields(sku_id = %sku_id))]
    pub async fn deactivate(&self, actor_id: &str, sku_id: Uuid) -> Result<SkuResponse, ServiceError> {
        let db = &*self.db_pool;
        let txn = db.begin().await?;

        let sku_model = SkuEntity::find_by_id(sku_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("SKU {} not found", sku_id)))?;
        if !sku_model.is_active {
            return Err(ServiceError::InvalidOperation(format!(
                "SKU {} is already deactivated",
                sku_model.code
            )));
        }

        let next_version = sku_model.version + 1;
        let mut active: sku::ActiveModel = sku_model.into();
        active.is_active = Set(false);
        active.version = Set(next_version);
        active.updated_at = Set(Some(self.clock.now()));
        let updated = active.update(&txn).await?;
        txn.commit().await?;

        info!(sku_id = %sku_id, actor_id = %actor_id, "SKU deactivated");
        self.emit(Event::SkuDeactivated(sku_id)).await;

        Ok(updated.into())
    }
}
