//! Customers and suppliers. Their running balances belong to the invoicing
//! and installment flows; this service only manages the records themselves.

use crate::{
    clock::SharedClock,
    db::DbPool,
    entities::customer::{self, Entity as CustomerEntity},
    entities::supplier::{self, Entity as SupplierEntity},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePartyRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PartyListQuery {
    /// Matches name or phone.
    pub search: Option<String>,
    pub page: u64,
    pub limit: u64,
}

#[derive(Debug, Serialize)]
pub struct PartyResponse {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub balance: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<customer::Model> for PartyResponse {
    fn from(model: customer::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            phone: model.phone,
            address: model.address,
            balance: model.balance,
            is_active: model.is_active,
            created_at: model.created_at,
        }
    }
}

impl From<supplier::Model> for PartyResponse {
    fn from(model: supplier::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            phone: model.phone,
            address: model.address,
            balance: model.balance,
            is_active: model.is_active,
            created_at: model.created_at,
        }
    }
}

#[derive(Clone)]
pub struct PartyService {
    db_pool: Arc<DbPool>,
    clock: SharedClock,
    event_sender: Option<Arc<EventSender>>,
}

impl PartyService {
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
                warn!(error = %e, "Failed to send counterparty event");
            }
        }
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_customer(
        &self,
        actor_id: &str,
        request: CreatePartyRequest,
    ) -> Result<PartyResponse, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;
        let model = customer::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name.trim().to_string()),
            phone: Set(request.phone),
            address: Set(request.address),
            balance: Set(Decimal::ZERO),
            is_active: Set(true),
            created_at: Set(self.clock.now()),
            updated_at: Set(None),
        }
        .insert(db)
        .await?;

        info!(customer_id = %model.id, actor_id = %actor_id, "Customer created");
        self.emit(Event::CustomerCreated(model.id)).await;
        Ok(model.into())
    }

    #[instrument(skip(self), fields(customer_id = %customer_id))]
    pub async fn get_customer(&self, customer_id: Uuid) -> Result<PartyResponse, ServiceError> {
        let db = &*self.db_pool;
        CustomerEntity::find_by_id(customer_id)
            .one(db)
            .await?
            .map(PartyResponse::from)
            .ok_or_else(|| ServiceError::NotFound(format!("Customer {} not found", customer_id)))
    }

    #[instrument(skip(self, query))]
    pub async fn list_customers(
        &self,
        query: PartyListQuery,
    ) -> Result<(Vec<PartyResponse>, u64), ServiceError> {
        let db = &*self.db_pool;
        let mut finder = CustomerEntity::find();
        if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", search);
            finder = finder.filter(
                Condition::any()
                    .add(customer::Column::Name.like(pattern.clone()))
                    .add(customer::Column::Phone.like(pattern)),
            );
        }
        let paginator = finder
            .order_by_asc(customer::Column::Name)
            .paginate(db, query.limit);
        let total = paginator.num_items().await?;
        let customers = paginator.fetch_page(query.page.saturating_sub(1)).await?;
        Ok((
            customers.into_iter().map(PartyResponse::from).collect(),
            total,
        ))
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_supplier(
        &self,
        actor_id: &str,
        request: CreatePartyRequest,
    ) -> Result<PartyResponse, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;
        let model = supplier::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name.trim().to_string()),
            phone: Set(request.phone),
            address: Set(request.address),
            balance: Set(Decimal::ZERO),
            is_active: Set(true),
            created_at: Set(self.clock.now()),
            updated_at: Set(None),
        }
        .insert(db)
        .await?;

        info!(supplier_id = %model.id, actor_id = %actor_id, "Supplier created");
        self.emit(Event::SupplierCreated(model.id)).await;
        Ok(model.into())
    }

    #[instrument(skip(self), fields(supplier_id = %supplier_id))]
    pub async fn get_supplier(&self, supplier_id: Uuid) -> Result<PartyResponse, ServiceError> {
        let db = &*self.db_pool;
        SupplierEntity::find_by_id(supplier_id)
            .one(db)
            .await?
            .map(PartyResponse::from)
            .ok_or_else(|| ServiceError::NotFound(format!("Supplier {} not found", supplier_id)))
    }

    #[instrument(skip(self, query))]
    pub async fn list_suppliers(
        &self,
        query: PartyListQuery,
    ) -> Result<(Vec<PartyResponse>, u64), ServiceError> {
        let db = &*self.db_pool;
        let mut finder = SupplierEntity::find();
        if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", search);
            finder = finder.filter(
                Condition::any()
                    .add(supplier::Column::Name.like(pattern.clone()))
                    .add(supplier::Column::Phone.like(pattern)),
            );
        }
        let paginator = finder
            .order_by_asc(supplier::Column::Name)
            .paginate(db, query.limit);
        let total = paginator.num_items().await?;
        let suppliers = paginator.fetch_page(query.page.saturating_sub(1)).await?;
        Ok((
            suppliers.into_iter().map(PartyResponse::from).collect(),
            total,
        ))
    }
}
