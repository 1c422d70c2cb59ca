//! Thin HTTP handlers: parse and clamp inputs, call the service, wrap the
//! result in the shared response envelope.

pub mod customers;
pub mod installments;
pub mod ledger_entries;
pub mod purchases;
pub mod reports;
pub mod returns;
pub mod sales;
pub mod skus;
pub mod stock;
pub mod stock_takes;
pub mod suppliers;

use crate::{
    clock::SharedClock,
    config::AppConfig,
    db::DbPool,
    errors::ServiceError,
    events::EventSender,
    services::{
        installments::InstallmentService, ledger_entries::LedgerEntryService,
        parties::PartyService, purchases::PurchaseService, reporting::ReportingService,
        returns::ReturnService, sales::SalesService, skus::SkuService,
        stock_ledger::StockLedgerService, stock_taking::StockTakingService,
    },
    PaginatedResponse,
};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use std::sync::Arc;

/// Header carrying the opaque acting-user id attached to every mutation.
pub const ACTOR_ID_HEADER: &str = "x-actor-id";

/// Extractor for the acting user. Mutating routes require the header; a
/// missing or blank value is a validation error.
#[derive(Debug, Clone)]
pub struct ActorId(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for ActorId
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(ACTOR_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| ActorId(value.to_string()))
            .ok_or_else(|| {
                ServiceError::ValidationError(format!(
                    "Missing {} header identifying the acting user",
                    ACTOR_ID_HEADER
                ))
            })
    }
}

/// Every service the HTTP surface talks to, built once at startup.
#[derive(Clone)]
pub struct AppServices {
    pub skus: Arc<SkuService>,
    pub stock_ledger: Arc<StockLedgerService>,
    pub sales: Arc<SalesService>,
    pub purchases: Arc<PurchaseService>,
    pub installments: Arc<InstallmentService>,
    pub returns: Arc<ReturnService>,
    pub reporting: Arc<ReportingService>,
    pub stock_taking: Arc<StockTakingService>,
    pub ledger_entries: Arc<LedgerEntryService>,
    pub parties: Arc<PartyService>,
}

impl AppServices {
    pub fn new(db: Arc<DbPool>, clock: SharedClock, event_sender: Arc<EventSender>) -> Self {
        let events = Some(event_sender);
        Self {
            skus: Arc::new(SkuService::new(db.clone(), clock.clone(), events.clone())),
            stock_ledger: Arc::new(StockLedgerService::new(
                db.clone(),
                clock.clone(),
                events.clone(),
            )),
            sales: Arc::new(SalesService::new(db.clone(), clock.clone(), events.clone())),
            purchases: Arc::new(PurchaseService::new(
                db.clone(),
                clock.clone(),
                events.clone(),
            )),
            installments: Arc::new(InstallmentService::new(
                db.clone(),
                clock.clone(),
                events.clone(),
            )),
            returns: Arc::new(ReturnService::new(db.clone(), clock.clone(), events.clone())),
            reporting: Arc::new(ReportingService::new(db.clone(), clock.clone())),
            stock_taking: Arc::new(StockTakingService::new(
                db.clone(),
                clock.clone(),
                events.clone(),
            )),
            ledger_entries: Arc::new(LedgerEntryService::new(
                db.clone(),
                clock.clone(),
                events.clone(),
            )),
            parties: Arc::new(PartyService::new(db, clock, events)),
        }
    }
}

/// Clamps caller-supplied paging to the configured bounds.
pub(crate) fn clamp_paging(cfg: &AppConfig, page: Option<u64>, limit: Option<u64>) -> (u64, u64) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit
        .unwrap_or(cfg.api_default_page_size)
        .clamp(1, cfg.api_max_page_size);
    (page, limit)
}

pub(crate) fn paginate<T>(items: Vec<T>, total: u64, page: u64, limit: u64) -> PaginatedResponse<T> {
    let total_pages = (total + limit - 1) / limit;
    PaginatedResponse {
        items,
        total,
        page,
        limit,
        total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> AppConfig {
        AppConfig::new(
            "sqlite::memory:".into(),
            "127.0.0.1".into(),
            8080,
            "development".into(),
        )
    }

    #[test]
    fn paging_defaults_and_clamps() {
        let cfg = cfg();
        assert_eq!(clamp_paging(&cfg, None, None), (1, 20));
        assert_eq!(clamp_paging(&cfg, Some(0), Some(0)), (1, 1));
        assert_eq!(clamp_paging(&cfg, Some(3), Some(500)), (3, 100));
    }

    #[test]
    fn paginate_rounds_total_pages_up() {
        let response = paginate(vec![1, 2, 3], 41, 1, 20);
        assert_eq!(response.total_pages, 3);
    }
}
