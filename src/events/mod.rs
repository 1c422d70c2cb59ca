use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event without waiting for channel capacity. Events are
    /// advisory: callers emit after commit and must never block on a slow
    /// consumer, so a full or closed channel drops the event and reports
    /// the failure for the caller to log.
    pub fn send(&self, event: Event) -> Result<(), String> {
        self.sender.try_send(event).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => "event channel full, event dropped".to_string(),
            mpsc::error::TrySendError::Closed(_) => "event channel closed".to_string(),
        })
    }
}

// The events the system can emit. Every mutating service operation emits one
// after its transaction commits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Catalog events
    SkuCreated(Uuid),
    SkuUpdated(Uuid),
    SkuDeactivated(Uuid),

    // Ledger events
    MovementRecorded {
        movement_id: Uuid,
        sku_id: Uuid,
        quantity: Decimal,
    },
    LowStock {
        sku_id: Uuid,
        quantity_on_hand: Decimal,
        reorder_level: Decimal,
    },

    // Invoicing events
    SalesInvoiceCreated(Uuid),
    PurchaseInvoiceCreated(Uuid),

    // Installment events
    InstallmentPlanOpened(Uuid),
    InstallmentPaymentApplied {
        plan_id: Uuid,
        amount: Decimal,
    },
    InstallmentPlanCompleted(Uuid),

    // Return events
    ReturnRequested(Uuid),
    ReturnApproved(Uuid),
    ReturnRejected(Uuid),

    // Counterparty events
    CustomerCreated(Uuid),
    SupplierCreated(Uuid),

    // Bookkeeping events
    StockTakeRecorded {
        sku_id: Uuid,
        difference: Decimal,
    },
    LedgerEntryRecorded(Uuid),

    // Generic event for custom messages
    Generic {
        message: String,
        timestamp: DateTime<Utc>,
        metadata: serde_json::Value,
    },
}

impl Event {
    /// Create a generic event with string data
    pub fn with_data(data: String) -> Self {
        Event::Generic {
            message: data,
            timestamp: Utc::now(),
            metadata: serde_json::Value::Null,
        }
    }
}

// Consumes events from the channel and reacts to the ones that need
// follow-up. Runs for the lifetime of the server task.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match event {
            Event::LowStock {
                sku_id,
                quantity_on_hand,
                reorder_level,
            } => {
                handle_low_stock(sku_id, quantity_on_hand, reorder_level).await;
            }
            Event::InstallmentPlanCompleted(plan_id) => {
                info!(plan_id = %plan_id, "Installment plan fully collected");
            }
            Event::ReturnApproved(return_id) => {
                info!(return_id = %return_id, "Return approved and applied to stock");
            }
            Event::StockTakeRecorded { sku_id, difference } if !difference.is_zero() => {
                warn!(
                    sku_id = %sku_id,
                    difference = %difference,
                    "Stock take found a discrepancy"
                );
            }
            other => {
                info!("Received event: {:?}", other);
            }
        }
    }

    warn!("Event processing loop has ended");
}

async fn handle_low_stock(sku_id: Uuid, quantity_on_hand: Decimal, reorder_level: Decimal) {
    warn!(
        sku_id = %sku_id,
        quantity_on_hand = %quantity_on_hand,
        reorder_level = %reorder_level,
        "Low stock alert: SKU at or below reorder level"
    );
    // Reordering stays manual; the alert is the hand-off point.
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn event_sender_delivers_to_channel() {
        let (tx, mut rx) = mpsc::channel(8);
        let sender = EventSender::new(tx);

        sender
            .send(Event::SalesInvoiceCreated(Uuid::new_v4()))
            .unwrap();

        assert!(matches!(
            rx.recv().await,
            Some(Event::SalesInvoiceCreated(_))
        ));
    }

    #[tokio::test]
    async fn event_sender_errors_when_channel_closed() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);

        let result = sender.send(Event::MovementRecorded {
            movement_id: Uuid::new_v4(),
            sku_id: Uuid::new_v4(),
            quantity: dec!(5),
        });
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn full_channel_drops_the_event_instead_of_waiting() {
        let (tx, _rx) = mpsc::channel(1);
        let sender = EventSender::new(tx);

        sender
            .send(Event::SkuCreated(Uuid::new_v4()))
            .unwrap();

        // Nobody is draining the channel; the second event must come back
        // immediately rather than stalling the caller.
        let result = sender.send(Event::SkuCreated(Uuid::new_v4()));
        assert_eq!(result, Err("event channel full, event dropped".to_string()));
    }
}
