use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::entities::booking::BookingStatus;

/// Domain events emitted by services after state changes commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    OrderCreated(Uuid),
    CheckoutCompleted {
        order_id: Uuid,
        customer_id: Uuid,
    },
    VoucherApplied {
        customer_id: Uuid,
        code: String,
    },
    MilestoneVouchersEarned {
        customer_id: Uuid,
        blocks: i32,
    },
    StockDepleted {
        product_id: Uuid,
    },
    BookingCreated(Uuid),
    BookingDecided {
        booking_id: Uuid,
        status: BookingStatus,
    },
    ProductCreated(Uuid),
    ProductDeleted(Uuid),
}

/// Cloneable handle for emitting events onto the processing channel.
#[derive(Clone, Debug)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Send an event, surfacing channel failures to the caller.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Send an event, logging instead of failing when the channel is closed.
    /// State changes have already committed by the time events are emitted,
    /// so a lost event must not fail the request.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event.clone()).await {
            warn!("Dropped event {:?}: {}", event, e);
        }
    }
}

/// Background loop consuming domain events.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Event processor started");
    while let Some(event) = rx.recv().await {
        debug!("Processing event: {:?}", event);
        match event {
            Event::OrderCreated(order_id) => {
                info!(%order_id, "Order created");
            }
            Event::CheckoutCompleted {
                order_id,
                customer_id,
            } => {
                info!(%order_id, %customer_id, "Checkout completed");
            }
            Event::VoucherApplied { customer_id, code } => {
                info!(%customer_id, code, "Voucher applied");
            }
            Event::MilestoneVouchersEarned {
                customer_id,
                blocks,
            } => {
                info!(%customer_id, blocks, "Milestone vouchers earned");
            }
            Event::StockDepleted { product_id } => {
                warn!(%product_id, "Product stock depleted");
            }
            Event::BookingCreated(booking_id) => {
                info!(%booking_id, "Booking created");
            }
            Event::BookingDecided { booking_id, status } => {
                info!(%booking_id, %status, "Booking decided");
            }
            Event::ProductCreated(product_id) => {
                info!(%product_id, "Product created");
            }
            Event::ProductDeleted(product_id) => {
                info!(%product_id, "Product deleted");
            }
        }
    }
    info!("Event processor stopped");
}
