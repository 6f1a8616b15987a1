pub mod bookings;
pub mod carts;
pub mod checkout;
pub mod common;
pub mod dashboards;
pub mod health;
pub mod orders;
pub mod products;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::events::EventSender;
use crate::services::{
    BookingService, CartService, CheckoutService, DashboardService, OrderService, ProductService,
    VoucherLedgerService,
};

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub products: ProductService,
    pub carts: CartService,
    pub checkout: CheckoutService,
    pub orders: OrderService,
    pub bookings: BookingService,
    pub dashboards: DashboardService,
    pub vouchers: VoucherLedgerService,
}

impl AppServices {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self {
            products: ProductService::new(db.clone(), event_sender.clone()),
            carts: CartService::new(db.clone()),
            checkout: CheckoutService::new(db.clone(), event_sender.clone()),
            orders: OrderService::new(db.clone()),
            bookings: BookingService::new(db.clone(), event_sender),
            dashboards: DashboardService::new(db.clone()),
            vouchers: VoucherLedgerService::new(db),
        }
    }
}
