//! Domain services. Pure calculation lives in `pricing`, `badges`, and the
//! ledger math in `vouchers`; the rest orchestrate persistence and events.

pub mod badges;
pub mod bookings;
pub mod carts;
pub mod checkout;
pub mod dashboards;
pub mod orders;
pub mod pricing;
pub mod products;
pub mod vouchers;

pub use bookings::BookingService;
pub use carts::CartService;
pub use checkout::CheckoutService;
pub use dashboards::DashboardService;
pub use orders::OrderService;
pub use products::ProductService;
pub use vouchers::VoucherLedgerService;
