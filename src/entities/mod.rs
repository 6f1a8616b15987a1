pub mod account;
pub mod booking;
pub mod order;
pub mod order_item;
pub mod product;
pub mod voucher_ledger;

pub use account::{AccountRole, Entity as Account, Model as AccountModel};
pub use booking::{BookingStatus, Entity as Booking, Model as BookingModel};
pub use order::{DeliveryStage, Entity as Order, Model as OrderModel};
pub use order_item::{Entity as OrderItem, Model as OrderItemModel};
pub use product::{Entity as Product, Model as ProductModel};
pub use voucher_ledger::{Entity as VoucherLedger, Model as VoucherLedgerModel};
