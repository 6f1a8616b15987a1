pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_accounts_table;
mod m20240101_000002_create_voucher_ledgers_table;
mod m20240101_000003_create_products_table;
mod m20240101_000004_create_orders_table;
mod m20240101_000005_create_order_items_table;
mod m20240101_000006_create_bookings_table;
mod m20240101_000007_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_accounts_table::Migration),
            Box::new(m20240101_000002_create_voucher_ledgers_table::Migration),
            Box::new(m20240101_000003_create_products_table::Migration),
            Box::new(m20240101_000004_create_orders_table::Migration),
            Box::new(m20240101_000005_create_order_items_table::Migration),
            Box::new(m20240101_000006_create_bookings_table::Migration),
            Box::new(m20240101_000007_add_indexes::Migration),
        ]
    }
}
