//! Checkout orchestration: preview and commit.
//!
//! Preview prices the cart without touching anything. Commit re-runs the
//! same pure pricing inside a single transaction that also persists the
//! order, decrements stock, and advances the voucher ledger. Stock and
//! ledger rows carry a version column; a version mismatch means another
//! checkout raced this one, and the whole transaction rolls back with a
//! conflict the caller can retry.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use rand::Rng;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::{order, order_item, product, voucher_ledger};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::carts::Cart;
use crate::services::pricing::{self, PricingQuote};
use crate::services::vouchers;

/// Inclusive range the courier estimate is drawn from.
pub const DELIVERY_DAYS_MIN: i32 = 1;
pub const DELIVERY_DAYS_MAX: i32 = 5;

/// Priced cart awaiting payment, returned by preview and stored in the
/// caller's session until the customer confirms.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PendingCheckout {
    pub cart: Cart,
    pub quote: PricingQuote,
}

/// Everything the confirmation page needs after a successful commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutReceipt {
    pub order: order::Model,
    pub items: Vec<order_item::Model>,
    pub quote: PricingQuote,
    /// Milestone vouchers credited by this purchase.
    pub vouchers_earned: i32,
}

pub fn delivery_eta(ordered_on: NaiveDate, delivery_days: i32) -> NaiveDate {
    ordered_on + Duration::days(i64::from(delivery_days))
}

fn generate_order_number() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("PH-{}", id[..10].to_uppercase())
}

#[derive(Clone)]
pub struct CheckoutService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl CheckoutService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Price the cart against the customer's ledger without mutating state.
    #[instrument(skip(self, cart))]
    pub async fn preview(
        &self,
        customer_id: Uuid,
        cart: &Cart,
        voucher_code: &str,
    ) -> Result<PendingCheckout, ServiceError> {
        if cart.is_empty() {
            return Err(ServiceError::EmptyCart);
        }
        let ledger = self.ledger_for(&*self.db, customer_id).await?;
        let quote = pricing::quote(cart.subtotal(), voucher_code, &ledger);
        Ok(PendingCheckout {
            cart: cart.clone(),
            quote,
        })
    }

    /// Commit the checkout: order, line items, stock, and ledger in one
    /// transaction. The quote is recomputed here from the same inputs the
    /// preview used, so the charged numbers match the previewed ones.
    #[instrument(skip(self, cart))]
    pub async fn commit(
        &self,
        customer_id: Uuid,
        cart: &Cart,
        voucher_code: &str,
        payment_method: &str,
    ) -> Result<CheckoutReceipt, ServiceError> {
        if cart.is_empty() {
            return Err(ServiceError::EmptyCart);
        }

        let txn = self.db.begin().await?;

        let ledger = self.ledger_for(&txn, customer_id).await?;
        let quote = pricing::quote(cart.subtotal(), voucher_code, &ledger);

        let delivery_days = rand::thread_rng().gen_range(DELIVERY_DAYS_MIN..=DELIVERY_DAYS_MAX);
        let today = Utc::now().date_naive();

        let order_row = order::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_number: Set(generate_order_number()),
            customer_id: Set(customer_id),
            subtotal: Set(quote.subtotal),
            applied_discount: Set(quote.discount),
            convenience_fee: Set(quote.convenience_fee),
            final_total: Set(quote.final_total),
            voucher_code: Set(quote.voucher_code.clone()),
            payment_method: Set(payment_method.to_string()),
            delivery_days: Set(delivery_days),
            delivery_eta: Set(delivery_eta(today, delivery_days)),
            created_at: Set(Utc::now()),
        }
        .insert(&txn)
        .await?;

        let mut items = Vec::with_capacity(cart.lines.len());
        let mut depleted = Vec::new();
        for line in &cart.lines {
            // A product deleted since it was carted still ships from the
            // snapshot; the line just loses its product reference.
            let product = product::Entity::find_by_id(line.product_id).one(&txn).await?;

            if let Some(ref p) = product {
                let new_stock = (p.stock - line.quantity).max(0);
                self.decrement_stock(&txn, p, new_stock).await?;
                if new_stock == 0 {
                    depleted.push(p.id);
                }
            }

            let item = order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_row.id),
                product_id: Set(product.as_ref().map(|p| p.id)),
                product_name: Set(line.product_name.clone()),
                brand: Set(line.brand.clone()),
                model: Set(line.model.clone()),
                unit_price: Set(line.unit_price),
                quantity: Set(line.quantity),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            items.push(item);
        }

        let update = vouchers::settle(&ledger, quote.applied, quote.final_total);
        self.write_ledger(&txn, &ledger, &update).await?;

        txn.commit().await?;

        info!(
            order_id = %order_row.id,
            order_number = %order_row.order_number,
            %customer_id,
            final_total = %quote.final_total,
            "Checkout committed"
        );

        self.event_sender
            .send_or_log(Event::OrderCreated(order_row.id))
            .await;
        self.event_sender
            .send_or_log(Event::CheckoutCompleted {
                order_id: order_row.id,
                customer_id,
            })
            .await;
        if let Some(kind) = quote.applied {
            self.event_sender
                .send_or_log(Event::VoucherApplied {
                    customer_id,
                    code: kind.code().to_string(),
                })
                .await;
        }
        if update.credited_blocks > 0 {
            self.event_sender
                .send_or_log(Event::MilestoneVouchersEarned {
                    customer_id,
                    blocks: update.credited_blocks,
                })
                .await;
        }
        for product_id in depleted {
            self.event_sender
                .send_or_log(Event::StockDepleted { product_id })
                .await;
        }

        Ok(CheckoutReceipt {
            order: order_row,
            items,
            quote,
            vouchers_earned: update.credited_blocks,
        })
    }

    async fn ledger_for<C: ConnectionTrait>(
        &self,
        conn: &C,
        customer_id: Uuid,
    ) -> Result<voucher_ledger::Model, ServiceError> {
        if let Some(ledger) = voucher_ledger::Entity::find()
            .filter(voucher_ledger::Column::AccountId.eq(customer_id))
            .one(conn)
            .await?
        {
            return Ok(ledger);
        }
        let fresh = voucher_ledger::ActiveModel {
            id: Set(Uuid::new_v4()),
            account_id: Set(customer_id),
            total_spent: Set(rust_decimal::Decimal::ZERO),
            five_pct_used: Set(false),
            ten_pct_used: Set(false),
            twenty_pct_used: Set(false),
            extra_voucher_balance: Set(0),
            extra_vouchers_earned: Set(0),
            version: Set(0),
            updated_at: Set(Utc::now()),
        };
        Ok(fresh.insert(conn).await?)
    }

    async fn decrement_stock(
        &self,
        txn: &DatabaseTransaction,
        p: &product::Model,
        new_stock: i32,
    ) -> Result<(), ServiceError> {
        let result = product::Entity::update_many()
            .col_expr(product::Column::Stock, Expr::value(new_stock))
            .col_expr(product::Column::Version, Expr::value(p.version + 1))
            .col_expr(product::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(product::Column::Id.eq(p.id))
            .filter(product::Column::Version.eq(p.version))
            .exec(txn)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::ConcurrentModification(p.id));
        }
        Ok(())
    }

    async fn write_ledger(
        &self,
        txn: &DatabaseTransaction,
        ledger: &voucher_ledger::Model,
        update: &vouchers::LedgerUpdate,
    ) -> Result<(), ServiceError> {
        let result = voucher_ledger::Entity::update_many()
            .col_expr(
                voucher_ledger::Column::TotalSpent,
                Expr::value(update.total_spent),
            )
            .col_expr(
                voucher_ledger::Column::FivePctUsed,
                Expr::value(update.five_pct_used),
            )
            .col_expr(
                voucher_ledger::Column::TenPctUsed,
                Expr::value(update.ten_pct_used),
            )
            .col_expr(
                voucher_ledger::Column::TwentyPctUsed,
                Expr::value(update.twenty_pct_used),
            )
            .col_expr(
                voucher_ledger::Column::ExtraVoucherBalance,
                Expr::value(update.extra_voucher_balance),
            )
            .col_expr(
                voucher_ledger::Column::ExtraVouchersEarned,
                Expr::value(update.extra_vouchers_earned),
            )
            .col_expr(
                voucher_ledger::Column::Version,
                Expr::value(ledger.version + 1),
            )
            .col_expr(voucher_ledger::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(voucher_ledger::Column::Id.eq(ledger.id))
            .filter(voucher_ledger::Column::Version.eq(ledger.version))
            .exec(txn)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::ConcurrentModification(ledger.id));
        }
        Ok(())
    }
}
