//! Seller and installer dashboards.
//!
//! Seller revenue is computed from order line items joined to the seller's
//! listings. Lines whose product was deleted keep shipping history on the
//! order but drop out of revenue attribution, so a deleted listing no
//! longer counts toward the badge.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::entities::{account, booking, order, order_item, product, AccountRole, BookingStatus};
use crate::errors::ServiceError;
use crate::services::badges::{self, BadgeInfo};

/// Stock level at or below which a listing appears in the restock list.
pub const LOW_STOCK_THRESHOLD: i32 = 3;
const UPCOMING_LIMIT: u64 = 10;

/// Lifetime revenue a seller has earned across all sold line items.
pub async fn seller_lifetime_revenue<C: ConnectionTrait>(
    conn: &C,
    seller_id: Uuid,
) -> Result<Decimal, ServiceError> {
    let items = order_item::Entity::find()
        .inner_join(product::Entity)
        .filter(product::Column::SellerId.eq(seller_id))
        .all(conn)
        .await?;
    Ok(items.iter().map(order_item::Model::line_total).sum())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopProduct {
    pub product_id: Uuid,
    pub product_name: String,
    pub units_sold: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SellerDashboard {
    pub lifetime_revenue: Decimal,
    pub units_sold: i64,
    pub order_count: u64,
    pub average_order_revenue: Decimal,
    pub revenue_last_30_days: Decimal,
    pub top_products: Vec<TopProduct>,
    pub low_stock: Vec<product::Model>,
    pub badge: BadgeInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallerDashboard {
    pub pending_count: u64,
    pub accepted_count: u64,
    pub rejected_count: u64,
    /// Finders fees from accepted bookings only.
    pub total_finders_fees: Decimal,
    /// Today-onward pending and accepted bookings, soonest first.
    pub upcoming: Vec<booking::Model>,
}

/// Units-sold ranking over sold line items, ties broken by name for a
/// stable ordering, top five kept.
fn rank_top_products(items: &[order_item::Model]) -> Vec<TopProduct> {
    let mut by_product: HashMap<Uuid, (String, i64)> = HashMap::new();
    for item in items {
        let Some(product_id) = item.product_id else {
            continue;
        };
        let entry = by_product
            .entry(product_id)
            .or_insert_with(|| (item.product_name.clone(), 0));
        entry.1 += i64::from(item.quantity);
    }
    let mut ranked: Vec<TopProduct> = by_product
        .into_iter()
        .map(|(product_id, (product_name, units_sold))| TopProduct {
            product_id,
            product_name,
            units_sold,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.units_sold
            .cmp(&a.units_sold)
            .then_with(|| a.product_name.cmp(&b.product_name))
    });
    ranked.truncate(5);
    ranked
}

#[derive(Clone)]
pub struct DashboardService {
    db: Arc<DatabaseConnection>,
}

impl DashboardService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn require_role(&self, account_id: Uuid, role: AccountRole) -> Result<(), ServiceError> {
        let account = account::Entity::find_by_id(account_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Account {} not found", account_id)))?;
        if account.role != role {
            return Err(ServiceError::Forbidden(format!(
                "Dashboard is only available to {} accounts",
                role
            )));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn seller_dashboard(&self, seller_id: Uuid) -> Result<SellerDashboard, ServiceError> {
        self.require_role(seller_id, AccountRole::Seller).await?;

        let sold = order_item::Entity::find()
            .inner_join(product::Entity)
            .filter(product::Column::SellerId.eq(seller_id))
            .find_also_related(order::Entity)
            .all(&*self.db)
            .await?;

        let items: Vec<order_item::Model> = sold.iter().map(|(i, _)| i.clone()).collect();
        let lifetime_revenue: Decimal = items.iter().map(order_item::Model::line_total).sum();
        let units_sold: i64 = items.iter().map(|i| i64::from(i.quantity)).sum();

        let mut order_ids: Vec<Uuid> = items.iter().map(|i| i.order_id).collect();
        order_ids.sort();
        order_ids.dedup();
        let order_count = order_ids.len() as u64;

        let average_order_revenue = if order_count == 0 {
            Decimal::ZERO
        } else {
            lifetime_revenue / Decimal::from(order_count)
        };

        let cutoff = Utc::now() - Duration::days(30);
        let revenue_last_30_days: Decimal = sold
            .iter()
            .filter(|(_, o)| o.as_ref().is_some_and(|o| o.created_at >= cutoff))
            .map(|(i, _)| i.line_total())
            .sum();

        let low_stock = product::Entity::find()
            .filter(product::Column::SellerId.eq(seller_id))
            .filter(product::Column::Stock.lte(LOW_STOCK_THRESHOLD))
            .order_by_asc(product::Column::Stock)
            .all(&*self.db)
            .await?;

        Ok(SellerDashboard {
            lifetime_revenue,
            units_sold,
            order_count,
            average_order_revenue,
            revenue_last_30_days,
            top_products: rank_top_products(&items),
            low_stock,
            badge: badges::evaluate(lifetime_revenue),
        })
    }

    #[instrument(skip(self))]
    pub async fn installer_dashboard(
        &self,
        installer_id: Uuid,
    ) -> Result<InstallerDashboard, ServiceError> {
        self.require_role(installer_id, AccountRole::Installer)
            .await?;

        let bookings = booking::Entity::find()
            .filter(booking::Column::InstallerId.eq(installer_id))
            .all(&*self.db)
            .await?;

        let mut pending_count = 0;
        let mut accepted_count = 0;
        let mut rejected_count = 0;
        let mut total_finders_fees = Decimal::ZERO;
        for b in &bookings {
            match b.status {
                BookingStatus::Pending => pending_count += 1,
                BookingStatus::Accepted => {
                    accepted_count += 1;
                    total_finders_fees += b.finders_fee;
                }
                BookingStatus::Rejected => rejected_count += 1,
            }
        }

        let upcoming = booking::Entity::find()
            .filter(booking::Column::InstallerId.eq(installer_id))
            .filter(booking::Column::ScheduledDate.gte(Utc::now().date_naive()))
            .filter(
                booking::Column::Status
                    .is_in([BookingStatus::Pending, BookingStatus::Accepted]),
            )
            .order_by_asc(booking::Column::ScheduledDate)
            .order_by_asc(booking::Column::ScheduledTime)
            .limit(UPCOMING_LIMIT)
            .all(&*self.db)
            .await?;

        Ok(InstallerDashboard {
            pending_count,
            accepted_count,
            rejected_count,
            total_finders_fees,
            upcoming,
        })
    }
}
