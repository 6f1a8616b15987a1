//! Order history and tracking.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::entities::{order, order_item};
use crate::errors::ServiceError;

/// An order with its line items and the derived tracking stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderView {
    #[serde(flatten)]
    pub order: order::Model,
    pub items: Vec<order_item::Model>,
    pub delivery_stage: order::DeliveryStage,
    pub delivery_stage_label: &'static str,
}

impl OrderView {
    fn build(order: order::Model, items: Vec<order_item::Model>) -> Self {
        let stage = order.delivery_stage(Utc::now().date_naive());
        OrderView {
            order,
            items,
            delivery_stage: stage,
            delivery_stage_label: stage.description(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderPage {
    pub orders: Vec<OrderView>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
}

#[derive(Clone)]
pub struct OrderService {
    db: Arc<DatabaseConnection>,
}

impl OrderService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Fetch one of the customer's orders with items and tracking stage.
    /// Another customer's order id is indistinguishable from a missing one.
    #[instrument(skip(self))]
    pub async fn get_order(
        &self,
        customer_id: Uuid,
        order_id: Uuid,
    ) -> Result<OrderView, ServiceError> {
        let order = order::Entity::find_by_id(order_id)
            .filter(order::Column::CustomerId.eq(customer_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        let items = order_item::Entity::find()
            .filter(order_item::Column::OrderId.eq(order.id))
            .all(&*self.db)
            .await?;

        Ok(OrderView::build(order, items))
    }

    /// The customer's orders, newest first.
    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        customer_id: Uuid,
        page: u64,
        page_size: u64,
    ) -> Result<OrderPage, ServiceError> {
        let paginator = order::Entity::find()
            .filter(order::Column::CustomerId.eq(customer_id))
            .order_by_desc(order::Column::CreatedAt)
            .paginate(&*self.db, page_size);

        let total = paginator.num_items().await?;
        let orders = paginator.fetch_page(page.saturating_sub(1)).await?;

        let mut views = Vec::with_capacity(orders.len());
        for order in orders {
            let items = order_item::Entity::find()
                .filter(order_item::Column::OrderId.eq(order.id))
                .all(&*self.db)
                .await?;
            views.push(OrderView::build(order, items));
        }

        Ok(OrderPage {
            orders: views,
            total,
            page,
            page_size,
        })
    }
}
