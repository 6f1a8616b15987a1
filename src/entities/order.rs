use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Committed checkout. Rows are immutable after insert; the delivery stage
/// is derived from elapsed days and never stored.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[validate(length(
        min = 1,
        max = 50,
        message = "Order number must be between 1 and 50 characters"
    ))]
    pub order_number: String,

    pub customer_id: Uuid,
    pub subtotal: Decimal,
    pub applied_discount: Decimal,
    pub convenience_fee: Decimal,
    pub final_total: Decimal,
    /// Voucher code charged against this order, empty when none applied.
    pub voucher_code: String,
    pub payment_method: String,
    pub delivery_days: i32,
    pub delivery_eta: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl Model {
    /// Derive the delivery stage from days elapsed between the order date
    /// and `today` against the randomized delivery window.
    pub fn delivery_stage(&self, today: NaiveDate) -> DeliveryStage {
        let days_since = (today - self.created_at.date_naive()).num_days();
        if days_since < 0 {
            DeliveryStage::AwaitingDispatch
        } else if days_since == 0 {
            DeliveryStage::Packing
        } else if days_since < i64::from(self.delivery_days) - 1 {
            DeliveryStage::InTransit
        } else if days_since < i64::from(self.delivery_days) {
            DeliveryStage::Delivering
        } else {
            DeliveryStage::Delivered
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::CustomerId",
        to = "super::account::Column::Id"
    )]
    Customer,
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Derived, non-persisted delivery progress for a committed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DeliveryStage {
    AwaitingDispatch,
    Packing,
    InTransit,
    Delivering,
    Delivered,
}

impl DeliveryStage {
    /// Customer-facing label shown on the order tracking page.
    pub fn description(&self) -> &'static str {
        match self {
            DeliveryStage::AwaitingDispatch => "Awaiting dispatch",
            DeliveryStage::Packing => "Seller is packing",
            DeliveryStage::InTransit => "Sent to courier",
            DeliveryStage::Delivering => "Delivering to your address",
            DeliveryStage::Delivered => "Delivered",
        }
    }
}
