//! Shopping cart operations.
//!
//! The cart itself is a value held by the caller's session layer; handlers
//! pass it in and receive the updated value back. The service only touches
//! the database to verify products and their stock, and all quantity rules
//! live on the [`Cart`] value so they are testable without a connection.

use std::sync::Arc;

use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::product;
use crate::errors::ServiceError;

/// One cart line, carrying a display snapshot of the product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CartLine {
    pub product_id: Uuid,
    pub product_name: String,
    pub brand: String,
    pub model: String,
    pub unit_price: Decimal,
    pub quantity: i32,
}

impl CartLine {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// An ordered cart; lines keep their insertion order across updates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Cart {
    #[serde(default)]
    pub lines: Vec<CartLine>,
}

impl Cart {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn subtotal(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    fn line_mut(&mut self, product_id: Uuid) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|l| l.product_id == product_id)
    }

    /// Add a product, accumulating onto an existing line.
    ///
    /// Requested quantities below one are raised to one and the resulting
    /// line quantity is capped at the product's current stock. An
    /// out-of-stock product is rejected outright.
    pub fn add(&mut self, product: &product::Model, quantity: i32) -> Result<(), ServiceError> {
        if product.stock <= 0 {
            return Err(ServiceError::InsufficientStock(format!(
                "'{}' is out of stock",
                product.name
            )));
        }
        let requested = quantity.max(1);
        match self.line_mut(product.id) {
            Some(line) => {
                line.quantity = (line.quantity + requested).min(product.stock);
                line.unit_price = product.price;
            }
            None => self.lines.push(CartLine {
                product_id: product.id,
                product_name: product.name.clone(),
                brand: product.brand.clone(),
                model: product.model.clone(),
                unit_price: product.price,
                quantity: requested.min(product.stock),
            }),
        }
        Ok(())
    }

    /// Replace a line's quantity, clamped to `[1, stock]`.
    pub fn set_quantity(
        &mut self,
        product_id: Uuid,
        quantity: i32,
        stock: i32,
    ) -> Result<(), ServiceError> {
        let line = self
            .line_mut(product_id)
            .ok_or_else(|| ServiceError::NotFound("Item is not in the cart".to_string()))?;
        line.quantity = quantity.max(1).min(stock.max(1));
        Ok(())
    }

    pub fn remove(&mut self, product_id: Uuid) -> Result<(), ServiceError> {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        if self.lines.len() == before {
            return Err(ServiceError::NotFound("Item is not in the cart".to_string()));
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

/// Cart rendered for the customer, with line and cart totals.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartView {
    pub lines: Vec<CartViewLine>,
    pub subtotal: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartViewLine {
    pub product_id: Uuid,
    pub product_name: String,
    pub brand: String,
    pub model: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub line_total: Decimal,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        CartView {
            lines: cart
                .lines
                .iter()
                .map(|l| CartViewLine {
                    product_id: l.product_id,
                    product_name: l.product_name.clone(),
                    brand: l.brand.clone(),
                    model: l.model.clone(),
                    unit_price: l.unit_price,
                    quantity: l.quantity,
                    line_total: l.line_total(),
                })
                .collect(),
            subtotal: cart.subtotal(),
        }
    }
}

#[derive(Clone)]
pub struct CartService {
    db: Arc<DatabaseConnection>,
}

impl CartService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn load_product(&self, product_id: Uuid) -> Result<product::Model, ServiceError> {
        product::Entity::find_by_id(product_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))
    }

    /// Add a product to the cart, refreshing the line's price snapshot.
    #[instrument(skip(self, cart))]
    pub async fn add_item(
        &self,
        mut cart: Cart,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<Cart, ServiceError> {
        let product = self.load_product(product_id).await?;
        cart.add(&product, quantity)?;
        Ok(cart)
    }

    #[instrument(skip(self, cart))]
    pub async fn update_quantity(
        &self,
        mut cart: Cart,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<Cart, ServiceError> {
        let product = self.load_product(product_id).await?;
        cart.set_quantity(product_id, quantity, product.stock)?;
        Ok(cart)
    }

    #[instrument(skip(self, cart))]
    pub fn remove_item(&self, mut cart: Cart, product_id: Uuid) -> Result<Cart, ServiceError> {
        cart.remove(product_id)?;
        Ok(cart)
    }
}
