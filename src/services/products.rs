//! Product catalog: customer browsing plus seller-side listing management.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::entities::{account, product, AccountRole};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::badges::{self, BadgeInfo};
use crate::services::dashboards::seller_lifetime_revenue;

/// Catalog search filters. Brand and model match on substring; year keeps
/// only listings whose compatibility list contains it exactly.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub page: u64,
    pub page_size: u64,
}

/// Catalog row: the listing plus its seller's storefront badge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: product::Model,
    pub year_range: String,
    pub seller_badge: badges::BadgeLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller_badge_label: Option<&'static str>,
}

impl ProductView {
    fn annotate(product: product::Model, badge: &BadgeInfo) -> Self {
        ProductView {
            year_range: product.year_range(),
            seller_badge: badge.level,
            seller_badge_label: badge.label,
            product,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductPage {
    pub products: Vec<ProductView>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub brand: String,
    pub model: String,
    pub compatible_years: String,
    pub price: Decimal,
    pub stock: i32,
}

#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub compatible_years: Option<String>,
    pub price: Option<Decimal>,
}

#[derive(Clone)]
pub struct ProductService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl ProductService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Browse the catalog. The year filter works on the parsed
    /// compatibility list, so it is applied after the database query.
    #[instrument(skip(self))]
    pub async fn list_products(&self, filter: ProductFilter) -> Result<ProductPage, ServiceError> {
        let mut query = product::Entity::find().order_by_desc(product::Column::CreatedAt);
        if let Some(ref brand) = filter.brand {
            query = query.filter(product::Column::Brand.contains(brand));
        }
        if let Some(ref model) = filter.model {
            query = query.filter(product::Column::Model.contains(model));
        }

        let mut rows = query.all(&*self.db).await?;
        if let Some(year) = filter.year {
            rows.retain(|p| p.fits_year(year));
        }

        let total = rows.len() as u64;
        let page = filter.page.max(1);
        let page_size = filter.page_size.max(1);
        let offset = ((page - 1) * page_size) as usize;
        let rows: Vec<product::Model> = rows
            .into_iter()
            .skip(offset)
            .take(page_size as usize)
            .collect();

        let mut badge_cache: HashMap<Uuid, BadgeInfo> = HashMap::new();
        let mut views = Vec::with_capacity(rows.len());
        for product in rows {
            if !badge_cache.contains_key(&product.seller_id) {
                let revenue = seller_lifetime_revenue(&*self.db, product.seller_id).await?;
                badge_cache.insert(product.seller_id, badges::evaluate(revenue));
            }
            let badge = &badge_cache[&product.seller_id];
            views.push(ProductView::annotate(product, badge));
        }

        Ok(ProductPage {
            products: views,
            total,
            page,
            page_size,
        })
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, product_id: Uuid) -> Result<ProductView, ServiceError> {
        let product = self.load(product_id).await?;
        let revenue = seller_lifetime_revenue(&*self.db, product.seller_id).await?;
        Ok(ProductView::annotate(product, &badges::evaluate(revenue)))
    }

    #[instrument(skip(self, input))]
    pub async fn create_product(
        &self,
        seller_id: Uuid,
        input: NewProduct,
    ) -> Result<product::Model, ServiceError> {
        let seller = account::Entity::find_by_id(seller_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Account {} not found", seller_id)))?;
        if seller.role != AccountRole::Seller {
            return Err(ServiceError::Forbidden(
                "Only seller accounts can create listings".to_string(),
            ));
        }
        if input.name.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Product name must not be empty".to_string(),
            ));
        }
        if input.price <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Price must be positive".to_string(),
            ));
        }
        if input.stock < 0 {
            return Err(ServiceError::ValidationError(
                "Stock must not be negative".to_string(),
            ));
        }

        let now = Utc::now();
        let created = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            seller_id: Set(seller_id),
            name: Set(input.name),
            brand: Set(input.brand),
            model: Set(input.model),
            compatible_years: Set(input.compatible_years),
            price: Set(input.price),
            stock: Set(input.stock),
            version: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await?;

        info!(product_id = %created.id, %seller_id, "Product created");
        self.event_sender
            .send_or_log(Event::ProductCreated(created.id))
            .await;
        Ok(created)
    }

    /// Edit listing details. The version bump makes any in-flight stock
    /// reservation against the old row fail its check and retry.
    #[instrument(skip(self, changes))]
    pub async fn update_product(
        &self,
        seller_id: Uuid,
        product_id: Uuid,
        changes: ProductUpdate,
    ) -> Result<product::Model, ServiceError> {
        let existing = self.load_owned(seller_id, product_id).await?;

        if let Some(ref price) = changes.price {
            if *price <= Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "Price must be positive".to_string(),
                ));
            }
        }

        let version = existing.version;
        let mut active: product::ActiveModel = existing.into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(brand) = changes.brand {
            active.brand = Set(brand);
        }
        if let Some(model) = changes.model {
            active.model = Set(model);
        }
        if let Some(years) = changes.compatible_years {
            active.compatible_years = Set(years);
        }
        if let Some(price) = changes.price {
            active.price = Set(price);
        }
        active.version = Set(version + 1);
        active.updated_at = Set(Utc::now());

        Ok(active.update(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_product(
        &self,
        seller_id: Uuid,
        product_id: Uuid,
    ) -> Result<(), ServiceError> {
        let existing = self.load_owned(seller_id, product_id).await?;
        product::Entity::delete_by_id(existing.id)
            .exec(&*self.db)
            .await?;
        info!(%product_id, %seller_id, "Product deleted");
        self.event_sender
            .send_or_log(Event::ProductDeleted(product_id))
            .await;
        Ok(())
    }

    /// Restock a listing. Raced against a checkout's decrement, exactly one
    /// of the two writes wins its version check.
    #[instrument(skip(self))]
    pub async fn add_stock(
        &self,
        seller_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<product::Model, ServiceError> {
        if quantity < 1 {
            return Err(ServiceError::ValidationError(
                "Restock quantity must be at least 1".to_string(),
            ));
        }
        let existing = self.load_owned(seller_id, product_id).await?;

        let result = product::Entity::update_many()
            .col_expr(
                product::Column::Stock,
                Expr::value(existing.stock + quantity),
            )
            .col_expr(product::Column::Version, Expr::value(existing.version + 1))
            .col_expr(product::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(product::Column::Id.eq(existing.id))
            .filter(product::Column::Version.eq(existing.version))
            .exec(&*self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::ConcurrentModification(existing.id));
        }

        self.load(product_id).await
    }

    /// The seller's own listings, newest first.
    #[instrument(skip(self))]
    pub async fn list_for_seller(
        &self,
        seller_id: Uuid,
    ) -> Result<Vec<product::Model>, ServiceError> {
        Ok(product::Entity::find()
            .filter(product::Column::SellerId.eq(seller_id))
            .order_by_desc(product::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    async fn load(&self, product_id: Uuid) -> Result<product::Model, ServiceError> {
        product::Entity::find_by_id(product_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))
    }

    async fn load_owned(
        &self,
        seller_id: Uuid,
        product_id: Uuid,
    ) -> Result<product::Model, ServiceError> {
        let product = self.load(product_id).await?;
        if product.seller_id != seller_id {
            return Err(ServiceError::Forbidden(
                "Listing belongs to another seller".to_string(),
            ));
        }
        Ok(product)
    }
}
