use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Car-part listing owned by a seller account.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub seller_id: Uuid,

    #[validate(length(min = 1, max = 200, message = "Product name must not be empty"))]
    pub name: String,

    pub brand: String,
    pub model: String,

    /// Comma-separated list of compatible car years, e.g. "2014,2015,2016".
    pub compatible_years: String,

    pub price: Decimal,
    pub stock: i32,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    /// Compact display form of `compatible_years`: a single year as-is,
    /// multiple years as "min–max", non-numeric entries ignored.
    pub fn year_range(&self) -> String {
        let years: Vec<i32> = self
            .compatible_years
            .split(',')
            .filter_map(|part| part.trim().parse().ok())
            .collect();
        match (years.iter().min(), years.iter().max()) {
            (Some(min), Some(max)) if min == max => min.to_string(),
            (Some(min), Some(max)) => format!("{}–{}", min, max),
            _ => String::new(),
        }
    }

    /// Whether the listing is compatible with the given car year.
    pub fn fits_year(&self, year: i32) -> bool {
        self.compatible_years
            .split(',')
            .filter_map(|part| part.trim().parse::<i32>().ok())
            .any(|y| y == year)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::SellerId",
        to = "super::account::Column::Id"
    )]
    Seller,
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Seller.def()
    }
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn listing(years: &str) -> Model {
        Model {
            id: Uuid::new_v4(),
            seller_id: Uuid::new_v4(),
            name: "Brake pads".into(),
            brand: "Toyota".into(),
            model: "Vios".into(),
            compatible_years: years.into(),
            price: dec!(1500),
            stock: 4,
            version: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn year_range_spans_min_to_max() {
        assert_eq!(listing("2016, 2014,2015").year_range(), "2014–2016");
    }

    #[test]
    fn year_range_single_year() {
        assert_eq!(listing("2018").year_range(), "2018");
    }

    #[test]
    fn year_range_ignores_junk() {
        assert_eq!(listing("abc, ,2020").year_range(), "2020");
        assert_eq!(listing("").year_range(), "");
    }

    #[test]
    fn fits_year_matches_exact_entries() {
        let p = listing("2014,2015,2016");
        assert!(p.fits_year(2015));
        assert!(!p.fits_year(2017));
    }
}
