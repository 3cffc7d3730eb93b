use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::DomainError;

#[derive(Debug, Clone)]
pub struct Knife {
    pub id: Uuid,
    pub name: String,
    pub category_id: i32,
    pub category_name: Option<String>,
    pub description: String,
    pub price: BigDecimal,
    pub discount_price: BigDecimal,
    pub percentage_discount: bool,
    pub stock_quantity: i32,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    pub knife_type: String,
    pub blade_length: f64,
    pub color: Option<String>,
    pub blade_material: String,
    pub handle_material: String,
    pub knife_sizes: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Field values for creating or replacing a knife.
#[derive(Debug, Clone)]
pub struct KnifeDraft {
    pub name: String,
    pub category_id: i32,
    pub category_name: Option<String>,
    pub description: String,
    pub price: BigDecimal,
    pub discount_price: BigDecimal,
    pub percentage_discount: bool,
    pub stock_quantity: i32,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    pub knife_type: String,
    pub blade_length: f64,
    pub color: Option<String>,
    pub blade_material: String,
    pub handle_material: String,
    pub knife_sizes: Vec<String>,
}

impl KnifeDraft {
    /// Checks the invariants a stored knife must hold and folds a discount
    /// that is not below the regular price back to "no discount".
    pub fn normalized(mut self) -> Result<Self, DomainError> {
        if self.price <= BigDecimal::zero() {
            return Err(DomainError::InvalidInput(
                "Regular price must be greater than 0".to_string(),
            ));
        }
        if self.discount_price < BigDecimal::zero() {
            return Err(DomainError::InvalidInput(
                "Discount price cannot be negative".to_string(),
            ));
        }
        if self.stock_quantity < 0 {
            return Err(DomainError::InvalidInput(
                "Stock quantity cannot be negative".to_string(),
            ));
        }
        if !(self.blade_length > 0.0) {
            return Err(DomainError::InvalidInput(
                "Blade length must be positive".to_string(),
            ));
        }
        for (field, value) in [
            ("name", &self.name),
            ("knifeType", &self.knife_type),
            ("bladeMaterial", &self.blade_material),
            ("handleMaterial", &self.handle_material),
        ] {
            if value.trim().is_empty() {
                return Err(DomainError::InvalidInput(format!("{} is required", field)));
            }
        }
        if self.knife_sizes.iter().all(|s| s.trim().is_empty()) {
            return Err(DomainError::InvalidInput(
                "At least one knife size is required".to_string(),
            ));
        }

        if self.discount_price >= self.price {
            self.discount_price = self.price.clone();
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Anything other than "asc" (case-insensitive) sorts descending.
    pub fn parse_price_sort(raw: Option<&str>) -> Self {
        match raw {
            None => SortDirection::Asc,
            Some(s) if s.eq_ignore_ascii_case("asc") => SortDirection::Asc,
            Some(_) => SortDirection::Desc,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct KnifeFilter {
    pub search_term: Option<String>,
    pub category_id: Option<i32>,
    pub min_price: Option<BigDecimal>,
    pub max_price: Option<BigDecimal>,
    pub knife_type: Option<String>,
    pub blade_material: Option<String>,
    pub sort: SortDirection,
}

impl KnifeFilter {
    /// In-memory equivalent of the repository query.
    pub fn matches(&self, knife: &Knife) -> bool {
        if let Some(term) = non_empty(&self.search_term) {
            if !knife.name.to_lowercase().contains(&term.to_lowercase()) {
                return false;
            }
        }
        if let Some(category_id) = self.category_id {
            if knife.category_id != category_id {
                return false;
            }
        }
        if let Some(min) = &self.min_price {
            if &knife.price < min {
                return false;
            }
        }
        if let Some(max) = &self.max_price {
            if &knife.price > max {
                return false;
            }
        }
        if let Some(knife_type) = non_empty(&self.knife_type) {
            if knife.knife_type != knife_type {
                return false;
            }
        }
        if let Some(material) = non_empty(&self.blade_material) {
            if knife.blade_material != material {
                return false;
            }
        }
        true
    }
}

pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, PartialEq)]
pub struct StockCheck {
    pub knife_id: Uuid,
    pub requested: i32,
    pub available: bool,
    pub stock: i32,
    pub product_name: Option<String>,
    pub reason: Option<String>,
}

impl StockCheck {
    pub fn evaluate(knife_id: Uuid, knife: Option<&Knife>, requested: i32) -> Self {
        let Some(knife) = knife else {
            return Self {
                knife_id,
                requested,
                available: false,
                stock: 0,
                product_name: None,
                reason: Some("Product not found".to_string()),
            };
        };

        let stock = knife.stock_quantity;
        let available = stock >= requested;
        let reason = match (available, stock) {
            (true, _) => None,
            (false, 0) => Some("Out of stock".to_string()),
            (false, n) => Some(format!("Insufficient stock. Only {} available", n)),
        };

        Self {
            knife_id,
            requested,
            available,
            stock,
            product_name: Some(knife.name.clone()),
            reason,
        }
    }
}
