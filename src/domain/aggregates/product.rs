//! Product Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use crate::domain::value_objects::{Category, Discount, Quality, Sku, Slug};
use crate::domain::events::{DomainEvent, ProductEvent};

/// Validated catalog fields supplied by an admin on create or update.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub title: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub discount: Discount,
    pub sku: Option<Sku>,
    pub quantity: u32,
    pub quality: Quality,
    pub category: Category,
    pub brand: Option<String>,
    pub tags: Vec<String>,
    pub images: Vec<String>,
    pub thumbnail: Option<String>,
    pub variants: Vec<Variant>,
    pub is_featured: bool,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant { pub color: Option<String>, pub size: Option<String>, pub stock: u32, pub sku: Option<String> }

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    id: String,
    slug: Slug,
    #[serde(flatten)]
    details: ProductDraft,
    final_price: Decimal,
    is_available: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

/// Copy of a catalog product as held by carts and wishlists.
///
/// Snapshots are not live: stock and price reflect the catalog at the time
/// the copy was taken.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    pub id: String,
    pub title: String,
    pub price: Decimal,
    #[serde(default)]
    pub discount: Discount,
    pub final_price: Decimal,
    pub thumbnail: Option<String>,
    pub category: String,
    pub brand: Option<String>,
    pub stock: u32,
    pub is_available: bool,
}

impl ProductSnapshot {
    pub fn is_purchasable(&self) -> bool { self.is_available && self.stock > 0 }
}

impl Product {
    pub fn create(details: ProductDraft) -> Self {
        let id = Uuid::now_v7().to_string();
        let now = Utc::now();
        let slug = Slug::from_title(&details.title);
        let mut product = Self {
            id: id.clone(), slug: slug.clone(), details, final_price: Decimal::ZERO, is_available: false,
            created_at: now, updated_at: now, events: vec![],
        };
        product.derive();
        product.raise_event(DomainEvent::Product(ProductEvent::Created { product_id: id, slug: slug.to_string() }));
        product
    }

    /// Rebuilds a stored product. Derived fields are recomputed from `details`.
    pub fn restore(id: String, slug: Slug, details: ProductDraft, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Self {
        let mut product = Self { id, slug, details, final_price: Decimal::ZERO, is_available: false, created_at, updated_at, events: vec![] };
        product.derive();
        product
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn slug(&self) -> &Slug { &self.slug }
    pub fn details(&self) -> &ProductDraft { &self.details }
    pub fn title(&self) -> &str { &self.details.title }
    pub fn quantity(&self) -> u32 { self.details.quantity }
    pub fn final_price(&self) -> Decimal { self.final_price }
    pub fn is_available(&self) -> bool { self.is_available }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }

    /// Replaces every editable field. The slug is kept once assigned.
    pub fn update(&mut self, details: ProductDraft) {
        let stock_changed = details.quantity != self.details.quantity;
        self.details = details;
        self.derive();
        self.touch();
        self.raise_event(DomainEvent::Product(ProductEvent::Updated { product_id: self.id.clone(), final_price: self.final_price }));
        if stock_changed { self.raise_stock_changed(); }
    }

    pub fn set_stock(&mut self, quantity: u32) {
        self.details.quantity = quantity;
        self.derive();
        self.touch();
        self.raise_stock_changed();
    }

    pub fn remove_inventory(&mut self, qty: u32) -> Result<(), ProductError> {
        let remaining = self.details.quantity.checked_sub(qty).ok_or(ProductError::InsufficientInventory)?;
        self.set_stock(remaining);
        Ok(())
    }

    pub fn mark_deleted(&mut self) {
        self.raise_event(DomainEvent::Product(ProductEvent::Deleted { product_id: self.id.clone() }));
    }

    pub fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            id: self.id.clone(),
            title: self.details.title.clone(),
            price: self.details.price,
            discount: self.details.discount,
            final_price: self.final_price,
            thumbnail: self.details.thumbnail.clone(),
            category: self.details.category.to_string(),
            brand: self.details.brand.clone(),
            stock: self.details.quantity,
            is_available: self.is_available,
        }
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
    fn raise_stock_changed(&mut self) {
        self.raise_event(DomainEvent::Product(ProductEvent::StockChanged {
            product_id: self.id.clone(), quantity: self.details.quantity, is_available: self.is_available,
        }));
    }
    fn derive(&mut self) {
        self.final_price = self.details.discount.apply(self.details.price);
        self.is_available = self.details.quantity > 0;
    }
    fn touch(&mut self) { self.updated_at = Utc::now(); }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductError {
    #[error("Insufficient inventory")]
    InsufficientInventory,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str, price: Decimal, discount: u32, quantity: u32) -> ProductDraft {
        ProductDraft {
            title: title.into(), description: None, price, discount: Discount::new(discount).unwrap(), sku: None,
            quantity, quality: Quality::New, category: Category::Electronics, brand: Some("Acme".into()),
            tags: vec![], images: vec![], thumbnail: None, variants: vec![], is_featured: false,
            meta_title: None, meta_description: None,
        }
    }

    #[test]
    fn test_product_create() {
        let mut p = Product::create(draft("Test Product", Decimal::new(2000, 2), 25, 3));
        assert_eq!(p.slug().as_str(), "test-product");
        assert_eq!(p.final_price(), Decimal::new(15, 0));
        assert!(p.is_available());
        let events = p.take_events();
        assert!(matches!(events.as_slice(), [DomainEvent::Product(ProductEvent::Created { .. })]));
    }
    #[test]
    fn test_inventory() {
        let mut p = Product::create(draft("P", Decimal::new(10, 0), 0, 5));
        p.remove_inventory(5).unwrap();
        assert_eq!(p.quantity(), 0);
        assert!(!p.is_available());
        assert_eq!(p.remove_inventory(1), Err(ProductError::InsufficientInventory));
    }
    #[test]
    fn test_update_keeps_slug_and_rederives() {
        let mut p = Product::create(draft("Old Name", Decimal::new(100, 0), 0, 1));
        p.take_events();
        p.update(draft("New Name", Decimal::new(100, 0), 50, 0));
        assert_eq!(p.slug().as_str(), "old-name");
        assert_eq!(p.final_price(), Decimal::new(50, 0));
        assert!(!p.is_available());
        assert_eq!(p.take_events().len(), 2);
    }
    #[test]
    fn test_snapshot() {
        let p = Product::create(draft("Lamp", Decimal::new(40, 0), 10, 7));
        let s = p.snapshot();
        assert_eq!(s.id, p.id());
        assert_eq!(s.final_price, Decimal::new(36, 0));
        assert_eq!(s.category, "electronics");
        assert_eq!(s.stock, 7);
        assert!(s.is_purchasable());
    }
}
