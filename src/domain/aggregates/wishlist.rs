//! Wishlist Aggregate

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use crate::domain::aggregates::product::ProductSnapshot;

/// Products saved for later, unique by id, in insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WishlistState {
    items: Vec<ProductSnapshot>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum WishlistCommand {
    Add(ProductSnapshot),
    Remove(String),
    Clear,
    Load(Vec<ProductSnapshot>),
}

impl WishlistState {
    pub fn new() -> Self { Self::default() }
    pub fn items(&self) -> &[ProductSnapshot] { &self.items }
    pub fn total_items(&self) -> usize { self.items.len() }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }
    pub fn contains(&self, product_id: &str) -> bool { self.items.iter().any(|p| p.id == product_id) }

    pub fn reduce(&self, command: WishlistCommand) -> WishlistState {
        match command {
            WishlistCommand::Add(product) => {
                if self.contains(&product.id) { return self.clone(); }
                let mut items = self.items.clone();
                items.push(product);
                Self { items }
            }
            WishlistCommand::Remove(product_id) => {
                Self { items: self.items.iter().filter(|p| p.id != product_id).cloned().collect() }
            }
            WishlistCommand::Clear => Self::new(),
            WishlistCommand::Load(items) => {
                let mut seen = HashSet::new();
                Self { items: items.into_iter().filter(|p| seen.insert(p.id.clone())).collect() }
            }
        }
    }
}
