//! Aggregates module
pub mod product;
pub mod cart;
pub mod wishlist;

pub use product::{Product, ProductDraft, ProductError, ProductSnapshot, Variant};
pub use cart::{CartCommand, CartEntry, CartState, CartTotals};
pub use wishlist::{WishlistCommand, WishlistState};
