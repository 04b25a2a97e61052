//! Storefront core
//!
//! Catalog service plus the per-user cart and wishlist state it feeds.
//!
//! ## Features
//! - Product catalog with validation, derived pricing and filtered listing
//! - Cart and wishlist reducers with derived totals
//! - Login gate with return-path redirects
//! - Per-account snapshot persistence that degrades to empty state

pub mod api;
pub mod config;
pub mod domain;
pub mod session;

pub use domain::aggregates::{CartCommand, CartEntry, CartState, CartTotals, Product, ProductDraft, ProductSnapshot, WishlistCommand, WishlistState};
pub use session::{AuthStatus, CartContainer, Identity, Navigator, Outcome, Role, SnapshotStore, WishlistContainer};
