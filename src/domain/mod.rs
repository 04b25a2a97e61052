//! Domain layer: catalog products, cart and wishlist state.
pub mod aggregates;
pub mod events;
pub mod value_objects;
