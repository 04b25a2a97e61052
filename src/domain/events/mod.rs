//! Domain events
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "aggregate", content = "event", rename_all = "snake_case")]
pub enum DomainEvent {
    Product(ProductEvent),
}

impl DomainEvent {
    /// NATS subject the event is published on.
    pub fn subject(&self) -> String {
        match self {
            Self::Product(e) => format!("ecommerce.products.{}", e.name()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProductEvent {
    Created { product_id: String, slug: String },
    Updated { product_id: String, final_price: Decimal },
    StockChanged { product_id: String, quantity: u32, is_available: bool },
    Deleted { product_id: String },
}

impl ProductEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Created { .. } => "created",
            Self::Updated { .. } => "updated",
            Self::StockChanged { .. } => "stock_changed",
            Self::Deleted { .. } => "deleted",
        }
    }
}
