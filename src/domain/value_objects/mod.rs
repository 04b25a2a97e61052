//! Value Objects for the catalog

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Characters allowed in a SKU after normalisation.
pub fn is_sku_char(c: char) -> bool { c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-' || c == '_' }

/// SKU (Stock Keeping Unit) value object
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Sku(String);

impl Sku {
    pub const MIN_LEN: usize = 3;
    pub const MAX_LEN: usize = 50;

    pub fn new(value: impl Into<String>) -> Result<Self, SkuError> {
        let value = value.into().trim().to_uppercase();
        if value.is_empty() { return Err(SkuError::Empty); }
        if value.len() < Self::MIN_LEN { return Err(SkuError::TooShort); }
        if value.len() > Self::MAX_LEN { return Err(SkuError::TooLong); }
        if !value.chars().all(is_sku_char) { return Err(SkuError::InvalidChars); }
        Ok(Self(value))
    }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Sku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl TryFrom<String> for Sku {
    type Error = SkuError;
    fn try_from(value: String) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<Sku> for String {
    fn from(sku: Sku) -> Self { sku.0 }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkuError {
    #[error("SKU empty")]
    Empty,
    #[error("SKU must be at least 3 characters")]
    TooShort,
    #[error("SKU cannot exceed 50 characters")]
    TooLong,
    #[error("SKU can only contain uppercase letters, numbers, hyphens, and underscores")]
    InvalidChars,
}

/// Whole-number discount percentage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Discount(u8);

impl Discount {
    pub const NONE: Discount = Discount(0);

    pub fn new(percent: u32) -> Result<Self, DiscountError> {
        u8::try_from(percent).ok().filter(|p| *p <= 100).map(Self).ok_or(DiscountError::OutOfRange(percent))
    }
    pub fn percent(&self) -> u8 { self.0 }
    pub fn is_zero(&self) -> bool { self.0 == 0 }

    /// Price after the discount, rounded half-up to cents.
    pub fn apply(&self, price: Decimal) -> Decimal {
        if self.is_zero() { return price; }
        let off = price * Decimal::from(self.0) / Decimal::ONE_HUNDRED;
        (price - off).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }
}

impl TryFrom<u32> for Discount {
    type Error = DiscountError;
    fn try_from(value: u32) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<Discount> for u32 {
    fn from(d: Discount) -> Self { u32::from(d.0) }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscountError {
    #[error("Discount {0} is outside 0..=100")]
    OutOfRange(u32),
}

/// URL-safe handle generated from a product title.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slug(String);

impl Slug {
    pub fn from_title(title: &str) -> Self {
        let slug = title
            .to_lowercase()
            .replace(' ', "-")
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
            .collect();
        Self(slug)
    }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category { Electronics, Clothing, Accessories, Home, Sports, Books, Beauty, Automotive, Toys, Food }

impl Category {
    pub const ALL: [Category; 10] = [
        Self::Electronics, Self::Clothing, Self::Accessories, Self::Home, Self::Sports,
        Self::Books, Self::Beauty, Self::Automotive, Self::Toys, Self::Food,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Electronics => "electronics", Self::Clothing => "clothing", Self::Accessories => "accessories",
            Self::Home => "home", Self::Sports => "sports", Self::Books => "books", Self::Beauty => "beauty",
            Self::Automotive => "automotive", Self::Toys => "toys", Self::Food => "food",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for Category {
    type Err = UnknownVariant;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|c| c.as_str() == s).ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality { #[default] New, Used, Refurbished }

impl Quality {
    pub fn as_str(&self) -> &'static str {
        match self { Self::New => "new", Self::Used => "used", Self::Refurbished => "refurbished" }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for Quality {
    type Err = UnknownVariant;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "used" => Ok(Self::Used),
            "refurbished" => Ok(Self::Refurbished),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown value: {0}")]
pub struct UnknownVariant(pub String);

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_sku() { let sku = Sku::new(" prod-001 ").unwrap(); assert_eq!(sku.as_str(), "PROD-001"); }
    #[test]
    fn test_sku_rejects_bad_input() {
        assert_eq!(Sku::new("   "), Err(SkuError::Empty));
        assert_eq!(Sku::new("ab"), Err(SkuError::TooShort));
        assert_eq!(Sku::new("x".repeat(51)), Err(SkuError::TooLong));
        assert_eq!(Sku::new("ab c"), Err(SkuError::InvalidChars));
    }
    #[test]
    fn test_discount_apply() {
        let d = Discount::new(15).unwrap();
        assert_eq!(d.apply(Decimal::new(1999, 2)), Decimal::new(1699, 2));
        assert_eq!(Discount::NONE.apply(Decimal::new(10, 0)), Decimal::new(10, 0));
        assert_eq!(Discount::new(100).unwrap().apply(Decimal::new(42, 0)), Decimal::ZERO);
        assert!(Discount::new(101).is_err());
    }
    #[test]
    fn test_slug() {
        assert_eq!(Slug::from_title("Wireless Mouse (Black) 2.0").as_str(), "wireless-mouse-black-20");
    }
    #[test]
    fn test_category_parse() {
        assert_eq!("toys".parse::<Category>().unwrap(), Category::Toys);
        assert!("garden".parse::<Category>().is_err());
        assert_eq!(Quality::default().to_string(), "new");
    }
}
