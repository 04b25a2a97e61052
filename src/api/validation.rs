//! Request validation for product create and update.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::borrow::Cow;
use validator::{Validate, ValidationError, ValidationErrors};
use crate::api::error::{ApiError, FieldError};
use crate::domain::aggregates::{ProductDraft, Variant};
use crate::domain::value_objects::{is_sku_char, Category, Discount, Quality, Sku};

const IMAGE_EXTENSIONS: [&str; 5] = [".jpg", ".jpeg", ".png", ".gif", ".webp"];

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    #[validate(length(min = 2, max = 200, message = "Title must be between 2 and 200 characters"))]
    pub title: String,
    #[validate(length(max = 2000, message = "Description cannot exceed 2000 characters"))]
    pub description: Option<String>,
    #[validate(custom = "validate_price")]
    pub price: Decimal,
    #[serde(default)]
    #[validate(range(max = 100, message = "Discount cannot exceed 100%"))]
    pub discount: u32,
    #[serde(default)]
    #[validate(range(max = 999999, message = "Quantity cannot exceed 999,999"))]
    pub quantity: u32,
    #[validate(custom = "validate_quality")]
    pub quality: Option<String>,
    #[validate(custom = "validate_sku")]
    pub sku: Option<String>,
    #[validate(length(max = 100, message = "Brand cannot exceed 100 characters"))]
    pub brand: Option<String>,
    #[validate(custom = "validate_category")]
    pub category: String,
    #[serde(default)]
    #[validate(length(max = 20, message = "Maximum 20 tags allowed"), custom = "validate_tags")]
    pub tags: Vec<String>,
    #[serde(default)]
    #[validate(length(max = 10, message = "Maximum 10 images allowed"), custom = "validate_images")]
    pub images: Vec<String>,
    #[validate(custom = "validate_image_url")]
    pub thumbnail: Option<String>,
    #[serde(default)]
    #[validate(length(max = 50, message = "Maximum 50 variants allowed"), custom = "validate_variants")]
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub is_featured: bool,
    #[validate(length(max = 60, message = "Meta title cannot exceed 60 characters"))]
    pub meta_title: Option<String>,
    #[validate(length(max = 160, message = "Meta description cannot exceed 160 characters"))]
    pub meta_description: Option<String>,
}

impl ProductInput {
    /// Trims text, upper-cases the SKU and drops empty optional values and list items.
    pub fn normalize(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.description = trimmed(self.description);
        self.brand = trimmed(self.brand);
        self.sku = trimmed(self.sku).map(|s| s.to_uppercase());
        self.quality = trimmed(self.quality);
        self.thumbnail = trimmed(self.thumbnail);
        self.meta_title = trimmed(self.meta_title);
        self.meta_description = trimmed(self.meta_description);
        self.category = self.category.trim().to_string();
        self.tags = self.tags.into_iter().filter_map(|t| trimmed(Some(t))).collect();
        self.images = self.images.into_iter().filter_map(|i| trimmed(Some(i))).collect();
        self
    }

    /// Normalizes, validates and converts into domain values.
    pub fn into_draft(self) -> Result<ProductDraft, ApiError> {
        let input = self.normalize();
        input.validate().map_err(|e| ApiError::Validation(field_errors(&e)))?;

        let invalid = |field: &str, message: String| ApiError::Validation(vec![FieldError::new(field, message)]);
        let category = input.category.parse::<Category>().map_err(|e| invalid("category", e.to_string()))?;
        let quality = input.quality.as_deref().map(str::parse::<Quality>).transpose().map_err(|e| invalid("quality", e.to_string()))?;
        let sku = input.sku.map(Sku::new).transpose().map_err(|e| invalid("sku", e.to_string()))?;
        let discount = Discount::new(input.discount).map_err(|e| invalid("discount", e.to_string()))?;

        Ok(ProductDraft {
            title: input.title,
            description: input.description,
            price: input.price,
            discount,
            sku,
            quantity: input.quantity,
            quality: quality.unwrap_or_default(),
            category,
            brand: input.brand,
            tags: input.tags,
            images: input.images,
            thumbnail: input.thumbnail,
            variants: input.variants,
            is_featured: input.is_featured,
            meta_title: input.meta_title,
            meta_description: input.meta_description,
        })
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Flattens validator output into `{field, message}` pairs, sorted by field.
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let message = e.message.as_ref().map(|m| m.to_string()).unwrap_or_else(|| format!("{} is invalid", camel_case(field)));
                FieldError::new(camel_case(field), message)
            })
        })
        .collect();
    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' { upper = true; continue; }
        if upper { out.extend(c.to_uppercase()); upper = false; } else { out.push(c); }
    }
    out
}

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut e = ValidationError::new(code);
    e.message = Some(Cow::Borrowed(message));
    e
}

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() && !price.is_zero() { return Err(error("price", "Price cannot be negative")); }
    if *price > Decimal::new(99_999_999, 2) { return Err(error("price", "Price cannot exceed $999,999.99")); }
    Ok(())
}

fn validate_quality(quality: &str) -> Result<(), ValidationError> {
    quality.parse::<Quality>().map(|_| ()).map_err(|_| error("quality", "Quality must be one of: new, used, refurbished"))
}

fn validate_category(category: &str) -> Result<(), ValidationError> {
    if category.is_empty() { return Err(error("category", "Category is required")); }
    category.parse::<Category>().map(|_| ()).map_err(|_| {
        error("category", "Category must be one of: electronics, clothing, accessories, home, sports, books, beauty, automotive, toys, food")
    })
}

fn validate_sku(sku: &str) -> Result<(), ValidationError> {
    Sku::new(sku).map(|_| ()).map_err(|e| {
        let mut err = ValidationError::new("sku");
        err.message = Some(Cow::Owned(e.to_string()));
        err
    })
}

fn validate_tags(tags: &[String]) -> Result<(), ValidationError> {
    if tags.iter().any(|t| t.chars().count() > 50) { return Err(error("tags", "Tags cannot exceed 50 characters")); }
    Ok(())
}

fn is_image_url(value: &str) -> bool {
    let Ok(url) = url::Url::parse(value) else { return false };
    let path = url.path().to_ascii_lowercase();
    matches!(url.scheme(), "http" | "https") && IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

fn validate_images(images: &[String]) -> Result<(), ValidationError> {
    if images.iter().all(|i| is_image_url(i)) { Ok(()) } else { Err(error("images", "All images must be valid image URLs")) }
}

fn validate_image_url(thumbnail: &str) -> Result<(), ValidationError> {
    if is_image_url(thumbnail) { Ok(()) } else { Err(error("thumbnail", "Thumbnail must be a valid image URL")) }
}

fn validate_variants(variants: &[Variant]) -> Result<(), ValidationError> {
    for v in variants {
        if v.color.as_deref().is_some_and(|c| c.chars().count() > 50) { return Err(error("variants", "Color name cannot exceed 50 characters")); }
        if v.size.as_deref().is_some_and(|s| s.chars().count() > 20) { return Err(error("variants", "Size cannot exceed 20 characters")); }
        if let Some(sku) = v.sku.as_deref() {
            if sku.len() > 50 { return Err(error("variants", "SKU cannot exceed 50 characters")); }
            if !sku.chars().all(is_sku_char) {
                return Err(error("variants", "SKU can only contain uppercase letters, numbers, hyphens, and underscores"));
            }
        }
    }
    Ok(())
}
