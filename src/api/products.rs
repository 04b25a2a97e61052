//! Catalog product endpoints.

use axum::{
    extract::{rejection::{JsonRejection, PathRejection, QueryRejection}, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::types::Json as SqlJson;
use uuid::Uuid;
use crate::api::error::ApiError;
use crate::api::query::{ListParams, Pagination, ProductFilter};
use crate::api::validation::ProductInput;
use crate::api::AppState;
use crate::domain::aggregates::{Product, ProductDraft, Variant};
use crate::domain::value_objects::{Discount, Slug, Sku, UnknownVariant};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: Uuid, pub title: String, pub slug: String, pub description: Option<String>,
    pub price: Decimal, pub discount: i32, pub final_price: Decimal, pub sku: Option<String>,
    pub quantity: i32, pub quality: String, pub category: String, pub brand: Option<String>,
    pub tags: Vec<String>, pub images: Vec<String>, pub thumbnail: Option<String>,
    pub variants: SqlJson<Vec<Variant>>, pub is_featured: bool, pub is_available: bool,
    pub meta_title: Option<String>, pub meta_description: Option<String>,
    pub created_at: DateTime<Utc>, pub updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = ApiError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let corrupt = |field: &str, e: String| ApiError::Internal(format!("product {} has invalid {field}: {e}", row.id));
        let discount = u32::try_from(row.discount).map_err(|e| e.to_string()).and_then(|d| Discount::new(d).map_err(|e| e.to_string()))
            .map_err(|e| corrupt("discount", e))?;
        let details = ProductDraft {
            title: row.title.clone(),
            description: row.description.clone(),
            price: row.price,
            discount,
            sku: row.sku.clone().map(Sku::new).transpose().map_err(|e| corrupt("sku", e.to_string()))?,
            quantity: u32::try_from(row.quantity).map_err(|e| corrupt("quantity", e.to_string()))?,
            quality: row.quality.parse().map_err(|e: UnknownVariant| corrupt("quality", e.to_string()))?,
            category: row.category.parse().map_err(|e: UnknownVariant| corrupt("category", e.to_string()))?,
            brand: row.brand.clone(),
            tags: row.tags.clone(),
            images: row.images.clone(),
            thumbnail: row.thumbnail.clone(),
            variants: row.variants.0.clone(),
            is_featured: row.is_featured,
            meta_title: row.meta_title.clone(),
            meta_description: row.meta_description.clone(),
        };
        let slug = Slug::from_title(&row.slug);
        Ok(Product::restore(row.id.to_string(), slug, details, row.created_at, row.updated_at))
    }
}

fn parse_id(product: &Product) -> Result<Uuid, ApiError> {
    Uuid::parse_str(product.id()).map_err(|e| ApiError::Internal(e.to_string()))
}

#[derive(Serialize)]
pub struct ListResponse { pub success: bool, pub products: Vec<Product>, pub pagination: Pagination, pub filters: ListParams }

#[derive(Serialize)]
pub struct ProductResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub product: Product,
}

pub async fn list_products(State(s): State<AppState>, params: Result<Query<ListParams>, QueryRejection>) -> Result<Json<ListResponse>, ApiError> {
    let Query(params) = params?;
    let filter = ProductFilter::from_params(&params)?;
    let rows: Vec<ProductRow> = filter.select_query().build_query_as().fetch_all(&s.db).await?;
    let total: i64 = filter.count_query().build_query_scalar().fetch_one(&s.db).await?;
    let products = rows.into_iter().map(Product::try_from).collect::<Result<Vec<_>, _>>()?;
    tracing::debug!(found = products.len(), total, "listed products");
    Ok(Json(ListResponse { success: true, products, pagination: Pagination::new(&filter, total), filters: params }))
}

pub async fn get_product(State(s): State<AppState>, id: Result<Path<Uuid>, PathRejection>) -> Result<Json<ProductResponse>, ApiError> {
    let Path(id) = id?;
    let row = sqlx::query_as::<_, ProductRow>("SELECT * FROM products WHERE id = $1").bind(id).fetch_optional(&s.db).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(ProductResponse { message: None, product: row.try_into()? }))
}

pub async fn create_product(State(s): State<AppState>, payload: Result<Json<ProductInput>, JsonRejection>) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    let Json(input) = payload?;
    let mut product = Product::create(input.into_draft()?);
    let row = insert(&s, &product).await?;
    let events = product.take_events();
    let product = Product::try_from(row)?;
    tracing::info!(product_id = product.id(), slug = %product.slug(), "product created");
    s.publish(events).await;
    Ok((StatusCode::CREATED, Json(ProductResponse { message: Some("Product created successfully"), product })))
}

pub async fn update_product(
    State(s): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<ProductInput>, JsonRejection>,
) -> Result<Json<ProductResponse>, ApiError> {
    let Path(id) = id?;
    let Json(input) = payload?;
    let draft = input.into_draft()?;
    let row = sqlx::query_as::<_, ProductRow>("SELECT * FROM products WHERE id = $1").bind(id).fetch_optional(&s.db).await?.ok_or(ApiError::NotFound)?;
    let mut product = Product::try_from(row)?;
    product.update(draft);
    let row = sqlx::query_as::<_, ProductRow>(
        "UPDATE products SET title = $2, description = $3, price = $4, discount = $5, final_price = $6, sku = $7, quantity = $8, \
         quality = $9, category = $10, brand = $11, tags = $12, images = $13, thumbnail = $14, variants = $15, is_featured = $16, \
         is_available = $17, meta_title = $18, meta_description = $19, updated_at = $20 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(product.title())
    .bind(&product.details().description)
    .bind(product.details().price)
    .bind(i32::from(product.details().discount.percent()))
    .bind(product.final_price())
    .bind(product.details().sku.as_ref().map(Sku::as_str))
    .bind(quantity_column(&product)?)
    .bind(product.details().quality.as_str())
    .bind(product.details().category.as_str())
    .bind(&product.details().brand)
    .bind(&product.details().tags)
    .bind(&product.details().images)
    .bind(&product.details().thumbnail)
    .bind(SqlJson(&product.details().variants))
    .bind(product.details().is_featured)
    .bind(product.is_available())
    .bind(&product.details().meta_title)
    .bind(&product.details().meta_description)
    .bind(product.updated_at())
    .fetch_optional(&s.db)
    .await?
    .ok_or(ApiError::NotFound)?;
    let events = product.take_events();
    tracing::info!(product_id = %id, "product updated");
    s.publish(events).await;
    Ok(Json(ProductResponse { message: Some("Product updated successfully"), product: row.try_into()? }))
}

pub async fn delete_product(State(s): State<AppState>, id: Result<Path<Uuid>, PathRejection>) -> Result<Json<ProductResponse>, ApiError> {
    let Path(id) = id?;
    let row = sqlx::query_as::<_, ProductRow>("DELETE FROM products WHERE id = $1 RETURNING *").bind(id).fetch_optional(&s.db).await?.ok_or(ApiError::NotFound)?;
    let mut product = Product::try_from(row)?;
    product.mark_deleted();
    tracing::info!(product_id = %id, "product deleted");
    s.publish(product.take_events()).await;
    Ok(Json(ProductResponse { message: Some("Product deleted successfully"), product }))
}

fn quantity_column(product: &Product) -> Result<i32, ApiError> {
    i32::try_from(product.quantity()).map_err(|e| ApiError::Internal(e.to_string()))
}

async fn insert(s: &AppState, product: &Product) -> Result<ProductRow, ApiError> {
    let d = product.details();
    let row = sqlx::query_as::<_, ProductRow>(
        "INSERT INTO products (id, title, slug, description, price, discount, final_price, sku, quantity, quality, category, brand, \
         tags, images, thumbnail, variants, is_featured, is_available, meta_title, meta_description, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21, $22) RETURNING *",
    )
    .bind(parse_id(product)?)
    .bind(&d.title)
    .bind(product.slug().as_str())
    .bind(&d.description)
    .bind(d.price)
    .bind(i32::from(d.discount.percent()))
    .bind(product.final_price())
    .bind(d.sku.as_ref().map(Sku::as_str))
    .bind(quantity_column(product)?)
    .bind(d.quality.as_str())
    .bind(d.category.as_str())
    .bind(&d.brand)
    .bind(&d.tags)
    .bind(&d.images)
    .bind(&d.thumbnail)
    .bind(SqlJson(&d.variants))
    .bind(d.is_featured)
    .bind(product.is_available())
    .bind(&d.meta_title)
    .bind(&d.meta_description)
    .bind(product.created_at())
    .bind(product.updated_at())
    .fetch_one(&s.db)
    .await?;
    Ok(row)
}
