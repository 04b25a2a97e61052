//! HTTP surface for the catalog.

pub mod error;
pub mod products;
pub mod query;
pub mod validation;

use axum::{routing::get, Json, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use crate::domain::events::DomainEvent;

pub use error::{ApiError, FieldError};

#[derive(Clone)]
pub struct AppState { pub db: sqlx::PgPool, pub nats: Option<async_nats::Client> }

impl AppState {
    /// Publishes domain events to NATS. Publishing never fails a request.
    pub async fn publish(&self, events: Vec<DomainEvent>) {
        let Some(nats) = &self.nats else {
            tracing::debug!(count = events.len(), "no event bus configured, dropping events");
            return;
        };
        for event in events {
            let subject = event.subject();
            let payload = match serde_json::to_vec(&event) {
                Ok(payload) => payload,
                Err(e) => { tracing::warn!(%subject, error = %e, "failed to encode event"); continue; }
            };
            if let Err(e) = nats.publish(subject.clone(), payload.into()).await {
                tracing::warn!(%subject, error = %e, "failed to publish event");
            }
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "storefront-core"})) }))
        .route("/api/v1/products", get(products::list_products).post(products::create_product))
        .route("/api/v1/products/:id", get(products::get_product).put(products::update_product).delete(products::delete_product))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::{Request, StatusCode}};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    fn app() -> Router {
        let db = PgPoolOptions::new().connect_lazy("postgres://localhost/storefront_unused").unwrap();
        router(AppState { db, nats: None })
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app().oneshot(Request::get("/health").body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "healthy");
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_product() {
        let body = serde_json::json!({ "title": "A", "price": -1, "category": "garden" }).to_string();
        let request = Request::post("/api/v1/products").header("content-type", "application/json").body(Body::from(body)).unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["message"], "Validation failed");
        let fields: Vec<&str> = json["errors"].as_array().unwrap().iter().map(|e| e["field"].as_str().unwrap()).collect();
        assert_eq!(fields, vec!["category", "price", "title"]);
    }

    #[tokio::test]
    async fn test_create_rejects_malformed_json() {
        let request = Request::post("/api/v1/products").header("content-type", "application/json").body(Body::from("{")).unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_rejects_bad_price_filter() {
        let response = app().oneshot(Request::get("/api/v1/products?maxPrice=lots").body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["message"], "maxPrice must be a number");
    }

    #[tokio::test]
    async fn test_malformed_id_returns_json_error() {
        for request in [
            Request::get("/api/v1/products/not-a-uuid").body(Body::empty()).unwrap(),
            Request::delete("/api/v1/products/42").body(Body::empty()).unwrap(),
        ] {
            let response = app().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert!(json_body(response).await["message"].is_string());
        }
    }

    #[tokio::test]
    async fn test_publish_without_bus_is_noop() {
        let db = PgPoolOptions::new().connect_lazy("postgres://localhost/storefront_unused").unwrap();
        AppState { db, nats: None }.publish(vec![]).await;
    }
}
