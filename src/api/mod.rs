//! HTTP storefront API.
//!
//! Handlers are thin: they parse the request, call into [`crate::core`] and map the
//! result. Errors become JSON bodies through [`error::ApiError`].

pub mod auth;
pub mod catalog;
pub mod customers;
pub mod ecu;
pub mod error;
pub mod extract;
pub mod features;

use std::sync::Arc;

use axum::{
    Json, Router,
    response::IntoResponse,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::{AdminConfig, AppConfig},
    core::{collection::Pagination, purchase::PurchaseDesk},
};

pub use error::{ApiError, ApiResult};

/// Shared application state
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    pub admin: AdminConfig,
    pub purchases: PurchaseDesk,
}

impl AppState {
    /// Builds the state; the purchase desk takes its settle delay from the store config.
    #[must_use]
    pub fn new(db: DatabaseConnection, config: AppConfig, admin: AdminConfig) -> Self {
        let purchases = PurchaseDesk::new(config.store.purchase_settle_delay());
        Self {
            db,
            config,
            admin,
            purchases,
        }
    }

    /// Pagination from `page` / `perPage` query parameters, bounded by the store config.
    #[must_use]
    pub fn pagination(&self, page: Option<u64>, per_page: Option<u64>) -> Pagination {
        Pagination::from_request(
            page,
            per_page,
            self.config.store.default_page_size,
            self.config.store.max_page_size,
        )
    }
}

/// Shared state handle used by handlers
pub type SharedState = Arc<AppState>;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    let shared_state = Arc::new(state);

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/auth/login", post(auth::login_handler))
        .route("/api/auth/logout", post(auth::logout_handler))
        .route(
            "/api/ecu",
            get(ecu::list_files_handler).post(ecu::create_file_handler),
        )
        .route("/api/ecu/{id}", get(ecu::get_file_handler))
        .route("/api/ecu/{id}/download", post(ecu::download_handler))
        .route("/api/brands", get(catalog::list_brands_handler))
        .route("/api/features", get(features::list_features_handler))
        .route("/api/tokens/packages", get(catalog::list_packages_handler))
        .route("/api/tokens/services", get(catalog::list_services_handler))
        .route(
            "/api/tokens/payment-methods",
            get(catalog::list_payment_methods_handler),
        )
        .route(
            "/api/customers/{id}/balance",
            get(customers::balance_handler),
        )
        .route(
            "/api/customers/{id}/transactions",
            get(customers::transactions_handler),
        )
        .route(
            "/api/customers/{id}/purchase",
            get(customers::purchase_state_handler),
        )
        .route(
            "/api/customers/{id}/purchase/package",
            post(customers::select_package_handler),
        )
        .route(
            "/api/customers/{id}/purchase/payment-method",
            post(customers::select_payment_method_handler),
        )
        .route(
            "/api/customers/{id}/purchase/confirm",
            post(customers::confirm_purchase_handler),
        )
        .route(
            "/api/customers/{id}/purchase/reset",
            post(customers::reset_purchase_handler),
        )
        .route(
            "/api/customers/{id}/services/{key}",
            post(customers::use_service_handler),
        )
        .with_state(shared_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Health check
pub async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "autotechno"
    }))
}
