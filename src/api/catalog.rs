//! Brand, package and service listings.

use axum::{Json, extract::State};
use serde::Serialize;

use super::{ApiResult, SharedState};
use crate::{
    core::catalog::{self, PaymentMethod},
    entities::{BrandModel, ServiceCostModel, TokenPackageModel},
};

/// `GET /api/brands`
pub async fn list_brands_handler(
    State(state): State<SharedState>,
) -> ApiResult<Json<Vec<BrandModel>>> {
    Ok(Json(catalog::list_brands(&state.db).await?))
}

/// `GET /api/tokens/packages`
pub async fn list_packages_handler(
    State(state): State<SharedState>,
) -> ApiResult<Json<Vec<TokenPackageModel>>> {
    Ok(Json(catalog::list_packages(&state.db).await?))
}

/// `GET /api/tokens/services`
pub async fn list_services_handler(
    State(state): State<SharedState>,
) -> ApiResult<Json<Vec<ServiceCostModel>>> {
    Ok(Json(catalog::list_services(&state.db).await?))
}

#[derive(Debug, Serialize)]
pub struct PaymentMethodView {
    pub id: PaymentMethod,
    pub label: &'static str,
}

/// `GET /api/tokens/payment-methods`
pub async fn list_payment_methods_handler() -> Json<Vec<PaymentMethodView>> {
    Json(
        PaymentMethod::ALL
            .into_iter()
            .map(|id| PaymentMethodView {
                id,
                label: id.label(),
            })
            .collect(),
    )
}
