//! Customer balance, ledger, checkout and service usage endpoints.

use axum::{
    Json,
    extract::State,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use super::{
    ApiResult, SharedState,
    extract::{JsonBody, PathParams, QueryParams},
};
use crate::{
    core::{
        catalog::PaymentMethod,
        collection::Page,
        customer,
        ledger::{self, TransactionQuery, TransactionRow},
        purchase::PurchaseState,
    },
    errors::Error,
};

/// `page` / `perPage` query parameters
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// `GET /api/customers/{id}/balance`
pub async fn balance_handler(
    State(state): State<SharedState>,
    PathParams(id): PathParams<i64>,
) -> ApiResult<impl IntoResponse> {
    let summary = customer::get_customer_summary(&state.db, id).await?;
    Ok(Json(json!({
        "customerId": summary.customer.id,
        "balance": summary.tokens,
    })))
}

/// `GET /api/customers/{id}/transactions`, newest first.
pub async fn transactions_handler(
    State(state): State<SharedState>,
    PathParams(id): PathParams<i64>,
    QueryParams(params): QueryParams<PageParams>,
) -> ApiResult<Json<Page<TransactionRow>>> {
    customer::require_customer(&state.db, id).await?;
    let query = TransactionQuery {
        customer_id: Some(id),
        pagination: Some(state.pagination(params.page, params.per_page)),
        ..TransactionQuery::default()
    };
    Ok(Json(ledger::list_transactions(&state.db, &query).await?))
}

/// `GET /api/customers/{id}/purchase`
pub async fn purchase_state_handler(
    State(state): State<SharedState>,
    PathParams(id): PathParams<i64>,
) -> ApiResult<Json<PurchaseState>> {
    customer::require_customer(&state.db, id).await?;
    Ok(Json(state.purchases.state(id).await))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectPackageRequest {
    pub package_id: i64,
}

/// `POST /api/customers/{id}/purchase/package`
pub async fn select_package_handler(
    State(state): State<SharedState>,
    PathParams(id): PathParams<i64>,
    JsonBody(payload): JsonBody<SelectPackageRequest>,
) -> ApiResult<Json<PurchaseState>> {
    let next = state
        .purchases
        .select_package(&state.db, id, payload.package_id)
        .await?;
    Ok(Json(next))
}

#[derive(Debug, Deserialize)]
pub struct SelectMethodRequest {
    pub method: String,
}

/// `POST /api/customers/{id}/purchase/payment-method`
pub async fn select_payment_method_handler(
    State(state): State<SharedState>,
    PathParams(id): PathParams<i64>,
    JsonBody(payload): JsonBody<SelectMethodRequest>,
) -> ApiResult<Json<PurchaseState>> {
    let method = PaymentMethod::parse(&payload.method).ok_or_else(|| {
        Error::invalid("method", "Choose credit_card, paypal or bank_transfer")
    })?;
    customer::require_customer(&state.db, id).await?;
    Ok(Json(state.purchases.select_payment_method(id, method).await?))
}

/// `POST /api/customers/{id}/purchase/confirm`. Responds once the payment has settled.
pub async fn confirm_purchase_handler(
    State(state): State<SharedState>,
    PathParams(id): PathParams<i64>,
) -> ApiResult<Json<PurchaseState>> {
    Ok(Json(state.purchases.confirm(&state.db, id).await?))
}

/// `POST /api/customers/{id}/purchase/reset`
pub async fn reset_purchase_handler(
    State(state): State<SharedState>,
    PathParams(id): PathParams<i64>,
) -> ApiResult<Json<PurchaseState>> {
    Ok(Json(state.purchases.reset(id).await?))
}

/// `POST /api/customers/{id}/services/{key}`: spends tokens on a service.
pub async fn use_service_handler(
    State(state): State<SharedState>,
    PathParams((id, key)): PathParams<(i64, String)>,
) -> ApiResult<impl IntoResponse> {
    let transaction = ledger::spend_tokens(&state.db, id, &key).await?;
    let balance = ledger::balance(&state.db, id).await?;
    Ok(Json(json!({
        "transaction": transaction,
        "balance": balance,
    })))
}
