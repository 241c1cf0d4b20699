//! Maps domain errors onto HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use crate::errors::Error;

/// Error returned by every handler
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl From<sea_orm::DbErr> for ApiError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self(Error::Database(err))
    }
}

impl ApiError {
    /// HTTP status for the wrapped error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            Error::Validation(_) | Error::InvalidAmount { .. } => StatusCode::BAD_REQUEST,
            Error::CustomerNotFound { .. }
            | Error::FileNotFound { .. }
            | Error::PackageNotFound { .. }
            | Error::ServiceNotFound { .. } => StatusCode::NOT_FOUND,
            Error::InvalidTransition { .. }
            | Error::PurchaseInProgress
            | Error::PurchaseState { .. }
            | Error::InsufficientTokens { .. } => StatusCode::CONFLICT,
            Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Error::LoginDisabled => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self.0 {
            Error::Validation(errors) => json!({
                "message": "Please correct the highlighted fields",
                "errors": errors,
            }),
            err if status == StatusCode::INTERNAL_SERVER_ERROR => {
                error!(error = %err, "Request failed");
                json!({ "message": "Internal server error" })
            }
            err => json!({ "message": err.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

/// Handler result
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FieldError;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (Error::invalid("title", "Title is required"), StatusCode::BAD_REQUEST),
            (Error::FileNotFound { id: 3 }, StatusCode::NOT_FOUND),
            (Error::PurchaseInProgress, StatusCode::CONFLICT),
            (
                Error::InsufficientTokens {
                    balance: 1,
                    required: 2,
                },
                StatusCode::CONFLICT,
            ),
            (Error::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (Error::LoginDisabled, StatusCode::SERVICE_UNAVAILABLE),
            (
                Error::Config {
                    message: "boom".to_string(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError(err).status(), status);
        }
    }

    #[test]
    fn test_validation_body_lists_fields() {
        let response = ApiError(Error::Validation(vec![FieldError::new(
            "brandId",
            "Brand is required",
        )]))
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
