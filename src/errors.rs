//! Unified error type for the storefront, the HTTP API and the Discord back office.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::entities::ecu_file::FileStatus;

/// A single inline form error, reported per field instead of a blocking alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Name of the offending input field (wire name, e.g. `brandId`)
    pub field: &'static str,
    /// Human-readable explanation
    pub message: String,
}

impl FieldError {
    /// Creates a field error.
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// All failures the crate can surface.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Validation failed: {}", join_field_errors(.0))]
    Validation(Vec<FieldError>),

    #[error("Customer {id} not found")]
    CustomerNotFound { id: i64 },

    #[error("ECU file {id} not found")]
    FileNotFound { id: i64 },

    #[error("Token package {id} not found")]
    PackageNotFound { id: i64 },

    #[error("Service '{key}' not found")]
    ServiceNotFound { key: String },

    #[error("Invalid token amount {amount} for a {kind} transaction")]
    InvalidAmount { amount: i64, kind: &'static str },

    #[error("Insufficient tokens: balance is {balance}, {required} required")]
    InsufficientTokens { balance: i64, required: i64 },

    #[error("Cannot move file from {from} to {to}")]
    InvalidTransition { from: FileStatus, to: FileStatus },

    #[error("A purchase is already being processed")]
    PurchaseInProgress,

    #[error("Cannot {action} while the purchase is {state}")]
    PurchaseState {
        action: &'static str,
        state: &'static str,
    },

    #[error("Invalid admin credentials")]
    InvalidCredentials,

    #[error("Admin login is not configured")]
    LoginDisabled,

    #[error("Password hashing error: {message}")]
    PasswordHash { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Integer conversion error: {0}")]
    IntConversion(#[from] std::num::TryFromIntError),

    #[error("Serenity/Poise framework error: {0}")]
    #[allow(clippy::enum_variant_names)]
    FrameworkError(Box<poise::serenity_prelude::Error>),
}

impl Error {
    /// Shorthand for a validation failure on a single field.
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::FrameworkError(Box::new(value))
    }
}

impl From<argon2::password_hash::Error> for Error {
    fn from(value: argon2::password_hash::Error) -> Self {
        Self::PasswordHash {
            message: value.to_string(),
        }
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
