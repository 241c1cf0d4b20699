//! Core business logic - framework-agnostic operations shared by the HTTP API and the bot.
//!
//! Every function takes a database connection and returns `Result`, so the same logic
//! backs `/api/*` routes, Discord commands and tests.

pub mod auth;
pub mod catalog;
pub mod collection;
pub mod customer;
pub mod ecu_file;
pub mod features;
pub mod ledger;
pub mod purchase;
pub mod report;
pub mod seed;
pub mod settings;

use chrono::{NaiveDate, Utc};

/// Today's date in UTC, used to stamp creation and modification days.
#[must_use]
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Trims an optional text input, turning blanks into `None`.
#[must_use]
pub fn clean_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
