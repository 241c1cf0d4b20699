//! Shared test utilities.
//!
//! Helpers for setting up in-memory databases and creating test entities with
//! sensible defaults.

use crate::{
    core::{customer, seed},
    entities,
    errors::Result,
};
use sea_orm::DatabaseConnection;
use tracing_subscriber::EnvFilter;

/// Routes `tracing` output to the test harness. Safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    init_test_tracing();
    let db = crate::config::database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates an in-memory database holding the demo store from `data/seed.toml`.
///
/// Customers 1 to 8 are John Doe, Sara Smith, Mike Johnson, Emma Wilson, Alex Brown,
/// Rachel Green, Chris Black and Jessica Lee. Files 1 to 15 are all active.
pub async fn setup_seeded_db() -> Result<DatabaseConnection> {
    let db = setup_test_db().await?;
    seed::seed_store(&db).await?;
    Ok(db)
}

/// Creates an active customer with a zero balance.
///
/// The email is derived from the name: `"Dana Ortiz"` becomes `dana.ortiz@test.example`.
pub async fn create_test_customer(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::customer::Model> {
    let email = format!(
        "{}@test.example",
        name.to_lowercase().split_whitespace().collect::<Vec<_>>().join(".")
    );
    customer::create_customer(
        db,
        customer::NewCustomer {
            name: name.to_string(),
            email,
            status: None,
        },
    )
    .await
}
