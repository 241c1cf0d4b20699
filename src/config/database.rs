//! Database configuration module.
//!
//! This module handles the `SQLite` connection and table creation using `SeaORM`.
//! Tables are generated with `Schema::create_table_from_entity`, so the schema always
//! matches the entity definitions without hand-written SQL. The default URL is an
//! in-memory database: the store is rebuilt from seed data on every start unless an
//! operator points `DATABASE_URL` at a file.

use crate::entities::{
    Brand, Customer, EcuFile, ServiceCost, Setting, TokenPackage, TokenTransaction,
};
use crate::errors::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema};
use tracing::{debug, info};

const DEFAULT_DATABASE_URL: &str = "sqlite::memory:";

/// Gets the database URL from environment variable or returns the in-memory default.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by `DATABASE_URL`.
///
/// An in-memory database is pinned to a single pooled connection; every extra
/// connection would otherwise open its own empty database.
pub async fn create_connection() -> Result<DatabaseConnection> {
    connect(&get_database_url()).await
}

/// Connects to an explicit URL.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Connecting to database at {database_url}");
    let mut options = ConnectOptions::new(database_url.to_string());
    if database_url.contains(":memory:") {
        options.max_connections(1).min_connections(1);
    }
    options.sqlx_logging(false);

    Database::connect(options).await.map_err(Into::into)
}

/// Creates all tables from the entity definitions.
///
/// Parents are created before children so the generated foreign keys resolve.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let tables = [
        schema.create_table_from_entity(Brand),
        schema.create_table_from_entity(Customer),
        schema.create_table_from_entity(EcuFile),
        schema.create_table_from_entity(TokenPackage),
        schema.create_table_from_entity(ServiceCost),
        schema.create_table_from_entity(TokenTransaction),
        schema.create_table_from_entity(Setting),
    ];

    for mut table in tables {
        table.if_not_exists();
        db.execute(builder.build(&table)).await?;
    }

    info!("Database tables ensured");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{CustomerModel, EcuFileModel, SettingModel, TokenTransactionModel};
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<CustomerModel> = Customer::find().limit(1).all(&db).await?;
        let _: Vec<EcuFileModel> = EcuFile::find().limit(1).all(&db).await?;
        let _: Vec<TokenTransactionModel> = TokenTransaction::find().limit(1).all(&db).await?;
        let _: Vec<SettingModel> = Setting::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_repeatable() -> Result<()> {
        let db = connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }
}
