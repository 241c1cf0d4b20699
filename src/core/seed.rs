//! Demo data loaded into an empty store.
//!
//! The data lives in `data/seed.toml` and is compiled into the binary. Customer balances in
//! the file are targets: the ledger is replayed per customer, with an opening credit
//! covering any early usage and a closing correction for whatever is left, so the derived
//! balances match the listed ones.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{DatabaseTransaction, EntityTrait, PaginatorTrait, Set, TransactionTrait, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::{
    core::{
        catalog::PaymentMethod,
        ledger::{self, NewTransaction},
    },
    entities::{
        Brand, Customer, brand, customer, ecu_file,
        customer::CustomerStatus,
        ecu_file::{FileCategory, FileStatus},
        service_cost, token_package,
        token_transaction::TransactionKind,
    },
    errors::{Error, Result},
};

const SEED_TOML: &str = include_str!("../../data/seed.toml");

#[derive(Debug, Deserialize)]
struct SeedData {
    brands: Vec<SeedBrand>,
    packages: Vec<SeedPackage>,
    services: Vec<SeedService>,
    customers: Vec<SeedCustomer>,
    transactions: Vec<SeedTransaction>,
    files: Vec<SeedFile>,
}

#[derive(Debug, Deserialize)]
struct SeedBrand {
    id: String,
    name: String,
    #[serde(default)]
    featured: bool,
}

#[derive(Debug, Deserialize)]
struct SeedPackage {
    name: String,
    tokens: i64,
    price_cents: i64,
    #[serde(default)]
    discount_percentage: i32,
    #[serde(default)]
    popular: bool,
}

#[derive(Debug, Deserialize)]
struct SeedService {
    key: String,
    name: String,
    cost: i64,
}

#[derive(Debug, Deserialize)]
struct SeedCustomer {
    name: String,
    email: String,
    tokens: i64,
    status: CustomerStatus,
    date_created: NaiveDate,
    last_active: NaiveDate,
    total_spent_cents: i64,
}

#[derive(Debug, Deserialize)]
struct SeedTransaction {
    /// Customer email
    customer: String,
    kind: TransactionKind,
    amount: i64,
    date: NaiveDate,
    method: Option<PaymentMethod>,
    service: Option<String>,
    /// Package name
    package: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SeedFile {
    title: String,
    description: String,
    brand_id: String,
    model: Option<String>,
    year: Option<i32>,
    system: Option<String>,
    category: Option<FileCategory>,
    #[serde(default)]
    tags: Vec<String>,
    price_cents: i64,
    is_original: bool,
    upload_date: NaiveDate,
    #[serde(default)]
    downloads: i64,
    #[serde(default)]
    comment_count: i64,
}

/// What a seeding run wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub brands: usize,
    pub customers: usize,
    pub transactions: usize,
    pub files: usize,
}

fn parse_seed() -> Result<SeedData> {
    toml::from_str(SEED_TOML).map_err(|e| Error::Config {
        message: format!("Failed to parse seed data: {e}"),
    })
}

fn at_hour(date: NaiveDate, hour: u32) -> Result<DateTime<Utc>> {
    date.and_hms_opt(hour, 0, 0)
        .map(|naive| naive.and_utc())
        .ok_or_else(|| Error::Config {
            message: format!("Invalid seed timestamp {date} {hour}:00"),
        })
}

/// Loads the demo store unless it already holds brands or customers.
///
/// Returns `None` when the store was not empty.
#[instrument(skip(db))]
pub async fn seed_store(db: &DatabaseConnection) -> Result<Option<SeedSummary>> {
    if Brand::find().count(db).await? > 0 || Customer::find().count(db).await? > 0 {
        info!("Store already has data, skipping seed");
        return Ok(None);
    }

    let data = parse_seed()?;
    let txn = db.begin().await?;
    let summary = write_seed(&txn, data).await?;
    txn.commit().await?;

    info!(
        brands = summary.brands,
        customers = summary.customers,
        transactions = summary.transactions,
        files = summary.files,
        "Seeded demo store"
    );
    Ok(Some(summary))
}

async fn write_seed(txn: &DatabaseTransaction, data: SeedData) -> Result<SeedSummary> {
    let mut summary = SeedSummary::default();

    for b in data.brands {
        brand::ActiveModel {
            id: Set(b.id),
            name: Set(b.name),
            featured: Set(b.featured),
        }
        .insert(txn)
        .await?;
        summary.brands += 1;
    }

    let mut package_ids = HashMap::new();
    for p in data.packages {
        let package = token_package::ActiveModel {
            name: Set(p.name),
            tokens: Set(p.tokens),
            price_cents: Set(p.price_cents),
            discount_percentage: Set(p.discount_percentage),
            popular: Set(p.popular),
            ..Default::default()
        }
        .insert(txn)
        .await?;
        package_ids.insert(package.name.clone(), package.id);
    }

    for s in data.services {
        service_cost::ActiveModel {
            key: Set(s.key),
            name: Set(s.name),
            cost: Set(s.cost),
            ..Default::default()
        }
        .insert(txn)
        .await?;
    }

    let mut history: HashMap<String, Vec<SeedTransaction>> = HashMap::new();
    for t in data.transactions {
        history.entry(t.customer.to_lowercase()).or_default().push(t);
    }

    for c in data.customers {
        let model = customer::ActiveModel {
            name: Set(c.name),
            email: Set(c.email.to_lowercase()),
            status: Set(c.status),
            date_created: Set(c.date_created),
            last_active: Set(c.last_active),
            total_spent_cents: Set(c.total_spent_cents),
            ..Default::default()
        }
        .insert(txn)
        .await?;
        summary.customers += 1;

        let mut rows = history.remove(&model.email).unwrap_or_default();
        rows.sort_by_key(|t| t.date);
        summary.transactions += replay_ledger(txn, &model, c.tokens, rows, &package_ids).await?;
    }

    if let Some(orphan) = history.keys().next() {
        return Err(Error::Config {
            message: format!("Seed transaction references unknown customer {orphan}"),
        });
    }

    for f in data.files {
        ecu_file::ActiveModel {
            title: Set(f.title),
            description: Set(f.description),
            brand_id: Set(f.brand_id),
            vehicle_model: Set(f.model),
            year: Set(f.year),
            system: Set(f.system),
            category: Set(f.category),
            tags: Set(f.tags.join(",")),
            price_cents: Set(f.price_cents),
            is_original: Set(f.is_original),
            status: Set(FileStatus::Active),
            upload_date: Set(f.upload_date),
            last_modified: Set(None),
            downloads: Set(f.downloads),
            comment_count: Set(f.comment_count),
            uploaded_by: Set(None),
            approved_by: Set(None),
            notes: Set(None),
            ..Default::default()
        }
        .insert(txn)
        .await?;
        summary.files += 1;
    }

    Ok(summary)
}

/// Writes one customer's ledger so that it ends at `target`.
async fn replay_ledger(
    txn: &DatabaseTransaction,
    customer: &customer::Model,
    target: i64,
    rows: Vec<SeedTransaction>,
    package_ids: &HashMap<String, i64>,
) -> Result<usize> {
    let mut running = 0_i64;
    let mut lowest = 0_i64;
    for row in &rows {
        running += row.amount;
        lowest = lowest.min(running);
    }
    let opening = -lowest;
    let correction = target - opening - running;
    let mut written = 0;

    if opening > 0 {
        let new = NewTransaction::adjustment(customer.id, opening)
            .note("Opening balance")
            .at(at_hour(customer.date_created, 9)?);
        ledger::insert_checked(txn, new).await?;
        written += 1;
    }

    for row in rows {
        let mut new = NewTransaction {
            customer_id: customer.id,
            kind: row.kind,
            amount: row.amount,
            method: row.method.map(|m| m.as_str().to_string()),
            service: row.service,
            package_id: None,
            note: None,
            created_at: Some(at_hour(row.date, 12)?),
        };
        if let Some(name) = row.package {
            let id = package_ids.get(&name).ok_or_else(|| Error::Config {
                message: format!("Seed transaction references unknown package {name}"),
            })?;
            new.package_id = Some(*id);
        }
        ledger::insert_checked(txn, new).await?;
        written += 1;
    }

    if correction != 0 {
        let new = NewTransaction::adjustment(customer.id, correction)
            .note("Balance correction")
            .at(at_hour(customer.last_active, 23)?);
        ledger::insert_checked(txn, new).await?;
        written += 1;
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{core::customer, test_utils::*};

    #[test]
    fn test_seed_file_parses() {
        let data = parse_seed().unwrap();
        assert_eq!(data.customers.len(), 8);
        assert_eq!(data.transactions.len(), 8);
        assert_eq!(data.files.len(), 15);
        assert_eq!(data.packages.len(), 4);
        assert_eq!(data.services.len(), 5);
    }

    #[tokio::test]
    async fn test_seed_runs_once() -> Result<()> {
        let db = setup_test_db().await?;

        let summary = seed_store(&db).await?.unwrap();
        assert_eq!(summary.customers, 8);
        assert_eq!(summary.files, 15);
        assert_eq!(summary.brands, 12);

        assert!(seed_store(&db).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_seeded_balances_match_listed_tokens() -> Result<()> {
        let db = setup_seeded_db().await?;

        let expected = [25, 42, 18, 36, 54, 8, 60, 12];
        for (id, tokens) in (1_i64..).zip(expected) {
            assert_eq!(ledger::balance(&db, id).await?, tokens, "customer {id}");
        }

        let john = customer::get_customer_by_email(&db, "john@example.com")
            .await?
            .unwrap();
        assert_eq!(john.id, 1);
        Ok(())
    }
}
