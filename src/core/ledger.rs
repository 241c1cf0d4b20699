//! Token ledger - every token movement is a row, every balance is a sum.
//!
//! Rows are append-only. The sign of `amount` must match the row kind, and a debit is
//! only written when the customer's balance covers it. Both checks run inside the same
//! database transaction as the insert.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{
    ConnectionTrait, QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*,
};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::{
    core::{
        catalog,
        collection::{CollectionView, Page, Pagination, Record, SortKey, SortSpec},
        customer,
    },
    entities::{
        Customer, TokenTransaction,
        token_transaction::{self, TransactionKind},
    },
    errors::{Error, Result},
};

/// A ledger row about to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    /// Owner of the tokens
    pub customer_id: i64,
    /// Row kind; constrains the sign of `amount`
    pub kind: TransactionKind,
    /// Signed token amount
    pub amount: i64,
    /// Payment method (purchases)
    pub method: Option<String>,
    /// Service name (usage)
    pub service: Option<String>,
    /// Package bought (purchases)
    pub package_id: Option<i64>,
    /// Free text
    pub note: Option<String>,
    /// Timestamp override; defaults to now
    pub created_at: Option<DateTime<Utc>>,
}

impl NewTransaction {
    fn new(customer_id: i64, kind: TransactionKind, amount: i64) -> Self {
        Self {
            customer_id,
            kind,
            amount,
            method: None,
            service: None,
            package_id: None,
            note: None,
            created_at: None,
        }
    }

    /// Tokens credited by a package purchase.
    #[must_use]
    pub fn purchase(customer_id: i64, tokens: i64) -> Self {
        Self::new(customer_id, TransactionKind::Purchase, tokens)
    }

    /// Tokens spent on a service. `tokens` is the positive cost; the row stores it negated.
    #[must_use]
    pub fn usage(customer_id: i64, tokens: i64) -> Self {
        Self::new(customer_id, TransactionKind::Usage, -tokens)
    }

    /// Manual correction, either sign.
    #[must_use]
    pub fn adjustment(customer_id: i64, amount: i64) -> Self {
        Self::new(customer_id, TransactionKind::Adjustment, amount)
    }

    #[must_use]
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    #[must_use]
    pub fn service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    #[must_use]
    pub const fn package(mut self, package_id: i64) -> Self {
        self.package_id = Some(package_id);
        self
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    #[must_use]
    pub const fn at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

/// Current token balance of a customer: the sum of their ledger rows.
pub async fn balance<C: ConnectionTrait>(db: &C, customer_id: i64) -> Result<i64> {
    let sum = TokenTransaction::find()
        .select_only()
        .column_as(token_transaction::Column::Amount.sum(), "balance")
        .filter(token_transaction::Column::CustomerId.eq(customer_id))
        .into_tuple::<Option<i64>>()
        .one(db)
        .await?;
    Ok(sum.flatten().unwrap_or(0))
}

/// Balances of every customer with at least one ledger row.
pub async fn balances<C: ConnectionTrait>(db: &C) -> Result<HashMap<i64, i64>> {
    let rows = TokenTransaction::find()
        .select_only()
        .column(token_transaction::Column::CustomerId)
        .column_as(token_transaction::Column::Amount.sum(), "balance")
        .group_by(token_transaction::Column::CustomerId)
        .into_tuple::<(i64, Option<i64>)>()
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .map(|(customer_id, sum)| (customer_id, sum.unwrap_or(0)))
        .collect())
}

/// Validates and inserts a row on an open connection or transaction.
///
/// Callers that need atomicity with other writes pass a `DatabaseTransaction`.
pub(crate) async fn insert_checked<C: ConnectionTrait>(
    db: &C,
    new: NewTransaction,
) -> Result<token_transaction::Model> {
    if !new.kind.accepts(new.amount) {
        return Err(Error::InvalidAmount {
            amount: new.amount,
            kind: new.kind.as_str(),
        });
    }

    if Customer::find_by_id(new.customer_id).one(db).await?.is_none() {
        return Err(Error::CustomerNotFound {
            id: new.customer_id,
        });
    }

    if new.amount < 0 {
        let current = balance(db, new.customer_id).await?;
        if current + new.amount < 0 {
            return Err(Error::InsufficientTokens {
                balance: current,
                required: -new.amount,
            });
        }
    }

    let row = token_transaction::ActiveModel {
        customer_id: Set(new.customer_id),
        kind: Set(new.kind),
        amount: Set(new.amount),
        created_at: Set(new.created_at.unwrap_or_else(Utc::now)),
        method: Set(new.method),
        service: Set(new.service),
        package_id: Set(new.package_id),
        note: Set(new.note),
        ..Default::default()
    };
    Ok(row.insert(db).await?)
}

/// Records a ledger row atomically.
///
/// # Errors
/// - `InvalidAmount` when the sign does not match the kind
/// - `CustomerNotFound` when the customer does not exist
/// - `InsufficientTokens` when a debit would take the balance below zero
#[instrument(skip(db), fields(customer_id = new.customer_id, kind = %new.kind))]
pub async fn record_transaction(
    db: &DatabaseConnection,
    new: NewTransaction,
) -> Result<token_transaction::Model> {
    let txn = db.begin().await?;
    let row = insert_checked(&txn, new).await?;
    txn.commit().await?;
    debug!(transaction_id = row.id, amount = row.amount, "Recorded ledger row");
    Ok(row)
}

/// Debits the cost of a service from a customer's balance.
///
/// Looks up the service by key, writes a `usage` row named after the service and touches
/// the customer's last-active day, all in one transaction.
#[instrument(skip(db))]
pub async fn spend_tokens(
    db: &DatabaseConnection,
    customer_id: i64,
    service_key: &str,
) -> Result<token_transaction::Model> {
    let service = catalog::require_service(db, service_key).await?;

    let txn = db.begin().await?;
    let row = insert_checked(
        &txn,
        NewTransaction::usage(customer_id, service.cost).service(service.name.clone()),
    )
    .await?;
    customer::touch_last_active(&txn, customer_id).await?;
    txn.commit().await?;

    info!(
        customer_id,
        service = %service.key,
        cost = service.cost,
        "Customer spent tokens"
    );
    Ok(row)
}

/// A ledger row joined with its customer's name for display and search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRow {
    #[serde(flatten)]
    pub transaction: token_transaction::Model,
    pub customer_name: String,
}

/// Sortable columns of the transactions table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionField {
    Date,
    Amount,
    Customer,
    Kind,
}

impl TransactionField {
    /// Parses a column name from a request.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "date" => Some(Self::Date),
            "amount" => Some(Self::Amount),
            "customer" => Some(Self::Customer),
            "kind" | "type" => Some(Self::Kind),
            _ => None,
        }
    }
}

impl Record for TransactionRow {
    type Field = TransactionField;

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.customer_name.as_str(), self.transaction.kind.as_str()];
        fields.extend(self.transaction.method.as_deref());
        fields.extend(self.transaction.service.as_deref());
        fields.extend(self.transaction.note.as_deref());
        fields
    }

    fn sort_key(&self, field: TransactionField) -> SortKey<'_> {
        match field {
            TransactionField::Date => SortKey::Integer(self.transaction.created_at.timestamp_millis()),
            TransactionField::Amount => SortKey::Integer(self.transaction.amount),
            TransactionField::Customer => SortKey::Text(&self.customer_name),
            TransactionField::Kind => SortKey::Text(self.transaction.kind.as_str()),
        }
    }
}

/// Listing request for the transactions table.
#[derive(Debug, Clone, Default)]
pub struct TransactionQuery {
    pub customer_id: Option<i64>,
    pub kind: Option<TransactionKind>,
    pub search: String,
    /// Defaults to newest first
    pub sort: Option<SortSpec<TransactionField>>,
    pub pagination: Option<Pagination>,
}

/// Lists ledger rows through the collection view.
pub async fn list_transactions(
    db: &DatabaseConnection,
    query: &TransactionQuery,
) -> Result<Page<TransactionRow>> {
    let mut select = TokenTransaction::find().order_by_asc(token_transaction::Column::Id);
    if let Some(customer_id) = query.customer_id {
        select = select.filter(token_transaction::Column::CustomerId.eq(customer_id));
    }
    let transactions = select.all(db).await?;

    let names: HashMap<i64, String> = Customer::find()
        .all(db)
        .await?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();

    let rows = transactions.into_iter().map(|transaction| TransactionRow {
        customer_name: names
            .get(&transaction.customer_id)
            .cloned()
            .unwrap_or_default(),
        transaction,
    });

    let sort = query
        .sort
        .unwrap_or(SortSpec::descending(TransactionField::Date));

    Ok(CollectionView::new()
        .search(query.search.clone())
        .filter_by(query.kind, |row: &TransactionRow, kind| {
            row.transaction.kind == *kind
        })
        .sort(Some(sort))
        .paginate(query.pagination)
        .apply(rows))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_sign_must_match_kind() -> Result<()> {
        let db = setup_test_db().await?;

        let result = insert_checked(&db, NewTransaction::purchase(1, -5)).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidAmount {
                amount: -5,
                kind: "purchase"
            }
        ));

        let result = insert_checked(&db, NewTransaction::usage(1, -3)).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidAmount { amount: 3, .. }
        ));

        let result = insert_checked(&db, NewTransaction::adjustment(1, 0)).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_balance_is_sum_of_rows() -> Result<()> {
        let db = setup_test_db().await?;
        let customer = create_test_customer(&db, "Dana Ortiz").await?;

        assert_eq!(balance(&db, customer.id).await?, 0);

        record_transaction(&db, NewTransaction::purchase(customer.id, 50)).await?;
        record_transaction(&db, NewTransaction::usage(customer.id, 4)).await?;
        record_transaction(&db, NewTransaction::adjustment(customer.id, -6)).await?;

        assert_eq!(balance(&db, customer.id).await?, 40);
        assert_eq!(balances(&db).await?.get(&customer.id), Some(&40));
        Ok(())
    }

    #[tokio::test]
    async fn test_usage_cannot_overdraw() -> Result<()> {
        let db = setup_test_db().await?;
        let customer = create_test_customer(&db, "Dana Ortiz").await?;
        record_transaction(&db, NewTransaction::purchase(customer.id, 3)).await?;

        let result = record_transaction(&db, NewTransaction::usage(customer.id, 5)).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InsufficientTokens {
                balance: 3,
                required: 5
            }
        ));

        // Spending the exact balance is fine
        record_transaction(&db, NewTransaction::usage(customer.id, 3)).await?;
        assert_eq!(balance(&db, customer.id).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_customer() -> Result<()> {
        let db = setup_test_db().await?;
        let result = record_transaction(&db, NewTransaction::purchase(999, 10)).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::CustomerNotFound { id: 999 }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_spend_tokens_uses_service_cost() -> Result<()> {
        let db = setup_seeded_db().await?;
        let before = balance(&db, 2).await?;

        let row = spend_tokens(&db, 2, "airbag_reset").await?;
        assert_eq!(row.amount, -3);
        assert_eq!(row.kind, TransactionKind::Usage);
        assert_eq!(row.service.as_deref(), Some("Airbag Reset"));
        assert_eq!(balance(&db, 2).await?, before - 3);

        let result = spend_tokens(&db, 2, "teleport").await;
        assert!(matches!(result.unwrap_err(), Error::ServiceNotFound { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_transactions_newest_first_with_filters() -> Result<()> {
        let db = setup_seeded_db().await?;

        let usage = list_transactions(
            &db,
            &TransactionQuery {
                kind: Some(TransactionKind::Usage),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(usage.total, 4);
        assert!(usage.items.iter().all(|r| r.transaction.amount < 0));
        assert!(
            usage
                .items
                .windows(2)
                .all(|w| w[0].transaction.created_at >= w[1].transaction.created_at)
        );

        let paypal = list_transactions(
            &db,
            &TransactionQuery {
                search: "paypal".to_string(),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(paypal.total, 1);
        assert_eq!(paypal.items[0].customer_name, "Sara Smith");
        Ok(())
    }
}
