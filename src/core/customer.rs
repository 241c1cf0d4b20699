//! Customer business logic for the back office customers screen.
//!
//! Customers carry no token column. Every summary pairs the stored row with the balance
//! computed from the ledger at read time.

use sea_orm::{ConnectionTrait, QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::{
    core::{
        collection::{CollectionView, Page, Pagination, Record, SortKey, SortSpec},
        ledger::{self, NewTransaction},
        today,
    },
    entities::{
        Customer, TokenTransaction,
        customer::{self, CustomerStatus},
        token_transaction,
    },
    errors::{Error, FieldError, Result},
};

/// A customer together with their derived token balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSummary {
    #[serde(flatten)]
    pub customer: customer::Model,
    /// Sum of the customer's ledger rows
    pub tokens: i64,
}

/// Sortable columns of the customers table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerField {
    Name,
    Email,
    Tokens,
    Status,
    DateCreated,
    LastActive,
    TotalSpent,
}

impl CustomerField {
    /// Parses a column name from a request (`"name"`, `"dateCreated"`, `"total_spent"`, ...).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let key: String = value
            .trim()
            .chars()
            .filter(|c| *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "name" => Some(Self::Name),
            "email" => Some(Self::Email),
            "tokens" => Some(Self::Tokens),
            "status" => Some(Self::Status),
            "datecreated" | "created" => Some(Self::DateCreated),
            "lastactive" => Some(Self::LastActive),
            "totalspent" | "spent" => Some(Self::TotalSpent),
            _ => None,
        }
    }
}

impl Record for CustomerSummary {
    type Field = CustomerField;

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.customer.name, &self.customer.email]
    }

    fn sort_key(&self, field: CustomerField) -> SortKey<'_> {
        match field {
            CustomerField::Name => SortKey::Text(&self.customer.name),
            CustomerField::Email => SortKey::Text(&self.customer.email),
            CustomerField::Tokens => SortKey::Integer(self.tokens),
            CustomerField::Status => SortKey::Text(self.customer.status.label()),
            CustomerField::DateCreated => SortKey::Date(self.customer.date_created),
            CustomerField::LastActive => SortKey::Date(self.customer.last_active),
            CustomerField::TotalSpent => SortKey::Integer(self.customer.total_spent_cents),
        }
    }
}

/// Listing request for the customers table.
#[derive(Debug, Clone, Default)]
pub struct CustomerQuery {
    /// Free text over name and email
    pub search: String,
    pub status: Option<CustomerStatus>,
    /// Insertion order when absent
    pub sort: Option<SortSpec<CustomerField>>,
    pub pagination: Option<Pagination>,
}

/// Input of the "add customer" form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub status: Option<CustomerStatus>,
}

fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

/// Lists customers with their balances through the collection view.
pub async fn list_customers(
    db: &DatabaseConnection,
    query: &CustomerQuery,
) -> Result<Page<CustomerSummary>> {
    let customers = Customer::find()
        .order_by_asc(customer::Column::Id)
        .all(db)
        .await?;
    let balances = ledger::balances(db).await?;

    let summaries = customers.into_iter().map(|customer| CustomerSummary {
        tokens: balances.get(&customer.id).copied().unwrap_or(0),
        customer,
    });

    Ok(CollectionView::new()
        .search(query.search.clone())
        .filter_by(query.status, |summary: &CustomerSummary, status| {
            summary.customer.status == *status
        })
        .sort(query.sort)
        .paginate(query.pagination)
        .apply(summaries))
}

/// Retrieves a customer by id.
pub async fn get_customer(
    db: &DatabaseConnection,
    customer_id: i64,
) -> Result<Option<customer::Model>> {
    Customer::find_by_id(customer_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a customer by id, failing with `CustomerNotFound`.
pub async fn require_customer<C: ConnectionTrait>(
    db: &C,
    customer_id: i64,
) -> Result<customer::Model> {
    Customer::find_by_id(customer_id)
        .one(db)
        .await?
        .ok_or(Error::CustomerNotFound { id: customer_id })
}

/// Customer plus current balance.
pub async fn get_customer_summary(
    db: &DatabaseConnection,
    customer_id: i64,
) -> Result<CustomerSummary> {
    let customer = require_customer(db, customer_id).await?;
    let tokens = ledger::balance(db, customer_id).await?;
    Ok(CustomerSummary { customer, tokens })
}

/// Finds a customer by email, case-insensitively.
pub async fn get_customer_by_email(
    db: &DatabaseConnection,
    email: &str,
) -> Result<Option<customer::Model>> {
    Customer::find()
        .filter(customer::Column::Email.eq(email.trim().to_lowercase()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a customer after validating the form.
///
/// Emails are stored lowercased. Every problem is reported at once as field errors.
#[instrument(skip(db, new), fields(email = %new.email))]
pub async fn create_customer(
    db: &DatabaseConnection,
    new: NewCustomer,
) -> Result<customer::Model> {
    let name = new.name.trim().to_string();
    let email = new.email.trim().to_lowercase();

    let mut errors = Vec::new();
    if name.is_empty() {
        errors.push(FieldError::new("name", "Name is required"));
    }
    if email.is_empty() {
        errors.push(FieldError::new("email", "Email is required"));
    } else if !looks_like_email(&email) {
        errors.push(FieldError::new("email", "Email address is not valid"));
    } else if get_customer_by_email(db, &email).await?.is_some() {
        errors.push(FieldError::new(
            "email",
            "A customer with this email already exists",
        ));
    }
    if !errors.is_empty() {
        return Err(Error::Validation(errors));
    }

    let day = today();
    let model = customer::ActiveModel {
        name: Set(name),
        email: Set(email),
        status: Set(new.status.unwrap_or(CustomerStatus::Active)),
        date_created: Set(day),
        last_active: Set(day),
        total_spent_cents: Set(0),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(customer_id = model.id, "Created customer");
    Ok(model)
}

/// Activates or deactivates a customer.
pub async fn update_customer_status(
    db: &DatabaseConnection,
    customer_id: i64,
    status: CustomerStatus,
) -> Result<customer::Model> {
    let mut active: customer::ActiveModel = require_customer(db, customer_id).await?.into();
    active.status = Set(status);
    let updated = active.update(db).await?;
    info!(customer_id, status = status.label(), "Updated customer status");
    Ok(updated)
}

/// Deletes a customer and their ledger rows.
#[instrument(skip(db))]
pub async fn delete_customer(db: &DatabaseConnection, customer_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    require_customer(&txn, customer_id).await?;

    let removed = TokenTransaction::delete_many()
        .filter(token_transaction::Column::CustomerId.eq(customer_id))
        .exec(&txn)
        .await?;
    Customer::delete_by_id(customer_id).exec(&txn).await?;

    txn.commit().await?;

    warn!(
        customer_id,
        ledger_rows = removed.rows_affected,
        "Deleted customer"
    );
    Ok(())
}

/// Admin "add tokens" action: writes an adjustment and returns the new balance.
///
/// Negative amounts take tokens away, but never below zero.
#[instrument(skip(db, note))]
pub async fn grant_tokens(
    db: &DatabaseConnection,
    customer_id: i64,
    amount: i64,
    note: Option<String>,
) -> Result<i64> {
    let txn = db.begin().await?;
    let mut new = NewTransaction::adjustment(customer_id, amount);
    new.note = note;
    ledger::insert_checked(&txn, new).await?;
    touch_last_active(&txn, customer_id).await?;
    let balance = ledger::balance(&txn, customer_id).await?;
    txn.commit().await?;

    info!(customer_id, amount, balance, "Granted tokens");
    Ok(balance)
}

/// Stamps today as the customer's last active day.
pub async fn touch_last_active<C: ConnectionTrait>(db: &C, customer_id: i64) -> Result<()> {
    let mut active: customer::ActiveModel = require_customer(db, customer_id).await?.into();
    active.last_active = Set(today());
    active.update(db).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use crate::{core::collection::SortDirection, test_utils::*};

    fn names(page: &Page<CustomerSummary>) -> Vec<&str> {
        page.items
            .iter()
            .map(|s| s.customer.name.as_str())
            .collect()
    }

    #[tokio::test]
    async fn test_search_sara_finds_one_customer() -> Result<()> {
        let db = setup_seeded_db().await?;

        let page = list_customers(
            &db,
            &CustomerQuery {
                search: "SARA".to_string(),
                ..Default::default()
            },
        )
        .await?;

        assert_eq!(names(&page), vec!["Sara Smith"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_inactive_filter() -> Result<()> {
        let db = setup_seeded_db().await?;

        let page = list_customers(
            &db,
            &CustomerQuery {
                status: Some(CustomerStatus::Inactive),
                ..Default::default()
            },
        )
        .await?;

        assert_eq!(names(&page), vec!["Alex Brown", "Jessica Lee"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_seeded_balances_come_from_ledger() -> Result<()> {
        let db = setup_seeded_db().await?;

        let page = list_customers(
            &db,
            &CustomerQuery {
                sort: Some(SortSpec {
                    field: CustomerField::Tokens,
                    direction: SortDirection::Descending,
                }),
                ..Default::default()
            },
        )
        .await?;

        let tokens: Vec<i64> = page.items.iter().map(|s| s.tokens).collect();
        assert_eq!(tokens, vec![60, 54, 42, 36, 25, 18, 12, 8]);
        assert_eq!(page.items[0].customer.name, "Chris Black");
        Ok(())
    }

    #[tokio::test]
    async fn test_no_match_is_empty_page() -> Result<()> {
        let db = setup_seeded_db().await?;

        let page = list_customers(
            &db,
            &CustomerQuery {
                search: "zzz-nobody".to_string(),
                pagination: Some(Pagination {
                    page: 1,
                    per_page: 5,
                }),
                ..Default::default()
            },
        )
        .await?;

        assert!(page.is_empty());
        assert_eq!(page.total, 0);
        assert_eq!(page.total_pages, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_customer_validation() -> Result<()> {
        let db = setup_seeded_db().await?;

        let result = create_customer(
            &db,
            NewCustomer {
                name: "   ".to_string(),
                email: "not-an-email".to_string(),
                status: None,
            },
        )
        .await;
        let Err(Error::Validation(errors)) = result else {
            panic!("expected validation errors");
        };
        let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["name", "email"]);

        let result = create_customer(
            &db,
            NewCustomer {
                name: "John Again".to_string(),
                email: "John@Example.com".to_string(),
                status: None,
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Validation(_)));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_and_grant() -> Result<()> {
        let db = setup_test_db().await?;
        let customer = create_customer(
            &db,
            NewCustomer {
                name: " Nia Patel ".to_string(),
                email: "Nia@Example.com".to_string(),
                status: None,
            },
        )
        .await?;

        assert_eq!(customer.name, "Nia Patel");
        assert_eq!(customer.email, "nia@example.com");
        assert_eq!(customer.status, CustomerStatus::Active);

        assert_eq!(grant_tokens(&db, customer.id, 12, None).await?, 12);
        assert_eq!(grant_tokens(&db, customer.id, -2, None).await?, 10);
        assert!(matches!(
            grant_tokens(&db, customer.id, -11, None).await.unwrap_err(),
            Error::InsufficientTokens { .. }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_status_and_delete() -> Result<()> {
        let db = setup_seeded_db().await?;

        let updated = update_customer_status(&db, 1, CustomerStatus::Inactive).await?;
        assert_eq!(updated.status, CustomerStatus::Inactive);

        delete_customer(&db, 1).await?;
        assert!(get_customer(&db, 1).await?.is_none());
        assert_eq!(ledger::balance(&db, 1).await?, 0);

        assert!(matches!(
            delete_customer(&db, 1).await.unwrap_err(),
            Error::CustomerNotFound { id: 1 }
        ));
        Ok(())
    }

    #[test]
    fn test_field_parse() {
        assert_eq!(CustomerField::parse("dateCreated"), Some(CustomerField::DateCreated));
        assert_eq!(CustomerField::parse("total_spent"), Some(CustomerField::TotalSpent));
        assert_eq!(CustomerField::parse("shoe size"), None);
    }
}
