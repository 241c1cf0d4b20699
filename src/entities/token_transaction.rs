//! Token transaction entity - the append-only token ledger.
//!
//! Each row has a `customer_id`, a signed `amount` and a `kind` (purchase/usage/adjustment).
//! A customer's balance is the sum of their rows.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What produced a ledger row
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Tokens bought with a package; amount is positive
    #[sea_orm(string_value = "purchase")]
    Purchase,
    /// Tokens spent on a service; amount is negative
    #[sea_orm(string_value = "usage")]
    Usage,
    /// Manual correction by an admin; any non-zero amount
    #[sea_orm(string_value = "adjustment")]
    Adjustment,
}

impl TransactionKind {
    /// Lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Purchase => "purchase",
            Self::Usage => "usage",
            Self::Adjustment => "adjustment",
        }
    }

    /// Whether `amount` has the sign this kind requires.
    #[must_use]
    pub const fn accepts(self, amount: i64) -> bool {
        match self {
            Self::Purchase => amount > 0,
            Self::Usage => amount < 0,
            Self::Adjustment => amount != 0,
        }
    }

    /// Parses a kind case-insensitively.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "purchase" => Some(Self::Purchase),
            "usage" => Some(Self::Usage),
            "adjustment" => Some(Self::Adjustment),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token transaction database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "token_transactions")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the transaction
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Customer the tokens belong to
    pub customer_id: i64,
    /// Purchase, usage or adjustment
    pub kind: TransactionKind,
    /// Signed token amount
    pub amount: i64,
    /// When the transaction was recorded
    pub created_at: DateTimeUtc,
    /// Payment method for purchases (e.g., `"credit_card"`)
    pub method: Option<String>,
    /// Service name for usage rows
    pub service: Option<String>,
    /// Package bought, for purchases
    pub package_id: Option<i64>,
    /// Free text (e.g., "Opening balance")
    pub note: Option<String>,
}

/// Defines relationships between `TokenTransaction` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each transaction belongs to one customer
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id"
    )]
    Customer,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
