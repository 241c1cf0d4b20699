//! Customer entity - storefront accounts managed from the back office.
//!
//! The token balance is not a column. It is the sum of the customer's rows in
//! `token_transactions`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account status shown and filtered on the customers screen
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum CustomerStatus {
    /// Customer can buy and spend tokens
    #[sea_orm(string_value = "active")]
    Active,
    /// Dormant account
    #[sea_orm(string_value = "inactive")]
    Inactive,
}

impl CustomerStatus {
    /// Display label used by the back office.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
        }
    }

    /// Parses a status case-insensitively (`"Active"`, `"inactive"`, ...).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            _ => None,
        }
    }
}

/// Customer database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "customers")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the customer
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Full name
    pub name: String,
    /// Login e-mail, unique across customers
    #[sea_orm(unique)]
    pub email: String,
    /// Active or inactive
    pub status: CustomerStatus,
    /// Account creation date
    pub date_created: Date,
    /// Last day the customer did anything
    pub last_active: Date,
    /// Money spent on token packages, in cents
    pub total_spent_cents: i64,
}

/// Defines relationships between Customer and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One customer has many ledger rows
    #[sea_orm(has_many = "super::token_transaction::Entity")]
    TokenTransactions,
}

impl Related<super::token_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TokenTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
