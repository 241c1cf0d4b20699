//! Token package entity - the token bundles customers can buy.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Token package database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "token_packages")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the package
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Package name (e.g., "Standard")
    #[sea_orm(unique)]
    pub name: String,
    /// Tokens credited on purchase
    pub tokens: i64,
    /// Price in cents
    pub price_cents: i64,
    /// Advertised discount against the per-token base price
    pub discount_percentage: i32,
    /// Highlighted as the popular choice
    pub popular: bool,
}

/// `TokenPackage` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
