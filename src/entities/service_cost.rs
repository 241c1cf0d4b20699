//! Service cost entity - how many tokens each paid service consumes.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Service cost database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service_costs")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Stable lookup key (e.g., `"ecu_decrypt"`)
    #[sea_orm(unique)]
    pub key: String,
    /// Display name (e.g., "ECU File Decryption")
    pub name: String,
    /// Tokens charged per use
    pub cost: i64,
}

/// `ServiceCost` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
