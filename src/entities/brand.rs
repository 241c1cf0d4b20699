//! Brand entity - car manufacturers that ECU files are filed under.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Brand database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "brands")]
pub struct Model {
    /// URL-safe slug (e.g., `"alfa-romeo"`)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Display name (e.g., "Alfa Romeo")
    pub name: String,
    /// Whether the brand is highlighted on the storefront
    pub featured: bool,
}

/// Defines relationships between Brand and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One brand has many ECU files
    #[sea_orm(has_many = "super::ecu_file::Entity")]
    EcuFiles,
}

impl Related<super::ecu_file::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EcuFiles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
