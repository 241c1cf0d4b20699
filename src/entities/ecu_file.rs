//! ECU file entity - tuning files sold on the storefront and moderated in the back office.
//!
//! Each file belongs to a brand, carries optional vehicle details (model, year, ECU system),
//! a category, a price in cents and a moderation `status`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Moderation status of an ECU file
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// Uploaded, waiting for an admin decision
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Visible on the storefront
    #[sea_orm(string_value = "active")]
    Active,
    /// Turned down by an admin
    #[sea_orm(string_value = "rejected")]
    Rejected,
    /// Retired; terminal
    #[sea_orm(string_value = "archived")]
    Archived,
}

impl FileStatus {
    /// Lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Rejected => "rejected",
            Self::Archived => "archived",
        }
    }

    /// Parses a status case-insensitively.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "active" => Some(Self::Active),
            "rejected" => Some(Self::Rejected),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Catalog category of an ECU file
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    #[sea_orm(string_value = "performance")]
    Performance,
    #[sea_orm(string_value = "economy")]
    Economy,
    #[sea_orm(string_value = "emissions")]
    Emissions,
    #[sea_orm(string_value = "transmission")]
    Transmission,
    #[sea_orm(string_value = "diagnostics")]
    Diagnostics,
    #[sea_orm(string_value = "custom")]
    Custom,
}

impl FileCategory {
    /// Every category, in the order the back office lists them.
    pub const ALL: [Self; 6] = [
        Self::Performance,
        Self::Economy,
        Self::Emissions,
        Self::Transmission,
        Self::Diagnostics,
        Self::Custom,
    ];

    /// Lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Performance => "performance",
            Self::Economy => "economy",
            Self::Emissions => "emissions",
            Self::Transmission => "transmission",
            Self::Diagnostics => "diagnostics",
            Self::Custom => "custom",
        }
    }

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Performance => "Performance",
            Self::Economy => "Economy",
            Self::Emissions => "Emissions",
            Self::Transmission => "Transmission",
            Self::Diagnostics => "Diagnostics",
            Self::Custom => "Custom",
        }
    }

    /// Parses a category case-insensitively.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let wanted = value.trim().to_lowercase();
        Self::ALL.into_iter().find(|c| c.as_str() == wanted)
    }
}

impl fmt::Display for FileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ECU file database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ecu_files")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the file
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Listing title (e.g., "BMW M4 3.0T G82 - Stage 1")
    pub title: String,
    /// Long description
    #[sea_orm(column_type = "Text")]
    pub description: String,
    /// Slug of the brand this file is for
    pub brand_id: String,
    /// Vehicle model (e.g., "M4 3.0T G82")
    #[serde(rename = "model")]
    pub vehicle_model: Option<String>,
    /// Vehicle model year
    pub year: Option<i32>,
    /// ECU system (e.g., "EDC17C64")
    pub system: Option<String>,
    /// Catalog category
    pub category: Option<FileCategory>,
    /// Comma separated tags
    pub tags: String,
    /// Price in cents
    pub price_cents: i64,
    /// Whether the file is an original dump rather than a modified one
    pub is_original: bool,
    /// Moderation status
    pub status: FileStatus,
    /// Day the file was uploaded
    pub upload_date: Date,
    /// Day of the last edit or status change
    pub last_modified: Option<Date>,
    /// Download counter
    pub downloads: i64,
    /// Number of customer comments
    pub comment_count: i64,
    /// Who uploaded the file
    pub uploaded_by: Option<String>,
    /// Admin who approved the file
    pub approved_by: Option<String>,
    /// Internal moderation notes
    pub notes: Option<String>,
}

impl Model {
    /// Splits the stored tag list.
    #[must_use]
    pub fn tag_list(&self) -> Vec<&str> {
        self.tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect()
    }
}

/// Defines relationships between `EcuFile` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each file belongs to one brand
    #[sea_orm(
        belongs_to = "super::brand::Entity",
        from = "Column::BrandId",
        to = "super::brand::Column::Id"
    )]
    Brand,
}

impl Related<super::brand::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Brand.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
