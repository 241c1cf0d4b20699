//! Back-office feature catalog.
//!
//! A fixed list of admin tools, grouped by area and tagged with a release status. The
//! list lives in `data/features.toml` and is compiled into the binary. Listing goes
//! through [`CollectionView`] like every other record set: the text query searches name
//! and description, group and status are exact filters.

use std::{collections::HashSet, fmt};

use serde::{Deserialize, Serialize};

use crate::{
    core::collection::{CollectionView, Page, Pagination, Record, SortKey, SortSpec},
    errors::{Error, Result},
};

const FEATURES_TOML: &str = include_str!("../../data/features.toml");

/// Release status of a feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeatureStatus {
    Active,
    ComingSoon,
    Beta,
    Deprecated,
}

impl FeatureStatus {
    /// Every status, in the order the status filter offers them.
    pub const ALL: [Self; 4] = [Self::Active, Self::ComingSoon, Self::Beta, Self::Deprecated];

    /// Wire key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::ComingSoon => "coming-soon",
            Self::Beta => "beta",
            Self::Deprecated => "deprecated",
        }
    }

    /// Badge label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::ComingSoon => "Coming Soon",
            Self::Beta => "Beta",
            Self::Deprecated => "Deprecated",
        }
    }

    /// Accepts keys (`coming-soon`) and labels (`Coming Soon`), any case.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let key = value.trim().to_lowercase().replace([' ', '_'], "-");
        Self::ALL.into_iter().find(|s| s.as_str() == key)
    }
}

impl fmt::Display for FeatureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Area of the back office a feature belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureGroup {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// One back-office tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    pub id: String,
    /// Id of the owning [`FeatureGroup`]
    pub group: String,
    pub name: String,
    pub description: String,
    pub status: FeatureStatus,
    /// Admin screen of the tool, when it has one
    #[serde(default)]
    pub path: Option<String>,
    /// Planned release, for tools that are not out yet
    #[serde(default, alias = "available_from")]
    pub available_from: Option<String>,
}

/// Sortable fields of a [`Feature`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureField {
    Name,
    Group,
    Status,
}

impl FeatureField {
    /// Parses a `sortBy` value.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "name" => Some(Self::Name),
            "group" | "category" => Some(Self::Group),
            "status" => Some(Self::Status),
            _ => None,
        }
    }
}

impl Record for Feature {
    type Field = FeatureField;

    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.description.as_str()]
    }

    fn sort_key(&self, field: FeatureField) -> SortKey<'_> {
        match field {
            FeatureField::Name => SortKey::Text(&self.name),
            FeatureField::Group => SortKey::Text(&self.group),
            FeatureField::Status => SortKey::Text(self.status.as_str()),
        }
    }
}

/// Filters for [`FeatureCatalog::list`]
#[derive(Debug, Clone, Default)]
pub struct FeatureQuery {
    pub search: String,
    /// Group id
    pub group: Option<String>,
    pub status: Option<FeatureStatus>,
    pub sort: Option<SortSpec<FeatureField>>,
    pub pagination: Option<Pagination>,
}

/// A group with the features of one listing that belong to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureSection {
    pub group: FeatureGroup,
    pub features: Vec<Feature>,
}

/// Every group and feature
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureCatalog {
    pub groups: Vec<FeatureGroup>,
    pub features: Vec<Feature>,
}

impl FeatureCatalog {
    /// Loads the built-in catalog.
    pub fn load() -> Result<Self> {
        Self::parse(FEATURES_TOML)
    }

    /// Parses a catalog and checks that ids are unique and every feature has a known group.
    pub fn parse(contents: &str) -> Result<Self> {
        let catalog: Self = toml::from_str(contents).map_err(|e| Error::Config {
            message: format!("Failed to parse feature catalog: {e}"),
        })?;
        catalog.check()?;
        Ok(catalog)
    }

    fn check(&self) -> Result<()> {
        let mut group_ids = HashSet::new();
        for group in &self.groups {
            if !group_ids.insert(group.id.as_str()) {
                return Err(Error::Config {
                    message: format!("Duplicate feature group '{}'", group.id),
                });
            }
        }

        let mut feature_ids = HashSet::new();
        for feature in &self.features {
            if !feature_ids.insert(feature.id.as_str()) {
                return Err(Error::Config {
                    message: format!("Duplicate feature '{}'", feature.id),
                });
            }
            if !group_ids.contains(feature.group.as_str()) {
                return Err(Error::Config {
                    message: format!(
                        "Feature '{}' belongs to unknown group '{}'",
                        feature.id, feature.group
                    ),
                });
            }
        }
        Ok(())
    }

    /// Finds a group by id, case-insensitively.
    #[must_use]
    pub fn group(&self, id: &str) -> Option<&FeatureGroup> {
        let id = id.trim();
        self.groups.iter().find(|g| g.id.eq_ignore_ascii_case(id))
    }

    /// Searches, filters, sorts and pages the features. An unknown group is a
    /// validation error rather than an empty list.
    pub fn list(&self, query: &FeatureQuery) -> Result<Page<Feature>> {
        let group = match query.group.as_deref() {
            None => None,
            Some(raw) => Some(
                self.group(raw)
                    .map(|g| g.id.clone())
                    .ok_or_else(|| Error::invalid("group", format!("Unknown group '{raw}'")))?,
            ),
        };

        let view = CollectionView::new()
            .search(query.search.clone())
            .filter_by(group, |f: &Feature, group| &f.group == group)
            .filter_by(query.status, |f: &Feature, status| f.status == *status)
            .sort(query.sort)
            .paginate(query.pagination);
        Ok(view.apply(self.features.iter().cloned()))
    }

    /// Groups `features` under their group, in catalog group order. Groups without a
    /// feature in `features` are left out.
    #[must_use]
    pub fn sections(&self, features: &[Feature]) -> Vec<FeatureSection> {
        self.groups
            .iter()
            .filter_map(|group| {
                let members: Vec<Feature> = features
                    .iter()
                    .filter(|f| f.group == group.id)
                    .cloned()
                    .collect();
                (!members.is_empty()).then(|| FeatureSection {
                    group: group.clone(),
                    features: members,
                })
            })
            .collect()
    }
}
