//! ECU file catalog and the admin review workflow.
//!
//! Uploaded files start `pending`. An admin approves or rejects them, and any file that is
//! not yet archived can be archived. Archived files stay archived. Every transition stamps
//! `last_modified`.

use chrono::Datelike;
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::{
    core::{
        catalog, clean_text,
        collection::{CollectionView, Page, Pagination, Record, SortKey, SortSpec},
        today,
    },
    entities::{
        EcuFile,
        ecu_file::{self, FileCategory, FileStatus},
    },
    errors::{Error, FieldError, Result},
};

/// Admin review actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileAction {
    Approve,
    Reject,
    Archive,
}

impl FileAction {
    /// All actions, for exhaustive checks.
    pub const ALL: [Self; 3] = [Self::Approve, Self::Reject, Self::Archive];

    /// Status a successful action leads to.
    #[must_use]
    pub const fn target(self) -> FileStatus {
        match self {
            Self::Approve => FileStatus::Active,
            Self::Reject => FileStatus::Rejected,
            Self::Archive => FileStatus::Archived,
        }
    }

    /// Verb for messages.
    #[must_use]
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Approve => "approved",
            Self::Reject => "rejected",
            Self::Archive => "archived",
        }
    }
}

impl FileStatus {
    /// Applies a review action.
    ///
    /// # Errors
    /// `InvalidTransition` unless the action is allowed from the current status.
    pub fn transition(self, action: FileAction) -> Result<Self> {
        let allowed = match action {
            FileAction::Approve | FileAction::Reject => matches!(self, Self::Pending),
            FileAction::Archive => !matches!(self, Self::Archived),
        };
        if allowed {
            Ok(action.target())
        } else {
            Err(Error::InvalidTransition {
                from: self,
                to: action.target(),
            })
        }
    }
}

/// Sortable columns of the file catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileField {
    /// Upload date
    Date,
    Title,
    Price,
    Downloads,
    /// Comment count
    Popularity,
}

impl FileField {
    /// Parses a `sortBy` value.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "date" => Some(Self::Date),
            "title" => Some(Self::Title),
            "price" => Some(Self::Price),
            "downloads" => Some(Self::Downloads),
            "popularity" => Some(Self::Popularity),
            _ => None,
        }
    }
}

impl Record for ecu_file::Model {
    type Field = FileField;

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str(), self.description.as_str()];
        fields.extend(self.vehicle_model.as_deref());
        fields.extend(self.system.as_deref());
        fields.extend(self.tag_list());
        fields
    }

    fn sort_key(&self, field: FileField) -> SortKey<'_> {
        match field {
            FileField::Date => SortKey::Date(self.upload_date),
            FileField::Title => SortKey::Text(&self.title),
            FileField::Price => SortKey::Integer(self.price_cents),
            FileField::Downloads => SortKey::Integer(self.downloads),
            FileField::Popularity => SortKey::Integer(self.comment_count),
        }
    }
}

/// Listing request for the catalog and the admin files screen.
#[derive(Debug, Clone, Default)]
pub struct FileQuery {
    /// Free text over title, description, model, system and tags
    pub search: String,
    pub brand_id: Option<String>,
    pub category: Option<FileCategory>,
    pub status: Option<FileStatus>,
    pub year: Option<i32>,
    /// Substring of the ECU system name
    pub system: Option<String>,
    pub original_only: bool,
    /// Newest first when absent
    pub sort: Option<SortSpec<FileField>>,
    pub pagination: Option<Pagination>,
}

/// Lists files through the collection view.
pub async fn list_files(db: &DatabaseConnection, query: &FileQuery) -> Result<Page<ecu_file::Model>> {
    let files = EcuFile::find()
        .order_by_asc(ecu_file::Column::Id)
        .all(db)
        .await?;

    let system = query
        .system
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    Ok(CollectionView::new()
        .search(query.search.clone())
        .filter_by(query.brand_id.clone(), |file: &ecu_file::Model, brand| {
            file.brand_id == *brand
        })
        .filter_by(query.category, |file: &ecu_file::Model, category| {
            file.category == Some(*category)
        })
        .filter_by(query.status, |file: &ecu_file::Model, status| {
            file.status == *status
        })
        .filter_by(query.year, |file: &ecu_file::Model, year| {
            file.year == Some(*year)
        })
        .filter_by(system, |file: &ecu_file::Model, needle| {
            file.system
                .as_deref()
                .is_some_and(|s| s.to_lowercase().contains(needle.as_str()))
        })
        .filter_by(query.original_only.then_some(()), |file: &ecu_file::Model, _| {
            file.is_original
        })
        .sort(Some(
            query.sort.unwrap_or(SortSpec::descending(FileField::Date)),
        ))
        .paginate(query.pagination)
        .apply(files))
}

/// Retrieves a file by id.
pub async fn get_file(db: &DatabaseConnection, file_id: i64) -> Result<Option<ecu_file::Model>> {
    EcuFile::find_by_id(file_id).one(db).await.map_err(Into::into)
}

/// Retrieves a file by id, failing with `FileNotFound`.
pub async fn require_file(db: &DatabaseConnection, file_id: i64) -> Result<ecu_file::Model> {
    get_file(db, file_id)
        .await?
        .ok_or(Error::FileNotFound { id: file_id })
}

/// Files sharing the brand or the category of `file_id`, closest matches first.
pub async fn related_files(
    db: &DatabaseConnection,
    file_id: i64,
    limit: usize,
) -> Result<Vec<ecu_file::Model>> {
    let target = require_file(db, file_id).await?;
    let relevance = |file: &ecu_file::Model| {
        u8::from(file.brand_id == target.brand_id)
            + u8::from(file.category.is_some() && file.category == target.category)
    };

    let mut related: Vec<ecu_file::Model> = EcuFile::find()
        .filter(ecu_file::Column::Id.ne(file_id))
        .filter(ecu_file::Column::Status.eq(FileStatus::Active))
        .order_by_asc(ecu_file::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .filter(|file| relevance(file) > 0)
        .collect();

    related.sort_by_key(|file| std::cmp::Reverse(relevance(file)));
    related.truncate(limit);
    Ok(related)
}

/// Upload / edit form. Every field is optional on the wire so that missing values become
/// field errors instead of a rejected body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub brand_id: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub system: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Price in currency units, e.g. `99.99`
    pub price: Option<f64>,
    pub is_original: Option<bool>,
    pub uploaded_by: Option<String>,
    pub notes: Option<String>,
}

/// A draft that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ValidDraft {
    title: String,
    description: String,
    brand_id: String,
    model: Option<String>,
    year: Option<i32>,
    system: Option<String>,
    category: Option<FileCategory>,
    tags: String,
    price_cents: i64,
    is_original: bool,
    uploaded_by: Option<String>,
    notes: Option<String>,
}

const MAX_PRICE: f64 = 100_000.0;
const EARLIEST_YEAR: i32 = 1950;

#[allow(clippy::cast_possible_truncation)]
fn to_cents(price: f64) -> i64 {
    (price * 100.0).round() as i64
}

impl FileDraft {
    async fn validate(self, db: &DatabaseConnection) -> Result<ValidDraft> {
        let mut errors = Vec::new();

        let title = clean_text(self.title);
        if title.is_none() {
            errors.push(FieldError::new("title", "Title is required"));
        }
        let description = clean_text(self.description);
        if description.is_none() {
            errors.push(FieldError::new("description", "Description is required"));
        }

        let brand_id = clean_text(self.brand_id).map(|b| b.to_lowercase());
        match &brand_id {
            None => errors.push(FieldError::new("brandId", "Brand is required")),
            Some(id) if catalog::get_brand(db, id).await?.is_none() => {
                errors.push(FieldError::new("brandId", format!("Unknown brand '{id}'")));
            }
            Some(_) => {}
        }

        let category = match clean_text(self.category) {
            None => None,
            Some(raw) => {
                let parsed = FileCategory::parse(&raw);
                if parsed.is_none() {
                    errors.push(FieldError::new(
                        "category",
                        format!("Unknown category '{raw}'"),
                    ));
                }
                parsed
            }
        };

        let latest_year = today().year() + 1;
        if let Some(year) = self.year {
            if !(EARLIEST_YEAR..=latest_year).contains(&year) {
                errors.push(FieldError::new(
                    "year",
                    format!("Year must be between {EARLIEST_YEAR} and {latest_year}"),
                ));
            }
        }

        let price = self.price.unwrap_or(0.0);
        if !price.is_finite() || price < 0.0 {
            errors.push(FieldError::new("price", "Price must be zero or more"));
        } else if price > MAX_PRICE {
            errors.push(FieldError::new("price", "Price is too high"));
        }

        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }

        let tags = self
            .tags
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(",");

        Ok(ValidDraft {
            title: title.unwrap_or_default(),
            description: description.unwrap_or_default(),
            brand_id: brand_id.unwrap_or_default(),
            model: clean_text(self.model),
            year: self.year,
            system: clean_text(self.system),
            category,
            tags,
            price_cents: to_cents(price),
            is_original: self.is_original.unwrap_or(true),
            uploaded_by: clean_text(self.uploaded_by),
            notes: clean_text(self.notes),
        })
    }
}

/// Creates a file from an upload form. New files wait for review as `pending`.
#[instrument(skip(db, draft))]
pub async fn create_file(db: &DatabaseConnection, draft: FileDraft) -> Result<ecu_file::Model> {
    let valid = draft.validate(db).await?;

    let file = ecu_file::ActiveModel {
        title: Set(valid.title),
        description: Set(valid.description),
        brand_id: Set(valid.brand_id),
        vehicle_model: Set(valid.model),
        year: Set(valid.year),
        system: Set(valid.system),
        category: Set(valid.category),
        tags: Set(valid.tags),
        price_cents: Set(valid.price_cents),
        is_original: Set(valid.is_original),
        status: Set(FileStatus::Pending),
        upload_date: Set(today()),
        last_modified: Set(None),
        downloads: Set(0),
        comment_count: Set(0),
        uploaded_by: Set(valid.uploaded_by),
        approved_by: Set(None),
        notes: Set(valid.notes),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(file_id = file.id, title = %file.title, "File submitted for review");
    Ok(file)
}

/// Replaces the editable metadata of a file. Status and counters are untouched.
#[instrument(skip(db, draft))]
pub async fn update_file(
    db: &DatabaseConnection,
    file_id: i64,
    draft: FileDraft,
) -> Result<ecu_file::Model> {
    let existing = require_file(db, file_id).await?;
    let valid = draft.validate(db).await?;

    let mut file: ecu_file::ActiveModel = existing.into();
    file.title = Set(valid.title);
    file.description = Set(valid.description);
    file.brand_id = Set(valid.brand_id);
    file.vehicle_model = Set(valid.model);
    file.year = Set(valid.year);
    file.system = Set(valid.system);
    file.category = Set(valid.category);
    file.tags = Set(valid.tags);
    file.price_cents = Set(valid.price_cents);
    file.is_original = Set(valid.is_original);
    file.notes = Set(valid.notes);
    file.last_modified = Set(Some(today()));

    Ok(file.update(db).await?)
}

/// Removes a file from the catalog.
pub async fn delete_file(db: &DatabaseConnection, file_id: i64) -> Result<()> {
    require_file(db, file_id).await?;
    EcuFile::delete_by_id(file_id).exec(db).await?;
    info!(file_id, "Deleted file");
    Ok(())
}

/// Applies a review action, stamping `last_modified` and, on approval, `approved_by`.
#[instrument(skip(db))]
pub async fn change_status(
    db: &DatabaseConnection,
    file_id: i64,
    action: FileAction,
    admin: &str,
) -> Result<ecu_file::Model> {
    let existing = require_file(db, file_id).await?;
    let next = existing.status.transition(action)?;

    let mut file: ecu_file::ActiveModel = existing.into();
    file.status = Set(next);
    file.last_modified = Set(Some(today()));
    if action == FileAction::Approve {
        file.approved_by = Set(Some(admin.to_string()));
    }
    let updated = file.update(db).await?;

    info!(file_id, status = %next, admin, "File {}", action.verb());
    Ok(updated)
}

/// `pending -> active`
pub async fn approve_file(
    db: &DatabaseConnection,
    file_id: i64,
    admin: &str,
) -> Result<ecu_file::Model> {
    change_status(db, file_id, FileAction::Approve, admin).await
}

/// `pending -> rejected`
pub async fn reject_file(
    db: &DatabaseConnection,
    file_id: i64,
    admin: &str,
) -> Result<ecu_file::Model> {
    change_status(db, file_id, FileAction::Reject, admin).await
}

/// `pending | active | rejected -> archived`
pub async fn archive_file(
    db: &DatabaseConnection,
    file_id: i64,
    admin: &str,
) -> Result<ecu_file::Model> {
    change_status(db, file_id, FileAction::Archive, admin).await
}

/// Counts one download of an active file.
pub async fn record_download(db: &DatabaseConnection, file_id: i64) -> Result<ecu_file::Model> {
    let existing = require_file(db, file_id).await?;
    if existing.status != FileStatus::Active {
        return Err(Error::FileNotFound { id: file_id });
    }
    let downloads = existing.downloads + 1;
    let mut file: ecu_file::ActiveModel = existing.into();
    file.downloads = Set(downloads);
    Ok(file.update(db).await?)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use crate::test_utils::*;

    const STATUSES: [FileStatus; 4] = [
        FileStatus::Pending,
        FileStatus::Active,
        FileStatus::Rejected,
        FileStatus::Archived,
    ];

    #[test]
    fn test_approve_pending_yields_active() {
        assert_eq!(
            FileStatus::Pending.transition(FileAction::Approve).unwrap(),
            FileStatus::Active
        );
        assert_eq!(
            FileStatus::Pending.transition(FileAction::Reject).unwrap(),
            FileStatus::Rejected
        );
    }

    #[test]
    fn test_archive_from_every_live_status() {
        for status in [FileStatus::Pending, FileStatus::Active, FileStatus::Rejected] {
            assert_eq!(
                status.transition(FileAction::Archive).unwrap(),
                FileStatus::Archived
            );
        }
        assert!(matches!(
            FileStatus::Archived.transition(FileAction::Archive),
            Err(Error::InvalidTransition {
                from: FileStatus::Archived,
                to: FileStatus::Archived
            })
        ));
    }

    #[test]
    fn test_transition_closure() {
        for status in STATUSES {
            for action in FileAction::ALL {
                if let Ok(next) = status.transition(action) {
                    assert!(STATUSES.contains(&next));
                    assert_eq!(next, action.target());
                }
            }
        }
        // Nothing leaves archived, and only pending can be approved or rejected
        for action in FileAction::ALL {
            assert!(FileStatus::Archived.transition(action).is_err());
        }
        assert!(FileStatus::Active.transition(FileAction::Approve).is_err());
        assert!(FileStatus::Rejected.transition(FileAction::Approve).is_err());
    }

    #[tokio::test]
    async fn test_create_file_requires_fields() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_file(
            &db,
            FileDraft {
                title: Some("  ".to_string()),
                price: Some(-1.0),
                ..Default::default()
            },
        )
        .await;

        let Err(Error::Validation(errors)) = result else {
            panic!("expected validation errors");
        };
        let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["title", "description", "brandId", "price"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_file_checks_brand_and_category() -> Result<()> {
        let db = setup_seeded_db().await?;

        let result = create_file(
            &db,
            FileDraft {
                title: Some("Ford Focus ST Stage 1".to_string()),
                description: Some("Mild tune".to_string()),
                brand_id: Some("ford".to_string()),
                category: Some("magic".to_string()),
                year: Some(1900),
                ..Default::default()
            },
        )
        .await;

        let Err(Error::Validation(errors)) = result else {
            panic!("expected validation errors");
        };
        let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["brandId", "category", "year"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_upload_then_review() -> Result<()> {
        let db = setup_seeded_db().await?;

        let file = create_file(
            &db,
            FileDraft {
                title: Some("Audi RS3 8Y Stage 1".to_string()),
                description: Some("Stage 1 for the 2.5 TFSI".to_string()),
                brand_id: Some("AUDI".to_string()),
                category: Some("Performance".to_string()),
                tags: vec!["stage1".to_string(), " ".to_string(), "tfsi".to_string()],
                price: Some(119.5),
                ..Default::default()
            },
        )
        .await?;

        assert_eq!(file.status, FileStatus::Pending);
        assert_eq!(file.brand_id, "audi");
        assert_eq!(file.price_cents, 11950);
        assert_eq!(file.tag_list(), vec!["stage1", "tfsi"]);
        assert!(file.last_modified.is_none());

        let approved = approve_file(&db, file.id, "admin@autotechno.com").await?;
        assert_eq!(approved.status, FileStatus::Active);
        assert_eq!(approved.approved_by.as_deref(), Some("admin@autotechno.com"));
        assert_eq!(approved.last_modified, Some(today()));

        assert!(matches!(
            reject_file(&db, file.id, "admin").await.unwrap_err(),
            Error::InvalidTransition { .. }
        ));

        let archived = archive_file(&db, file.id, "admin").await?;
        assert_eq!(archived.status, FileStatus::Archived);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_files_filters_and_default_order() -> Result<()> {
        let db = setup_seeded_db().await?;

        let all = list_files(&db, &FileQuery::default()).await?;
        assert_eq!(all.total, 15);
        assert!(
            all.items
                .windows(2)
                .all(|w| w[0].upload_date >= w[1].upload_date)
        );

        let bmw_performance = list_files(
            &db,
            &FileQuery {
                brand_id: Some("bmw".to_string()),
                category: Some(FileCategory::Performance),
                ..Default::default()
            },
        )
        .await?;
        let titles: Vec<&str> = bmw_performance.items.iter().map(|f| f.title.as_str()).collect();
        assert_eq!(titles, vec!["BMW M4 3.0T G82 - Stage 1", "BMW M5 F90 - Burble Tune"]);

        let turbo = list_files(
            &db,
            &FileQuery {
                search: "turbo".to_string(),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(turbo.total, 2);

        let original_turbo = list_files(
            &db,
            &FileQuery {
                search: "turbo".to_string(),
                original_only: true,
                ..Default::default()
            },
        )
        .await?;
        let titles: Vec<&str> = original_turbo.items.iter().map(|f| f.title.as_str()).collect();
        assert_eq!(titles, vec!["Mercedes CLA45 AMG - Stage 3"]);

        let edc = list_files(
            &db,
            &FileQuery {
                system: Some("edc17".to_string()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(edc.total, 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_related_files_rank_brand_and_category() -> Result<()> {
        let db = setup_seeded_db().await?;

        // BMW M4 Stage 1: performance
        let related = related_files(&db, 1, 3).await?;
        assert_eq!(related.len(), 3);
        assert!(related.iter().all(|f| f.id != 1));
        // Same brand and category ranks first
        assert_eq!(related[0].title, "BMW M5 F90 - Burble Tune");
        Ok(())
    }

    #[tokio::test]
    async fn test_record_download() -> Result<()> {
        let db = setup_seeded_db().await?;
        let before = require_file(&db, 1).await?.downloads;
        let after = record_download(&db, 1).await?;
        assert_eq!(after.downloads, before + 1);
        Ok(())
    }
}
