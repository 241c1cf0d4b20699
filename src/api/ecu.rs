//! Public ECU file catalog endpoints.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use super::{
    ApiResult, SharedState,
    extract::{JsonBody, PathParams, QueryParams},
};
use crate::{
    core::{
        collection::{SortDirection, SortSpec},
        ecu_file::{self, FileDraft, FileField, FileQuery},
    },
    entities::{
        EcuFileModel,
        ecu_file::{FileCategory, FileStatus},
    },
    errors::{Error, FieldError},
};

const RELATED_LIMIT: usize = 3;

/// Query string of `GET /api/ecu`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub brand_id: Option<String>,
    pub category: Option<String>,
    pub year: Option<i32>,
    pub system: Option<String>,
    pub search: Option<String>,
    #[serde(default)]
    pub original_only: bool,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// Paged file list
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileListResponse {
    pub files: Vec<EcuFileModel>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
}

impl ListParams {
    fn into_query(self, state: &SharedState) -> Result<FileQuery, Error> {
        let mut errors = Vec::new();

        // "all" and an empty value mean no category filter
        let category = self
            .category
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty() && !raw.eq_ignore_ascii_case("all"))
            .and_then(|raw| {
                let parsed = FileCategory::parse(raw);
                if parsed.is_none() {
                    errors.push(FieldError::new("category", format!("Unknown category '{raw}'")));
                }
                parsed
            });

        let field = match self.sort_by.as_deref() {
            None => FileField::Date,
            Some(raw) => FileField::parse(raw).unwrap_or_else(|| {
                errors.push(FieldError::new(
                    "sortBy",
                    "Sort by date, title, price, downloads or popularity",
                ));
                FileField::Date
            }),
        };
        let direction = match self.sort_order.as_deref() {
            None => SortDirection::Descending,
            Some(raw) => SortDirection::parse(raw).unwrap_or_else(|| {
                errors.push(FieldError::new("sortOrder", "Sort order is asc or desc"));
                SortDirection::Descending
            }),
        };

        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }

        Ok(FileQuery {
            search: self.search.unwrap_or_default(),
            brand_id: self.brand_id.map(|b| b.trim().to_lowercase()),
            category,
            status: Some(FileStatus::Active),
            year: self.year,
            system: self.system,
            original_only: self.original_only,
            sort: Some(SortSpec { field, direction }),
            pagination: Some(state.pagination(self.page, self.per_page)),
        })
    }
}

/// `GET /api/ecu`. Only active files are listed.
pub async fn list_files_handler(
    State(state): State<SharedState>,
    QueryParams(params): QueryParams<ListParams>,
) -> ApiResult<Json<FileListResponse>> {
    let query = params.into_query(&state)?;
    let page = ecu_file::list_files(&state.db, &query).await?;
    Ok(Json(FileListResponse {
        files: page.items,
        total: page.total,
        page: page.page,
        per_page: page.per_page,
        total_pages: page.total_pages,
    }))
}

/// `POST /api/ecu`. The file is stored as pending until an admin reviews it.
pub async fn create_file_handler(
    State(state): State<SharedState>,
    JsonBody(draft): JsonBody<FileDraft>,
) -> ApiResult<impl IntoResponse> {
    let file = ecu_file::create_file(&state.db, draft).await?;
    info!(file_id = file.id, "File uploaded through the API");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "ECU file submitted for review",
            "file": file,
        })),
    ))
}

async fn require_public(state: &SharedState, id: i64) -> Result<EcuFileModel, Error> {
    let file = ecu_file::require_file(&state.db, id).await?;
    if file.status == FileStatus::Active {
        Ok(file)
    } else {
        Err(Error::FileNotFound { id })
    }
}

/// `GET /api/ecu/{id}` with related files.
pub async fn get_file_handler(
    State(state): State<SharedState>,
    PathParams(id): PathParams<i64>,
) -> ApiResult<impl IntoResponse> {
    let file = require_public(&state, id).await?;
    let related = ecu_file::related_files(&state.db, id, RELATED_LIMIT).await?;
    Ok(Json(json!({ "file": file, "related": related })))
}

/// `POST /api/ecu/{id}/download`
pub async fn download_handler(
    State(state): State<SharedState>,
    PathParams(id): PathParams<i64>,
) -> ApiResult<impl IntoResponse> {
    let file = ecu_file::record_download(&state.db, id).await?;
    Ok(Json(json!({ "id": file.id, "downloads": file.downloads })))
}
