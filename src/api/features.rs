//! Back-office feature catalog endpoint.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use super::{ApiResult, SharedState, extract::QueryParams};
use crate::{
    core::{
        collection::{SortDirection, SortSpec},
        features::{Feature, FeatureCatalog, FeatureField, FeatureQuery, FeatureSection, FeatureStatus},
    },
    errors::{Error, FieldError},
};

/// Query string of `GET /api/features`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureParams {
    pub search: Option<String>,
    pub group: Option<String>,
    pub status: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// Paged feature list, also grouped for display
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureListResponse {
    pub features: Vec<Feature>,
    pub sections: Vec<FeatureSection>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
}

/// Empty values and "all" mean no filter.
fn selected(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

impl FeatureParams {
    fn into_query(self, state: &SharedState) -> Result<FeatureQuery, Error> {
        let mut errors = Vec::new();

        let status = selected(self.status).and_then(|raw| {
            let parsed = FeatureStatus::parse(&raw);
            if parsed.is_none() {
                errors.push(FieldError::new(
                    "status",
                    "Status is active, coming-soon, beta or deprecated",
                ));
            }
            parsed
        });
        let sort = match self.sort_by.as_deref() {
            None => None,
            Some(raw) => {
                let field = FeatureField::parse(raw);
                if field.is_none() {
                    errors.push(FieldError::new("sortBy", "Sort by name, group or status"));
                }
                field
            }
        };
        let direction = match self.sort_order.as_deref() {
            None => SortDirection::Ascending,
            Some(raw) => SortDirection::parse(raw).unwrap_or_else(|| {
                errors.push(FieldError::new("sortOrder", "Sort order is asc or desc"));
                SortDirection::Ascending
            }),
        };

        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }

        Ok(FeatureQuery {
            search: self.search.unwrap_or_default(),
            group: selected(self.group),
            status,
            sort: sort.map(|field| SortSpec { field, direction }),
            pagination: Some(state.pagination(self.page, self.per_page)),
        })
    }
}

/// `GET /api/features`. Catalog order unless a sort is given.
pub async fn list_features_handler(
    State(state): State<SharedState>,
    QueryParams(params): QueryParams<FeatureParams>,
) -> ApiResult<Json<FeatureListResponse>> {
    let query = params.into_query(&state)?;
    let catalog = FeatureCatalog::load()?;
    let page = catalog.list(&query)?;
    Ok(Json(FeatureListResponse {
        sections: catalog.sections(&page.items),
        features: page.items,
        total: page.total,
        page: page.page,
        per_page: page.per_page,
        total_pages: page.total_pages,
    }))
}
