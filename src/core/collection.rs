//! Generic collection view - free-text search, structured filters, stable sorting and
//! offset/limit pagination over an in-memory record set.
//!
//! Every list in the storefront and the back office (customers, ECU files, token
//! packages, ledger) goes through [`CollectionView`], so they all share one set of rules:
//!
//! - a record matches the text query when any of its searchable fields contains the
//!   query as a case-insensitive substring; a blank query matches everything
//! - structured filters are ANDed with the text query
//! - sorting is stable and keyed by one field; descending flips the comparator, so
//!   records with equal keys keep their original relative order in both directions
//! - pagination really slices the result and reports the true total
//!
//! None of these operations can fail.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Direction of a sort
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest first
    #[default]
    #[serde(alias = "asc", alias = "ascending")]
    Ascending,
    /// Largest first
    #[serde(alias = "desc", alias = "descending")]
    Descending,
}

impl SortDirection {
    /// The other direction.
    #[must_use]
    pub const fn toggle(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    /// Applies the direction to an ascending comparison result.
    #[must_use]
    pub const fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }

    /// Parses `asc`, `ascending`, `desc` or `descending` (any case).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Some(Self::Ascending),
            "desc" | "descending" => Some(Self::Descending),
            _ => None,
        }
    }

    /// Arrow shown next to the active column.
    #[must_use]
    pub const fn indicator(self) -> &'static str {
        match self {
            Self::Ascending => "↑",
            Self::Descending => "↓",
        }
    }
}

/// Sort on one field in one direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec<F> {
    /// Field to sort by
    pub field: F,
    /// Direction
    pub direction: SortDirection,
}

impl<F: Copy + Eq> SortSpec<F> {
    /// Ascending sort on `field`.
    pub const fn ascending(field: F) -> Self {
        Self {
            field,
            direction: SortDirection::Ascending,
        }
    }

    /// Descending sort on `field`.
    pub const fn descending(field: F) -> Self {
        Self {
            field,
            direction: SortDirection::Descending,
        }
    }

    /// Column-header click: the active ascending column flips to descending,
    /// anything else (another column, or the active descending one) starts ascending.
    #[must_use]
    pub fn request(current: Option<Self>, field: F) -> Self {
        match current {
            Some(spec) if spec.field == field && spec.direction == SortDirection::Ascending => {
                Self::descending(field)
            }
            _ => Self::ascending(field),
        }
    }
}

/// Comparable projection of one record field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortKey<'a> {
    /// Compared case-insensitively, raw text breaking ties
    Text(&'a str),
    /// Numeric values, including money in cents
    Integer(i64),
    /// Calendar dates
    Date(NaiveDate),
    /// Booleans, `false` first
    Flag(bool),
    /// Absent optional value; sorts before everything else
    Missing,
}

impl SortKey<'_> {
    const fn rank(&self) -> u8 {
        match self {
            Self::Missing => 0,
            Self::Flag(_) => 1,
            Self::Integer(_) => 2,
            Self::Date(_) => 3,
            Self::Text(_) => 4,
        }
    }

    /// Ascending comparison.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => compare_text(a, b),
            (Self::Integer(a), Self::Integer(b)) => a.cmp(b),
            (Self::Date(a), Self::Date(b)) => a.cmp(b),
            (Self::Flag(a), Self::Flag(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl<'a> From<Option<&'a str>> for SortKey<'a> {
    fn from(value: Option<&'a str>) -> Self {
        value.map_or(Self::Missing, SortKey::Text)
    }
}

impl From<Option<i64>> for SortKey<'_> {
    fn from(value: Option<i64>) -> Self {
        value.map_or(Self::Missing, SortKey::Integer)
    }
}

/// Case-insensitive text ordering with the raw text as tie breaker, so the order is total.
#[must_use]
pub fn compare_text(a: &str, b: &str) -> Ordering {
    let folded_a = a.chars().flat_map(char::to_lowercase);
    let folded_b = b.chars().flat_map(char::to_lowercase);
    folded_a.cmp(folded_b).then_with(|| a.cmp(b))
}

/// A record type that can be listed through a [`CollectionView`].
///
/// Sortable fields are an explicit enum per entity, never a runtime key lookup.
pub trait Record {
    /// Enumerates the sortable fields of the record.
    type Field: Copy + Eq;

    /// Fields that the free-text query searches.
    fn search_fields(&self) -> Vec<&str>;

    /// Value of `field` for sorting.
    fn sort_key(&self, field: Self::Field) -> SortKey<'_>;
}

/// Normalizes a free-text query: trimmed and lowercased. `None` means "match everything".
#[must_use]
pub fn normalize_query(query: &str) -> Option<String> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Whether `record` matches an already normalized query.
pub fn matches_query<T: Record>(record: &T, needle: &str) -> bool {
    record
        .search_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}

/// Keeps the records matching `query`, preserving order.
pub fn filter_records<T: Record>(records: Vec<T>, query: &str) -> Vec<T> {
    match normalize_query(query) {
        None => records,
        Some(needle) => records
            .into_iter()
            .filter(|record| matches_query(record, &needle))
            .collect(),
    }
}

/// Stable in-place sort by one field.
pub fn sort_records<T: Record>(records: &mut [T], spec: SortSpec<T::Field>) {
    records.sort_by(|a, b| {
        let ordering = a.sort_key(spec.field).compare(&b.sort_key(spec.field));
        spec.direction.apply(ordering)
    });
}

/// Requested page, 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Page number, starting at 1
    pub page: u64,
    /// Records per page, at least 1
    pub per_page: u64,
}

impl Pagination {
    /// Builds a pagination from optional caller input.
    ///
    /// Page 0 or absent becomes 1; a per-page of 0 or absent becomes `default_size`;
    /// anything above `max_size` is capped.
    #[must_use]
    pub fn from_request(
        page: Option<u64>,
        per_page: Option<u64>,
        default_size: u64,
        max_size: u64,
    ) -> Self {
        let per_page = per_page
            .filter(|&size| size > 0)
            .unwrap_or(default_size)
            .clamp(1, max_size.max(1));
        Self {
            page: page.unwrap_or(1).max(1),
            per_page,
        }
    }
}

/// One slice of a result set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Records on this page
    pub items: Vec<T>,
    /// Page number, starting at 1
    pub page: u64,
    /// Page size used for slicing
    pub per_page: u64,
    /// Matching records across all pages
    pub total: u64,
    /// Number of pages, at least 1
    pub total_pages: u64,
}

impl<T> Page<T> {
    /// Whether the page has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Maps the records while keeping the paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total: self.total,
            total_pages: self.total_pages,
        }
    }

    /// "page X of Y" label for list footers.
    #[must_use]
    pub fn describe(&self) -> String {
        format!("page {} of {}", self.page, self.total_pages)
    }
}

fn to_usize(value: u64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

/// Slices `records` to the requested page. Without a pagination, everything is one page.
pub fn paginate<T>(records: Vec<T>, pagination: Option<Pagination>) -> Page<T> {
    let total = records.len() as u64;
    let Some(pagination) = pagination else {
        return Page {
            items: records,
            page: 1,
            per_page: total.max(1),
            total,
            total_pages: 1,
        };
    };

    let total_pages = total.div_ceil(pagination.per_page).max(1);
    let offset = (pagination.page - 1).saturating_mul(pagination.per_page);
    let items = records
        .into_iter()
        .skip(to_usize(offset))
        .take(to_usize(pagination.per_page))
        .collect();

    Page {
        items,
        page: pagination.page,
        per_page: pagination.per_page,
        total,
        total_pages,
    }
}

type Predicate<'a, T> = Box<dyn Fn(&T) -> bool + Send + Sync + 'a>;

/// Search + filters + sort + page, applied in that order.
pub struct CollectionView<'a, T: Record> {
    query: String,
    predicates: Vec<Predicate<'a, T>>,
    sort: Option<SortSpec<T::Field>>,
    pagination: Option<Pagination>,
}

impl<'a, T: Record> Default for CollectionView<'a, T> {
    fn default() -> Self {
        Self {
            query: String::new(),
            predicates: Vec::new(),
            sort: None,
            pagination: None,
        }
    }
}

impl<'a, T: Record> CollectionView<'a, T> {
    /// Empty view: no query, no filters, insertion order, single page.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the free-text query.
    #[must_use]
    pub fn search(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    /// Adds a structured filter, ANDed with everything else.
    #[must_use]
    pub fn filter(mut self, predicate: impl Fn(&T) -> bool + Send + Sync + 'a) -> Self {
        self.predicates.push(Box::new(predicate));
        self
    }

    /// Adds a filter only when `value` is present.
    #[must_use]
    pub fn filter_by<V: Send + Sync + 'a>(
        self,
        value: Option<V>,
        predicate: impl Fn(&T, &V) -> bool + Send + Sync + 'a,
    ) -> Self {
        match value {
            Some(value) => self.filter(move |record| predicate(record, &value)),
            None => self,
        }
    }

    /// Sorts by one field. Without a sort, insertion order is kept.
    #[must_use]
    pub fn sort(mut self, spec: Option<SortSpec<T::Field>>) -> Self {
        self.sort = spec;
        self
    }

    /// Slices the result.
    #[must_use]
    pub fn paginate(mut self, pagination: Option<Pagination>) -> Self {
        self.pagination = pagination;
        self
    }

    /// Runs the view over `records`.
    pub fn apply(&self, records: impl IntoIterator<Item = T>) -> Page<T> {
        let needle = normalize_query(&self.query);
        let mut matching: Vec<T> = records
            .into_iter()
            .filter(|record| needle.as_deref().is_none_or(|n| matches_query(record, n)))
            .filter(|record| self.predicates.iter().all(|keep| keep(record)))
            .collect();

        if let Some(spec) = self.sort {
            sort_records(&mut matching, spec);
        }

        paginate(matching, self.pagination)
    }
}
