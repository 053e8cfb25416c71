//! Data model for the browser history store.
//!
//! Timestamps are Unix epoch milliseconds. A `deleted_at` of `0` marks a
//! live row; any other value is the moment the row was soft-deleted.

use serde::{Deserialize, Serialize};

/// Row id of a `domain` record
pub type DomainId = i64;

/// Row id of a `history` record
pub type HistoryId = i64;

/// A registrable domain that visited URLs are grouped under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    pub id: DomainId,
    /// Display name, initially the pattern itself
    pub name: String,
    /// Registrable domain, e.g. `example.co.uk`
    pub pattern: String,
    pub color: String,
    /// Manual ordering key, fixed to `id` at creation
    pub sort: i64,
    /// Number of live history rows, maintained by the store's triggers
    pub item_count: i64,
    pub deleted_at: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Domain {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at != 0
    }
}

/// Fields needed to register a new domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDomain {
    pub name: String,
    pub color: String,
    pub pattern: String,
}

impl NewDomain {
    /// A domain named after its own pattern
    pub fn for_pattern(pattern: impl Into<String>, color: impl Into<String>) -> Self {
        let pattern = pattern.into();
        Self {
            name: pattern.clone(),
            color: color.into(),
            pattern,
        }
    }
}

/// Partial update of a domain's display fields; `None` leaves a field as is
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainUpdate {
    pub name: Option<String>,
    pub color: Option<String>,
    pub sort: Option<i64>,
}

impl DomainUpdate {
    pub fn sort(sort: i64) -> Self {
        Self {
            sort: Some(sort),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.color.is_none() && self.sort.is_none()
    }
}

/// A visited URL as stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: HistoryId,
    pub title: String,
    pub url: String,
    pub last_visited: i64,
    pub domain_id: DomainId,
    pub deleted_at: i64,
}

/// A visited URL submitted for ingestion; the owning domain is resolved by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHistoryEntry {
    pub title: String,
    pub url: String,
    pub last_visited: i64,
}

impl NewHistoryEntry {
    pub fn new(url: impl Into<String>, title: impl Into<String>, last_visited: i64) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            last_visited,
        }
    }
}

/// Denormalized read: a history row with its domain embedded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryWithDomain {
    #[serde(flatten)]
    pub entry: HistoryEntry,
    pub domain: Domain,
}

/// Filters for history reads. All fields are optional and AND-ed together.
///
/// Zero ids, zero bounds and empty keywords count as absent. Pagination only
/// applies when both `page` and `size` are non-zero; pages are 1-indexed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryFilter {
    pub id: Option<HistoryId>,
    pub domain_id: Option<DomainId>,
    /// Exclusive lower bound on `last_visited`
    pub start: Option<i64>,
    /// Exclusive upper bound on `last_visited`
    pub end: Option<i64>,
    /// Substring of the title; also orders results by `last_visited` descending
    pub keyword: Option<String>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl HistoryFilter {
    pub fn with_id(mut self, id: HistoryId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_domain(mut self, domain_id: DomainId) -> Self {
        self.domain_id = Some(domain_id);
        self
    }

    pub fn with_range(mut self, start: Option<i64>, end: Option<i64>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    pub fn with_page(mut self, page: u32, size: u32) -> Self {
        self.page = Some(page);
        self.size = Some(size);
        self
    }

    pub fn id(&self) -> Option<HistoryId> {
        self.id.filter(|id| *id != 0)
    }

    pub fn domain_id(&self) -> Option<DomainId> {
        self.domain_id.filter(|id| *id != 0)
    }

    pub fn start(&self) -> Option<i64> {
        self.start.filter(|t| *t != 0)
    }

    pub fn end(&self) -> Option<i64> {
        self.end.filter(|t| *t != 0)
    }

    pub fn keyword(&self) -> Option<&str> {
        non_empty(self.keyword.as_deref())
    }

    /// `(limit, offset)` when both page and size are set
    pub fn limit_offset(&self) -> Option<(u64, u64)> {
        match (self.page, self.size) {
            (Some(page), Some(size)) if page > 0 && size > 0 => {
                let size = u64::from(size);
                Some((size, (u64::from(page) - 1) * size))
            }
            _ => None,
        }
    }
}

/// Filters honoured by `count`.
///
/// Narrower than [`HistoryFilter`]: id, domain and date range are not part of it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountFilter {
    pub keyword: Option<String>,
}

impl CountFilter {
    pub fn keyword(&self) -> Option<&str> {
        non_empty(self.keyword.as_deref())
    }
}

impl From<&HistoryFilter> for CountFilter {
    fn from(filter: &HistoryFilter) -> Self {
        Self {
            keyword: filter.keyword.clone(),
        }
    }
}

/// A page request for the history list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationQuery {
    pub keyword: Option<String>,
    pub page: u32,
    pub size: u32,
}

impl PaginationQuery {
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            keyword: None,
            page,
            size,
        }
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    pub fn to_filter(&self) -> HistoryFilter {
        HistoryFilter {
            keyword: self.keyword.clone(),
            page: Some(self.page),
            size: Some(self.size),
            ..HistoryFilter::default()
        }
    }

    pub fn to_count_filter(&self) -> CountFilter {
        CountFilter {
            keyword: self.keyword.clone(),
        }
    }
}

/// One page of results plus the total and whether another page follows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub list: Vec<T>,
    pub count: u64,
    pub next: bool,
}

impl<T> Paginated<T> {
    pub fn new(list: Vec<T>, count: u64, page: u32, size: u32) -> Self {
        Self {
            list,
            count,
            next: has_next_page(count, page, size),
        }
    }
}

/// Whether rows remain beyond `page` pages of `size` rows
pub fn has_next_page(count: u64, page: u32, size: u32) -> bool {
    count > u64::from(page) * u64::from(size)
}

/// Outcome of a batch ingestion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchInsertReport {
    pub inserted: usize,
    /// Items dropped because their host has no registrable domain
    pub skipped: usize,
    pub domains_created: usize,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}
