//! Repository traits and row mapping shared by the SQLite implementations

use async_trait::async_trait;
use history_store_core::*;
use rusqlite::Row;

/// Repository trait for the domain registry
#[async_trait]
pub trait DomainRepository: Send + Sync {
    /// Live domain with exactly this pattern; the newest wins if duplicates exist
    async fn lookup(&self, pattern: &str) -> Result<Option<Domain>>;
    async fn get_by_id(&self, id: DomainId) -> Result<Option<Domain>>;
    /// Register a domain and fix its `sort` to the generated id
    async fn create(&self, domain: &NewDomain) -> Result<DomainId>;
    /// Returns whether a live domain was updated
    async fn update(&self, id: DomainId, update: &DomainUpdate) -> Result<bool>;
    /// All live domains by `sort`
    async fn select(&self) -> Result<Vec<Domain>>;
    async fn count(&self) -> Result<u64>;
}

/// Repository trait for visited URLs
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Ingest a batch atomically, creating domains as needed
    ///
    /// A pattern whose domain was soft-deleted cannot be registered again, so any
    /// batch containing it fails with a constraint violation and writes nothing.
    async fn batch_insert(&self, items: &[NewHistoryEntry]) -> Result<BatchInsertReport>;
    async fn select(&self, filter: &HistoryFilter) -> Result<Vec<HistoryWithDomain>>;
    async fn count(&self, filter: &CountFilter) -> Result<u64>;
    /// `count` and `select` against one snapshot
    async fn pagination_select(&self, query: &PaginationQuery) -> Result<Paginated<HistoryWithDomain>>;
}

/// Map a row to Domain, reading [`crate::schema::DOMAIN_COLUMNS`] from column `base`
pub(crate) fn row_to_domain(row: &Row, base: usize) -> rusqlite::Result<Domain> {
    Ok(Domain {
        id: row.get(base)?,
        name: row.get(base + 1)?,
        pattern: row.get(base + 2)?,
        color: row.get(base + 3)?,
        sort: row.get(base + 4)?,
        item_count: row.get(base + 5)?,
        deleted_at: row.get(base + 6)?,
        created_at: row.get(base + 7)?,
        updated_at: row.get(base + 8)?,
    })
}

/// Map a joined history/domain row
pub(crate) fn row_to_history_with_domain(row: &Row) -> rusqlite::Result<HistoryWithDomain> {
    let entry = HistoryEntry {
        id: row.get(0)?,
        title: row.get(1)?,
        url: row.get(2)?,
        last_visited: row.get(3)?,
        domain_id: row.get(4)?,
        deleted_at: row.get(5)?,
    };
    let domain = row_to_domain(row, 6)?;
    Ok(HistoryWithDomain { entry, domain })
}

/// Current time in epoch milliseconds
pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
