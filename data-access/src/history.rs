//! History store backed by the `history` table
//!
//! Writes go through [`HistoryRepository::batch_insert`], which resolves every
//! URL's registrable domain against the domain registry inside one
//! transaction. Reads join the live domain set and embed the domain in each row.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use history_store_core::*;
use tokio_rusqlite::Connection;
use tracing::{debug, info};

use crate::domain::SqliteDomainRepository;
use crate::pattern::registrable_domain;
use crate::query::{like_substring, Conditions};
use crate::repository::{now_millis, row_to_history_with_domain, HistoryRepository};
use crate::transaction::{run, run_in_transaction};

const SELECT_JOINED: &str = "SELECT h.id, h.title, h.url, h.lastVisited, h.domainId, h.deletedAt, \
     d.id, d.name, d.pattern, d.color, d.sort, d.itemCount, d.deletedAt, d.createdAt, d.updatedAt \
     FROM history h JOIN domain d ON h.domainId = d.id AND d.deletedAt = 0";

/// SQLite implementation of HistoryRepository
pub struct SqliteHistoryRepository {
    connection: Arc<Connection>,
    domains: Arc<SqliteDomainRepository>,
}

impl SqliteHistoryRepository {
    pub fn new(connection: Arc<Connection>, domains: Arc<SqliteDomainRepository>) -> Self {
        Self {
            connection,
            domains,
        }
    }
}

/// Live, titled rows only
fn base_conditions() -> Conditions {
    let mut conditions = Conditions::new();
    conditions
        .always("h.deletedAt = 0")
        .always("length(h.title) != 0");
    conditions
}

pub(crate) fn select_in(
    conn: &rusqlite::Connection,
    filter: &HistoryFilter,
) -> rusqlite::Result<Vec<HistoryWithDomain>> {
    let mut conditions = base_conditions();
    if let Some(id) = filter.id() {
        conditions.bind("h.id = ?", id);
    }
    if let Some(domain_id) = filter.domain_id() {
        conditions.bind("h.domainId = ?", domain_id);
    }
    if let Some(start) = filter.start() {
        conditions.bind("h.lastVisited > ?", start);
    }
    if let Some(end) = filter.end() {
        conditions.bind("h.lastVisited < ?", end);
    }
    if let Some(keyword) = filter.keyword() {
        conditions.bind("h.title LIKE ? ESCAPE '\\'", like_substring(keyword));
    }

    let mut sql = format!("{}{}", SELECT_JOINED, conditions.where_sql());
    if filter.keyword().is_some() {
        sql.push_str(" ORDER BY h.lastVisited DESC");
    }
    if let Some((limit, offset)) = filter.limit_offset() {
        sql.push_str(" LIMIT ? OFFSET ?");
        conditions.push_param(limit as i64);
        conditions.push_param(offset as i64);
    }

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(conditions.params().as_slice(), row_to_history_with_domain)?;
    rows.collect()
}

pub(crate) fn count_in(conn: &rusqlite::Connection, filter: &CountFilter) -> rusqlite::Result<u64> {
    let mut conditions = base_conditions();
    if let Some(keyword) = filter.keyword() {
        conditions.bind("h.title LIKE ? ESCAPE '\\'", like_substring(keyword));
    }

    let sql = format!("SELECT COUNT(*) FROM history h{}", conditions.where_sql());
    let count: i64 = conn.query_row(&sql, conditions.params().as_slice(), |row| row.get(0))?;
    Ok(count.max(0) as u64)
}

#[async_trait]
impl HistoryRepository for SqliteHistoryRepository {
    async fn batch_insert(&self, items: &[NewHistoryEntry]) -> Result<BatchInsertReport> {
        if items.is_empty() {
            return Ok(BatchInsertReport::default());
        }

        // Any malformed URL fails the whole batch before a transaction opens
        let mut resolved = Vec::with_capacity(items.len());
        for item in items {
            let pattern = registrable_domain(&item.url)?;
            resolved.push((item.clone(), pattern));
        }

        let domains = Arc::clone(&self.domains);
        let report = run_in_transaction(&self.connection, "history.batch_insert", move |tx| {
            let mut report = BatchInsertReport::default();

            let patterns: BTreeSet<&str> = resolved
                .iter()
                .filter_map(|(_, pattern)| pattern.as_deref())
                .collect();
            let mut domain_ids: HashMap<&str, DomainId> = HashMap::with_capacity(patterns.len());
            for pattern in patterns {
                let id = match domains.lookup_in(tx, pattern)? {
                    Some(domain) => domain.id,
                    None => {
                        report.domains_created += 1;
                        domains.create_in(tx, &domains.new_domain(pattern))?
                    }
                };
                domain_ids.insert(pattern, id);
            }

            let now = now_millis();
            let mut stmt = tx.prepare_cached(
                "INSERT INTO history (title, url, lastVisited, domainId, createdAt, updatedAt) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            )?;
            for (item, pattern) in &resolved {
                let Some(domain_id) = pattern.as_deref().and_then(|p| domain_ids.get(p)) else {
                    report.skipped += 1;
                    continue;
                };
                stmt.execute(rusqlite::params![
                    item.title,
                    item.url,
                    item.last_visited,
                    domain_id,
                    now,
                ])?;
                report.inserted += 1;
            }

            Ok(report)
        })
        .await?;

        info!(
            inserted = report.inserted,
            skipped = report.skipped,
            domains_created = report.domains_created,
            "Stored history batch"
        );
        Ok(report)
    }

    async fn select(&self, filter: &HistoryFilter) -> Result<Vec<HistoryWithDomain>> {
        let filter = filter.clone();
        run(&self.connection, "history.select", move |conn| select_in(conn, &filter)).await
    }

    async fn count(&self, filter: &CountFilter) -> Result<u64> {
        let filter = filter.clone();
        run(&self.connection, "history.count", move |conn| count_in(conn, &filter)).await
    }

    async fn pagination_select(&self, query: &PaginationQuery) -> Result<Paginated<HistoryWithDomain>> {
        if query.page == 0 || query.size == 0 {
            return Err(ValidationError::InvalidPagination {
                page: query.page,
                size: query.size,
            }
            .into());
        }

        let filter = query.to_filter();
        let count_filter = query.to_count_filter();
        let (count, list) = run_in_transaction(&self.connection, "history.pagination_select", move |tx| {
            let count = count_in(tx, &count_filter)?;
            let list = select_in(tx, &filter)?;
            Ok((count, list))
        })
        .await?;

        let page = Paginated::new(list, count, query.page, query.size);
        debug!(
            page = query.page,
            size = query.size,
            count = page.count,
            next = page.next,
            "Paginated history read"
        );
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DatabaseManager, DomainRepository};

    async fn execute_raw(db: &DatabaseManager, sql: &'static str) {
        db.connection()
            .call(move |conn| {
                conn.execute(sql, [])?;
                Ok(())
            })
            .await
            .unwrap();
    }

    async fn count_rows(db: &DatabaseManager, sql: &'static str) -> i64 {
        db.transaction("count_rows", move |tx| tx.query_row(sql, [], |row| row.get(0)))
            .await
            .unwrap()
    }

    fn entry(url: &str, title: &str, last_visited: i64) -> NewHistoryEntry {
        NewHistoryEntry::new(url, title, last_visited)
    }

    #[tokio::test]
    async fn test_batch_shares_domain_across_subdomains() {
        let db = DatabaseManager::in_memory().await.unwrap();
        let history = db.history_repository();

        let report = history
            .batch_insert(&[
                entry("https://a.example.com/x", "Page A", 100),
                entry("https://b.example.com/y", "Page B", 200),
            ])
            .await
            .unwrap();
        assert_eq!(report.inserted, 2);
        assert_eq!(report.domains_created, 1);
        assert_eq!(report.skipped, 0);

        let rows = history.select(&HistoryFilter::default()).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].entry.domain_id, rows[1].entry.domain_id);
        for row in &rows {
            assert_eq!(row.domain.pattern, "example.com");
            assert_eq!(row.domain.id, row.entry.domain_id);
            assert_eq!(row.domain.item_count, 2);
        }
    }

    #[tokio::test]
    async fn test_existing_domain_is_reused() {
        let db = DatabaseManager::in_memory().await.unwrap();
        let history = db.history_repository();
        let domains = db.domain_repository();

        let existing = domains
            .create(&NewDomain::for_pattern("example.com", "#abcdef"))
            .await
            .unwrap();

        let report = history
            .batch_insert(&[entry("https://www.example.com/", "Home", 1)])
            .await
            .unwrap();
        assert_eq!(report.domains_created, 0);

        let rows = history.select(&HistoryFilter::default()).await.unwrap();
        assert_eq!(rows[0].entry.domain_id, existing);
        assert_eq!(rows[0].domain.color, "#abcdef");
    }

    #[tokio::test]
    async fn test_hosts_without_pattern_are_skipped() {
        let db = DatabaseManager::in_memory().await.unwrap();
        let history = db.history_repository();

        let report = history
            .batch_insert(&[
                entry("http://localhost:8080/admin", "Local", 1),
                entry("http://192.168.1.1/", "Router", 2),
                entry("https://docs.rs/tokio", "tokio - Rust", 3),
            ])
            .await
            .unwrap();
        assert_eq!(report.inserted, 1);
        assert_eq!(report.skipped, 2);

        let rows = history.select(&HistoryFilter::default()).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].domain.pattern, "docs.rs");
    }

    #[tokio::test]
    async fn test_malformed_url_fails_whole_batch() {
        let db = DatabaseManager::in_memory().await.unwrap();
        let history = db.history_repository();

        let err = history
            .batch_insert(&[
                entry("https://example.com/ok", "Fine", 1),
                entry("not a url", "Broken", 2),
            ])
            .await
            .unwrap_err();
        assert!(err.is_validation(), "unexpected error: {err}");

        assert_eq!(history.count(&CountFilter::default()).await.unwrap(), 0);
        assert_eq!(db.domain_repository().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_empty_batch_is_noop() {
        let db = DatabaseManager::in_memory().await.unwrap();
        let report = db.history_repository().batch_insert(&[]).await.unwrap();
        assert_eq!(report, BatchInsertReport::default());
    }

    #[tokio::test]
    async fn test_blank_titles_and_deleted_rows_are_hidden() {
        let db = DatabaseManager::in_memory().await.unwrap();
        let history = db.history_repository();

        history
            .batch_insert(&[
                entry("https://example.com/redirect", "", 1),
                entry("https://example.com/kept", "Kept", 2),
                entry("https://example.com/gone", "Gone", 3),
            ])
            .await
            .unwrap();
        execute_raw(&db, "UPDATE history SET deletedAt = 99 WHERE title = 'Gone'").await;

        let rows = history.select(&HistoryFilter::default()).await.unwrap();
        let titles: Vec<&str> = rows.iter().map(|r| r.entry.title.as_str()).collect();
        assert_eq!(titles, vec!["Kept"]);
        assert_eq!(history.count(&CountFilter::default()).await.unwrap(), 1);

        // trigger keeps itemCount in step with the soft delete; the blank-titled row still counts
        assert_eq!(rows[0].domain.item_count, 2);
    }

    #[tokio::test]
    async fn test_select_filters_combine() {
        let db = DatabaseManager::in_memory().await.unwrap();
        let history = db.history_repository();

        history
            .batch_insert(&[
                entry("https://example.com/1", "Rust book", 100),
                entry("https://example.com/2", "Rust reference", 200),
                entry("https://rust-lang.org/", "Rust homepage", 300),
                entry("https://example.com/3", "Cooking", 400),
            ])
            .await
            .unwrap();

        let example = db.domain_repository().lookup("example.com").await.unwrap().unwrap();

        let by_domain = history
            .select(&HistoryFilter::default().with_domain(example.id))
            .await
            .unwrap();
        assert_eq!(by_domain.len(), 3);

        // both bounds are exclusive
        let ranged = history
            .select(&HistoryFilter::default().with_range(Some(100), Some(400)))
            .await
            .unwrap();
        let mut visited: Vec<i64> = ranged.iter().map(|r| r.entry.last_visited).collect();
        visited.sort();
        assert_eq!(visited, vec![200, 300]);

        let combined = history
            .select(
                &HistoryFilter::default()
                    .with_domain(example.id)
                    .with_keyword("Rust")
                    .with_range(Some(150), None),
            )
            .await
            .unwrap();
        assert_eq!(combined.len(), 1);
        assert_eq!(combined[0].entry.title, "Rust reference");

        let by_id = history
            .select(&HistoryFilter::default().with_id(combined[0].entry.id))
            .await
            .unwrap();
        assert_eq!(by_id.len(), 1);
        assert_eq!(by_id[0].entry.url, "https://example.com/2");
    }

    #[tokio::test]
    async fn test_keyword_orders_by_last_visited_desc() {
        let db = DatabaseManager::in_memory().await.unwrap();
        let history = db.history_repository();

        history
            .batch_insert(&[
                entry("https://a.com/", "news today", 10),
                entry("https://b.com/", "news archive", 30),
                entry("https://c.com/", "weather", 40),
                entry("https://d.com/", "old news", 20),
            ])
            .await
            .unwrap();

        let rows = history
            .select(&HistoryFilter::default().with_keyword("news"))
            .await
            .unwrap();
        let visited: Vec<i64> = rows.iter().map(|r| r.entry.last_visited).collect();
        assert_eq!(visited, vec![30, 20, 10]);
    }

    #[tokio::test]
    async fn test_keyword_wildcards_match_literally() {
        let db = DatabaseManager::in_memory().await.unwrap();
        let history = db.history_repository();

        history
            .batch_insert(&[
                entry("https://a.com/", "100% pure", 1),
                entry("https://b.com/", "1000 items", 2),
            ])
            .await
            .unwrap();

        let rows = history
            .select(&HistoryFilter::default().with_keyword("100%"))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].entry.title, "100% pure");
    }

    #[tokio::test]
    async fn test_count_ignores_range_and_domain() {
        let db = DatabaseManager::in_memory().await.unwrap();
        let history = db.history_repository();

        assert_eq!(history.count(&CountFilter::default()).await.unwrap(), 0);

        history
            .batch_insert(&[
                entry("https://a.com/", "alpha", 1),
                entry("https://b.com/", "beta", 2),
                entry("https://c.com/", "alphabet", 3),
            ])
            .await
            .unwrap();

        let filter = HistoryFilter::default()
            .with_keyword("alpha")
            .with_range(Some(2), None);
        assert_eq!(history.select(&filter).await.unwrap().len(), 1);
        // count only honours the keyword, so the range above does not narrow it
        assert_eq!(history.count(&CountFilter::from(&filter)).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_pagination_select_pages_and_next() {
        let db = DatabaseManager::in_memory().await.unwrap();
        let history = db.history_repository();

        let items: Vec<NewHistoryEntry> = (0..25)
            .map(|i| entry(&format!("https://site{}.com/", i), &format!("page {}", i), i))
            .collect();
        history.batch_insert(&items).await.unwrap();

        let first = history
            .pagination_select(&PaginationQuery::new(1, 10))
            .await
            .unwrap();
        assert_eq!(first.count, 25);
        assert_eq!(first.list.len(), 10);
        assert!(first.next);

        let last = history
            .pagination_select(&PaginationQuery::new(3, 10))
            .await
            .unwrap();
        assert_eq!(last.list.len(), 5);
        assert!(!last.next);

        let beyond = history
            .pagination_select(&PaginationQuery::new(4, 10))
            .await
            .unwrap();
        assert!(beyond.list.is_empty());
        assert_eq!(beyond.count, 25);
    }

    #[tokio::test]
    async fn test_pagination_select_with_keyword() {
        let db = DatabaseManager::in_memory().await.unwrap();
        let history = db.history_repository();

        let items: Vec<NewHistoryEntry> = (0..6)
            .map(|i| {
                let title = if i % 2 == 0 { "rust tips" } else { "gardening" };
                entry(&format!("https://site{}.com/", i), title, i)
            })
            .collect();
        history.batch_insert(&items).await.unwrap();

        let page = history
            .pagination_select(&PaginationQuery::new(1, 2).with_keyword("rust"))
            .await
            .unwrap();
        assert_eq!(page.count, 3);
        assert!(page.next);
        let visited: Vec<i64> = page.list.iter().map(|r| r.entry.last_visited).collect();
        assert_eq!(visited, vec![4, 2]);
    }

    #[tokio::test]
    async fn test_pagination_rejects_zero_page_or_size() {
        let db = DatabaseManager::in_memory().await.unwrap();
        let history = db.history_repository();

        let err = history
            .pagination_select(&PaginationQuery::new(0, 10))
            .await
            .unwrap_err();
        assert!(err.is_validation());

        let err = history
            .pagination_select(&PaginationQuery::new(1, 0))
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_soft_deleted_domain_hides_its_entries() {
        let db = DatabaseManager::in_memory().await.unwrap();
        let history = db.history_repository();

        history
            .batch_insert(&[
                entry("https://example.com/", "Example", 1),
                entry("https://rust-lang.org/", "Rust", 2),
            ])
            .await
            .unwrap();
        execute_raw(&db, "UPDATE domain SET deletedAt = 5 WHERE pattern = 'example.com'").await;

        let rows = history.select(&HistoryFilter::default()).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].domain.pattern, "rust-lang.org");
    }

    #[tokio::test]
    async fn test_constraint_violation_rolls_back_created_domains() {
        let db = DatabaseManager::in_memory().await.unwrap();
        let history = db.history_repository();
        let domains = db.domain_repository();

        history
            .batch_insert(&[entry("https://example.com/", "Example", 1)])
            .await
            .unwrap();
        execute_raw(&db, "UPDATE domain SET deletedAt = 5 WHERE pattern = 'example.com'").await;

        // aaa.org is registered first, then example.com collides with the soft-deleted row
        let err = history
            .batch_insert(&[
                entry("https://aaa.org/", "Aaa", 2),
                entry("https://www.example.com/again", "Example again", 3),
            ])
            .await
            .unwrap_err();
        assert!(err.is_constraint_violation());

        assert!(domains.lookup("aaa.org").await.unwrap().is_none());
        assert_eq!(count_rows(&db, "SELECT COUNT(*) FROM domain").await, 1);
        assert_eq!(count_rows(&db, "SELECT COUNT(*) FROM history").await, 1);
    }
}
