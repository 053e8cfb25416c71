//! Domain registry backed by the `domain` table
//!
//! The `*_in` methods take an open connection or transaction so that the
//! history store can resolve domains inside its own transaction.

use std::sync::Arc;

use async_trait::async_trait;
use history_store_core::*;
use rusqlite::OptionalExtension;
use tokio_rusqlite::Connection;
use tracing::debug;

use crate::color::random_color;
use crate::repository::{now_millis, row_to_domain, DomainRepository};
use crate::schema::DOMAIN_COLUMNS;
use crate::transaction::{run, run_in_transaction};

/// Produces the display colour for a newly registered domain
pub type ColorGenerator = fn() -> String;

/// SQLite implementation of DomainRepository
pub struct SqliteDomainRepository {
    connection: Arc<Connection>,
    color: ColorGenerator,
}

impl SqliteDomainRepository {
    pub fn new(connection: Arc<Connection>) -> Self {
        Self::with_color_generator(connection, random_color)
    }

    pub fn with_color_generator(connection: Arc<Connection>, color: ColorGenerator) -> Self {
        Self { connection, color }
    }

    /// A new domain named after `pattern` with a fresh colour
    pub fn new_domain(&self, pattern: &str) -> NewDomain {
        NewDomain::for_pattern(pattern, (self.color)())
    }

    pub(crate) fn lookup_in(
        &self,
        conn: &rusqlite::Connection,
        pattern: &str,
    ) -> rusqlite::Result<Option<Domain>> {
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {DOMAIN_COLUMNS} FROM domain \
             WHERE pattern = ?1 AND deletedAt = 0 ORDER BY id DESC LIMIT 1"
        ))?;
        stmt.query_row([pattern], |row| row_to_domain(row, 0))
            .optional()
    }

    pub(crate) fn get_in(
        &self,
        conn: &rusqlite::Connection,
        id: DomainId,
    ) -> rusqlite::Result<Option<Domain>> {
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {DOMAIN_COLUMNS} FROM domain WHERE id = ?1 AND deletedAt = 0"
        ))?;
        stmt.query_row([id], |row| row_to_domain(row, 0)).optional()
    }

    /// Insert only; `sort` stays 0 until [`Self::update_in`] sets it
    pub(crate) fn insert_in(
        &self,
        conn: &rusqlite::Connection,
        domain: &NewDomain,
    ) -> rusqlite::Result<DomainId> {
        let now = now_millis();
        conn.execute(
            "INSERT INTO domain (name, pattern, color, sort, createdAt, updatedAt) \
             VALUES (?1, ?2, ?3, 0, ?4, ?4)",
            rusqlite::params![domain.name, domain.pattern, domain.color, now],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub(crate) fn update_in(
        &self,
        conn: &rusqlite::Connection,
        id: DomainId,
        update: &DomainUpdate,
    ) -> rusqlite::Result<bool> {
        let changed = conn.execute(
            "UPDATE domain SET \
                 name = COALESCE(?1, name), \
                 color = COALESCE(?2, color), \
                 sort = COALESCE(?3, sort), \
                 updatedAt = ?4 \
             WHERE id = ?5 AND deletedAt = 0",
            rusqlite::params![update.name, update.color, update.sort, now_millis(), id],
        )?;
        Ok(changed > 0)
    }

    /// Insert followed by `sort = id`; two writes, atomic within the caller's transaction
    pub(crate) fn create_in(
        &self,
        conn: &rusqlite::Connection,
        domain: &NewDomain,
    ) -> rusqlite::Result<DomainId> {
        let id = self.insert_in(conn, domain)?;
        self.update_in(conn, id, &DomainUpdate::sort(id))?;
        debug!(id, pattern = %domain.pattern, "Registered domain");
        Ok(id)
    }

    pub(crate) fn select_in(&self, conn: &rusqlite::Connection) -> rusqlite::Result<Vec<Domain>> {
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {DOMAIN_COLUMNS} FROM domain WHERE deletedAt = 0 ORDER BY sort, id"
        ))?;
        let rows = stmt.query_map([], |row| row_to_domain(row, 0))?;
        rows.collect()
    }
}

#[async_trait]
impl DomainRepository for SqliteDomainRepository {
    async fn lookup(&self, pattern: &str) -> Result<Option<Domain>> {
        let pattern = pattern.to_string();
        let this = self.detached();
        run(&self.connection, "domain.lookup", move |conn| {
            this.lookup_in(conn, &pattern)
        })
        .await
    }

    async fn get_by_id(&self, id: DomainId) -> Result<Option<Domain>> {
        let this = self.detached();
        run(&self.connection, "domain.get_by_id", move |conn| this.get_in(conn, id)).await
    }

    async fn create(&self, domain: &NewDomain) -> Result<DomainId> {
        let domain = domain.clone();
        let this = self.detached();
        run_in_transaction(&self.connection, "domain.create", move |tx| {
            this.create_in(tx, &domain)
        })
        .await
    }

    async fn update(&self, id: DomainId, update: &DomainUpdate) -> Result<bool> {
        if update.is_empty() {
            return Ok(false);
        }
        let update = update.clone();
        let this = self.detached();
        run(&self.connection, "domain.update", move |conn| {
            this.update_in(conn, id, &update)
        })
        .await
    }

    async fn select(&self) -> Result<Vec<Domain>> {
        let this = self.detached();
        run(&self.connection, "domain.select", move |conn| this.select_in(conn)).await
    }

    async fn count(&self) -> Result<u64> {
        run(&self.connection, "domain.count", |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM domain WHERE deletedAt = 0",
                [],
                |row| row.get(0),
            )?;
            Ok(count as u64)
        })
        .await
    }
}

impl SqliteDomainRepository {
    /// A handle that can move onto the connection thread
    fn detached(&self) -> Self {
        Self {
            connection: Arc::clone(&self.connection),
            color: self.color,
        }
    }
}
