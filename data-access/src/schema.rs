//! Bootstrap schema for the history store
//!
//! Every statement is idempotent, so the DDL runs on each open. Column names
//! are camelCase to match the records the UI layer exchanges.

/// SQL schema for the history database
pub const SCHEMA_SQL: &str = r#"
-- Registrable domains
CREATE TABLE IF NOT EXISTS domain (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    pattern TEXT NOT NULL UNIQUE,
    color TEXT NOT NULL,
    sort INTEGER NOT NULL DEFAULT 0,
    itemCount INTEGER NOT NULL DEFAULT 0,
    deletedAt INTEGER NOT NULL DEFAULT 0,
    createdAt INTEGER NOT NULL,
    updatedAt INTEGER NOT NULL
);

-- Visited URLs
CREATE TABLE IF NOT EXISTS history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL DEFAULT '',
    url TEXT NOT NULL,
    lastVisited INTEGER NOT NULL,
    domainId INTEGER NOT NULL,
    deletedAt INTEGER NOT NULL DEFAULT 0,
    createdAt INTEGER NOT NULL,
    updatedAt INTEGER NOT NULL
);

-- itemCount tracks live history rows per domain
CREATE TRIGGER IF NOT EXISTS history_item_count_insert AFTER INSERT ON history
WHEN new.deletedAt = 0
BEGIN
    UPDATE domain SET itemCount = itemCount + 1 WHERE id = new.domainId;
END;

CREATE TRIGGER IF NOT EXISTS history_item_count_remove AFTER UPDATE OF deletedAt ON history
WHEN old.deletedAt = 0 AND new.deletedAt != 0
BEGIN
    UPDATE domain SET itemCount = itemCount - 1 WHERE id = new.domainId;
END;

CREATE TRIGGER IF NOT EXISTS history_item_count_restore AFTER UPDATE OF deletedAt ON history
WHEN old.deletedAt != 0 AND new.deletedAt = 0
BEGIN
    UPDATE domain SET itemCount = itemCount + 1 WHERE id = new.domainId;
END;

-- Indexes for common queries
CREATE INDEX IF NOT EXISTS idx_history_domain_id ON history(domainId);
CREATE INDEX IF NOT EXISTS idx_history_last_visited ON history(lastVisited);
CREATE INDEX IF NOT EXISTS idx_history_deleted_at ON history(deletedAt);
CREATE INDEX IF NOT EXISTS idx_domain_sort ON domain(sort);
"#;

/// Column list shared by every domain read, in `row_to_domain` order
pub const DOMAIN_COLUMNS: &str =
    "id, name, pattern, color, sort, itemCount, deletedAt, createdAt, updatedAt";
