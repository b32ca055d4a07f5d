//! Long-term tier schema: same open/migrate sequence as `critique-history`,
//! a separate database file per the persisted-state layout.

pub const SCHEMA_VERSION_DDL: &str = "
    CREATE TABLE IF NOT EXISTS schema_version (
        version INTEGER NOT NULL
    ) STRICT;
";

pub const SCHEMA_V1_SQL: &str = "
    CREATE TABLE IF NOT EXISTS memory_items (
        id               TEXT PRIMARY KEY,
        kind             TEXT    NOT NULL
                                 CHECK(kind IN ('issue','fix','pattern','context')),
        content          TEXT    NOT NULL,
        embedding        TEXT,
        importance       REAL    NOT NULL DEFAULT 0.0,
        access_count     INTEGER NOT NULL DEFAULT 0,
        created_at       INTEGER NOT NULL,
        last_accessed_at INTEGER NOT NULL
    ) STRICT;

    CREATE TABLE IF NOT EXISTS memory_tags (
        item_id TEXT NOT NULL REFERENCES memory_items(id) ON DELETE CASCADE,
        tag     TEXT NOT NULL,
        PRIMARY KEY (item_id, tag)
    ) STRICT;

    CREATE INDEX IF NOT EXISTS idx_memory_tags_tag ON memory_tags(tag);
    CREATE INDEX IF NOT EXISTS idx_memory_items_kind ON memory_items(kind);

    CREATE TABLE IF NOT EXISTS hebbian_edges (
        from_id        TEXT    NOT NULL REFERENCES memory_items(id) ON DELETE CASCADE,
        to_id          TEXT    NOT NULL REFERENCES memory_items(id) ON DELETE CASCADE,
        weight         REAL    NOT NULL,
        co_occurrences INTEGER NOT NULL DEFAULT 1,
        last_access    INTEGER NOT NULL,
        PRIMARY KEY (from_id, to_id)
    ) STRICT;

    CREATE INDEX IF NOT EXISTS idx_hebbian_from_weight ON hebbian_edges(from_id, weight DESC);
";

pub fn migrate(db: &mut rusqlite::Connection) -> rusqlite::Result<()> {
    db.execute_batch(SCHEMA_VERSION_DDL)?;

    let version: i64 = db.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0)).unwrap_or(0);

    if version < 1 {
        let tx = db.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
        tx.execute_batch(SCHEMA_V1_SQL)?;
        tx.execute("INSERT INTO schema_version (version) VALUES (1)", [])?;
        tx.commit()?;
    }

    Ok(())
}
