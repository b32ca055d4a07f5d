//! Forward-only schema migration, mirroring
//! `wizardengineer-airev::airev-core::schema`'s `schema_version` table and
//! `BEGIN IMMEDIATE` transaction shape.

pub const SCHEMA_VERSION_DDL: &str = "
    CREATE TABLE IF NOT EXISTS schema_version (
        version INTEGER NOT NULL
    ) STRICT;
";

pub const SCHEMA_V1_SQL: &str = "
    CREATE TABLE IF NOT EXISTS history_records (
        id           INTEGER PRIMARY KEY AUTOINCREMENT,
        commit_hash  TEXT,
        file_path    TEXT    NOT NULL,
        line         INTEGER,
        severity     TEXT    NOT NULL
                             CHECK(severity IN ('info','warning','error','critical')),
        issue_type   TEXT    NOT NULL
                             CHECK(issue_type IN ('bug','security','performance','style','best_practice')),
        message      TEXT    NOT NULL,
        suggestion   TEXT,
        author       TEXT,
        branch       TEXT,
        created_at   INTEGER NOT NULL,
        resolved     INTEGER NOT NULL DEFAULT 0
    ) STRICT;

    CREATE INDEX IF NOT EXISTS idx_history_file_path ON history_records(file_path);
    CREATE INDEX IF NOT EXISTS idx_history_created_at ON history_records(created_at);

    CREATE VIRTUAL TABLE IF NOT EXISTS history_fts USING fts5(
        message, suggestion, content='history_records', content_rowid='id'
    );

    CREATE TRIGGER IF NOT EXISTS history_fts_ai AFTER INSERT ON history_records BEGIN
        INSERT INTO history_fts(rowid, message, suggestion) VALUES (new.id, new.message, new.suggestion);
    END;

    CREATE TRIGGER IF NOT EXISTS history_fts_au AFTER UPDATE ON history_records BEGIN
        INSERT INTO history_fts(history_fts, rowid, message, suggestion) VALUES ('delete', old.id, old.message, old.suggestion);
        INSERT INTO history_fts(rowid, message, suggestion) VALUES (new.id, new.message, new.suggestion);
    END;

    CREATE TRIGGER IF NOT EXISTS history_fts_ad AFTER DELETE ON history_records BEGIN
        INSERT INTO history_fts(history_fts, rowid, message, suggestion) VALUES ('delete', old.id, old.message, old.suggestion);
    END;
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
