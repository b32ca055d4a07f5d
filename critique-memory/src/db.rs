//! DB open sequence, matching `critique-history::db::open_db`'s pragmas and
//! startup checkpoint for the long-term tier's own database file.

use std::time::Duration;

use tokio_rusqlite::Connection;

use crate::errors::MemoryResult;
use crate::schema;

pub async fn open_db(path: &str) -> MemoryResult<Connection> {
    let conn = Connection::open(path).await?;

    conn.call(|db| {
        db.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL; PRAGMA foreign_keys=ON;")?;
        db.busy_timeout(Duration::from_secs(10))?;
        Ok(())
    })
    .await?;

    conn.call(|db| {
        db.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    })
    .await?;

    conn.call(|db| {
        schema::migrate(db)?;
        Ok(())
    })
    .await?;

    Ok(conn)
}
