//! DB open sequence, mirroring `wizardengineer-airev::airev-core::db::open_db`
//! exactly: WAL + synchronous=NORMAL + foreign_keys=ON, an explicit
//! `busy_timeout`, a startup `wal_checkpoint(TRUNCATE)`, then migration.

use std::time::Duration;

use tokio_rusqlite::Connection;

use crate::errors::HistoryResult;
use crate::schema;

pub async fn open_db(path: &str) -> HistoryResult<Connection> {
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
