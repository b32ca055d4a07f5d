//! Long-term tier: persistent key-value store with secondary indices by
//! type and by tag, plus the Hebbian association graph.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio_rusqlite::Connection;
use tracing::debug;

use crate::db::open_db;
use crate::errors::{MemoryError, MemoryResult};
use crate::model::{HebbianConnection, MemoryItem, MemoryItemId, MemoryKind};

const COMPACTION_INTERVAL: Duration = Duration::from_secs(5 * 60);
const DECAY_INTERVAL: Duration = Duration::from_secs(60 * 60);

fn kind_to_str(kind: MemoryKind) -> &'static str {
    match kind {
        MemoryKind::Issue => "issue",
        MemoryKind::Fix => "fix",
        MemoryKind::Pattern => "pattern",
        MemoryKind::Context => "context",
    }
}

fn kind_from_str(s: &str) -> MemoryKind {
    match s {
        "issue" => MemoryKind::Issue,
        "fix" => MemoryKind::Fix,
        "context" => MemoryKind::Context,
        _ => MemoryKind::Pattern,
    }
}

fn row_to_item(row: &rusqlite::Row<'_>) -> rusqlite::Result<MemoryItem> {
    let created_at: i64 = row.get("created_at")?;
    let last_accessed_at: i64 = row.get("last_accessed_at")?;
    let embedding: Option<String> = row.get("embedding")?;
    Ok(MemoryItem {
        id: row.get("id")?,
        kind: kind_from_str(&row.get::<_, String>("kind")?),
        content: row.get("content")?,
        tags: Vec::new(),
        embedding: embedding.and_then(|s| serde_json::from_str(&s).ok()),
        importance: row.get("importance")?,
        access_count: row.get::<_, i64>("access_count")? as u32,
        created_at: DateTime::from_timestamp(created_at, 0).unwrap_or_else(Utc::now),
        last_accessed_at: DateTime::from_timestamp(last_accessed_at, 0).unwrap_or_else(Utc::now),
    })
}

#[derive(Clone)]
pub struct LongTermStore {
    conn: Connection,
}

impl LongTermStore {
    pub async fn open(path: impl Into<String>) -> MemoryResult<Self> {
        let conn = open_db(&path.into()).await?;
        Ok(Self { conn })
    }

    pub async fn insert(&self, item: MemoryItem) -> MemoryResult<()> {
        let tags = item.tags.clone();
        self.conn
            .call(move |db| {
                let embedding = item.embedding.as_ref().map(|e| serde_json::to_string(e)).transpose().map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
                db.execute(
                    "INSERT INTO memory_items (id, kind, content, embedding, importance, access_count, created_at, last_accessed_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                     ON CONFLICT(id) DO UPDATE SET content=excluded.content, embedding=excluded.embedding,
                         importance=excluded.importance, access_count=excluded.access_count, last_accessed_at=excluded.last_accessed_at",
                    rusqlite::params![
                        item.id,
                        kind_to_str(item.kind),
                        item.content,
                        embedding,
                        item.importance,
                        item.access_count as i64,
                        item.created_at.timestamp(),
                        item.last_accessed_at.timestamp(),
                    ],
                )?;
                for tag in &tags {
                    db.execute("INSERT OR IGNORE INTO memory_tags (item_id, tag) VALUES (?1, ?2)", rusqlite::params![item.id, tag])?;
                }
                Ok(())
            })
            .await?;
        Ok(())
    }

    pub async fn get(&self, id: &str) -> MemoryResult<MemoryItem> {
        let id = id.to_string();
        let item = self
            .conn
            .call(move |db| {
                let mut item = db.query_row("SELECT * FROM memory_items WHERE id = ?1", rusqlite::params![id], row_to_item)?;
                let mut stmt = db.prepare("SELECT tag FROM memory_tags WHERE item_id = ?1")?;
                let tags: Vec<String> = stmt.query_map(rusqlite::params![id], |r| r.get(0))?.collect::<rusqlite::Result<_>>()?;
                item.tags = tags;
                Ok(item)
            })
            .await
            .map_err(|_| MemoryError::NotFound(id.clone()))?;
        Ok(item)
    }

    pub async fn list_by_tag(&self, tag: &str) -> MemoryResult<Vec<MemoryItem>> {
        let tag = tag.to_string();
        let items = self
            .conn
            .call(move |db| {
                let mut stmt = db.prepare(
                    "SELECT m.* FROM memory_items m JOIN memory_tags t ON t.item_id = m.id WHERE t.tag = ?1 ORDER BY m.last_accessed_at DESC",
                )?;
                let rows = stmt.query_map(rusqlite::params![tag], row_to_item)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()
            })
            .await?;
        Ok(items)
    }

    pub async fn top_n(&self, limit: usize) -> MemoryResult<Vec<MemoryItem>> {
        let items = self
            .conn
            .call(move |db| {
                let mut stmt = db.prepare("SELECT * FROM memory_items ORDER BY last_accessed_at DESC LIMIT ?1")?;
                let rows = stmt.query_map(rusqlite::params![limit as i64], row_to_item)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()
            })
            .await?;
        Ok(items)
    }

    pub async fn delete(&self, id: &str) -> MemoryResult<()> {
        let id = id.to_string();
        self.conn
            .call(move |db| {
                db.execute("DELETE FROM memory_items WHERE id = ?1", rusqlite::params![id])?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    /// Reinforces the directed edge in both directions, matching the "for
    /// every unordered pair (i,j), a directed edge ... in both directions"
    /// contract.
    pub async fn reinforce_pair(&self, a: &MemoryItemId, b: &MemoryItemId) -> MemoryResult<()> {
        let (a, b) = (a.clone(), b.clone());
        self.conn
            .call(move |db| {
                for (from, to) in [(a.clone(), b.clone()), (b, a)] {
                    let existing: Option<(f32, i64)> = db
                        .query_row("SELECT weight, co_occurrences FROM hebbian_edges WHERE from_id = ?1 AND to_id = ?2", rusqlite::params![from, to], |r| {
                            Ok((r.get(0)?, r.get(1)?))
                        })
                        .ok();
                    let mut edge = match existing {
                        Some((weight, co)) => HebbianConnection { from_id: from.clone(), to_id: to.clone(), weight, co_occurrences: co as u32, last_access: Utc::now() },
                        None => HebbianConnection::new(from.clone(), to.clone()),
                    };
                    if existing.is_some() {
                        edge.reinforce();
                    }
                    db.execute(
                        "INSERT INTO hebbian_edges (from_id, to_id, weight, co_occurrences, last_access) VALUES (?1, ?2, ?3, ?4, ?5)
                         ON CONFLICT(from_id, to_id) DO UPDATE SET weight=excluded.weight, co_occurrences=excluded.co_occurrences, last_access=excluded.last_access",
                        rusqlite::params![edge.from_id, edge.to_id, edge.weight, edge.co_occurrences as i64, edge.last_access.timestamp()],
                    )?;
                }
                Ok(())
            })
            .await?;
        Ok(())
    }

    pub async fn get_related(&self, id: &str, limit: usize) -> MemoryResult<Vec<(MemoryItemId, f32)>> {
        let id = id.to_string();
        let related = self
            .conn
            .call(move |db| {
                let mut stmt = db.prepare("SELECT to_id, weight FROM hebbian_edges WHERE from_id = ?1 ORDER BY weight DESC LIMIT ?2")?;
                let rows = stmt.query_map(rusqlite::params![id, limit as i64], |r| Ok((r.get::<_, String>(0)?, r.get::<_, f32>(1)?)))?;
                rows.collect::<rusqlite::Result<Vec<_>>>()
            })
            .await?;
        Ok(related)
    }

    /// Applies exponential decay to every edge and deletes those that fall
    /// below `min_activation`.
    pub async fn decay_edges(&self, lambda: f32, min_activation: f32) -> MemoryResult<u64> {
        let deleted = self
            .conn
            .call(move |db| {
                let now = Utc::now();
                let mut stmt = db.prepare("SELECT from_id, to_id, weight, co_occurrences, last_access FROM hebbian_edges")?;
                let edges: Vec<HebbianConnection> = stmt
                    .query_map([], |r| {
                        let last_access: i64 = r.get(4)?;
                        Ok(HebbianConnection {
                            from_id: r.get(0)?,
                            to_id: r.get(1)?,
                            weight: r.get(2)?,
                            co_occurrences: r.get::<_, i64>(3)? as u32,
                            last_access: DateTime::from_timestamp(last_access, 0).unwrap_or(now),
                        })
                    })?
                    .collect::<rusqlite::Result<_>>()?;
                drop(stmt);

                let mut deleted = 0u64;
                for mut edge in edges {
                    edge.decay(lambda, now);
                    if edge.weight < min_activation {
                        db.execute("DELETE FROM hebbian_edges WHERE from_id = ?1 AND to_id = ?2", rusqlite::params![edge.from_id, edge.to_id])?;
                        deleted += 1;
                    } else {
                        db.execute(
                            "UPDATE hebbian_edges SET weight = ?3 WHERE from_id = ?1 AND to_id = ?2",
                            rusqlite::params![edge.from_id, edge.to_id, edge.weight],
                        )?;
                    }
                }
                Ok(deleted)
            })
            .await?;
        Ok(deleted)
    }

    /// Background decay loop; `lambda`/`min_activation` come from
    /// configuration and are fixed for the life of the store.
    pub fn spawn_decay_task(&self, lambda: f32, min_activation: f32) {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(DECAY_INTERVAL);
            loop {
                ticker.tick().await;
                match store.decay_edges(lambda, min_activation).await {
                    Ok(deleted) => debug!(deleted, "memory::decay: swept hebbian edges"),
                    Err(err) => debug!(%err, "memory::decay: sweep failed"),
                }
            }
        });
    }

    /// Periodic `PRAGMA optimize`/`VACUUM` pass, standing in for the
    /// compaction/GC pass the long-term tier contract calls for.
    pub fn spawn_compaction_task(&self) {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(COMPACTION_INTERVAL);
            loop {
                ticker.tick().await;
                let result = store
                    .conn
                    .call(|db| {
                        db.execute_batch("PRAGMA optimize; PRAGMA incremental_vacuum;")?;
                        Ok(())
                    })
                    .await;
                if let Err(err) = result {
                    debug!(%err, "memory::compaction: pass failed");
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MemoryKind;

    #[tokio::test]
    async fn insert_then_get_round_trips() {
        let store = LongTermStore::open(":memory:").await.unwrap();
        let item = MemoryItem::new(MemoryKind::Pattern, "remember this", vec!["rust".to_string()], 0.6);
        let id = item.id.clone();
        store.insert(item).await.unwrap();

        let loaded = store.get(&id).await.unwrap();
        assert_eq!(loaded.content, "remember this");
        assert_eq!(loaded.tags, vec!["rust".to_string()]);
    }

    #[tokio::test]
    async fn list_by_tag_filters() {
        let store = LongTermStore::open(":memory:").await.unwrap();
        store.insert(MemoryItem::new(MemoryKind::Pattern, "a", vec!["x".to_string()], 0.1)).await.unwrap();
        store.insert(MemoryItem::new(MemoryKind::Pattern, "b", vec!["y".to_string()], 0.1)).await.unwrap();

        let items = store.list_by_tag("x").await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].content, "a");
    }

    #[tokio::test]
    async fn reinforce_pair_creates_bidirectional_edges() {
        let store = LongTermStore::open(":memory:").await.unwrap();
        let a = MemoryItem::new(MemoryKind::Pattern, "a", vec![], 0.1);
        let b = MemoryItem::new(MemoryKind::Pattern, "b", vec![], 0.1);
        let (a_id, b_id) = (a.id.clone(), b.id.clone());
        store.insert(a).await.unwrap();
        store.insert(b).await.unwrap();

        store.reinforce_pair(&a_id, &b_id).await.unwrap();
        let related_to_a = store.get_related(&a_id, 10).await.unwrap();
        let related_to_b = store.get_related(&b_id, 10).await.unwrap();
        assert_eq!(related_to_a, vec![(b_id, 0.1)]);
        assert_eq!(related_to_b.len(), 1);
    }

    #[tokio::test]
    async fn reinforcement_increases_weight_monotonically() {
        let store = LongTermStore::open(":memory:").await.unwrap();
        let a = MemoryItem::new(MemoryKind::Pattern, "a", vec![], 0.1);
        let b = MemoryItem::new(MemoryKind::Pattern, "b", vec![], 0.1);
        let (a_id, b_id) = (a.id.clone(), b.id.clone());
        store.insert(a).await.unwrap();
        store.insert(b).await.unwrap();

        store.reinforce_pair(&a_id, &b_id).await.unwrap();
        let first = store.get_related(&a_id, 10).await.unwrap()[0].1;
        store.reinforce_pair(&a_id, &b_id).await.unwrap();
        let second = store.get_related(&a_id, 10).await.unwrap()[0].1;
        assert!(second > first);
    }

    #[tokio::test]
    async fn decay_removes_weak_edges() {
        let store = LongTermStore::open(":memory:").await.unwrap();
        let a = MemoryItem::new(MemoryKind::Pattern, "a", vec![], 0.1);
        let b = MemoryItem::new(MemoryKind::Pattern, "b", vec![], 0.1);
        let (a_id, b_id) = (a.id.clone(), b.id.clone());
        store.insert(a).await.unwrap();
        store.insert(b).await.unwrap();
        store.reinforce_pair(&a_id, &b_id).await.unwrap();

        let deleted = store.decay_edges(1000.0, 0.5).await.unwrap();
        assert_eq!(deleted, 2);
        assert!(store.get_related(&a_id, 10).await.unwrap().is_empty());
    }
}
