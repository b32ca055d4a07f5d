//! `MemoryStore`: the three-tier facade. `MemoryHandle::Noop` satisfies the
//! same interface with zero allocation when memory is disabled, so callers
//! never branch on whether memory is turned on.

use std::path::Path;

use critique_providers::ProviderClient;

use crate::config::MemoryConfig;
use crate::errors::MemoryResult;
use crate::longterm::LongTermStore;
use crate::model::{MemoryItem, MemoryItemId, MemoryKind, SearchHit};
use crate::search;
use crate::session::SessionMemory;
use crate::working::WorkingMemory;

const LONGTERM_SEARCH_SAMPLE: usize = 1000;

pub struct MemoryStore {
    working: WorkingMemory,
    session: SessionMemory,
    longterm: LongTermStore,
    hebbian_decay_rate: f32,
    hebbian_min_activation: f32,
}

impl MemoryStore {
    pub async fn open(config: &MemoryConfig) -> MemoryResult<Self> {
        std::fs::create_dir_all(&config.dir)?;
        let db_path = Path::new(&config.dir).join("longterm.sqlite3");
        let longterm = LongTermStore::open(db_path.to_string_lossy().to_string()).await?;
        longterm.spawn_decay_task(config.hebbian.decay_rate, config.hebbian.min_activation);
        longterm.spawn_compaction_task();

        Ok(Self {
            working: WorkingMemory::new(config.working_size),
            session: SessionMemory::new(config.session_capacity, config.session_ttl_secs),
            longterm,
            hebbian_decay_rate: config.hebbian.decay_rate,
            hebbian_min_activation: config.hebbian.min_activation,
        })
    }

    /// Adds to working tier; a displaced item is promoted into session,
    /// and from there into long-term if it clears the promotion bar.
    pub async fn remember(&self, kind: MemoryKind, content: impl Into<String>, tags: Vec<String>, importance: f32) -> MemoryItemId {
        let item = MemoryItem::new(kind, content, tags, importance);
        let id = item.id.clone();
        if let Some(displaced) = self.working.add(item).await {
            self.promote_from_working(displaced).await;
        }
        id
    }

    async fn promote_from_working(&self, mut item: MemoryItem) {
        item.touch();
        let eligible = item.eligible_for_longterm();
        self.session.put(item.clone()).await;
        if eligible {
            let _ = self.longterm.insert(item).await;
        }
    }

    pub async fn get(&self, id: &str) -> Option<MemoryItem> {
        if let Some(item) = self.working.get(id).await {
            return Some(item);
        }
        if let Some(mut item) = self.session.get(id).await {
            item.touch();
            if item.eligible_for_longterm() {
                let _ = self.longterm.insert(item.clone()).await;
            }
            self.session.put(item.clone()).await;
            return Some(item);
        }
        self.longterm.get(id).await.ok()
    }

    async fn candidates(&self) -> MemoryResult<Vec<MemoryItem>> {
        let mut items = self.working.all().await;
        items.extend(self.session.all().await);
        items.extend(self.longterm.top_n(LONGTERM_SEARCH_SAMPLE).await?);
        Ok(items)
    }

    /// Computes the query embedding via `provider` when available and
    /// `semantic_search` is enabled; otherwise ranks by token overlap.
    pub async fn search(&self, provider: Option<&ProviderClient>, query: &str, limit: usize) -> MemoryResult<Vec<SearchHit>> {
        let candidates = self.candidates().await?;

        let hits = if let Some(provider) = provider {
            match provider.get_embedding(query).await {
                Ok(embedding) => search::rank_by_embedding(candidates, &embedding, limit),
                Err(_) => search::rank_by_tokens(candidates, query, limit),
            }
        } else {
            search::rank_by_tokens(candidates, query, limit)
        };

        let ids: Vec<MemoryItemId> = hits.iter().map(|h| h.item.id.clone()).collect();
        self.record_co_access(&ids).await;
        Ok(hits)
    }

    /// Reinforces every unordered pair among `ids`, matching the
    /// `RecordCoAccess` contract triggered by each search call.
    async fn record_co_access(&self, ids: &[MemoryItemId]) {
        for i in 0..ids.len() {
            for j in (i + 1)..ids.len() {
                let _ = self.longterm.reinforce_pair(&ids[i], &ids[j]).await;
            }
        }
    }

    pub async fn get_related(&self, id: &str, limit: usize) -> MemoryResult<Vec<(MemoryItemId, f32)>> {
        self.longterm.get_related(id, limit).await
    }

    pub async fn decay_now(&self) -> MemoryResult<u64> {
        self.longterm.decay_edges(self.hebbian_decay_rate, self.hebbian_min_activation).await
    }
}

/// Selected when memory is disabled: every operation is a no-op returning
/// empty results, with no tier allocated.
#[derive(Default)]
pub struct NoopMemory;

impl NoopMemory {
    pub async fn remember(&self, _kind: MemoryKind, _content: impl Into<String>, _tags: Vec<String>, _importance: f32) -> Option<MemoryItemId> {
        None
    }

    pub async fn search(&self, _provider: Option<&ProviderClient>, _query: &str, _limit: usize) -> Vec<SearchHit> {
        Vec::new()
    }

    pub async fn get_related(&self, _id: &str, _limit: usize) -> Vec<(MemoryItemId, f32)> {
        Vec::new()
    }
}

pub enum MemoryHandle {
    Active(Box<MemoryStore>),
    Noop(NoopMemory),
}

impl MemoryHandle {
    pub async fn new(config: &MemoryConfig) -> MemoryResult<Self> {
        if !config.enabled {
            return Ok(Self::Noop(NoopMemory));
        }
        Ok(Self::Active(Box::new(MemoryStore::open(config).await?)))
    }

    /// Callers never need to branch on whether memory is active; a `Noop`
    /// handle just drops the item.
    pub async fn remember(&self, kind: MemoryKind, content: impl Into<String>, tags: Vec<String>, importance: f32) -> Option<MemoryItemId> {
        match self {
            MemoryHandle::Active(store) => Some(store.remember(kind, content, tags, importance).await),
            MemoryHandle::Noop(noop) => noop.remember(kind, content, tags, importance).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoryConfig;

    #[tokio::test]
    async fn remember_then_get_round_trips_through_working_tier() {
        let dir = tempfile::tempdir().unwrap();
        let config = MemoryConfig { enabled: true, dir: dir.path().to_string_lossy().to_string(), ..Default::default() };
        let store = MemoryStore::open(&config).await.unwrap();

        let id = store.remember(MemoryKind::Pattern, "remember this detail", vec![], 0.2).await;
        let item = store.get(&id).await.unwrap();
        assert_eq!(item.content, "remember this detail");
    }

    #[tokio::test]
    async fn noop_handle_returns_empty_results() {
        let config = MemoryConfig { enabled: false, ..Default::default() };
        let handle = MemoryHandle::new(&config).await.unwrap();
        match handle {
            MemoryHandle::Noop(noop) => {
                assert!(noop.search(None, "anything", 10).await.is_empty());
            }
            MemoryHandle::Active(_) => panic!("expected noop handle"),
        }
    }

    #[tokio::test]
    async fn search_without_provider_falls_back_to_tokens() {
        let dir = tempfile::tempdir().unwrap();
        let config = MemoryConfig { enabled: true, dir: dir.path().to_string_lossy().to_string(), ..Default::default() };
        let store = MemoryStore::open(&config).await.unwrap();
        store.remember(MemoryKind::Pattern, "rust ownership rules", vec![], 0.1).await;

        let hits = store.search(None, "ownership", 10).await.unwrap();
        assert_eq!(hits.len(), 1);
    }
}
