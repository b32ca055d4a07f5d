use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type MemoryItemId = String;

pub fn new_item_id() -> MemoryItemId {
    uuid::Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryKind {
    Issue,
    Fix,
    Pattern,
    Context,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryItem {
    pub id: MemoryItemId,
    pub kind: MemoryKind,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
    pub importance: f32,
    pub access_count: u32,
    pub created_at: DateTime<Utc>,
    pub last_accessed_at: DateTime<Utc>,
}

impl MemoryItem {
    pub fn new(kind: MemoryKind, content: impl Into<String>, tags: Vec<String>, importance: f32) -> Self {
        let now = Utc::now();
        Self { id: new_item_id(), kind, content: content.into(), tags, embedding: None, importance, access_count: 0, created_at: now, last_accessed_at: now }
    }

    pub fn touch(&mut self) {
        self.access_count += 1;
        self.last_accessed_at = Utc::now();
    }

    /// From session, items promote to long-term if important or accessed
    /// often enough, per the §4.9 promotion policy.
    pub fn eligible_for_longterm(&self) -> bool {
        self.importance >= 0.5 || self.access_count >= 3
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HebbianConnection {
    pub from_id: MemoryItemId,
    pub to_id: MemoryItemId,
    pub weight: f32,
    pub co_occurrences: u32,
    pub last_access: DateTime<Utc>,
}

impl HebbianConnection {
    pub const INITIAL_WEIGHT: f32 = 0.1;
    pub const REINFORCE_STEP: f32 = 0.1;

    pub fn new(from_id: MemoryItemId, to_id: MemoryItemId) -> Self {
        Self { from_id, to_id, weight: Self::INITIAL_WEIGHT, co_occurrences: 1, last_access: Utc::now() }
    }

    /// w <- min(1, w + step * (1 - w)); called whenever `from`/`to` are
    /// returned together from a search.
    pub fn reinforce(&mut self) {
        self.weight = (self.weight + Self::REINFORCE_STEP * (1.0 - self.weight)).min(1.0);
        self.co_occurrences += 1;
        self.last_access = Utc::now();
    }

    /// w <- w * exp(-lambda * hours_elapsed); `lambda` controls decay rate.
    pub fn decay(&mut self, lambda: f32, now: DateTime<Utc>) {
        let hours = (now - self.last_access).num_seconds() as f32 / 3600.0;
        if hours > 0.0 {
            self.weight *= (-lambda * hours).exp();
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub item: MemoryItem,
    pub score: f32,
}
