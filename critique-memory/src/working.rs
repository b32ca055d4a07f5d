//! Working-tier ring buffer: fixed-size arena plus an id→slot index,
//! guarded by one mutex since add/remove touch both structures together.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::model::{MemoryItem, MemoryItemId};

struct Inner {
    slots: Vec<Option<MemoryItem>>,
    index: HashMap<MemoryItemId, usize>,
    next_slot: usize,
}

#[derive(Clone)]
pub struct WorkingMemory {
    inner: Arc<Mutex<Inner>>,
    capacity: usize,
}

impl WorkingMemory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { inner: Arc::new(Mutex::new(Inner { slots: (0..capacity).map(|_| None).collect(), index: HashMap::new(), next_slot: 0 })), capacity }
    }

    /// Inserts `item`, returning the item displaced from the overflowed
    /// slot (if any) so the caller can promote it into session tier.
    pub async fn add(&self, item: MemoryItem) -> Option<MemoryItem> {
        let mut guard = self.inner.lock().await;
        let slot = guard.next_slot;
        guard.next_slot = (guard.next_slot + 1) % self.capacity;

        let displaced = guard.slots[slot].take();
        if let Some(d) = &displaced {
            guard.index.remove(&d.id);
        }
        guard.index.insert(item.id.clone(), slot);
        guard.slots[slot] = Some(item);
        displaced
    }

    pub async fn get(&self, id: &str) -> Option<MemoryItem> {
        let guard = self.inner.lock().await;
        let slot = *guard.index.get(id)?;
        guard.slots[slot].clone()
    }

    pub async fn remove(&self, id: &str) -> Option<MemoryItem> {
        let mut guard = self.inner.lock().await;
        let slot = guard.index.remove(id)?;
        guard.slots[slot].take()
    }

    pub async fn all(&self) -> Vec<MemoryItem> {
        let guard = self.inner.lock().await;
        guard.slots.iter().flatten().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        let guard = self.inner.lock().await;
        guard.index.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MemoryKind;

    #[tokio::test]
    async fn add_and_get_round_trips() {
        let mem = WorkingMemory::new(4);
        let item = MemoryItem::new(MemoryKind::Pattern, "hello", vec![], 0.2);
        let id = item.id.clone();
        assert!(mem.add(item).await.is_none());
        assert_eq!(mem.get(&id).await.unwrap().content, "hello");
    }

    #[tokio::test]
    async fn overflow_displaces_oldest_slot() {
        let mem = WorkingMemory::new(2);
        let a = MemoryItem::new(MemoryKind::Pattern, "a", vec![], 0.1);
        let b = MemoryItem::new(MemoryKind::Pattern, "b", vec![], 0.1);
        let c = MemoryItem::new(MemoryKind::Pattern, "c", vec![], 0.1);
        let a_id = a.id.clone();

        assert!(mem.add(a).await.is_none());
        assert!(mem.add(b).await.is_none());
        let displaced = mem.add(c).await.unwrap();
        assert_eq!(displaced.id, a_id);
        assert!(mem.get(&a_id).await.is_none());
    }
}
