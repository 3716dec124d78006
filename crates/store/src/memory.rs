use async_trait::async_trait;
use events::{Event, EventStore, QueryLimit, StorageError};
use tokio::sync::RwLock;

/// [`EventStore`] kept entirely in process memory.
///
/// Contents are lost when the store is dropped.
#[derive(Debug, Default)]
pub struct MemoryEventStore {
    events: RwLock<Vec<Event>>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn insert(&self, event: &Event) -> Result<(), StorageError> {
        self.events.write().await.push(event.clone());
        Ok(())
    }

    async fn query(&self, limit: QueryLimit) -> Result<Vec<Event>, StorageError> {
        let events = self.events.read().await;
        let mut indexed: Vec<(usize, &Event)> = events.iter().enumerate().collect();
        // Newest timestamp first; later insertion wins ties.
        indexed.sort_by(|(ia, a), (ib, b)| {
            b.timestamp().cmp(&a.timestamp()).then_with(|| ib.cmp(ia))
        });
        Ok(indexed
            .into_iter()
            .take(limit.as_usize())
            .map(|(_, event)| event.clone())
            .collect())
    }
}
