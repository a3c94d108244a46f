use crate::domain::{
    DomainResult, GetLocationChildrenInput, GetLocationInput, Location, LocationRepository,
};
use crate::memory::MemoryStore;
use async_trait::async_trait;

/// In-memory implementation of LocationRepository backed by MemoryStore
pub struct MemoryLocationRepository {
    store: MemoryStore,
}

impl MemoryLocationRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl LocationRepository for MemoryLocationRepository {
    async fn get_location(&self, input: GetLocationInput) -> DomainResult<Option<Location>> {
        let inner = self.store.inner.read().await;
        Ok(inner.locations.get(&input.location_id).cloned())
    }

    async fn get_location_children(
        &self,
        input: GetLocationChildrenInput,
    ) -> DomainResult<Vec<Location>> {
        let inner = self.store.inner.read().await;
        let mut children: Vec<Location> = inner
            .locations
            .values()
            .filter(|l| l.parent_id.as_ref() == Some(&input.parent_id))
            .filter(|l| input.kind.is_none_or(|kind| l.kind == kind))
            .cloned()
            .collect();
        children.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(children)
    }
}
