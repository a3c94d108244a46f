use crate::domain::{
    CoverageArea, CoverageAreaRepository, DomainResult, GetCoverageAreaInput,
};
use crate::memory::MemoryStore;
use async_trait::async_trait;

/// In-memory implementation of CoverageAreaRepository backed by MemoryStore
pub struct MemoryCoverageAreaRepository {
    store: MemoryStore,
}

impl MemoryCoverageAreaRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CoverageAreaRepository for MemoryCoverageAreaRepository {
    async fn get_coverage_area(
        &self,
        input: GetCoverageAreaInput,
    ) -> DomainResult<Option<CoverageArea>> {
        let inner = self.store.inner.read().await;
        Ok(inner.coverage_areas.get(&input.coverage_area_id).cloned())
    }
}
