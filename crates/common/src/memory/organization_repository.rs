use crate::domain::{
    DomainResult, GetOrganizationInput, Organization, OrganizationRepository,
};
use crate::memory::MemoryStore;
use async_trait::async_trait;

/// In-memory implementation of OrganizationRepository backed by MemoryStore
pub struct MemoryOrganizationRepository {
    store: MemoryStore,
}

impl MemoryOrganizationRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl OrganizationRepository for MemoryOrganizationRepository {
    async fn get_organization(
        &self,
        input: GetOrganizationInput,
    ) -> DomainResult<Option<Organization>> {
        let inner = self.store.inner.read().await;
        Ok(inner.organizations.get(&input.organization_id).cloned())
    }
}
