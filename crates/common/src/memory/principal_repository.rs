use crate::domain::{
    is_admin_tier, is_coordinator_class, DomainError, DomainResult, GetPrincipalInput, Principal,
    PrincipalRepository, SaveTierCacheInput,
};
use crate::memory::MemoryStore;
use async_trait::async_trait;

/// In-memory implementation of PrincipalRepository backed by MemoryStore
pub struct MemoryPrincipalRepository {
    store: MemoryStore,
}

impl MemoryPrincipalRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl PrincipalRepository for MemoryPrincipalRepository {
    async fn get_principal(&self, input: GetPrincipalInput) -> DomainResult<Option<Principal>> {
        let inner = self.store.inner.read().await;
        Ok(inner.principals.get(&input.principal_id).cloned())
    }

    async fn list_active_coordinators(&self) -> DomainResult<Vec<Principal>> {
        let inner = self.store.inner.read().await;
        let mut coordinators: Vec<Principal> = inner
            .principals
            .values()
            .filter(|p| p.is_active && !p.is_system_admin)
            .filter(|p| {
                inner
                    .max_active_authority(&p.id)
                    .is_some_and(|authority| {
                        is_coordinator_class(authority) && !is_admin_tier(authority)
                    })
            })
            .cloned()
            .collect();
        // HashMap iteration order is arbitrary; keep listings stable
        coordinators.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(coordinators)
    }

    async fn save_tier_cache(&self, input: SaveTierCacheInput) -> DomainResult<()> {
        let mut inner = self.store.inner.write().await;
        let Some(principal) = inner.principals.get_mut(&input.principal_id) else {
            return Err(DomainError::PrincipalNotFound(
                input.principal_id.to_string(),
            ));
        };
        principal.authority_tier = Some(input.authority_tier);
        principal.snapshot_version = input.snapshot_version;
        Ok(())
    }
}
