use crate::domain::{DomainResult, GetRoleInput, GetRolesByIdsInput, Role, RoleRepository};
use crate::memory::MemoryStore;
use async_trait::async_trait;

/// In-memory implementation of RoleRepository backed by MemoryStore
pub struct MemoryRoleRepository {
    store: MemoryStore,
}

impl MemoryRoleRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RoleRepository for MemoryRoleRepository {
    async fn get_role(&self, input: GetRoleInput) -> DomainResult<Option<Role>> {
        let inner = self.store.inner.read().await;
        Ok(inner.roles.get(&input.role_id).cloned())
    }

    async fn get_roles_by_ids(&self, input: GetRolesByIdsInput) -> DomainResult<Vec<Role>> {
        let inner = self.store.inner.read().await;
        Ok(input
            .role_ids
            .iter()
            .filter_map(|role_id| inner.roles.get(role_id).cloned())
            .collect())
    }
}
