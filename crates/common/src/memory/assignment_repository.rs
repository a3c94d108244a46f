use crate::domain::{
    AssignmentRepository, CoverageAssignment, DomainResult, GetAssignmentVersionInput,
    ListCoverageAssignmentsInput, ListOrganizationAssignmentsInput, ListRoleAssignmentsInput,
    OrganizationAssignment, RoleAssignment,
};
use crate::memory::MemoryStore;
use async_trait::async_trait;
use chrono::Utc;

/// In-memory implementation of AssignmentRepository backed by MemoryStore
pub struct MemoryAssignmentRepository {
    store: MemoryStore,
}

impl MemoryAssignmentRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AssignmentRepository for MemoryAssignmentRepository {
    async fn list_active_role_assignments(
        &self,
        input: ListRoleAssignmentsInput,
    ) -> DomainResult<Vec<RoleAssignment>> {
        let inner = self.store.inner.read().await;
        Ok(inner
            .role_assignments
            .iter()
            .filter(|a| a.principal_id == input.principal_id && a.is_active)
            .cloned()
            .collect())
    }

    async fn list_active_organization_assignments(
        &self,
        input: ListOrganizationAssignmentsInput,
    ) -> DomainResult<Vec<OrganizationAssignment>> {
        let now = Utc::now();
        let inner = self.store.inner.read().await;
        Ok(inner
            .organization_assignments
            .iter()
            .filter(|a| a.principal_id == input.principal_id && a.is_current(now))
            .cloned()
            .collect())
    }

    async fn list_active_coverage_assignments(
        &self,
        input: ListCoverageAssignmentsInput,
    ) -> DomainResult<Vec<CoverageAssignment>> {
        let now = Utc::now();
        let inner = self.store.inner.read().await;
        Ok(inner
            .coverage_assignments
            .iter()
            .filter(|a| a.principal_id == input.principal_id && a.is_current(now))
            .cloned()
            .collect())
    }

    async fn get_assignment_version(
        &self,
        input: GetAssignmentVersionInput,
    ) -> DomainResult<u64> {
        let inner = self.store.inner.read().await;
        Ok(inner.version_of(&input.principal_id))
    }
}
