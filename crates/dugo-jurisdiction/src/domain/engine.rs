use crate::domain::{
    AuthorityResolver, CoordinatorResolver, CoverageExpander, EmptyOrgPolicy, JurisdictionFilter,
    OrganizationMatcher,
};
use common::domain::{
    AssignmentRepository, CoverageAreaRepository, LocationRepository, OrganizationRepository,
    PrincipalRepository, RoleRepository,
};
use common::memory::{
    MemoryAssignmentRepository, MemoryCoverageAreaRepository, MemoryLocationRepository,
    MemoryOrganizationRepository, MemoryPrincipalRepository, MemoryRoleRepository, MemoryStore,
};
use std::sync::Arc;
use tracing::debug;

/// Repository handles the engine is wired from.
#[derive(Clone)]
pub struct EngineRepositories {
    pub principal: Arc<dyn PrincipalRepository>,
    pub role: Arc<dyn RoleRepository>,
    pub organization: Arc<dyn OrganizationRepository>,
    pub coverage_area: Arc<dyn CoverageAreaRepository>,
    pub location: Arc<dyn LocationRepository>,
    pub assignment: Arc<dyn AssignmentRepository>,
}

impl EngineRepositories {
    pub fn from_memory_store(store: &MemoryStore) -> Self {
        Self {
            principal: Arc::new(MemoryPrincipalRepository::new(store.clone())),
            role: Arc::new(MemoryRoleRepository::new(store.clone())),
            organization: Arc::new(MemoryOrganizationRepository::new(store.clone())),
            coverage_area: Arc::new(MemoryCoverageAreaRepository::new(store.clone())),
            location: Arc::new(MemoryLocationRepository::new(store.clone())),
            assignment: Arc::new(MemoryAssignmentRepository::new(store.clone())),
        }
    }
}

/// Facade bundling the resolution services over one repository set.
///
/// The sub-services share the expander and matcher instances so snapshot
/// reads and membership lookups go through the same code path everywhere.
pub struct JurisdictionEngine {
    pub authority_resolver: Arc<AuthorityResolver>,
    pub coverage_expander: Arc<CoverageExpander>,
    pub organization_matcher: Arc<OrganizationMatcher>,
    pub jurisdiction_filter: Arc<JurisdictionFilter>,
    pub coordinator_resolver: Arc<CoordinatorResolver>,
}

impl JurisdictionEngine {
    pub fn new(repositories: EngineRepositories, empty_org_policy: EmptyOrgPolicy) -> Self {
        debug!(
            empty_org_policy = empty_org_policy.as_str(),
            "initializing jurisdiction engine"
        );

        let authority_resolver = Arc::new(AuthorityResolver::new(
            repositories.principal.clone(),
            repositories.role.clone(),
            repositories.assignment.clone(),
        ));
        let coverage_expander = Arc::new(CoverageExpander::new(
            repositories.coverage_area.clone(),
            repositories.location.clone(),
            repositories.assignment.clone(),
        ));
        let organization_matcher =
            Arc::new(OrganizationMatcher::new(repositories.assignment.clone()));
        let jurisdiction_filter = Arc::new(JurisdictionFilter::new(
            authority_resolver.clone(),
            coverage_expander.clone(),
            organization_matcher.clone(),
            repositories.principal.clone(),
            repositories.organization.clone(),
            empty_org_policy,
        ));
        let coordinator_resolver = Arc::new(CoordinatorResolver::new(
            repositories.principal.clone(),
            coverage_expander.clone(),
            organization_matcher.clone(),
        ));

        Self {
            authority_resolver,
            coverage_expander,
            organization_matcher,
            jurisdiction_filter,
            coordinator_resolver,
        }
    }
}
