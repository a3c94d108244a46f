use common::domain::{
    AssignmentRepository, DomainResult, GetAssignmentVersionInput, GetPrincipalInput,
    GetRolesByIdsInput, ListRoleAssignmentsInput, Permission, Principal, PrincipalId,
    PrincipalRepository, RoleRepository, SaveTierCacheInput, BASIC_USER_TIER, COORDINATOR_TIER,
    OPERATIONAL_ADMIN_TIER, STAKEHOLDER_TIER, SYSTEM_ADMIN_TIER,
};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

const STAFF_RESOURCE: &str = "staff";
const REQUEST_RESOURCE: &str = "request";
const EVENT_RESOURCE: &str = "event";
const CREATE_ACTION: &str = "create";
const UPDATE_ACTION: &str = "update";
const REVIEW_ACTION: &str = "review";

/// Strategy that produced a tier, in ladder order. First match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStrategy {
    /// `is_system_admin` flag, absolute override.
    SystemAdminFlag,
    /// Persisted `authority_tier`, trusted only at a current snapshot version.
    CachedTier,
    /// Max authority over the embedded active role grants.
    RoleSnapshot,
    /// Recomputed from the live permission set.
    PermissionScan,
    /// Nothing to go on; basic user.
    DefaultTier,
}

impl ResolutionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionStrategy::SystemAdminFlag => "system_admin_flag",
            ResolutionStrategy::CachedTier => "cached_tier",
            ResolutionStrategy::RoleSnapshot => "role_snapshot",
            ResolutionStrategy::PermissionScan => "permission_scan",
            ResolutionStrategy::DefaultTier => "default_tier",
        }
    }
}

/// Outcome of authority resolution: the tier and how it was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierResolution {
    pub tier: i32,
    pub strategy: ResolutionStrategy,
}

/// Computes a principal's authority tier.
///
/// Resolution walks a fixed strategy ladder; the embedded snapshot
/// (cached tier, role grants) is consulted only when its recorded version
/// matches the live assignment version, otherwise resolution falls through
/// to a live permission scan. Resolution is a pure read; `resolve_and_cache`
/// is the one operation that writes.
pub struct AuthorityResolver {
    principal_repository: Arc<dyn PrincipalRepository>,
    role_repository: Arc<dyn RoleRepository>,
    assignment_repository: Arc<dyn AssignmentRepository>,
}

impl AuthorityResolver {
    pub fn new(
        principal_repository: Arc<dyn PrincipalRepository>,
        role_repository: Arc<dyn RoleRepository>,
        assignment_repository: Arc<dyn AssignmentRepository>,
    ) -> Self {
        Self {
            principal_repository,
            role_repository,
            assignment_repository,
        }
    }

    /// Resolve by id. A missing principal is not an error: it resolves to
    /// the basic user tier with a diagnostic, so callers can always obtain
    /// a tier for an id they were handed.
    #[instrument(skip(self), fields(principal_id = %principal_id))]
    pub async fn resolve_by_id(&self, principal_id: &PrincipalId) -> DomainResult<TierResolution> {
        let principal = self
            .principal_repository
            .get_principal(GetPrincipalInput {
                principal_id: principal_id.clone(),
            })
            .await?;
        match principal {
            Some(principal) => self.resolve(&principal).await,
            None => {
                warn!(principal_id = %principal_id, "principal not found, resolving to basic user tier");
                Ok(TierResolution {
                    tier: BASIC_USER_TIER,
                    strategy: ResolutionStrategy::DefaultTier,
                })
            }
        }
    }

    /// Walk the strategy ladder for an already-loaded principal.
    pub async fn resolve(&self, principal: &Principal) -> DomainResult<TierResolution> {
        if principal.is_system_admin {
            return Ok(TierResolution {
                tier: SYSTEM_ADMIN_TIER,
                strategy: ResolutionStrategy::SystemAdminFlag,
            });
        }
        let live_version = self.live_assignment_version(&principal.id).await?;
        self.resolve_at_version(principal, live_version).await
    }

    /// Resolve, and when the tier had to be recomputed from permissions,
    /// persist it stamped with the assignment version it was derived from.
    /// The version is read once, before the scan; a mutation landing
    /// mid-scan leaves the stamp behind the live version and the next read
    /// rescans instead of trusting the cache. Concurrent callers over the
    /// same assignments write the same value, so the overwrite is safe.
    #[instrument(skip(self), fields(principal_id = %principal_id))]
    pub async fn resolve_and_cache(
        &self,
        principal_id: &PrincipalId,
    ) -> DomainResult<TierResolution> {
        let principal = self
            .principal_repository
            .get_principal(GetPrincipalInput {
                principal_id: principal_id.clone(),
            })
            .await?;
        let Some(principal) = principal else {
            warn!(principal_id = %principal_id, "principal not found, resolving to basic user tier");
            return Ok(TierResolution {
                tier: BASIC_USER_TIER,
                strategy: ResolutionStrategy::DefaultTier,
            });
        };
        if principal.is_system_admin {
            return Ok(TierResolution {
                tier: SYSTEM_ADMIN_TIER,
                strategy: ResolutionStrategy::SystemAdminFlag,
            });
        }

        let scanned_version = self.live_assignment_version(principal_id).await?;
        let resolution = self.resolve_at_version(&principal, scanned_version).await?;
        if resolution.strategy == ResolutionStrategy::PermissionScan {
            self.principal_repository
                .save_tier_cache(SaveTierCacheInput {
                    principal_id: principal_id.clone(),
                    authority_tier: resolution.tier,
                    snapshot_version: scanned_version,
                })
                .await?;
            debug!(
                principal_id = %principal_id,
                tier = resolution.tier,
                version = scanned_version,
                "persisted recomputed authority tier"
            );
        }
        Ok(resolution)
    }

    /// The ladder below the system-admin flag. `live_version` is the
    /// caller's single version read; the freshness check and any cache
    /// stamp both use it.
    async fn resolve_at_version(
        &self,
        principal: &Principal,
        live_version: u64,
    ) -> DomainResult<TierResolution> {
        let snapshot_fresh = principal.snapshot_version == live_version;
        if !snapshot_fresh {
            debug!(
                principal_id = %principal.id,
                snapshot_version = principal.snapshot_version,
                live_version,
                "snapshot version behind live assignments, skipping cached strategies"
            );
        }

        if snapshot_fresh {
            if let Some(tier) = principal.authority_tier {
                return Ok(TierResolution {
                    tier,
                    strategy: ResolutionStrategy::CachedTier,
                });
            }

            let snapshot_max = principal
                .roles
                .iter()
                .filter(|grant| grant.is_active)
                .map(|grant| grant.role_authority)
                .max();
            if let Some(tier) = snapshot_max {
                return Ok(TierResolution {
                    tier,
                    strategy: ResolutionStrategy::RoleSnapshot,
                });
            }
        }

        if let Some(tier) = self.scan_permissions(&principal.id).await? {
            return Ok(TierResolution {
                tier,
                strategy: ResolutionStrategy::PermissionScan,
            });
        }

        Ok(TierResolution {
            tier: BASIC_USER_TIER,
            strategy: ResolutionStrategy::DefaultTier,
        })
    }

    async fn live_assignment_version(&self, principal_id: &PrincipalId) -> DomainResult<u64> {
        self.assignment_repository
            .get_assignment_version(GetAssignmentVersionInput {
                principal_id: principal_id.clone(),
            })
            .await
    }

    /// Classify the live permission set. Returns None when the principal has
    /// no active role assignments at all, leaving the ladder to its default.
    async fn scan_permissions(&self, principal_id: &PrincipalId) -> DomainResult<Option<i32>> {
        let assignments = self
            .assignment_repository
            .list_active_role_assignments(ListRoleAssignmentsInput {
                principal_id: principal_id.clone(),
            })
            .await?;
        if assignments.is_empty() {
            return Ok(None);
        }

        let role_ids = assignments.into_iter().map(|a| a.role_id).collect();
        let roles = self
            .role_repository
            .get_roles_by_ids(GetRolesByIdsInput { role_ids })
            .await?;
        let permissions: Vec<Permission> = roles
            .into_iter()
            .filter(|role| role.is_active)
            .flat_map(|role| role.permissions)
            .collect();
        Ok(Some(classify_permissions(&permissions)))
    }
}

/// Map a permission set to a tier.
///
/// Review-without-operational is checked before operational because a
/// principal may hold both, and operational implies the larger capability
/// set. The bare `staff` resource (or the resource wildcard) marks staff
/// administration; subtyped `staff:<kind>` grants only count as operational.
fn classify_permissions(permissions: &[Permission]) -> i32 {
    if permissions
        .iter()
        .any(|p| p.grants(Permission::WILDCARD, Permission::WILDCARD))
    {
        return SYSTEM_ADMIN_TIER;
    }

    if permissions.iter().any(|p| {
        p.applies_to(STAFF_RESOURCE) && (p.allows(CREATE_ACTION) || p.allows(UPDATE_ACTION))
    }) {
        return OPERATIONAL_ADMIN_TIER;
    }

    let operational = permissions.iter().any(|p| {
        (p.applies_to(REQUEST_RESOURCE) && p.allows(CREATE_ACTION))
            || (p.applies_to(EVENT_RESOURCE)
                && (p.allows(CREATE_ACTION) || p.allows(UPDATE_ACTION)))
            || (p.applies_to_family(STAFF_RESOURCE)
                && (p.allows(CREATE_ACTION) || p.allows(UPDATE_ACTION)))
    });
    let reviews_requests = permissions
        .iter()
        .any(|p| p.applies_to(REQUEST_RESOURCE) && p.allows(REVIEW_ACTION));

    if reviews_requests && !operational {
        return STAKEHOLDER_TIER;
    }
    if operational {
        return COORDINATOR_TIER;
    }
    BASIC_USER_TIER
}
