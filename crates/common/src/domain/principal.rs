use crate::domain::id::{CoverageAreaId, LocationId, OrganizationId, PrincipalId, RoleId};
use crate::domain::result::DomainResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Embedded copy of a role grant, denormalized for fast-path tier reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleGrant {
    pub role_id: RoleId,
    pub role_code: String,
    pub role_authority: i32,
    pub is_active: bool,
    pub assigned_at: Option<DateTime<Utc>>,
}

/// Embedded copy of an organization membership
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationMembership {
    pub organization_id: OrganizationId,
    pub is_primary: bool,
    pub is_active: bool,
    pub assigned_by: Option<PrincipalId>,
}

/// Pre-flattened geographic footprint of one coverage assignment.
///
/// `municipality_ids` holds municipality-level and finer unit ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageSnapshot {
    pub coverage_area_id: CoverageAreaId,
    pub district_ids: Vec<LocationId>,
    pub municipality_ids: Vec<LocationId>,
}

/// Residence geography for location-governed principals (stakeholders)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StakeholderLocation {
    pub municipality_id: Option<LocationId>,
    pub barangay_id: Option<LocationId>,
}

/// Principal (user) entity.
///
/// The embedded `roles`, `organizations`, and `coverage_areas` arrays plus
/// `authority_tier` are a read-through snapshot of the assignment join
/// tables, stamped with the assignment version they were built from. A
/// principal is either coverage-area-governed (coordinators and admins) or
/// location-governed (stakeholders), decided by authority tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: PrincipalId,
    pub email: String,
    pub name: String,
    pub is_system_admin: bool,
    pub is_active: bool,
    /// Cached tier; trusted only when the snapshot version is current.
    pub authority_tier: Option<i32>,
    /// Assignment version the embedded snapshot was built from.
    pub snapshot_version: u64,
    pub roles: Vec<RoleGrant>,
    pub organizations: Vec<OrganizationMembership>,
    pub coverage_areas: Vec<CoverageSnapshot>,
    pub location: Option<StakeholderLocation>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Principal {
    /// Minimal principal with no grants, used as a fixture base.
    pub fn bare(id: PrincipalId, email: &str, name: &str) -> Self {
        Self {
            id,
            email: email.to_string(),
            name: name.to_string(),
            is_system_admin: false,
            is_active: true,
            authority_tier: None,
            snapshot_version: 0,
            roles: Vec::new(),
            organizations: Vec::new(),
            coverage_areas: Vec::new(),
            location: None,
            created_at: None,
            updated_at: None,
        }
    }
}

/// Input for getting a principal by ID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetPrincipalInput {
    pub principal_id: PrincipalId,
}

/// Input for persisting a freshly computed authority tier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveTierCacheInput {
    pub principal_id: PrincipalId,
    pub authority_tier: i32,
    /// Assignment version the tier was computed at.
    pub snapshot_version: u64,
}

/// Repository trait for principal storage operations
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PrincipalRepository: Send + Sync {
    /// Get a principal by ID
    async fn get_principal(&self, input: GetPrincipalInput) -> DomainResult<Option<Principal>>;

    /// List active principals whose current grants place them in the
    /// coordinator class (admins excluded)
    async fn list_active_coordinators(&self) -> DomainResult<Vec<Principal>>;

    /// Persist a recomputed authority tier, stamped with the assignment
    /// version it was derived from. Idempotent overwrite.
    async fn save_tier_cache(&self, input: SaveTierCacheInput) -> DomainResult<()>;
}
