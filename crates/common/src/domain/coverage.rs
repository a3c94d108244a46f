use crate::domain::id::{CoverageAreaId, LocationId, OrganizationId, PrincipalId, RoleId};
use crate::domain::result::DomainResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Named bundle of geographic units a coordinator or admin is responsible for.
///
/// Units may sit at any level of the hierarchy; whether higher-level units
/// flatten into their descendants is decided per assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageArea {
    pub id: CoverageAreaId,
    pub name: String,
    pub geographic_units: Vec<LocationId>,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Join row granting a coverage area to a principal.
///
/// The join tables are the source of truth for grants; the principal record
/// only carries a versioned snapshot of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageAssignment {
    pub principal_id: PrincipalId,
    pub coverage_area_id: CoverageAreaId,
    pub is_primary: bool,
    /// When set, province and district units expand to their descendants.
    pub auto_cover_descendants: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub assigned_at: Option<DateTime<Utc>>,
}

impl CoverageAssignment {
    /// Active and not expired at `now`. An expired assignment is treated as absent.
    pub fn is_current(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.expires_at.is_none_or(|expires_at| expires_at > now)
    }
}

/// Join row granting an organization membership to a principal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationAssignment {
    pub principal_id: PrincipalId,
    pub organization_id: OrganizationId,
    pub is_primary: bool,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub assigned_by: Option<PrincipalId>,
    pub assigned_at: Option<DateTime<Utc>>,
}

impl OrganizationAssignment {
    /// Active and not expired at `now`. An expired membership is treated as absent.
    pub fn is_current(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.expires_at.is_none_or(|expires_at| expires_at > now)
    }
}

/// Join row granting a role to a principal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleAssignment {
    pub principal_id: PrincipalId,
    pub role_id: RoleId,
    pub is_active: bool,
    pub assigned_at: Option<DateTime<Utc>>,
}

/// Input for getting a coverage area by ID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetCoverageAreaInput {
    pub coverage_area_id: CoverageAreaId,
}

/// Repository trait for coverage area storage operations
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CoverageAreaRepository: Send + Sync {
    /// Get a coverage area by ID, geographic units included
    async fn get_coverage_area(
        &self,
        input: GetCoverageAreaInput,
    ) -> DomainResult<Option<CoverageArea>>;
}

/// Input for listing a principal's role assignments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRoleAssignmentsInput {
    pub principal_id: PrincipalId,
}

/// Input for listing a principal's organization assignments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOrganizationAssignmentsInput {
    pub principal_id: PrincipalId,
}

/// Input for listing a principal's coverage assignments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListCoverageAssignmentsInput {
    pub principal_id: PrincipalId,
}

/// Input for reading a principal's assignment version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetAssignmentVersionInput {
    pub principal_id: PrincipalId,
}

/// Repository trait over the assignment join tables.
///
/// "Active" lists exclude rows that are deactivated or expired at read time.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    /// List the principal's active role assignments
    async fn list_active_role_assignments(
        &self,
        input: ListRoleAssignmentsInput,
    ) -> DomainResult<Vec<RoleAssignment>>;

    /// List the principal's active, non-expired organization assignments
    async fn list_active_organization_assignments(
        &self,
        input: ListOrganizationAssignmentsInput,
    ) -> DomainResult<Vec<OrganizationAssignment>>;

    /// List the principal's active, non-expired coverage assignments
    async fn list_active_coverage_assignments(
        &self,
        input: ListCoverageAssignmentsInput,
    ) -> DomainResult<Vec<CoverageAssignment>>;

    /// Monotonic counter bumped by every assignment mutation for the
    /// principal. A snapshot is trusted only when built at this version.
    async fn get_assignment_version(
        &self,
        input: GetAssignmentVersionInput,
    ) -> DomainResult<u64>;
}
