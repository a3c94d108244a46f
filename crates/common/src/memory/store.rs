use crate::domain::{
    CoverageArea, CoverageAreaId, CoverageAssignment, CoverageSnapshot, DomainError, DomainResult,
    Location, LocationId, LocationKind, Organization, OrganizationAssignment, OrganizationId,
    OrganizationMembership, Principal, PrincipalId, Role, RoleAssignment, RoleGrant, RoleId,
    StakeholderLocation,
};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
pub(crate) struct StoreInner {
    pub(crate) principals: HashMap<PrincipalId, Principal>,
    pub(crate) roles: HashMap<RoleId, Role>,
    pub(crate) organizations: HashMap<OrganizationId, Organization>,
    pub(crate) coverage_areas: HashMap<CoverageAreaId, CoverageArea>,
    pub(crate) locations: HashMap<LocationId, Location>,
    pub(crate) role_assignments: Vec<RoleAssignment>,
    pub(crate) organization_assignments: Vec<OrganizationAssignment>,
    pub(crate) coverage_assignments: Vec<CoverageAssignment>,
    pub(crate) assignment_versions: HashMap<PrincipalId, u64>,
}

impl StoreInner {
    fn bump_version(&mut self, principal_id: &PrincipalId) {
        let version = self
            .assignment_versions
            .entry(principal_id.clone())
            .or_insert(0);
        *version += 1;
    }

    pub(crate) fn version_of(&self, principal_id: &PrincipalId) -> u64 {
        self.assignment_versions
            .get(principal_id)
            .copied()
            .unwrap_or(0)
    }

    /// Highest authority among the principal's active role grants,
    /// read from the join tables.
    pub(crate) fn max_active_authority(&self, principal_id: &PrincipalId) -> Option<i32> {
        self.role_assignments
            .iter()
            .filter(|a| &a.principal_id == principal_id && a.is_active)
            .filter_map(|a| self.roles.get(&a.role_id))
            .filter(|role| role.is_active)
            .map(|role| role.authority)
            .max()
    }

    fn children_of(&self, parent_id: &LocationId, kind: LocationKind) -> Vec<LocationId> {
        self.locations
            .values()
            .filter(|l| l.parent_id.as_ref() == Some(parent_id) && l.kind == kind)
            .map(|l| l.id.clone())
            .collect()
    }

    /// Pre-flatten a coverage assignment's geographic footprint. The
    /// assignment's descendant flag decides whether province and district
    /// units expand into their children; without it they stay literal, and
    /// a literal province has no flattened representation (the snapshot can
    /// only ever under-report relative to a live expansion).
    fn flatten_assignment(&self, assignment: &CoverageAssignment) -> CoverageSnapshot {
        let mut district_ids = Vec::new();
        let mut municipality_ids = Vec::new();

        let area = self
            .coverage_areas
            .get(&assignment.coverage_area_id)
            .filter(|area| area.is_active);
        if let Some(area) = area {
            for unit_id in &area.geographic_units {
                let Some(unit) = self.locations.get(unit_id) else {
                    debug!(
                        location_id = %unit_id,
                        coverage_area_id = %area.id,
                        "coverage area references missing location, skipping unit in snapshot"
                    );
                    continue;
                };
                match unit.kind {
                    LocationKind::Municipality | LocationKind::Barangay => {
                        municipality_ids.push(unit.id.clone());
                    }
                    LocationKind::District => {
                        district_ids.push(unit.id.clone());
                        if assignment.auto_cover_descendants {
                            municipality_ids
                                .extend(self.children_of(&unit.id, LocationKind::Municipality));
                        }
                    }
                    LocationKind::Province => {
                        if assignment.auto_cover_descendants {
                            for district_id in self.children_of(&unit.id, LocationKind::District) {
                                municipality_ids.extend(
                                    self.children_of(&district_id, LocationKind::Municipality),
                                );
                                district_ids.push(district_id);
                            }
                        }
                    }
                }
            }
        }

        district_ids.sort();
        district_ids.dedup();
        municipality_ids.sort();
        municipality_ids.dedup();

        CoverageSnapshot {
            coverage_area_id: assignment.coverage_area_id.clone(),
            district_ids,
            municipality_ids,
        }
    }
}

/// Shared in-memory backing store implementing every repository trait.
///
/// Stands where the production document-store adapter would. The assignment
/// join tables are the source of truth; every mutation bumps the affected
/// principal's assignment version so an out-of-date embedded snapshot is
/// detectable by version comparison.
#[derive(Clone, Default)]
pub struct MemoryStore {
    pub(crate) inner: Arc<RwLock<StoreInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_location(&self, location: Location) {
        let mut inner = self.inner.write().await;
        inner.locations.insert(location.id.clone(), location);
    }

    pub async fn insert_role(&self, role: Role) {
        let mut inner = self.inner.write().await;
        inner.roles.insert(role.id.clone(), role);
    }

    pub async fn insert_organization(&self, organization: Organization) {
        let mut inner = self.inner.write().await;
        inner
            .organizations
            .insert(organization.id.clone(), organization);
    }

    pub async fn insert_coverage_area(&self, coverage_area: CoverageArea) {
        let mut inner = self.inner.write().await;
        inner
            .coverage_areas
            .insert(coverage_area.id.clone(), coverage_area);
    }

    pub async fn insert_principal(&self, principal: Principal) {
        let mut inner = self.inner.write().await;
        inner.principals.insert(principal.id.clone(), principal);
    }

    /// Grant a role to a principal. Re-assigning the same role replaces the
    /// earlier row. Bumps the principal's assignment version.
    pub async fn assign_role(&self, assignment: RoleAssignment) -> DomainResult<()> {
        let mut inner = self.inner.write().await;
        if !inner.principals.contains_key(&assignment.principal_id) {
            return Err(DomainError::PrincipalNotFound(
                assignment.principal_id.to_string(),
            ));
        }
        if !inner.roles.contains_key(&assignment.role_id) {
            return Err(DomainError::RoleNotFound(assignment.role_id.to_string()));
        }
        let principal_id = assignment.principal_id.clone();
        inner.role_assignments.retain(|a| {
            !(a.principal_id == assignment.principal_id && a.role_id == assignment.role_id)
        });
        inner.role_assignments.push(assignment);
        inner.bump_version(&principal_id);
        Ok(())
    }

    /// Grant an organization membership. Bumps the assignment version.
    pub async fn assign_organization(
        &self,
        assignment: OrganizationAssignment,
    ) -> DomainResult<()> {
        let mut inner = self.inner.write().await;
        if !inner.principals.contains_key(&assignment.principal_id) {
            return Err(DomainError::PrincipalNotFound(
                assignment.principal_id.to_string(),
            ));
        }
        if !inner.organizations.contains_key(&assignment.organization_id) {
            return Err(DomainError::OrganizationNotFound(
                assignment.organization_id.to_string(),
            ));
        }
        let principal_id = assignment.principal_id.clone();
        inner.organization_assignments.retain(|a| {
            !(a.principal_id == assignment.principal_id
                && a.organization_id == assignment.organization_id)
        });
        inner.organization_assignments.push(assignment);
        inner.bump_version(&principal_id);
        Ok(())
    }

    /// Grant a coverage area. Bumps the assignment version.
    pub async fn assign_coverage_area(&self, assignment: CoverageAssignment) -> DomainResult<()> {
        let mut inner = self.inner.write().await;
        if !inner.principals.contains_key(&assignment.principal_id) {
            return Err(DomainError::PrincipalNotFound(
                assignment.principal_id.to_string(),
            ));
        }
        if !inner.coverage_areas.contains_key(&assignment.coverage_area_id) {
            return Err(DomainError::CoverageAreaNotFound(
                assignment.coverage_area_id.to_string(),
            ));
        }
        let principal_id = assignment.principal_id.clone();
        inner.coverage_assignments.retain(|a| {
            !(a.principal_id == assignment.principal_id
                && a.coverage_area_id == assignment.coverage_area_id)
        });
        inner.coverage_assignments.push(assignment);
        inner.bump_version(&principal_id);
        Ok(())
    }

    /// Set a stakeholder's residence geography. Bumps the assignment version.
    pub async fn set_stakeholder_location(
        &self,
        principal_id: &PrincipalId,
        location: StakeholderLocation,
    ) -> DomainResult<()> {
        let mut inner = self.inner.write().await;
        let Some(principal) = inner.principals.get_mut(principal_id) else {
            return Err(DomainError::PrincipalNotFound(principal_id.to_string()));
        };
        principal.location = Some(location);
        inner.bump_version(principal_id);
        Ok(())
    }

    /// Replace a coverage area's geographic units. Bumps the assignment
    /// version of every principal holding an assignment to the area, so
    /// their flattened snapshots stop being trusted.
    pub async fn update_coverage_area_units(
        &self,
        coverage_area_id: &CoverageAreaId,
        geographic_units: Vec<LocationId>,
    ) -> DomainResult<()> {
        let mut inner = self.inner.write().await;
        let Some(area) = inner.coverage_areas.get_mut(coverage_area_id) else {
            return Err(DomainError::CoverageAreaNotFound(
                coverage_area_id.to_string(),
            ));
        };
        area.geographic_units = geographic_units;
        area.updated_at = Some(Utc::now());

        let affected: Vec<PrincipalId> = inner
            .coverage_assignments
            .iter()
            .filter(|a| &a.coverage_area_id == coverage_area_id)
            .map(|a| a.principal_id.clone())
            .collect();
        for principal_id in affected {
            inner.bump_version(&principal_id);
        }
        Ok(())
    }

    /// Rebuild the principal's embedded snapshot from the join tables and
    /// stamp it with the current assignment version.
    pub async fn rebuild_principal_snapshot(
        &self,
        principal_id: &PrincipalId,
    ) -> DomainResult<()> {
        let mut inner = self.inner.write().await;
        let now = Utc::now();

        let role_grants: Vec<RoleGrant> = inner
            .role_assignments
            .iter()
            .filter(|a| &a.principal_id == principal_id)
            .filter_map(|a| {
                inner.roles.get(&a.role_id).map(|role| RoleGrant {
                    role_id: a.role_id.clone(),
                    role_code: role.code.clone(),
                    role_authority: role.authority,
                    is_active: a.is_active && role.is_active,
                    assigned_at: a.assigned_at,
                })
            })
            .collect();

        let memberships: Vec<OrganizationMembership> = inner
            .organization_assignments
            .iter()
            .filter(|a| &a.principal_id == principal_id && a.is_current(now))
            .map(|a| OrganizationMembership {
                organization_id: a.organization_id.clone(),
                is_primary: a.is_primary,
                is_active: a.is_active,
                assigned_by: a.assigned_by.clone(),
            })
            .collect();

        let coverage_snapshots: Vec<CoverageSnapshot> = inner
            .coverage_assignments
            .iter()
            .filter(|a| &a.principal_id == principal_id && a.is_current(now))
            .map(|a| inner.flatten_assignment(a))
            .collect();

        let authority_tier = role_grants
            .iter()
            .filter(|grant| grant.is_active)
            .map(|grant| grant.role_authority)
            .max();

        let version = inner.version_of(principal_id);
        let Some(principal) = inner.principals.get_mut(principal_id) else {
            return Err(DomainError::PrincipalNotFound(principal_id.to_string()));
        };
        principal.roles = role_grants;
        principal.organizations = memberships;
        principal.coverage_areas = coverage_snapshots;
        principal.authority_tier = authority_tier;
        principal.snapshot_version = version;
        principal.updated_at = Some(now);

        debug!(principal_id = %principal_id, version, "rebuilt principal snapshot");
        Ok(())
    }
}
