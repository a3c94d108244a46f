use crate::domain::{AuthorityResolver, CoverageExpander, OrganizationMatcher};
use common::domain::{
    is_admin_tier, is_coordinator_class, is_stakeholder_class, CoverageAreaId, DomainResult,
    GetOrganizationInput, GetPrincipalInput, LocationId, OrganizationId, OrganizationRepository,
    Principal, PrincipalId, PrincipalRepository,
};
use garde::Validate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// How the filter treats a stakeholder target with no active organization
/// memberships.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyOrgPolicy {
    /// Fail the organization check outright.
    Strict,
    /// Pass the organization axis and let geography decide.
    #[default]
    Lenient,
}

impl EmptyOrgPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmptyOrgPolicy::Strict => "strict",
            EmptyOrgPolicy::Lenient => "lenient",
        }
    }
}

/// Request for a single viewer/target jurisdiction check
#[derive(Debug, Clone, Validate)]
pub struct JurisdictionCheckRequest {
    #[garde(dive)]
    pub viewer_id: PrincipalId,
    #[garde(dive)]
    pub target_id: PrincipalId,
    /// Allow targets at the viewer's own tier, for peer-visibility contexts.
    #[garde(skip)]
    pub allow_equal_authority: bool,
}

/// Request for filtering a candidate set down to visible targets
#[derive(Debug, Clone, Validate)]
pub struct FilterTargetsRequest {
    #[garde(dive)]
    pub viewer_id: PrincipalId,
    #[garde(dive)]
    pub target_ids: Vec<PrincipalId>,
    #[garde(skip)]
    pub allow_equal_authority: bool,
}

/// Request for the coverage-area create gate
#[derive(Debug, Clone, Validate)]
pub struct CreateInCoverageAreaRequest {
    #[garde(dive)]
    pub viewer_id: PrincipalId,
    #[garde(dive)]
    pub coverage_area_id: CoverageAreaId,
}

/// Request for the organization assignment gate
#[derive(Debug, Clone, Validate)]
pub struct AssignOrganizationRequest {
    #[garde(dive)]
    pub viewer_id: PrincipalId,
    #[garde(dive)]
    pub organization_id: OrganizationId,
}

struct ViewerAuthority {
    principal: Principal,
    tier: i32,
}

struct ViewerContext {
    tier: i32,
    expansion: HashSet<LocationId>,
    organization_ids: HashSet<OrganizationId>,
}

/// Combines the authority, organization, and geography axes into the
/// visibility decisions the surrounding layers act on.
///
/// Admins bypass every axis. For everyone else the checks run cheapest
/// first and fail closed: a target that errors or is missing data is
/// excluded, never surfaced, and one bad record never aborts a batch.
pub struct JurisdictionFilter {
    authority_resolver: Arc<AuthorityResolver>,
    coverage_expander: Arc<CoverageExpander>,
    organization_matcher: Arc<OrganizationMatcher>,
    principal_repository: Arc<dyn PrincipalRepository>,
    organization_repository: Arc<dyn OrganizationRepository>,
    empty_org_policy: EmptyOrgPolicy,
}

impl JurisdictionFilter {
    pub fn new(
        authority_resolver: Arc<AuthorityResolver>,
        coverage_expander: Arc<CoverageExpander>,
        organization_matcher: Arc<OrganizationMatcher>,
        principal_repository: Arc<dyn PrincipalRepository>,
        organization_repository: Arc<dyn OrganizationRepository>,
        empty_org_policy: EmptyOrgPolicy,
    ) -> Self {
        Self {
            authority_resolver,
            coverage_expander,
            organization_matcher,
            principal_repository,
            organization_repository,
            empty_org_policy,
        }
    }

    /// Can the viewer see, manage, or message the target?
    #[instrument(skip(self, request), fields(viewer_id = %request.viewer_id, target_id = %request.target_id))]
    pub async fn is_within_jurisdiction(
        &self,
        request: JurisdictionCheckRequest,
    ) -> DomainResult<bool> {
        common::garde::validate_struct(&request)?;

        let Some(viewer) = self.load_viewer(&request.viewer_id).await? else {
            return Ok(false);
        };
        if is_admin_tier(viewer.tier) {
            return Ok(true);
        }

        let viewer = match self.load_viewer_jurisdiction(viewer).await {
            Ok(viewer) => viewer,
            Err(err) if err.is_data_error() => {
                warn!(
                    viewer_id = %request.viewer_id,
                    error = %err,
                    "viewer jurisdiction could not be computed, denying"
                );
                return Ok(false);
            }
            Err(err) => return Err(err),
        };

        match self
            .evaluate_target(&viewer, &request.target_id, request.allow_equal_authority)
            .await
        {
            Ok(allowed) => Ok(allowed),
            Err(err) if err.is_data_error() => {
                warn!(
                    target_id = %request.target_id,
                    error = %err,
                    "jurisdiction check degraded by bad record, denying"
                );
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    /// Filter a candidate set down to the targets the viewer may see,
    /// preserving input order. Admin viewers get the input back unmodified.
    #[instrument(skip(self, request), fields(viewer_id = %request.viewer_id, candidates = request.target_ids.len()))]
    pub async fn filter_by_jurisdiction(
        &self,
        request: FilterTargetsRequest,
    ) -> DomainResult<Vec<PrincipalId>> {
        common::garde::validate_struct(&request)?;

        let Some(viewer) = self.load_viewer(&request.viewer_id).await? else {
            return Ok(Vec::new());
        };
        if is_admin_tier(viewer.tier) {
            debug!(candidates = request.target_ids.len(), "admin viewer, skipping filter");
            return Ok(request.target_ids);
        }

        let viewer = match self.load_viewer_jurisdiction(viewer).await {
            Ok(viewer) => viewer,
            Err(err) if err.is_data_error() => {
                warn!(
                    viewer_id = %request.viewer_id,
                    error = %err,
                    "viewer jurisdiction could not be computed, returning no targets"
                );
                return Ok(Vec::new());
            }
            Err(err) => return Err(err),
        };

        let mut allowed = Vec::with_capacity(request.target_ids.len());
        for target_id in request.target_ids {
            match self
                .evaluate_target(&viewer, &target_id, request.allow_equal_authority)
                .await
            {
                Ok(true) => allowed.push(target_id),
                Ok(false) => {}
                Err(err) => {
                    warn!(
                        target_id = %target_id,
                        error = %err,
                        "target evaluation failed, excluding from results"
                    );
                }
            }
        }
        Ok(allowed)
    }

    /// May the viewer create a principal under this coverage area? Admins
    /// always may; otherwise the viewer must be coordinator-class and the
    /// area's municipality footprint must be non-empty and fully inside the
    /// viewer's own expansion.
    #[instrument(skip(self, request), fields(viewer_id = %request.viewer_id, coverage_area_id = %request.coverage_area_id))]
    pub async fn can_create_in_coverage_area(
        &self,
        request: CreateInCoverageAreaRequest,
    ) -> DomainResult<bool> {
        common::garde::validate_struct(&request)?;

        let Some(viewer) = self.load_viewer(&request.viewer_id).await? else {
            return Ok(false);
        };
        if is_admin_tier(viewer.tier) {
            return Ok(true);
        }
        if !is_coordinator_class(viewer.tier) {
            debug!(viewer_tier = viewer.tier, "viewer below coordinator class, denying create");
            return Ok(false);
        }

        let area_municipalities = match self
            .coverage_expander
            .expand_area_municipalities(&request.coverage_area_id)
            .await
        {
            Ok(municipalities) => municipalities,
            Err(err) if err.is_data_error() => {
                warn!(
                    coverage_area_id = %request.coverage_area_id,
                    error = %err,
                    "coverage area could not be expanded, denying create"
                );
                return Ok(false);
            }
            Err(err) => return Err(err),
        };
        if area_municipalities.is_empty() {
            debug!("coverage area has no municipality footprint, denying create");
            return Ok(false);
        }

        let expansion = self.coverage_expander.expand(&viewer.principal).await?;
        Ok(area_municipalities.is_subset(&expansion))
    }

    /// May the viewer assign this organization? Admins always may;
    /// otherwise the organization must exist and be active and the viewer
    /// must hold an active membership in it.
    #[instrument(skip(self, request), fields(viewer_id = %request.viewer_id, organization_id = %request.organization_id))]
    pub async fn can_assign_organization(
        &self,
        request: AssignOrganizationRequest,
    ) -> DomainResult<bool> {
        common::garde::validate_struct(&request)?;

        let Some(viewer) = self.load_viewer(&request.viewer_id).await? else {
            return Ok(false);
        };
        if is_admin_tier(viewer.tier) {
            return Ok(true);
        }

        let organization = self
            .organization_repository
            .get_organization(GetOrganizationInput {
                organization_id: request.organization_id.clone(),
            })
            .await?;
        let Some(organization) = organization else {
            warn!(organization_id = %request.organization_id, "organization not found, denying assignment");
            return Ok(false);
        };
        if !organization.is_active {
            debug!(organization_id = %organization.id, "organization inactive, denying assignment");
            return Ok(false);
        }

        let viewer_organizations = self
            .organization_matcher
            .organization_ids_of(&viewer.principal.id)
            .await?;
        Ok(viewer_organizations.contains(&request.organization_id))
    }

    async fn load_viewer(&self, viewer_id: &PrincipalId) -> DomainResult<Option<ViewerAuthority>> {
        let principal = self
            .principal_repository
            .get_principal(GetPrincipalInput {
                principal_id: viewer_id.clone(),
            })
            .await?;
        let Some(principal) = principal else {
            warn!(viewer_id = %viewer_id, "viewer not found, denying");
            return Ok(None);
        };
        let tier = self.authority_resolver.resolve(&principal).await?.tier;
        Ok(Some(ViewerAuthority { principal, tier }))
    }

    async fn load_viewer_jurisdiction(&self, viewer: ViewerAuthority) -> DomainResult<ViewerContext> {
        let expansion = self.coverage_expander.expand(&viewer.principal).await?;
        let organization_ids = self
            .organization_matcher
            .organization_ids_of(&viewer.principal.id)
            .await?;
        Ok(ViewerContext {
            tier: viewer.tier,
            expansion,
            organization_ids,
        })
    }

    /// One target through the decision steps: authority ordering, then for
    /// stakeholder targets the organization and geography checks, for
    /// coordinator-class targets a symmetric coverage intersection.
    async fn evaluate_target(
        &self,
        viewer: &ViewerContext,
        target_id: &PrincipalId,
        allow_equal_authority: bool,
    ) -> DomainResult<bool> {
        let target = self
            .principal_repository
            .get_principal(GetPrincipalInput {
                principal_id: target_id.clone(),
            })
            .await?;
        let Some(target) = target else {
            warn!(target_id = %target_id, "target principal not found, excluding");
            return Ok(false);
        };

        let target_tier = self.authority_resolver.resolve(&target).await?.tier;
        let authority_ok = if allow_equal_authority {
            target_tier <= viewer.tier
        } else {
            target_tier < viewer.tier
        };
        if !authority_ok {
            debug!(
                target_id = %target_id,
                target_tier,
                viewer_tier = viewer.tier,
                "target authority not below viewer, excluding"
            );
            return Ok(false);
        }

        if is_stakeholder_class(target_tier) {
            let target_organizations = self
                .organization_matcher
                .organization_ids_of(&target.id)
                .await?;
            let organization_ok = if target_organizations.is_empty() {
                matches!(self.empty_org_policy, EmptyOrgPolicy::Lenient)
            } else {
                !viewer.organization_ids.is_disjoint(&target_organizations)
            };
            if !organization_ok {
                debug!(target_id = %target_id, "no shared organization, excluding");
                return Ok(false);
            }

            let municipality_id = target
                .location
                .as_ref()
                .and_then(|location| location.municipality_id.as_ref());
            let Some(municipality_id) = municipality_id else {
                warn!(target_id = %target_id, "stakeholder target has no municipality, excluding");
                return Ok(false);
            };
            Ok(viewer.expansion.contains(municipality_id))
        } else {
            let target_expansion = self.coverage_expander.expand(&target).await?;
            Ok(!viewer.expansion.is_disjoint(&target_expansion))
        }
    }
}
