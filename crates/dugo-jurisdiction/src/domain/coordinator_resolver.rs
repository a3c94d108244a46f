use crate::domain::{CoverageExpander, OrganizationMatcher};
use common::domain::{
    DomainResult, GetPrincipalInput, Principal, PrincipalId, PrincipalRepository,
};
use garde::Validate;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Quality of a stakeholder-to-coordinator match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorMatchType {
    /// Shared organization and covering municipality.
    OrganizationAndMunicipality,
    /// Covering municipality only; the organization axis found nothing.
    MunicipalityOnly,
}

impl CoordinatorMatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoordinatorMatchType::OrganizationAndMunicipality => "organization_and_municipality",
            CoordinatorMatchType::MunicipalityOnly => "municipality_only",
        }
    }
}

/// Coordinators responsible for a stakeholder, with a lock hint for the UI.
#[derive(Debug, Clone)]
pub struct CoordinatorMatches {
    pub coordinators: Vec<Principal>,
    pub match_type: CoordinatorMatchType,
    /// True when exactly one coordinator qualifies.
    pub should_lock: bool,
}

/// Request for resolving the coordinators of a stakeholder
#[derive(Debug, Clone, Validate)]
pub struct ResolveCoordinatorsRequest {
    #[garde(dive)]
    pub stakeholder_id: PrincipalId,
}

/// Finds the coordinator(s) whose coverage and organization intersect a
/// stakeholder.
///
/// Geography is the hard gate: a coordinator whose expansion does not
/// contain the stakeholder's municipality is never a match. Among covering
/// coordinators, shared-organization matches are preferred; when none
/// exist, the municipality-only matches stand, deliberately more permissive
/// than the jurisdiction filter so operational recovery stays possible when
/// organization data is missing or inconsistent.
pub struct CoordinatorResolver {
    principal_repository: Arc<dyn PrincipalRepository>,
    coverage_expander: Arc<CoverageExpander>,
    organization_matcher: Arc<OrganizationMatcher>,
}

impl CoordinatorResolver {
    pub fn new(
        principal_repository: Arc<dyn PrincipalRepository>,
        coverage_expander: Arc<CoverageExpander>,
        organization_matcher: Arc<OrganizationMatcher>,
    ) -> Self {
        Self {
            principal_repository,
            coverage_expander,
            organization_matcher,
        }
    }

    #[instrument(skip(self, request), fields(stakeholder_id = %request.stakeholder_id))]
    pub async fn resolve_coordinators_for(
        &self,
        request: ResolveCoordinatorsRequest,
    ) -> DomainResult<CoordinatorMatches> {
        common::garde::validate_struct(&request)?;

        let stakeholder = self
            .principal_repository
            .get_principal(GetPrincipalInput {
                principal_id: request.stakeholder_id.clone(),
            })
            .await?;
        let Some(stakeholder) = stakeholder else {
            warn!(stakeholder_id = %request.stakeholder_id, "stakeholder not found, no coordinators");
            return Ok(Self::no_matches());
        };
        let municipality_id = stakeholder
            .location
            .as_ref()
            .and_then(|location| location.municipality_id.clone());
        let Some(municipality_id) = municipality_id else {
            warn!(stakeholder_id = %stakeholder.id, "stakeholder has no municipality, no coordinators");
            return Ok(Self::no_matches());
        };

        let stakeholder_organizations = self
            .organization_matcher
            .organization_ids_of(&stakeholder.id)
            .await?;

        let candidates = self.principal_repository.list_active_coordinators().await?;
        let mut organization_and_municipality = Vec::new();
        let mut municipality_only = Vec::new();
        for candidate in candidates {
            let expansion = match self.coverage_expander.expand(&candidate).await {
                Ok(expansion) => expansion,
                Err(err) if err.is_data_error() => {
                    warn!(
                        coordinator_id = %candidate.id,
                        error = %err,
                        "coordinator expansion degraded, skipping candidate"
                    );
                    continue;
                }
                Err(err) => return Err(err),
            };
            if !expansion.contains(&municipality_id) {
                continue;
            }

            let candidate_organizations = self
                .organization_matcher
                .organization_ids_of(&candidate.id)
                .await?;
            if candidate_organizations.is_disjoint(&stakeholder_organizations) {
                municipality_only.push(candidate);
            } else {
                organization_and_municipality.push(candidate);
            }
        }

        let (coordinators, match_type) = if organization_and_municipality.is_empty() {
            (municipality_only, CoordinatorMatchType::MunicipalityOnly)
        } else {
            (
                organization_and_municipality,
                CoordinatorMatchType::OrganizationAndMunicipality,
            )
        };
        let should_lock = coordinators.len() == 1;
        debug!(
            matches = coordinators.len(),
            match_type = match_type.as_str(),
            should_lock,
            "resolved coordinators for stakeholder"
        );
        Ok(CoordinatorMatches {
            coordinators,
            match_type,
            should_lock,
        })
    }

    fn no_matches() -> CoordinatorMatches {
        CoordinatorMatches {
            coordinators: Vec::new(),
            match_type: CoordinatorMatchType::MunicipalityOnly,
            should_lock: false,
        }
    }
}
