use common::domain::{
    AssignmentRepository, DomainResult, ListOrganizationAssignmentsInput, OrganizationAssignment,
    OrganizationId, PrincipalId,
};
use std::collections::HashSet;
use std::sync::Arc;

/// Answers organization-membership questions from the live join tables.
pub struct OrganizationMatcher {
    assignment_repository: Arc<dyn AssignmentRepository>,
}

impl OrganizationMatcher {
    pub fn new(assignment_repository: Arc<dyn AssignmentRepository>) -> Self {
        Self {
            assignment_repository,
        }
    }

    /// Active, non-expired memberships with their assignment metadata.
    pub async fn active_memberships(
        &self,
        principal_id: &PrincipalId,
    ) -> DomainResult<Vec<OrganizationAssignment>> {
        self.assignment_repository
            .list_active_organization_assignments(ListOrganizationAssignmentsInput {
                principal_id: principal_id.clone(),
            })
            .await
    }

    /// Ids of the organizations the principal currently belongs to.
    pub async fn organization_ids_of(
        &self,
        principal_id: &PrincipalId,
    ) -> DomainResult<HashSet<OrganizationId>> {
        Ok(self
            .active_memberships(principal_id)
            .await?
            .into_iter()
            .map(|a| a.organization_id)
            .collect())
    }

    /// True when the two principals share at least one active organization.
    /// An empty set on either side never overlaps.
    pub async fn organizations_overlap(
        &self,
        a: &PrincipalId,
        b: &PrincipalId,
    ) -> DomainResult<bool> {
        let first = self.organization_ids_of(a).await?;
        if first.is_empty() {
            return Ok(false);
        }
        let second = self.organization_ids_of(b).await?;
        Ok(!first.is_disjoint(&second))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::domain::MockAssignmentRepository;

    fn membership(principal_id: &PrincipalId, organization_id: &str) -> OrganizationAssignment {
        OrganizationAssignment {
            principal_id: principal_id.clone(),
            organization_id: OrganizationId::from(organization_id),
            is_primary: false,
            is_active: true,
            expires_at: None,
            assigned_by: None,
            assigned_at: None,
        }
    }

    fn matcher_with_memberships(
        memberships: Vec<(&'static str, &'static str)>,
    ) -> OrganizationMatcher {
        let mut mock = MockAssignmentRepository::new();
        mock.expect_list_active_organization_assignments()
            .returning(move |input| {
                Ok(memberships
                    .iter()
                    .filter(|(principal, _)| input.principal_id == PrincipalId::from(*principal))
                    .map(|(_, org)| membership(&input.principal_id, org))
                    .collect())
            });
        OrganizationMatcher::new(Arc::new(mock))
    }

    #[tokio::test]
    async fn test_overlap_on_shared_organization() {
        let matcher = matcher_with_memberships(vec![
            ("p-a", "org-1"),
            ("p-a", "org-2"),
            ("p-b", "org-2"),
        ]);

        let overlap = matcher
            .organizations_overlap(&PrincipalId::from("p-a"), &PrincipalId::from("p-b"))
            .await
            .unwrap();
        assert!(overlap);
    }

    #[tokio::test]
    async fn test_no_overlap_on_disjoint_organizations() {
        let matcher = matcher_with_memberships(vec![("p-a", "org-1"), ("p-b", "org-2")]);

        let overlap = matcher
            .organizations_overlap(&PrincipalId::from("p-a"), &PrincipalId::from("p-b"))
            .await
            .unwrap();
        assert!(!overlap);
    }

    #[tokio::test]
    async fn test_empty_side_never_overlaps() {
        let matcher = matcher_with_memberships(vec![("p-b", "org-1")]);

        let overlap = matcher
            .organizations_overlap(&PrincipalId::from("p-a"), &PrincipalId::from("p-b"))
            .await
            .unwrap();
        assert!(!overlap);

        let both_empty = matcher
            .organizations_overlap(&PrincipalId::from("p-x"), &PrincipalId::from("p-y"))
            .await
            .unwrap();
        assert!(!both_empty);
    }

    #[tokio::test]
    async fn test_organization_ids_deduplicate() {
        let matcher = matcher_with_memberships(vec![("p-a", "org-1"), ("p-a", "org-1")]);

        let ids = matcher
            .organization_ids_of(&PrincipalId::from("p-a"))
            .await
            .unwrap();
        assert_eq!(ids.len(), 1);
        assert!(ids.contains(&OrganizationId::from("org-1")));
    }
}
