use common::domain::{
    AssignmentRepository, CoverageAreaId, CoverageAreaRepository, CoverageAssignment, DomainError,
    DomainResult, GetAssignmentVersionInput, GetCoverageAreaInput, GetLocationChildrenInput,
    GetLocationInput, ListCoverageAssignmentsInput, LocationId, LocationKind, LocationRepository,
    Principal,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Expands coverage assignments and geographic units into the set of
/// location ids a principal effectively controls.
///
/// Per assignment, the pre-flattened snapshot is used when it is provably
/// fresh and non-empty; otherwise the footprint is recomputed live from the
/// coverage area. Principals without any coverage assignment fall back to
/// their residence location, so the same expansion serves coordinators and
/// stakeholders uniformly.
pub struct CoverageExpander {
    coverage_area_repository: Arc<dyn CoverageAreaRepository>,
    location_repository: Arc<dyn LocationRepository>,
    assignment_repository: Arc<dyn AssignmentRepository>,
}

impl CoverageExpander {
    pub fn new(
        coverage_area_repository: Arc<dyn CoverageAreaRepository>,
        location_repository: Arc<dyn LocationRepository>,
        assignment_repository: Arc<dyn AssignmentRepository>,
    ) -> Self {
        Self {
            coverage_area_repository,
            location_repository,
            assignment_repository,
        }
    }

    /// Every geographic unit id the principal effectively controls.
    ///
    /// Province units never appear in the result; they contribute their
    /// district and municipality descendants when the assignment covers
    /// descendants, and nothing otherwise.
    #[instrument(skip(self, principal), fields(principal_id = %principal.id))]
    pub async fn expand(&self, principal: &Principal) -> DomainResult<HashSet<LocationId>> {
        let assignments = self
            .assignment_repository
            .list_active_coverage_assignments(ListCoverageAssignmentsInput {
                principal_id: principal.id.clone(),
            })
            .await?;

        if assignments.is_empty() {
            return Ok(self.location_fallback(principal));
        }

        let live_version = self
            .assignment_repository
            .get_assignment_version(GetAssignmentVersionInput {
                principal_id: principal.id.clone(),
            })
            .await?;
        let snapshot_fresh = principal.snapshot_version == live_version;

        let mut units = HashSet::new();
        for assignment in &assignments {
            let snapshot = if snapshot_fresh {
                principal
                    .coverage_areas
                    .iter()
                    .find(|s| s.coverage_area_id == assignment.coverage_area_id)
                    .filter(|s| !s.district_ids.is_empty() || !s.municipality_ids.is_empty())
            } else {
                None
            };

            match snapshot {
                Some(snapshot) => {
                    units.extend(snapshot.district_ids.iter().cloned());
                    units.extend(snapshot.municipality_ids.iter().cloned());
                }
                None => {
                    if !snapshot_fresh {
                        debug!(
                            coverage_area_id = %assignment.coverage_area_id,
                            "snapshot stale, recomputing coverage footprint live"
                        );
                    }
                    self.expand_assignment_live(assignment, &mut units).await?;
                }
            }
        }
        Ok(units)
    }

    /// Expand one geographic unit, optionally walking all descendants.
    ///
    /// The walk carries a visited set; revisiting a node means the parent
    /// chain is cyclic and is reported as a hierarchy misconfiguration
    /// instead of looping.
    #[instrument(skip(self), fields(location_id = %location_id))]
    pub async fn expand_unit(
        &self,
        location_id: &LocationId,
        include_descendants: bool,
    ) -> DomainResult<HashSet<LocationId>> {
        let location = self
            .location_repository
            .get_location(GetLocationInput {
                location_id: location_id.clone(),
            })
            .await?;
        let Some(location) = location else {
            return Err(DomainError::LocationNotFound(location_id.to_string()));
        };

        let mut units = HashSet::new();
        units.insert(location.id.clone());
        if !include_descendants {
            return Ok(units);
        }

        let mut visited: HashSet<LocationId> = units.clone();
        let mut worklist = vec![location.id];
        while let Some(parent_id) = worklist.pop() {
            let children = self
                .location_repository
                .get_location_children(GetLocationChildrenInput {
                    parent_id,
                    kind: None,
                })
                .await?;
            for child in children {
                if !visited.insert(child.id.clone()) {
                    return Err(DomainError::MisconfiguredHierarchy(format!(
                        "location {} revisited while expanding {}",
                        child.id, location_id
                    )));
                }
                units.insert(child.id.clone());
                worklist.push(child.id);
            }
        }
        Ok(units)
    }

    /// Municipality-level footprint of a coverage area, descendants always
    /// included. Serves the create gate, which reasons about municipalities
    /// regardless of any assignment's descendant flag.
    #[instrument(skip(self), fields(coverage_area_id = %coverage_area_id))]
    pub async fn expand_area_municipalities(
        &self,
        coverage_area_id: &CoverageAreaId,
    ) -> DomainResult<HashSet<LocationId>> {
        let area = self
            .coverage_area_repository
            .get_coverage_area(GetCoverageAreaInput {
                coverage_area_id: coverage_area_id.clone(),
            })
            .await?;
        let Some(area) = area else {
            return Err(DomainError::CoverageAreaNotFound(
                coverage_area_id.to_string(),
            ));
        };

        let mut municipalities = HashSet::new();
        for unit_id in &area.geographic_units {
            let location = self
                .location_repository
                .get_location(GetLocationInput {
                    location_id: unit_id.clone(),
                })
                .await?;
            let Some(location) = location else {
                return Err(DomainError::MisconfiguredHierarchy(format!(
                    "coverage area {} references missing location {}",
                    area.id, unit_id
                )));
            };
            match location.kind {
                LocationKind::Municipality | LocationKind::Barangay => {
                    municipalities.insert(location.id);
                }
                LocationKind::District => {
                    self.collect_municipality_children(&location.id, &mut municipalities)
                        .await?;
                }
                LocationKind::Province => {
                    let districts = self
                        .location_repository
                        .get_location_children(GetLocationChildrenInput {
                            parent_id: location.id.clone(),
                            kind: Some(LocationKind::District),
                        })
                        .await?;
                    for district in districts {
                        self.collect_municipality_children(&district.id, &mut municipalities)
                            .await?;
                    }
                }
            }
        }
        Ok(municipalities)
    }

    async fn expand_assignment_live(
        &self,
        assignment: &CoverageAssignment,
        units: &mut HashSet<LocationId>,
    ) -> DomainResult<()> {
        let area = self
            .coverage_area_repository
            .get_coverage_area(GetCoverageAreaInput {
                coverage_area_id: assignment.coverage_area_id.clone(),
            })
            .await?;
        let Some(area) = area else {
            warn!(
                coverage_area_id = %assignment.coverage_area_id,
                "coverage assignment references missing area, skipping"
            );
            return Ok(());
        };
        if !area.is_active {
            debug!(coverage_area_id = %area.id, "coverage area inactive, skipping");
            return Ok(());
        }

        for unit_id in &area.geographic_units {
            let location = self
                .location_repository
                .get_location(GetLocationInput {
                    location_id: unit_id.clone(),
                })
                .await?;
            let Some(location) = location else {
                return Err(DomainError::MisconfiguredHierarchy(format!(
                    "coverage area {} references missing location {}",
                    area.id, unit_id
                )));
            };
            match location.kind {
                LocationKind::Municipality | LocationKind::Barangay => {
                    units.insert(location.id);
                }
                LocationKind::District => {
                    units.insert(location.id.clone());
                    if assignment.auto_cover_descendants {
                        self.collect_municipality_children(&location.id, units)
                            .await?;
                    }
                }
                LocationKind::Province => {
                    if assignment.auto_cover_descendants {
                        let districts = self
                            .location_repository
                            .get_location_children(GetLocationChildrenInput {
                                parent_id: location.id.clone(),
                                kind: Some(LocationKind::District),
                            })
                            .await?;
                        for district in districts {
                            self.collect_municipality_children(&district.id, units)
                                .await?;
                            units.insert(district.id);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    async fn collect_municipality_children(
        &self,
        parent_id: &LocationId,
        units: &mut HashSet<LocationId>,
    ) -> DomainResult<()> {
        let children = self
            .location_repository
            .get_location_children(GetLocationChildrenInput {
                parent_id: parent_id.clone(),
                kind: Some(LocationKind::Municipality),
            })
            .await?;
        for child in children {
            units.insert(child.id);
        }
        Ok(())
    }

    /// Stakeholder path: residence municipality plus barangay when present.
    fn location_fallback(&self, principal: &Principal) -> HashSet<LocationId> {
        let mut units = HashSet::new();
        if let Some(location) = &principal.location {
            if let Some(municipality_id) = &location.municipality_id {
                units.insert(municipality_id.clone());
            }
            if let Some(barangay_id) = &location.barangay_id {
                units.insert(barangay_id.clone());
            }
        }
        if units.is_empty() {
            debug!(
                principal_id = %principal.id,
                "no coverage assignments and no residence location, expansion is empty"
            );
        }
        units
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::domain::{
        CoverageArea, CoverageSnapshot, Location, MockAssignmentRepository,
        MockCoverageAreaRepository, MockLocationRepository, PrincipalId, StakeholderLocation,
    };

    const TEST_PRINCIPAL_ID: &str = "principal-123";

    fn assignment(coverage_area_id: &str, auto_cover_descendants: bool) -> CoverageAssignment {
        CoverageAssignment {
            principal_id: PrincipalId::from(TEST_PRINCIPAL_ID),
            coverage_area_id: CoverageAreaId::from(coverage_area_id),
            is_primary: true,
            auto_cover_descendants,
            expires_at: None,
            is_active: true,
            assigned_at: None,
        }
    }

    fn area(id: &str, units: &[&str]) -> CoverageArea {
        CoverageArea {
            id: CoverageAreaId::from(id),
            name: id.to_string(),
            geographic_units: units.iter().map(|u| LocationId::from(*u)).collect(),
            is_active: true,
            created_at: None,
            updated_at: None,
        }
    }

    fn location(id: &str, kind: LocationKind, parent: Option<&str>) -> Location {
        Location {
            id: LocationId::from(id),
            name: id.to_string(),
            kind,
            parent_id: parent.map(LocationId::from),
        }
    }

    fn principal_with_snapshot(snapshot_version: u64, snapshots: Vec<CoverageSnapshot>) -> Principal {
        Principal {
            snapshot_version,
            coverage_areas: snapshots,
            ..Principal::bare(
                PrincipalId::from(TEST_PRINCIPAL_ID),
                "p@example.com",
                "Test Principal",
            )
        }
    }

    fn create_mock_assignment_repo(
        assignments: Vec<CoverageAssignment>,
        version: u64,
    ) -> MockAssignmentRepository {
        let mut mock = MockAssignmentRepository::new();
        mock.expect_list_active_coverage_assignments()
            .returning(move |_| Ok(assignments.clone()));
        mock.expect_get_assignment_version()
            .returning(move |_| Ok(version));
        mock
    }

    fn expander_with(
        coverage_repo: MockCoverageAreaRepository,
        location_repo: MockLocationRepository,
        assignment_repo: MockAssignmentRepository,
    ) -> CoverageExpander {
        CoverageExpander::new(
            Arc::new(coverage_repo),
            Arc::new(location_repo),
            Arc::new(assignment_repo),
        )
    }

    fn ids(values: &[&str]) -> HashSet<LocationId> {
        values.iter().map(|v| LocationId::from(*v)).collect()
    }

    #[tokio::test]
    async fn test_fresh_snapshot_used_without_live_lookups() {
        // no expectations on the coverage or location repos: any call panics
        let expander = expander_with(
            MockCoverageAreaRepository::new(),
            MockLocationRepository::new(),
            create_mock_assignment_repo(vec![assignment("ca-1", true)], 3),
        );
        let principal = principal_with_snapshot(
            3,
            vec![CoverageSnapshot {
                coverage_area_id: CoverageAreaId::from("ca-1"),
                district_ids: vec![LocationId::from("dist-1")],
                municipality_ids: vec![LocationId::from("muni-1"), LocationId::from("muni-2")],
            }],
        );

        let units = expander.expand(&principal).await.unwrap();
        assert_eq!(units, ids(&["dist-1", "muni-1", "muni-2"]));
    }

    #[tokio::test]
    async fn test_stale_snapshot_recomputes_live() {
        let mut coverage_repo = MockCoverageAreaRepository::new();
        coverage_repo
            .expect_get_coverage_area()
            .returning(|_| Ok(Some(area("ca-1", &["muni-9"]))));
        let mut location_repo = MockLocationRepository::new();
        location_repo
            .expect_get_location()
            .returning(|_| Ok(Some(location("muni-9", LocationKind::Municipality, None))));

        let expander = expander_with(
            coverage_repo,
            location_repo,
            create_mock_assignment_repo(vec![assignment("ca-1", false)], 5),
        );
        // snapshot built at version 2 still points at the old footprint
        let principal = principal_with_snapshot(
            2,
            vec![CoverageSnapshot {
                coverage_area_id: CoverageAreaId::from("ca-1"),
                district_ids: Vec::new(),
                municipality_ids: vec![LocationId::from("muni-old")],
            }],
        );

        let units = expander.expand(&principal).await.unwrap();
        assert_eq!(units, ids(&["muni-9"]));
    }

    #[tokio::test]
    async fn test_empty_snapshot_recomputes_live() {
        let mut coverage_repo = MockCoverageAreaRepository::new();
        coverage_repo
            .expect_get_coverage_area()
            .returning(|_| Ok(Some(area("ca-1", &["muni-1"]))));
        let mut location_repo = MockLocationRepository::new();
        location_repo
            .expect_get_location()
            .returning(|_| Ok(Some(location("muni-1", LocationKind::Municipality, None))));

        let expander = expander_with(
            coverage_repo,
            location_repo,
            create_mock_assignment_repo(vec![assignment("ca-1", false)], 1),
        );
        let principal = principal_with_snapshot(
            1,
            vec![CoverageSnapshot {
                coverage_area_id: CoverageAreaId::from("ca-1"),
                district_ids: Vec::new(),
                municipality_ids: Vec::new(),
            }],
        );

        let units = expander.expand(&principal).await.unwrap();
        assert_eq!(units, ids(&["muni-1"]));
    }

    #[tokio::test]
    async fn test_district_expands_to_municipality_children_when_flagged() {
        let mut coverage_repo = MockCoverageAreaRepository::new();
        coverage_repo
            .expect_get_coverage_area()
            .returning(|_| Ok(Some(area("ca-1", &["dist-1"]))));
        let mut location_repo = MockLocationRepository::new();
        location_repo
            .expect_get_location()
            .returning(|_| Ok(Some(location("dist-1", LocationKind::District, Some("prov-1")))));
        location_repo.expect_get_location_children().returning(|_| {
            Ok(vec![
                location("muni-1", LocationKind::Municipality, Some("dist-1")),
                location("muni-2", LocationKind::Municipality, Some("dist-1")),
            ])
        });

        let expander = expander_with(
            coverage_repo,
            location_repo,
            create_mock_assignment_repo(vec![assignment("ca-1", true)], 1),
        );
        let principal = principal_with_snapshot(0, Vec::new());

        let units = expander.expand(&principal).await.unwrap();
        assert_eq!(units, ids(&["dist-1", "muni-1", "muni-2"]));
    }

    #[tokio::test]
    async fn test_district_stays_literal_without_flag() {
        let mut coverage_repo = MockCoverageAreaRepository::new();
        coverage_repo
            .expect_get_coverage_area()
            .returning(|_| Ok(Some(area("ca-1", &["dist-1"]))));
        let mut location_repo = MockLocationRepository::new();
        location_repo
            .expect_get_location()
            .returning(|_| Ok(Some(location("dist-1", LocationKind::District, Some("prov-1")))));

        let expander = expander_with(
            coverage_repo,
            location_repo,
            create_mock_assignment_repo(vec![assignment("ca-1", false)], 1),
        );
        let principal = principal_with_snapshot(0, Vec::new());

        let units = expander.expand(&principal).await.unwrap();
        assert_eq!(units, ids(&["dist-1"]));
    }

    #[tokio::test]
    async fn test_province_expands_three_levels_without_its_own_id() {
        let mut coverage_repo = MockCoverageAreaRepository::new();
        coverage_repo
            .expect_get_coverage_area()
            .returning(|_| Ok(Some(area("ca-1", &["prov-1"]))));
        let mut location_repo = MockLocationRepository::new();
        location_repo
            .expect_get_location()
            .returning(|_| Ok(Some(location("prov-1", LocationKind::Province, None))));
        location_repo
            .expect_get_location_children()
            .returning(|input| match input.kind {
                Some(LocationKind::District) => Ok(vec![
                    location("dist-1", LocationKind::District, Some("prov-1")),
                    location("dist-2", LocationKind::District, Some("prov-1")),
                ]),
                Some(LocationKind::Municipality) => {
                    if input.parent_id == LocationId::from("dist-1") {
                        Ok(vec![location(
                            "muni-1",
                            LocationKind::Municipality,
                            Some("dist-1"),
                        )])
                    } else {
                        Ok(vec![location(
                            "muni-2",
                            LocationKind::Municipality,
                            Some("dist-2"),
                        )])
                    }
                }
                _ => Ok(Vec::new()),
            });

        let expander = expander_with(
            coverage_repo,
            location_repo,
            create_mock_assignment_repo(vec![assignment("ca-1", true)], 1),
        );
        let principal = principal_with_snapshot(0, Vec::new());

        let units = expander.expand(&principal).await.unwrap();
        assert_eq!(units, ids(&["dist-1", "dist-2", "muni-1", "muni-2"]));
        assert!(!units.contains(&LocationId::from("prov-1")));
    }

    #[tokio::test]
    async fn test_missing_area_is_skipped_not_fatal() {
        let mut coverage_repo = MockCoverageAreaRepository::new();
        coverage_repo.expect_get_coverage_area().returning(|_| Ok(None));

        let expander = expander_with(
            coverage_repo,
            MockLocationRepository::new(),
            create_mock_assignment_repo(vec![assignment("ca-gone", true)], 1),
        );
        let principal = principal_with_snapshot(0, Vec::new());

        let units = expander.expand(&principal).await.unwrap();
        assert!(units.is_empty());
    }

    #[tokio::test]
    async fn test_area_with_missing_location_is_misconfigured() {
        let mut coverage_repo = MockCoverageAreaRepository::new();
        coverage_repo
            .expect_get_coverage_area()
            .returning(|_| Ok(Some(area("ca-1", &["loc-gone"]))));
        let mut location_repo = MockLocationRepository::new();
        location_repo.expect_get_location().returning(|_| Ok(None));

        let expander = expander_with(
            coverage_repo,
            location_repo,
            create_mock_assignment_repo(vec![assignment("ca-1", true)], 1),
        );
        let principal = principal_with_snapshot(0, Vec::new());

        let result = expander.expand(&principal).await;
        assert!(matches!(
            result,
            Err(DomainError::MisconfiguredHierarchy(_))
        ));
    }

    #[tokio::test]
    async fn test_no_assignments_falls_back_to_residence() {
        let mut assignment_repo = MockAssignmentRepository::new();
        assignment_repo
            .expect_list_active_coverage_assignments()
            .returning(|_| Ok(Vec::new()));

        let expander = expander_with(
            MockCoverageAreaRepository::new(),
            MockLocationRepository::new(),
            assignment_repo,
        );
        let principal = Principal {
            location: Some(StakeholderLocation {
                municipality_id: Some(LocationId::from("muni-1")),
                barangay_id: Some(LocationId::from("brgy-7")),
            }),
            ..Principal::bare(
                PrincipalId::from(TEST_PRINCIPAL_ID),
                "p@example.com",
                "Test Principal",
            )
        };

        let units = expander.expand(&principal).await.unwrap();
        assert_eq!(units, ids(&["muni-1", "brgy-7"]));
    }

    #[tokio::test]
    async fn test_expand_unit_without_descendants() {
        let mut location_repo = MockLocationRepository::new();
        location_repo
            .expect_get_location()
            .returning(|_| Ok(Some(location("dist-1", LocationKind::District, None))));

        let expander = expander_with(
            MockCoverageAreaRepository::new(),
            location_repo,
            MockAssignmentRepository::new(),
        );

        let units = expander
            .expand_unit(&LocationId::from("dist-1"), false)
            .await
            .unwrap();
        assert_eq!(units, ids(&["dist-1"]));
    }

    #[tokio::test]
    async fn test_expand_unit_walks_all_descendants() {
        let mut location_repo = MockLocationRepository::new();
        location_repo
            .expect_get_location()
            .returning(|_| Ok(Some(location("prov-1", LocationKind::Province, None))));
        location_repo
            .expect_get_location_children()
            .returning(|input| {
                if input.parent_id == LocationId::from("prov-1") {
                    Ok(vec![location("dist-1", LocationKind::District, Some("prov-1"))])
                } else if input.parent_id == LocationId::from("dist-1") {
                    Ok(vec![location(
                        "muni-1",
                        LocationKind::Municipality,
                        Some("dist-1"),
                    )])
                } else {
                    Ok(Vec::new())
                }
            });

        let expander = expander_with(
            MockCoverageAreaRepository::new(),
            location_repo,
            MockAssignmentRepository::new(),
        );

        let units = expander
            .expand_unit(&LocationId::from("prov-1"), true)
            .await
            .unwrap();
        assert_eq!(units, ids(&["prov-1", "dist-1", "muni-1"]));
    }

    #[tokio::test]
    async fn test_expand_unit_detects_cycle() {
        let mut location_repo = MockLocationRepository::new();
        location_repo
            .expect_get_location()
            .returning(|_| Ok(Some(location("loc-a", LocationKind::District, None))));
        // loc-a and loc-b list each other as children
        location_repo
            .expect_get_location_children()
            .returning(|input| {
                if input.parent_id == LocationId::from("loc-a") {
                    Ok(vec![location("loc-b", LocationKind::Municipality, Some("loc-a"))])
                } else {
                    Ok(vec![location("loc-a", LocationKind::District, Some("loc-b"))])
                }
            });

        let expander = expander_with(
            MockCoverageAreaRepository::new(),
            location_repo,
            MockAssignmentRepository::new(),
        );

        let result = expander.expand_unit(&LocationId::from("loc-a"), true).await;
        assert!(matches!(
            result,
            Err(DomainError::MisconfiguredHierarchy(_))
        ));
    }

    #[tokio::test]
    async fn test_expand_area_municipalities_flattens_every_level() {
        let mut coverage_repo = MockCoverageAreaRepository::new();
        coverage_repo
            .expect_get_coverage_area()
            .returning(|_| Ok(Some(area("ca-1", &["prov-1", "muni-5"]))));
        let mut location_repo = MockLocationRepository::new();
        location_repo.expect_get_location().returning(|input| {
            if input.location_id == LocationId::from("prov-1") {
                Ok(Some(location("prov-1", LocationKind::Province, None)))
            } else {
                Ok(Some(location("muni-5", LocationKind::Municipality, None)))
            }
        });
        location_repo
            .expect_get_location_children()
            .returning(|input| match input.kind {
                Some(LocationKind::District) => Ok(vec![location(
                    "dist-1",
                    LocationKind::District,
                    Some("prov-1"),
                )]),
                Some(LocationKind::Municipality) => Ok(vec![location(
                    "muni-1",
                    LocationKind::Municipality,
                    Some("dist-1"),
                )]),
                _ => Ok(Vec::new()),
            });

        let expander = expander_with(
            coverage_repo,
            location_repo,
            MockAssignmentRepository::new(),
        );

        let municipalities = expander
            .expand_area_municipalities(&CoverageAreaId::from("ca-1"))
            .await
            .unwrap();
        assert_eq!(municipalities, ids(&["muni-1", "muni-5"]));
    }

    #[tokio::test]
    async fn test_expand_area_municipalities_missing_area_errors() {
        let mut coverage_repo = MockCoverageAreaRepository::new();
        coverage_repo.expect_get_coverage_area().returning(|_| Ok(None));

        let expander = expander_with(
            coverage_repo,
            MockLocationRepository::new(),
            MockAssignmentRepository::new(),
        );

        let result = expander
            .expand_area_municipalities(&CoverageAreaId::from("ca-gone"))
            .await;
        assert!(matches!(result, Err(DomainError::CoverageAreaNotFound(_))));
    }
}
