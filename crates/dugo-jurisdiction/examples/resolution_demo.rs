//! End-to-end walk through the jurisdiction engine over the in-memory store.
//!
//! This example demonstrates:
//! - Seeding a small Philippine geography, roles, organizations, and principals
//! - Tier resolution with strategy reporting and tier caching
//! - Coverage expansion, jurisdiction checks, and roster filtering
//! - Coordinator matching for a newly registered donor
//!
//! Run with: cargo run --example resolution_demo
//! Tune logging with DUGO_LOG_LEVEL / DUGO_JSON_LOGS.

use chrono::Utc;
use common::domain::{
    CoverageArea, CoverageAreaId, CoverageAssignment, Location, LocationId, LocationKind,
    Organization, OrganizationAssignment, OrganizationId, Permission, Principal, PrincipalId,
    Role, RoleAssignment, RoleId, StakeholderLocation, COORDINATOR_TIER, OPERATIONAL_ADMIN_TIER,
    STAKEHOLDER_TIER,
};
use common::memory::MemoryStore;
use common::telemetry::init_telemetry;
use dugo_jurisdiction::config::EngineConfig;
use dugo_jurisdiction::domain::{
    EngineRepositories, FilterTargetsRequest, JurisdictionCheckRequest, JurisdictionEngine,
    ResolveCoordinatorsRequest,
};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = EngineConfig::from_env()?;
    init_telemetry(&config.telemetry())?;

    let store = seed_store().await?;
    let engine = JurisdictionEngine::new(
        EngineRepositories::from_memory_store(&store),
        config.empty_org_policy,
    );

    // Tier resolution, caching the scanned tiers as a login would
    for id in ["root-1", "admin-1", "coord-1", "coord-2", "donor-1", "walkin-1"] {
        let resolution = engine
            .authority_resolver
            .resolve_and_cache(&PrincipalId::from(id))
            .await?;
        info!(
            principal = id,
            tier = resolution.tier,
            strategy = resolution.strategy.as_str(),
            "resolved authority"
        );
    }

    // Coverage expansion for the first-district coordinator
    let coord = store_principal(&store, "coord-1").await?;
    let mut expansion: Vec<String> = engine
        .coverage_expander
        .expand(&coord)
        .await?
        .into_iter()
        .map(|id| id.to_string())
        .collect();
    expansion.sort();
    info!(coordinator = "coord-1", ?expansion, "expanded coverage");

    // Organization overlap between the coordinator and a donor
    let overlap = engine
        .organization_matcher
        .organizations_overlap(&PrincipalId::from("coord-1"), &PrincipalId::from("donor-1"))
        .await?;
    info!(overlap, "coord-1 and donor-1 share an organization");

    // Single checks across the authority/organization/geography axes
    for (viewer, target) in [
        ("admin-1", "coord-2"),
        ("coord-1", "donor-1"),
        ("coord-1", "donor-2"),
        ("coord-2", "donor-2"),
    ] {
        let allowed = engine
            .jurisdiction_filter
            .is_within_jurisdiction(JurisdictionCheckRequest {
                viewer_id: PrincipalId::from(viewer),
                target_id: PrincipalId::from(target),
                allow_equal_authority: false,
            })
            .await?;
        info!(viewer, target, allowed, "jurisdiction check");
    }

    // Roster filtering preserves order and drops what the viewer cannot see
    let roster = vec![
        PrincipalId::from("donor-1"),
        PrincipalId::from("donor-2"),
        PrincipalId::from("walkin-1"),
    ];
    let visible = engine
        .jurisdiction_filter
        .filter_by_jurisdiction(FilterTargetsRequest {
            viewer_id: PrincipalId::from("coord-1"),
            target_ids: roster,
            allow_equal_authority: false,
        })
        .await?;
    let visible: Vec<String> = visible.into_iter().map(|id| id.to_string()).collect();
    info!(viewer = "coord-1", ?visible, "filtered roster");

    // Coordinator matching for the walk-in registrant
    let matches = engine
        .coordinator_resolver
        .resolve_coordinators_for(ResolveCoordinatorsRequest {
            stakeholder_id: PrincipalId::from("walkin-1"),
        })
        .await?;
    let matched: Vec<String> = matches
        .coordinators
        .iter()
        .map(|c| c.id.to_string())
        .collect();
    info!(
        stakeholder = "walkin-1",
        ?matched,
        match_type = matches.match_type.as_str(),
        should_lock = matches.should_lock,
        "matched coordinators"
    );

    Ok(())
}

async fn store_principal(store: &MemoryStore, id: &str) -> anyhow::Result<Principal> {
    EngineRepositories::from_memory_store(store)
        .principal
        .get_principal(common::domain::GetPrincipalInput {
            principal_id: PrincipalId::from(id),
        })
        .await?
        .ok_or_else(|| anyhow::anyhow!("principal {id} not seeded"))
}

async fn seed_store() -> anyhow::Result<MemoryStore> {
    let store = MemoryStore::new();

    for (id, name, kind, parent) in [
        ("prov-in", "Ilocos Norte", LocationKind::Province, None),
        ("dist-1", "First District", LocationKind::District, Some("prov-in")),
        ("dist-2", "Second District", LocationKind::District, Some("prov-in")),
        ("muni-laoag", "Laoag", LocationKind::Municipality, Some("dist-1")),
        ("muni-bacarra", "Bacarra", LocationKind::Municipality, Some("dist-1")),
        ("muni-currimao", "Currimao", LocationKind::Municipality, Some("dist-2")),
        ("brgy-1", "Barangay Uno", LocationKind::Barangay, Some("muni-laoag")),
        ("brgy-2", "Barangay Dos", LocationKind::Barangay, Some("muni-laoag")),
    ] {
        store
            .insert_location(Location {
                id: LocationId::from(id),
                name: name.to_string(),
                kind,
                parent_id: parent.map(LocationId::from),
            })
            .await;
    }

    let role = |id: &str, code: &str, authority: i32, permissions: Vec<Permission>| Role {
        id: RoleId::from(id),
        code: code.to_string(),
        name: code.to_string(),
        authority,
        permissions,
        is_active: true,
        created_at: Some(Utc::now()),
        updated_at: None,
    };
    store
        .insert_role(role(
            "role-staffing",
            "staffing_admin",
            OPERATIONAL_ADMIN_TIER,
            vec![Permission {
                resource: "staff".to_string(),
                actions: vec!["create".to_string(), "update".to_string()],
            }],
        ))
        .await;
    store
        .insert_role(role(
            "role-coord",
            "coordinator",
            COORDINATOR_TIER,
            vec![Permission {
                resource: "request".to_string(),
                actions: vec!["create".to_string(), "review".to_string()],
            }],
        ))
        .await;
    store
        .insert_role(role(
            "role-donor",
            "donor",
            STAKEHOLDER_TIER,
            vec![Permission {
                resource: "appointment".to_string(),
                actions: vec!["create".to_string()],
            }],
        ))
        .await;

    for (id, name, organization_type) in [
        ("org-pbc", "Provincial Blood Center", "blood_bank"),
        ("org-cbc", "City Blood Council", "lgu_council"),
    ] {
        store
            .insert_organization(Organization {
                id: OrganizationId::from(id),
                name: name.to_string(),
                organization_type: organization_type.to_string(),
                is_active: true,
                created_at: Some(Utc::now()),
                updated_at: None,
            })
            .await;
    }

    store
        .insert_coverage_area(CoverageArea {
            id: CoverageAreaId::from("ca-first"),
            name: "First District Coverage".to_string(),
            geographic_units: vec![LocationId::from("dist-1")],
            is_active: true,
            created_at: Some(Utc::now()),
            updated_at: None,
        })
        .await;
    store
        .insert_coverage_area(CoverageArea {
            id: CoverageAreaId::from("ca-currimao"),
            name: "Currimao Coverage".to_string(),
            geographic_units: vec![LocationId::from("muni-currimao")],
            is_active: true,
            created_at: Some(Utc::now()),
            updated_at: None,
        })
        .await;

    for (id, name) in [
        ("root-1", "Root"),
        ("admin-1", "Admin One"),
        ("coord-1", "Coordinator One"),
        ("coord-2", "Coordinator Two"),
        ("donor-1", "Donor One"),
        ("donor-2", "Donor Two"),
        ("walkin-1", "Walk-in One"),
    ] {
        store
            .insert_principal(Principal {
                is_system_admin: id == "root-1",
                ..Principal::bare(PrincipalId::from(id), &format!("{id}@example.com"), name)
            })
            .await;
    }

    let assign_role = |principal: &str, role: &str| RoleAssignment {
        principal_id: PrincipalId::from(principal),
        role_id: RoleId::from(role),
        is_active: true,
        assigned_at: Some(Utc::now()),
    };
    store.assign_role(assign_role("admin-1", "role-staffing")).await?;
    store.assign_role(assign_role("coord-1", "role-coord")).await?;
    store.assign_role(assign_role("coord-2", "role-coord")).await?;
    store.assign_role(assign_role("donor-1", "role-donor")).await?;
    store.assign_role(assign_role("donor-2", "role-donor")).await?;

    let join = |principal: &str, organization: &str| OrganizationAssignment {
        principal_id: PrincipalId::from(principal),
        organization_id: OrganizationId::from(organization),
        is_primary: true,
        is_active: true,
        expires_at: None,
        assigned_by: None,
        assigned_at: Some(Utc::now()),
    };
    store.assign_organization(join("coord-1", "org-pbc")).await?;
    store.assign_organization(join("coord-2", "org-cbc")).await?;
    store.assign_organization(join("donor-1", "org-pbc")).await?;
    store.assign_organization(join("donor-2", "org-cbc")).await?;

    let cover = |principal: &str, area: &str| CoverageAssignment {
        principal_id: PrincipalId::from(principal),
        coverage_area_id: CoverageAreaId::from(area),
        is_primary: true,
        auto_cover_descendants: true,
        expires_at: None,
        is_active: true,
        assigned_at: Some(Utc::now()),
    };
    store.assign_coverage_area(cover("coord-1", "ca-first")).await?;
    store.assign_coverage_area(cover("coord-2", "ca-currimao")).await?;

    store
        .set_stakeholder_location(
            &PrincipalId::from("donor-1"),
            StakeholderLocation {
                municipality_id: Some(LocationId::from("muni-laoag")),
                barangay_id: Some(LocationId::from("brgy-1")),
            },
        )
        .await?;
    store
        .set_stakeholder_location(
            &PrincipalId::from("donor-2"),
            StakeholderLocation {
                municipality_id: Some(LocationId::from("muni-currimao")),
                barangay_id: None,
            },
        )
        .await?;
    store
        .set_stakeholder_location(
            &PrincipalId::from("walkin-1"),
            StakeholderLocation {
                municipality_id: Some(LocationId::from("muni-bacarra")),
                barangay_id: None,
            },
        )
        .await?;

    // coord-2's snapshot is left unbuilt: its first resolution will take the
    // permission-scan path and cache the result
    for id in ["admin-1", "coord-1", "donor-1", "donor-2"] {
        store.rebuild_principal_snapshot(&PrincipalId::from(id)).await?;
    }

    Ok(store)
}
