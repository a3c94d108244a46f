/// Full platform control, bypasses every jurisdiction check.
pub const SYSTEM_ADMIN_TIER: i32 = 100;
/// Operational staff administration across all organizations and geography.
pub const OPERATIONAL_ADMIN_TIER: i32 = 80;
/// Manages stakeholders within assigned coverage areas and organizations.
pub const COORDINATOR_TIER: i32 = 60;
/// Governed by a single municipality rather than a coverage area.
pub const STAKEHOLDER_TIER: i32 = 30;
/// Default tier for principals with no grants.
pub const BASIC_USER_TIER: i32 = 20;

/// Capability class of a principal, derived from its numeric authority tier.
///
/// Tier boundaries are inclusive lower bounds: any authority at or above a
/// class threshold belongs to that class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AuthorityTier {
    BasicUser,
    Stakeholder,
    Coordinator,
    OperationalAdmin,
    SystemAdmin,
}

impl AuthorityTier {
    /// Classify a raw authority value by comparison against the tier constants.
    pub fn from_authority(authority: i32) -> Self {
        if authority >= SYSTEM_ADMIN_TIER {
            AuthorityTier::SystemAdmin
        } else if authority >= OPERATIONAL_ADMIN_TIER {
            AuthorityTier::OperationalAdmin
        } else if authority >= COORDINATOR_TIER {
            AuthorityTier::Coordinator
        } else if authority >= STAKEHOLDER_TIER {
            AuthorityTier::Stakeholder
        } else {
            AuthorityTier::BasicUser
        }
    }

    pub fn as_i32(&self) -> i32 {
        match self {
            AuthorityTier::SystemAdmin => SYSTEM_ADMIN_TIER,
            AuthorityTier::OperationalAdmin => OPERATIONAL_ADMIN_TIER,
            AuthorityTier::Coordinator => COORDINATOR_TIER,
            AuthorityTier::Stakeholder => STAKEHOLDER_TIER,
            AuthorityTier::BasicUser => BASIC_USER_TIER,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AuthorityTier::SystemAdmin => "system_admin",
            AuthorityTier::OperationalAdmin => "operational_admin",
            AuthorityTier::Coordinator => "coordinator",
            AuthorityTier::Stakeholder => "stakeholder",
            AuthorityTier::BasicUser => "basic_user",
        }
    }
}

/// Display name for an authority tier value.
pub fn tier_name(authority: i32) -> &'static str {
    AuthorityTier::from_authority(authority).as_str()
}

/// Operational admin and above bypass jurisdiction checks entirely.
pub fn is_admin_tier(authority: i32) -> bool {
    authority >= OPERATIONAL_ADMIN_TIER
}

/// Coordinator and above are coverage-area-governed.
pub fn is_coordinator_class(authority: i32) -> bool {
    authority >= COORDINATOR_TIER
}

/// Below coordinator, principals are location-governed.
pub fn is_stakeholder_class(authority: i32) -> bool {
    authority < COORDINATOR_TIER
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_authority_buckets_by_lower_bound() {
        assert_eq!(AuthorityTier::from_authority(100), AuthorityTier::SystemAdmin);
        assert_eq!(AuthorityTier::from_authority(150), AuthorityTier::SystemAdmin);
        assert_eq!(AuthorityTier::from_authority(80), AuthorityTier::OperationalAdmin);
        assert_eq!(AuthorityTier::from_authority(99), AuthorityTier::OperationalAdmin);
        assert_eq!(AuthorityTier::from_authority(60), AuthorityTier::Coordinator);
        assert_eq!(AuthorityTier::from_authority(79), AuthorityTier::Coordinator);
        assert_eq!(AuthorityTier::from_authority(30), AuthorityTier::Stakeholder);
        assert_eq!(AuthorityTier::from_authority(20), AuthorityTier::BasicUser);
        assert_eq!(AuthorityTier::from_authority(0), AuthorityTier::BasicUser);
        assert_eq!(AuthorityTier::from_authority(-5), AuthorityTier::BasicUser);
    }

    #[test]
    fn test_tier_name() {
        assert_eq!(tier_name(SYSTEM_ADMIN_TIER), "system_admin");
        assert_eq!(tier_name(OPERATIONAL_ADMIN_TIER), "operational_admin");
        assert_eq!(tier_name(COORDINATOR_TIER), "coordinator");
        assert_eq!(tier_name(STAKEHOLDER_TIER), "stakeholder");
        assert_eq!(tier_name(BASIC_USER_TIER), "basic_user");
        assert_eq!(tier_name(45), "stakeholder");
    }

    #[test]
    fn test_class_predicates() {
        assert!(is_admin_tier(OPERATIONAL_ADMIN_TIER));
        assert!(is_admin_tier(SYSTEM_ADMIN_TIER));
        assert!(!is_admin_tier(COORDINATOR_TIER));

        assert!(is_coordinator_class(COORDINATOR_TIER));
        assert!(is_coordinator_class(SYSTEM_ADMIN_TIER));
        assert!(!is_coordinator_class(STAKEHOLDER_TIER));

        assert!(is_stakeholder_class(STAKEHOLDER_TIER));
        assert!(is_stakeholder_class(BASIC_USER_TIER));
        assert!(!is_stakeholder_class(COORDINATOR_TIER));
    }

    #[test]
    fn test_class_boundaries_are_inclusive_lower_bounds() {
        assert!(is_coordinator_class(60));
        assert!(!is_coordinator_class(59));
        assert!(is_admin_tier(80));
        assert!(!is_admin_tier(79));
    }
}
