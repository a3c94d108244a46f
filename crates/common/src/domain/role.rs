use crate::domain::id::RoleId;
use crate::domain::result::DomainResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// A resource with its allowed actions. Both sides accept the `*` wildcard.
///
/// Resources may carry a subtype after a colon (`staff:volunteer`); a bare
/// resource name is unrestricted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permission {
    pub resource: String,
    pub actions: Vec<String>,
}

impl Permission {
    pub const WILDCARD: &'static str = "*";

    /// True when this entry names `resource` exactly or via the wildcard.
    pub fn applies_to(&self, resource: &str) -> bool {
        self.resource == resource || self.resource == Self::WILDCARD
    }

    /// True when this entry names `resource`, one of its subtypes
    /// (`resource:<kind>`), or the wildcard.
    pub fn applies_to_family(&self, resource: &str) -> bool {
        if self.applies_to(resource) {
            return true;
        }
        self.resource
            .strip_prefix(resource)
            .is_some_and(|rest| rest.starts_with(':'))
    }

    /// True when the action list contains `action` or the wildcard.
    pub fn allows(&self, action: &str) -> bool {
        self.actions
            .iter()
            .any(|a| a == action || a == Self::WILDCARD)
    }

    /// Exact-resource grant check.
    pub fn grants(&self, resource: &str, action: &str) -> bool {
        self.applies_to(resource) && self.allows(action)
    }
}

/// Role entity: a named authority with its permission set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub id: RoleId,
    pub code: String,
    pub name: String,
    /// Source of truth for the tier this role confers, once persisted.
    pub authority: i32,
    pub permissions: Vec<Permission>,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Input for getting a role by ID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetRoleInput {
    pub role_id: RoleId,
}

/// Input for fetching several roles at once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetRolesByIdsInput {
    pub role_ids: Vec<RoleId>,
}

/// Repository trait for role storage operations
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Get a role by ID
    async fn get_role(&self, input: GetRoleInput) -> DomainResult<Option<Role>>;

    /// Get all roles matching the given IDs; missing IDs are silently absent
    async fn get_roles_by_ids(&self, input: GetRolesByIdsInput) -> DomainResult<Vec<Role>>;
}
