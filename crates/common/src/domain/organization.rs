use crate::domain::id::OrganizationId;
use crate::domain::result::DomainResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Organization entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Organization {
    pub id: OrganizationId,
    pub name: String,
    /// Free-form category: blood bank, hospital, LGU partner, and so on.
    pub organization_type: String,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Input for getting an organization by ID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetOrganizationInput {
    pub organization_id: OrganizationId,
}

/// Repository trait for organization storage operations
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    /// Get an organization by ID
    async fn get_organization(
        &self,
        input: GetOrganizationInput,
    ) -> DomainResult<Option<Organization>>;
}
