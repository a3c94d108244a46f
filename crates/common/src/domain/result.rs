use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Principal not found: {0}")]
    PrincipalNotFound(String),

    #[error("Role not found: {0}")]
    RoleNotFound(String),

    #[error("Organization not found: {0}")]
    OrganizationNotFound(String),

    #[error("Coverage area not found: {0}")]
    CoverageAreaNotFound(String),

    #[error("Location not found: {0}")]
    LocationNotFound(String),

    #[error("Misconfigured location hierarchy: {0}")]
    MisconfiguredHierarchy(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Repository error: {0}")]
    RepositoryError(#[from] anyhow::Error),
}

impl DomainError {
    /// True for errors caused by bad or missing records rather than
    /// infrastructure failure. Decision functions degrade these to the most
    /// restrictive answer instead of propagating them.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            DomainError::PrincipalNotFound(_)
                | DomainError::RoleNotFound(_)
                | DomainError::OrganizationNotFound(_)
                | DomainError::CoverageAreaNotFound(_)
                | DomainError::LocationNotFound(_)
                | DomainError::MisconfiguredHierarchy(_)
        )
    }
}
