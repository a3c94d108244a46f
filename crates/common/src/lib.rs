pub mod domain;
pub mod garde;
pub mod memory;
pub mod telemetry;

// Re-export mocks when testing feature is enabled
#[cfg(any(test, feature = "testing"))]
pub use domain::MockAssignmentRepository;
#[cfg(any(test, feature = "testing"))]
pub use domain::MockCoverageAreaRepository;
#[cfg(any(test, feature = "testing"))]
pub use domain::MockLocationRepository;
#[cfg(any(test, feature = "testing"))]
pub use domain::MockOrganizationRepository;
#[cfg(any(test, feature = "testing"))]
pub use domain::MockPrincipalRepository;
#[cfg(any(test, feature = "testing"))]
pub use domain::MockRoleRepository;
