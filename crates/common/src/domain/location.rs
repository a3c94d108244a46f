use crate::domain::id::LocationId;
use crate::domain::result::DomainResult;
use async_trait::async_trait;

/// Level of a geographic unit in the location hierarchy.
///
/// The hierarchy is a strict tree: province → district/city → municipality →
/// barangay, each node with at most one parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationKind {
    Province,
    /// Legislative district or independent city, between province and municipality.
    District,
    Municipality,
    Barangay,
}

impl LocationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationKind::Province => "province",
            LocationKind::District => "district",
            LocationKind::Municipality => "municipality",
            LocationKind::Barangay => "barangay",
        }
    }
}

/// Geographic unit entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub kind: LocationKind,
    pub parent_id: Option<LocationId>,
}

/// Input for getting a location by ID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetLocationInput {
    pub location_id: LocationId,
}

/// Input for listing the children of a location, optionally narrowed to one kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetLocationChildrenInput {
    pub parent_id: LocationId,
    pub kind: Option<LocationKind>,
}

/// Repository trait for the read-only location hierarchy
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait LocationRepository: Send + Sync {
    /// Get a location by ID
    async fn get_location(&self, input: GetLocationInput) -> DomainResult<Option<Location>>;

    /// List the direct children of a location
    async fn get_location_children(
        &self,
        input: GetLocationChildrenInput,
    ) -> DomainResult<Vec<Location>>;
}
