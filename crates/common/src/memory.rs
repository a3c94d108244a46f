mod assignment_repository;
mod coverage_area_repository;
mod location_repository;
mod organization_repository;
mod principal_repository;
mod role_repository;
mod store;

pub use assignment_repository::*;
pub use coverage_area_repository::*;
pub use location_repository::*;
pub use organization_repository::*;
pub use principal_repository::*;
pub use role_repository::*;
pub use store::*;
