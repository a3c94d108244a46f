mod authority_resolver;
mod coordinator_resolver;
mod coverage_expander;
mod engine;
mod jurisdiction_filter;
mod organization_matcher;

pub use authority_resolver::*;
pub use coordinator_resolver::*;
pub use coverage_expander::*;
pub use engine::*;
pub use jurisdiction_filter::*;
pub use organization_matcher::*;
