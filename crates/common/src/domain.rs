mod coverage;
mod id;
mod location;
mod organization;
mod principal;
mod result;
mod role;
mod tier;

pub use coverage::*;
pub use id::*;
pub use location::*;
pub use organization::*;
pub use principal::*;
pub use result::*;
pub use role::*;
pub use tier::*;
