use garde::Validate;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Validate,
        )]
        #[serde(transparent)]
        #[garde(transparent)]
        pub struct $name(#[garde(length(min = 1))] pub String);

        impl $name {
            /// Generate a new unique id
            pub fn generate() -> Self {
                Self(xid::new().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

define_id!(
    /// Identifier of a principal (user) record
    PrincipalId
);

define_id!(
    /// Identifier of a role
    RoleId
);

define_id!(
    /// Identifier of an organization
    OrganizationId
);

define_id!(
    /// Identifier of a coverage area
    CoverageAreaId
);

define_id!(
    /// Identifier of a geographic unit in the location hierarchy
    LocationId
);
