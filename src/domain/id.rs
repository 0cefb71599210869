//! Provider identifier types with NewType pattern
//!
//! Load balancer resources are identified by provider-assigned ARNs. Each
//! resource kind gets its own wrapper so a target group ARN can never be
//! passed where a listener ARN is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::Error;

/// Macro to generate NewType ARN wrappers with all required traits
macro_rules! arn_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a provider-issued identifier without validation
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Get the inner string value
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Convert to inner string value
            pub fn into_string(self) -> String {
                self.0
            }

            /// Parse an identifier, rejecting empty or whitespace-bearing values
            pub fn parse(s: &str) -> Result<Self, Error> {
                if s.is_empty() || s.chars().any(char::is_whitespace) {
                    return Err(Error::validation_field(
                        format!("'{}' is not a valid {}", s, stringify!($name)),
                        stringify!($name),
                    ));
                }
                Ok(Self(s.to_string()))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

arn_id!(
    /// Identifier of the load balancer a listener is attached to
    LoadBalancerArn
);

arn_id!(
    /// Provider-assigned listener identifier; the join key for updates
    ListenerArn
);

arn_id!(
    /// Identifier of a target group that forward actions route into
    TargetGroupArn
);

arn_id!(
    /// Identifier of a TLS certificate served by an HTTPS listener
    CertificateArn
);
