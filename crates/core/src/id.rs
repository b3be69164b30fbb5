//! Strongly-typed identifiers used across the domain.
//!
//! Identifiers in this system are opaque strings issued by the external
//! directory/auth service; this layer never mints them. The newtypes exist so
//! a shop id and a user id cannot be confused at a call site.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of a shop (directory-issued).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShopId(String);

/// Identifier of a user (auth-service-issued uid).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

macro_rules! impl_str_id {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Wrap a raw id string.
            ///
            /// No validation happens here; canonicalization of raw service
            /// shapes is the normalizer's job.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }

            /// Checked construction: rejects blank ids.
            pub fn try_from(value: &str) -> Result<Self, DomainError> {
                if value.trim().is_empty() {
                    return Err(DomainError::invalid_id(concat!($name, " must not be blank")));
                }
                Ok(Self(value.to_owned()))
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $t {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $t {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

    };
}

impl_str_id!(ShopId, "ShopId");
impl_str_id!(UserId, "UserId");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checked_construction_rejects_blank_ids() {
        assert!(ShopId::try_from("s1").is_ok());
        assert!(matches!(
            ShopId::try_from(""),
            Err(DomainError::InvalidId(_))
        ));
        assert!(matches!(
            UserId::try_from("   "),
            Err(DomainError::InvalidId(_))
        ));
    }

    #[test]
    fn serde_is_transparent() {
        let id = ShopId::new("s1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"s1\"");
        let back: ShopId = serde_json::from_str("\"s1\"").unwrap();
        assert_eq!(back, id);
    }
}
