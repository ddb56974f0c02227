//! Newtype IDs for upstream resource references.
//!
//! Google APIs hand out opaque string identifiers, usually wrapped in a
//! resource name such as `accounts/123456` or `properties/987654`. The
//! `define_id!` macro creates wrappers so account, property and merchant IDs
//! cannot be mixed up when they flow through the session and the routes.

/// Macro to define a type-safe opaque string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `from_resource_name()`, `as_str()`
/// - `From<String>`, `From<&str>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use beacon_core::define_id;
/// define_id!(WidgetId);
///
/// let id = WidgetId::from_resource_name("widgets/42");
/// assert_eq!(id.as_str(), "42");
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a raw identifier.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Create an ID from an API resource name, keeping the last path segment.
            ///
            /// `accounts/123` becomes `123`; a bare identifier is kept as is.
            #[must_use]
            pub fn from_resource_name(name: &str) -> Self {
                Self(name.rsplit('/').next().unwrap_or(name).to_owned())
            }

            /// Get the underlying identifier.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether the identifier is empty.
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(AccountId);
define_id!(PropertyId);
define_id!(MerchantId);
