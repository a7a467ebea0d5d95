//! Newtype document names for type-safe references.
//!
//! ERPNext identifies every document by a string `name`. Use the
//! `define_name!` macro to create wrappers that prevent accidentally mixing
//! names of different doctypes (an item code is not a customer).

/// Macro to define a type-safe document name wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>`, `AsRef<str>` and `Display`
///
/// # Example
///
/// ```rust
/// # use erp_storefront_core::define_name;
/// define_name!(WarehouseName);
/// define_name!(SupplierName);
///
/// let warehouse = WarehouseName::new("Stores - WP");
/// assert_eq!(warehouse.as_str(), "Stores - WP");
///
/// // These are different types, so this won't compile:
/// // let _: SupplierName = warehouse;
/// ```
#[macro_export]
macro_rules! define_name {
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
            /// Create a new name from anything string-like.
            #[must_use]
            pub fn new(name: impl Into<String>) -> Self {
                Self(name.into())
            }

            /// Get the underlying string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(name: String) -> Self {
                Self(name)
            }
        }

        impl From<&str> for $name {
            fn from(name: &str) -> Self {
                Self(name.to_owned())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Names that cross doctype boundaries
define_name!(ItemCode);
define_name!(CustomerId);
