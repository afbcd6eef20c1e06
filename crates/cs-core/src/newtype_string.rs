//! Macro for defining normalized, non-empty string newtypes.
//!
//! Offense names and state codes flow through every table as keys. Wrapping
//! them keeps a state code from being passed where an offense name is
//! expected, and applies one normalization at the boundary instead of at
//! every comparison.

/// Define a strongly-typed, non-empty string newtype.
///
/// The `normalize` function runs before the emptiness check, so a value made
/// only of whitespace is rejected when the normalizer trims.
///
/// Generates:
/// - The struct with `Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize`
/// - Custom `Deserialize` (normalizes, rejects empty strings)
/// - `new()` (panics on empty), `try_new()`, `as_str()`, `into_inner()`
/// - `Display`, `AsRef<str>`, `Deref<Target=str>`, `Borrow<str>`
/// - `PartialEq<str>`, `PartialEq<&str>`
macro_rules! define_newtype_string {
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident;
        normalize = $normalize:path;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
        #[serde(transparent)]
        $vis struct $Name(String);

        impl<'de> serde::Deserialize<'de> for $Name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                $Name::try_new(s)
                    .ok_or_else(|| serde::de::Error::custom(concat!(stringify!($Name), " must not be empty")))
            }
        }

        impl $Name {
            /// Create a new instance, panicking if the normalized value is empty.
            ///
            /// Reserved for compile-time constants; use [`try_new`](Self::try_new)
            /// for decoded input.
            pub fn new(value: impl AsRef<str>) -> Self {
                match Self::try_new(value) {
                    Some(v) => v,
                    None => panic!(concat!(stringify!($Name), " must not be empty")),
                }
            }

            /// Normalize and wrap `value`, returning `None` if nothing is left.
            pub fn try_new(value: impl AsRef<str>) -> Option<Self> {
                let s: String = $normalize(value.as_ref());
                if s.is_empty() { None } else { Some(Self(s)) }
            }

            /// Return the underlying value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the inner `String`.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl std::fmt::Display for $Name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $Name {
            fn as_ref(&self) -> &str { &self.0 }
        }

        impl std::ops::Deref for $Name {
            type Target = str;
            fn deref(&self) -> &str { &self.0 }
        }

        impl std::borrow::Borrow<str> for $Name {
            fn borrow(&self) -> &str { &self.0 }
        }

        impl PartialEq<str> for $Name {
            fn eq(&self, other: &str) -> bool { self.0 == other }
        }

        impl PartialEq<&str> for $Name {
            fn eq(&self, other: &&str) -> bool { self.0 == *other }
        }
    };
}

pub(crate) use define_newtype_string;

pub(crate) fn trimmed(s: &str) -> String {
    s.trim().to_string()
}

pub(crate) fn trimmed_upper(s: &str) -> String {
    s.trim().to_ascii_uppercase()
}
