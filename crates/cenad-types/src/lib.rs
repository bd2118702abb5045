//! Validated identifier types for CENAD file storage.
//!
//! Every externally supplied value that ends up as a directory or file name
//! (tenant ids, resource ids, upload file names, configured folder names) is
//! wrapped in a type from this crate. Construction is the only place the
//! validation rules live, so once a value exists it is known to be a single,
//! non-traversing path component.

use std::path::{Component, Path};

/// Longest single path component accepted, in bytes (`NAME_MAX` on common filesystems).
pub const MAX_SEGMENT_BYTES: usize = 255;

/// Errors that can occur when creating validated path segments.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TextError {
    /// The input was empty or contained only whitespace
    #[error("value cannot be empty")]
    Empty,

    /// The input was `.` or `..`
    #[error("value cannot be a relative directory reference: {0:?}")]
    Traversal(String),

    /// The input contained `/` or `\`
    #[error("value cannot contain a path separator: {0:?}")]
    Separator(String),

    /// The input contained NUL or another control character
    #[error("value cannot contain control characters")]
    ControlCharacter,

    /// The input was longer than [`MAX_SEGMENT_BYTES`]
    #[error("value is {0} bytes long (max {MAX_SEGMENT_BYTES})")]
    TooLong(usize),

    /// The input would not resolve to exactly one normal path component
    #[error("value is not a plain path component: {0:?}")]
    NotAComponent(String),
}

/// A string that is safe to use as exactly one path component.
///
/// Unlike trimmed text types, the input is stored verbatim: file names are kept
/// byte-for-byte as uploaded, so leading or trailing spaces are preserved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathSegment(String);

impl PathSegment {
    /// Validates `input` as a single path component.
    ///
    /// # Errors
    ///
    /// Returns a [`TextError`] if the input is blank, is `.` or `..`, contains a
    /// path separator or control character, exceeds [`MAX_SEGMENT_BYTES`], or
    /// would be interpreted by the platform as anything other than one normal
    /// component (for example a Windows drive prefix).
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let value = input.as_ref();

        if value.trim().is_empty() {
            return Err(TextError::Empty);
        }
        if value == "." || value == ".." {
            return Err(TextError::Traversal(value.to_owned()));
        }
        if value.contains('/') || value.contains('\\') {
            return Err(TextError::Separator(value.to_owned()));
        }
        if value.chars().any(char::is_control) {
            return Err(TextError::ControlCharacter);
        }
        if value.len() > MAX_SEGMENT_BYTES {
            return Err(TextError::TooLong(value.len()));
        }

        let mut components = Path::new(value).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(Self(value.to_owned())),
            _ => Err(TextError::NotAComponent(value.to_owned())),
        }
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the segment, returning the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for PathSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PathSegment {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl AsRef<Path> for PathSegment {
    fn as_ref(&self) -> &Path {
        Path::new(&self.0)
    }
}

impl std::str::FromStr for PathSegment {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl serde::Serialize for PathSegment {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for PathSegment {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PathSegment::new(&s).map_err(serde::de::Error::custom)
    }
}

/// Declares a named wrapper around [`PathSegment`] so the different kinds of
/// identifier cannot be swapped at call sites.
macro_rules! segment_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(PathSegment);

        impl $name {
            /// Validates `input` using the [`PathSegment`] rules.
            pub fn parse(input: impl AsRef<str>) -> Result<Self, TextError> {
                PathSegment::new(input).map(Self)
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }

            /// Returns the underlying path segment.
            pub fn segment(&self) -> &PathSegment {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.0, f)
            }
        }

        impl AsRef<Path> for $name {
            fn as_ref(&self) -> &Path {
                self.0.as_ref()
            }
        }

        impl std::str::FromStr for $name {
            type Err = TextError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }
    };
}

segment_newtype!(
    /// Identifier of a tenant (a CENAD/CMT facility).
    TenantId
);

segment_newtype!(
    /// Identifier of a sub-resource (a resource or a request) within a tenant.
    ResourceId
);

segment_newtype!(
    /// Name of a stored file, kept exactly as uploaded.
    FileName
);
