//! Fully qualified item paths.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors produced when validating a type path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypePathError {
    /// The path contains no segments at all.
    #[error("empty type path")]
    Empty,
    /// A segment between `::` separators is empty.
    #[error("empty path segment in '{0}'")]
    EmptySegment(String),
    /// A segment is not a valid Rust identifier.
    #[error("invalid path segment '{segment}' in '{path}'")]
    InvalidSegment {
        /// The full path under validation.
        path: String,
        /// The offending segment.
        segment: String,
    },
}

/// A fully qualified item path such as `acme_db::SourceStorage`.
///
/// The inner string is stored as-is; [`TypePath::parse`] and
/// [`TypePath::is_well_formed`] apply the segment grammar (identifiers
/// separated by `::`). Keeping construction unchecked lets the parser
/// round-trip malformed input so validation can report it with a code
/// instead of dropping it on the floor.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypePath(String);

impl TypePath {
    /// Create a type path without validating it.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Parse and validate a type path.
    pub fn parse(path: impl Into<String>) -> Result<Self, TypePathError> {
        let path = path.into();
        validate(&path)?;
        Ok(Self(path))
    }

    /// Check whether this path satisfies the segment grammar.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        validate(&self.0).is_ok()
    }

    /// The raw path string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterate over the `::`-separated segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split("::")
    }

    /// The first segment, conventionally the defining crate.
    #[must_use]
    pub fn crate_name(&self) -> &str {
        self.segments().next().unwrap_or("")
    }

    /// The final segment, the item's own name.
    #[must_use]
    pub fn item_name(&self) -> &str {
        self.segments().last().unwrap_or("")
    }
}

impl fmt::Display for TypePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TypePath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

/// Check that a string is a valid Rust identifier (ASCII approximation).
#[must_use]
pub fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn validate(path: &str) -> Result<(), TypePathError> {
    if path.is_empty() {
        return Err(TypePathError::Empty);
    }
    for segment in path.split("::") {
        if segment.is_empty() {
            return Err(TypePathError::EmptySegment(path.to_string()));
        }
        if !is_ident(segment) {
            return Err(TypePathError::InvalidSegment {
                path: path.to_string(),
                segment: segment.to_string(),
            });
        }
    }
    Ok(())
}
