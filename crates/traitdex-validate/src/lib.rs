//! Structural validation of implementor listings.
//!
//! Listings are machine-generated, so validation is about catching corrupt
//! or hand-mangled artifacts before they poison a documentation site's
//! cross-reference search:
//!
//! - Record shape (non-empty `types`, well-formed type paths)
//! - Crate keys (valid identifiers, non-empty record lists)
//! - `text` fragments (well-formed markup, known entities, complete links)
//! - Cross checks (self type appears in `types`, crate key owns its types)
//!
//! # Error Codes
//!
//! | Code | Description |
//! |------|-------------|
//! | E1001 | Record has an empty `types` list |
//! | E1002 | Malformed type path in `types` |
//! | E1003 | Duplicate type path within one crate's records |
//! | E1004 | Crate key is not a valid crate identifier |
//! | E1005 | Crate key maps to an empty record list |
//! | E2001 | `text` fragment is not well-formed markup |
//! | E2002 | Unknown or unterminated HTML entity in `text` |
//! | E2003 | Link element missing a required attribute or kind |
//! | E3001 | No `types` entry matches the fragment's self type |
//! | E3002 | `types` entry's crate differs from the crate key (warning) |
//! | W4001 | Record `text` does not begin with `impl` (warning) |
//! | I5001 | Listing registers zero crates (info) |

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use rayon::prelude::*;
use traitdex_core::{Implementor, TraitListing, TypePath};
use traitdex_parser::{parse_fragment, FragmentError};

/// Validation error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorCode {
    // === Record shape (E1xxx) ===
    /// E1001: Record has an empty `types` list.
    EmptyTypes,
    /// E1002: Malformed type path in `types`.
    MalformedTypePath,
    /// E1003: Duplicate type path within one crate's records.
    DuplicateTypePath,
    /// E1004: Crate key is not a valid crate identifier.
    InvalidCrateKey,
    /// E1005: Crate key maps to an empty record list.
    EmptyRecordList,

    // === Text fragments (E2xxx) ===
    /// E2001: `text` fragment is not well-formed markup.
    MalformedText,
    /// E2002: Unknown or unterminated HTML entity in `text`.
    BadEntity,
    /// E2003: Link element missing a required attribute or kind.
    IncompleteLink,

    // === Cross checks (E3xxx) ===
    /// E3001: No `types` entry matches the fragment's self type.
    SelfTypeMismatch,
    /// E3002: A `types` entry's crate differs from the crate key.
    ForeignTypePath,

    // === Suspicious content (W4xxx) ===
    /// W4001: Record `text` does not begin with `impl`.
    TextNotImpl,

    // === Informational (I5xxx) ===
    /// I5001: Listing registers zero crates.
    EmptyListing,
}

impl ErrorCode {
    /// Get the error code string (e.g., "E1001").
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::EmptyTypes => "E1001",
            Self::MalformedTypePath => "E1002",
            Self::DuplicateTypePath => "E1003",
            Self::InvalidCrateKey => "E1004",
            Self::EmptyRecordList => "E1005",
            Self::MalformedText => "E2001",
            Self::BadEntity => "E2002",
            Self::IncompleteLink => "E2003",
            Self::SelfTypeMismatch => "E3001",
            Self::ForeignTypePath => "E3002",
            Self::TextNotImpl => "W4001",
            Self::EmptyListing => "I5001",
        }
    }

    /// Check if this is a warning (not an error).
    #[must_use]
    pub const fn is_warning(&self) -> bool {
        matches!(self, Self::ForeignTypePath | Self::TextNotImpl)
    }

    /// Check if this is just informational.
    #[must_use]
    pub const fn is_info(&self) -> bool {
        matches!(self, Self::EmptyListing)
    }

    /// Get the severity level.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        if self.is_info() {
            Severity::Info
        } else if self.is_warning() {
            Severity::Warning
        } else {
            Severity::Error
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Severity level for validation messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Listing is structurally broken.
    Error,
    /// Suspicious but usable.
    Warning,
    /// Informational only.
    Info,
}

/// A validation diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
    /// The trait whose listing produced the diagnostic.
    pub trait_path: TypePath,
    /// The crate key, when the diagnostic applies to one crate's records.
    pub crate_name: Option<String>,
    /// Index of the record within the crate's list, when applicable.
    pub record: Option<usize>,
}

impl ValidationError {
    fn listing_level(code: ErrorCode, message: String, trait_path: &TypePath) -> Self {
        Self {
            code,
            message,
            trait_path: trait_path.clone(),
            crate_name: None,
            record: None,
        }
    }

    fn crate_level(
        code: ErrorCode,
        message: String,
        trait_path: &TypePath,
        crate_name: &str,
    ) -> Self {
        Self {
            code,
            message,
            trait_path: trait_path.clone(),
            crate_name: Some(crate_name.to_string()),
            record: None,
        }
    }

    fn record_level(
        code: ErrorCode,
        message: String,
        trait_path: &TypePath,
        crate_name: &str,
        record: usize,
    ) -> Self {
        Self {
            code,
            message,
            trait_path: trait_path.clone(),
            crate_name: Some(crate_name.to_string()),
            record: Some(record),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(crate_name) = &self.crate_name {
            write!(f, " (crate '{crate_name}'")?;
            if let Some(record) = self.record {
                write!(f, ", record {record}")?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

/// Validate a single listing.
#[must_use]
pub fn validate(listing: &TraitListing) -> Vec<ValidationError> {
    let trait_path = &listing.trait_path;
    let mut errors = Vec::new();

    if listing.map.is_empty() {
        errors.push(ValidationError::listing_level(
            ErrorCode::EmptyListing,
            format!("listing for '{trait_path}' registers no crates"),
            trait_path,
        ));
        return errors;
    }

    let crates: Vec<(&str, &[Implementor])> = listing.map.iter().collect();
    let mut per_crate: Vec<Vec<ValidationError>> = crates
        .par_iter()
        .map(|(crate_name, records)| validate_crate(trait_path, crate_name, records))
        .collect();
    for batch in &mut per_crate {
        errors.append(batch);
    }
    errors
}

/// Validate a set of listings, in parallel.
#[must_use]
pub fn validate_all(listings: &[TraitListing]) -> Vec<ValidationError> {
    let mut errors: Vec<ValidationError> = listings.par_iter().flat_map(validate).collect();
    errors.sort_by(|a, b| {
        (&a.trait_path, &a.crate_name, a.record, a.code)
            .cmp(&(&b.trait_path, &b.crate_name, b.record, b.code))
    });
    errors
}

fn validate_crate(
    trait_path: &TypePath,
    crate_name: &str,
    records: &[Implementor],
) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if !traitdex_core::type_path::is_ident(crate_name) {
        errors.push(ValidationError::crate_level(
            ErrorCode::InvalidCrateKey,
            format!("'{crate_name}' is not a valid crate identifier"),
            trait_path,
            crate_name,
        ));
    }
    if records.is_empty() {
        errors.push(ValidationError::crate_level(
            ErrorCode::EmptyRecordList,
            format!("crate '{crate_name}' registers no records"),
            trait_path,
            crate_name,
        ));
    }

    let mut seen_types: Vec<&TypePath> = Vec::new();
    for (index, record) in records.iter().enumerate() {
        validate_record(trait_path, crate_name, index, record, &mut errors);
        for ty in &record.types {
            if seen_types.contains(&ty) {
                errors.push(ValidationError::record_level(
                    ErrorCode::DuplicateTypePath,
                    format!("type '{ty}' appears more than once for crate '{crate_name}'"),
                    trait_path,
                    crate_name,
                    index,
                ));
            } else {
                seen_types.push(ty);
            }
        }
    }
    errors
}

fn validate_record(
    trait_path: &TypePath,
    crate_name: &str,
    index: usize,
    record: &Implementor,
    errors: &mut Vec<ValidationError>,
) {
    if record.types.is_empty() {
        errors.push(ValidationError::record_level(
            ErrorCode::EmptyTypes,
            "record has an empty 'types' list".to_string(),
            trait_path,
            crate_name,
            index,
        ));
    }
    for ty in &record.types {
        if !ty.is_well_formed() {
            errors.push(ValidationError::record_level(
                ErrorCode::MalformedTypePath,
                format!("'{ty}' is not a well-formed type path"),
                trait_path,
                crate_name,
                index,
            ));
        } else if ty.crate_name() != crate_name {
            errors.push(ValidationError::record_level(
                ErrorCode::ForeignTypePath,
                format!("type '{ty}' does not belong to crate '{crate_name}'"),
                trait_path,
                crate_name,
                index,
            ));
        }
    }

    match parse_fragment(&record.text) {
        Ok(signature) => {
            let matches_self = record.types.iter().any(|ty| {
                ty.as_str() == signature.self_link.qualified_path()
                    || ty.item_name() == signature.self_link.name
            });
            if !record.types.is_empty() && !matches_self {
                errors.push(ValidationError::record_level(
                    ErrorCode::SelfTypeMismatch,
                    format!(
                        "no 'types' entry matches implementing type '{}'",
                        signature.self_link.qualified_path()
                    ),
                    trait_path,
                    crate_name,
                    index,
                ));
            }
        }
        Err(err) => {
            let code = match &err {
                FragmentError::Entity(_) => ErrorCode::BadEntity,
                FragmentError::MissingAttr(_) | FragmentError::UnknownItemKind(_) => {
                    ErrorCode::IncompleteLink
                }
                FragmentError::MalformedHeader => ErrorCode::TextNotImpl,
                FragmentError::UnterminatedTag(_)
                | FragmentError::UnknownTag { .. }
                | FragmentError::MismatchedClose { .. }
                | FragmentError::Unclosed(_)
                | FragmentError::MalformedAttr { .. }
                | FragmentError::MissingSelfLink => ErrorCode::MalformedText,
            };
            errors.push(ValidationError::record_level(
                code,
                format!("cannot parse record text: {err}"),
                trait_path,
                crate_name,
                index,
            ));
        }
    }
}
