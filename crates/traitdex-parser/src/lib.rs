//! Parser for implementor listing files.
//!
//! This crate parses the generated JavaScript artifact that registers an
//! `implementors` mapping with a documentation page, producing the typed
//! model from `traitdex-core`. It also lowers each record's HTML `text`
//! fragment into a structured [`traitdex_core::ImplSignature`].
//!
//! # Features
//!
//! - Logos-based lexing of the JavaScript skeleton
//! - `serde_json` decoding of the embedded record arrays
//! - Error recovery (a malformed assignment does not abort the file)
//! - Precise byte spans for error reporting
//!
//! # Example
//!
//! ```
//! let source = r#"(function() {var implementors = {};
//! implementors["acme_db"] = [{"text":"impl Group for Storage","synthetic":false,"types":["acme_db::Storage"]}];
//! if (window.register_implementors) {window.register_implementors(implementors);} else {window.pending_implementors = implementors;}})()"#;
//!
//! let result = traitdex_parser::parse(source);
//! assert!(result.errors.is_empty());
//! assert_eq!(result.map.len(), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;
pub mod lexer;
mod parser;
pub mod signature;
mod span;

pub use error::{ParseError, ParseErrorKind};
pub use parser::{parse, ParseResult};
pub use signature::{parse_fragment, FragmentError};
pub use span::{Span, Spanned};

use traitdex_core::{TraitListing, TypePath};

/// Parse a listing file and tag the result with the trait it describes.
#[must_use]
pub fn parse_listing(source: &str, trait_path: TypePath) -> (TraitListing, Vec<ParseError>) {
    let result = parse(source);
    (TraitListing::new(trait_path, result.map), result.errors)
}
