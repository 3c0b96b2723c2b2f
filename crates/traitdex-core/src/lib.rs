//! Core types for traitdex
//!
//! This crate provides the fundamental types used throughout the traitdex
//! project:
//!
//! - [`TypePath`] - A fully qualified item path (`acme_db::SourceStorage`)
//! - [`Implementor`] - One trait-implementation record (`text`, `synthetic`, `types`)
//! - [`ImplementorMap`] - Crate name to implementor records, with merge support
//! - [`TraitListing`] - An [`ImplementorMap`] tagged with the trait it describes
//! - [`ImplSignature`] - Structured form of a record's HTML `text` fragment
//!
//! # Example
//!
//! ```
//! use traitdex_core::{Implementor, ImplementorMap, TraitListing, TypePath};
//!
//! let mut map = ImplementorMap::new();
//! map.push(
//!     "acme_db",
//!     Implementor::new(
//!         "impl Group for SourceStorage",
//!         false,
//!         vec![TypePath::new("acme_db::SourceStorage")],
//!     ),
//! );
//!
//! let listing = TraitListing::new(TypePath::new("acme::plumbing::Group"), map);
//! let js = traitdex_core::render_listing(&listing);
//! assert!(js.contains("implementors[\"acme_db\"]"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod entity;
pub mod implementor;
pub mod render;
pub mod signature;
pub mod type_path;

pub use entity::{escape, unescape, EntityError};
pub use implementor::{Implementor, ImplementorMap, MergeConflict, MergeError, TraitListing};
pub use render::{render_listing, render_records};
pub use signature::{ImplSignature, ItemKind, TypeLink};
pub use type_path::{TypePath, TypePathError};
