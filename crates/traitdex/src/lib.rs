//! Implementor-listing CLI tools.
//!
//! This crate provides command-line tools for working with rustdoc
//! implementor listings:
//!
//! - `tdex-check`: Validate the listings under a documentation root
//! - `tdex-format`: Re-emit listings in canonical form
//! - `tdex-query`: Cross-reference queries over a documentation root
//! - `tdex-merge`: Merge the listing sets of several documentation roots
//!
//! # Example Usage
//!
//! ```bash
//! tdex-check target/doc
//! tdex-format --check target/doc/implementors/acme/trait.Group.js
//! tdex-query target/doc --implementors-of acme::Group
//! tdex-merge merged/ target/doc other/doc
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cmd;
pub mod report;
