//! Canonical rendering of implementor listings.
//!
//! Output reproduces the generated artifact shape exactly: an IIFE that
//! declares the `implementors` object, one assignment per crate key, and
//! the register-or-queue epilogue. Crate keys render in sorted order and
//! records use compact JSON, so rendering the same listing twice yields
//! byte-identical output.

use crate::{Implementor, TraitListing};
use std::fmt::Write;

/// Opening line of the artifact.
pub const HEADER: &str = "(function() {var implementors = {};";

/// Closing register-or-queue epilogue.
pub const EPILOGUE: &str = "if (window.register_implementors) \
{window.register_implementors(implementors);} else \
{window.pending_implementors = implementors;}})()";

/// Render a record list as the compact JSON array the artifact embeds.
#[must_use]
pub fn render_records(records: &[Implementor]) -> String {
    // Implementor contains no map-typed fields, so serialization cannot fail.
    serde_json::to_string(records).unwrap_or_else(|_| "[]".to_string())
}

/// Render a full listing file.
#[must_use]
pub fn render_listing(listing: &TraitListing) -> String {
    let mut out = String::new();
    out.push_str(HEADER);
    out.push('\n');
    for (crate_name, records) in listing.map.iter() {
        // Crate keys never need escaping beyond JSON string rules.
        let key = serde_json::to_string(crate_name).unwrap_or_default();
        let _ = writeln!(out, "implementors[{key}] = {};", render_records(records));
    }
    out.push_str(EPILOGUE);
    out
}
