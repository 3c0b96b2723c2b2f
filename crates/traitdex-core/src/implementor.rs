//! Implementor records and per-trait listings.

use crate::TypePath;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use thiserror::Error;

/// One trait-implementation record as it appears on the wire.
///
/// Field names and order match the generated artifact exactly:
/// `{"text": ..., "synthetic": ..., "types": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Implementor {
    /// HTML fragment describing the implementation.
    pub text: String,
    /// Whether the implementation was synthesized by the compiler
    /// (auto traits) rather than written in source.
    pub synthetic: bool,
    /// Fully qualified paths of the types the implementation applies to.
    pub types: Vec<TypePath>,
}

impl Implementor {
    /// Create a new record.
    #[must_use]
    pub fn new(text: impl Into<String>, synthetic: bool, types: Vec<TypePath>) -> Self {
        Self {
            text: text.into(),
            synthetic,
            types,
        }
    }
}

/// A conflict discovered while merging two maps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeConflict {
    /// The crate key registered by both sides.
    pub crate_name: String,
    /// Number of records on the side being merged into.
    pub left_records: usize,
    /// Number of records on the side being merged from.
    pub right_records: usize,
}

/// Errors produced by [`ImplementorMap::merge`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    /// The same crate key carries differing record lists on the two sides.
    #[error("conflicting records for crate '{}' ({} vs {} records)",
        .0.crate_name, .0.left_records, .0.right_records)]
    Conflict(MergeConflict),
}

/// Mapping from crate name to that crate's implementor records.
///
/// Keys are kept sorted so iteration, and therefore rendering, is
/// deterministic regardless of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImplementorMap {
    entries: BTreeMap<String, Vec<Implementor>>,
}

impl ImplementorMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of crate keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map registers any crates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of records across all crates.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Records registered for a crate, if any.
    #[must_use]
    pub fn get(&self, crate_name: &str) -> Option<&[Implementor]> {
        self.entries.get(crate_name).map(Vec::as_slice)
    }

    /// Whether a crate key is present.
    #[must_use]
    pub fn contains(&self, crate_name: &str) -> bool {
        self.entries.contains_key(crate_name)
    }

    /// Replace the record list for a crate, returning the previous list.
    pub fn insert(
        &mut self,
        crate_name: impl Into<String>,
        records: Vec<Implementor>,
    ) -> Option<Vec<Implementor>> {
        self.entries.insert(crate_name.into(), records)
    }

    /// Append a single record to a crate's list, creating it if needed.
    pub fn push(&mut self, crate_name: impl Into<String>, record: Implementor) {
        self.entries.entry(crate_name.into()).or_default().push(record);
    }

    /// Iterate over `(crate, records)` pairs in sorted key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Implementor])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Crate keys in sorted order.
    pub fn crate_names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Merge another map into this one.
    ///
    /// A crate key present on both sides with an identical record list
    /// deduplicates silently; a differing list is a [`MergeError::Conflict`].
    /// On error the map is left unchanged for the conflicting key.
    pub fn merge(&mut self, other: Self) -> Result<(), MergeError> {
        for (crate_name, records) in other.entries {
            match self.entries.entry(crate_name) {
                Entry::Vacant(slot) => {
                    slot.insert(records);
                }
                Entry::Occupied(existing) => {
                    if *existing.get() != records {
                        return Err(MergeError::Conflict(MergeConflict {
                            crate_name: existing.key().clone(),
                            left_records: existing.get().len(),
                            right_records: records.len(),
                        }));
                    }
                }
            }
        }
        Ok(())
    }
}

impl FromIterator<(String, Vec<Implementor>)> for ImplementorMap {
    fn from_iter<I: IntoIterator<Item = (String, Vec<Implementor>)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// An [`ImplementorMap`] together with the trait it describes.
///
/// The trait path is not stored in the artifact itself; it is derived from
/// the file's location under `implementors/` in a documentation root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitListing {
    /// Fully qualified path of the documented trait.
    pub trait_path: TypePath,
    /// The implementor mapping for that trait.
    pub map: ImplementorMap,
}

impl TraitListing {
    /// Create a listing.
    #[must_use]
    pub const fn new(trait_path: TypePath, map: ImplementorMap) -> Self {
        Self { trait_path, map }
    }
}
