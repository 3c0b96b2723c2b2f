//! The cross-reference index.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use traitdex_core::{Implementor, TraitListing, TypePath};

/// One implementor record together with the crate that registered it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexedImpl {
    /// The crate key the record was registered under.
    pub crate_name: String,
    /// The record itself.
    pub record: Implementor,
}

/// Cross-reference index over a set of trait listings.
///
/// Built once with [`ImplIndex::build`], then queried. Both directions
/// are keyed by `BTreeMap` so every lookup and iteration is sorted.
#[derive(Debug, Clone, Default)]
pub struct ImplIndex {
    by_trait: BTreeMap<TypePath, Vec<IndexedImpl>>,
    by_type: BTreeMap<TypePath, BTreeSet<TypePath>>,
}

impl ImplIndex {
    /// Build the index from a set of listings.
    ///
    /// When the same trait appears in more than one listing the record
    /// lists are concatenated in crate order.
    #[must_use]
    pub fn build(listings: &[TraitListing]) -> Self {
        let mut by_trait: BTreeMap<TypePath, Vec<IndexedImpl>> = BTreeMap::new();
        let mut by_type: BTreeMap<TypePath, BTreeSet<TypePath>> = BTreeMap::new();
        for listing in listings {
            let entries = by_trait.entry(listing.trait_path.clone()).or_default();
            for (crate_name, records) in listing.map.iter() {
                for record in records {
                    for ty in &record.types {
                        by_type
                            .entry(ty.clone())
                            .or_default()
                            .insert(listing.trait_path.clone());
                    }
                    entries.push(IndexedImpl {
                        crate_name: crate_name.to_string(),
                        record: record.clone(),
                    });
                }
            }
        }
        Self { by_trait, by_type }
    }

    /// Number of distinct traits in the index.
    #[must_use]
    pub fn trait_count(&self) -> usize {
        self.by_trait.len()
    }

    /// Number of distinct implementing types in the index.
    #[must_use]
    pub fn type_count(&self) -> usize {
        self.by_type.len()
    }

    /// All implementor records for a trait, in crate order.
    #[must_use]
    pub fn implementors_of(&self, trait_path: &TypePath) -> &[IndexedImpl] {
        self.by_trait.get(trait_path).map_or(&[], Vec::as_slice)
    }

    /// Traits a type implements, in sorted order.
    #[must_use]
    pub fn traits_for(&self, type_path: &TypePath) -> Vec<&TypePath> {
        self.by_type
            .get(type_path)
            .map(|traits| traits.iter().collect())
            .unwrap_or_default()
    }

    /// Crate keys that register at least one implementor of a trait,
    /// deduplicated and sorted.
    #[must_use]
    pub fn crates_registering(&self, trait_path: &TypePath) -> Vec<&str> {
        let crates: BTreeSet<&str> = self
            .implementors_of(trait_path)
            .iter()
            .map(|entry| entry.crate_name.as_str())
            .collect();
        crates.into_iter().collect()
    }

    /// Traits known to the index, in sorted order.
    pub fn trait_paths(&self) -> impl Iterator<Item = &TypePath> {
        self.by_trait.keys()
    }

    /// Implementing types known to the index, in sorted order.
    pub fn type_paths(&self) -> impl Iterator<Item = &TypePath> {
        self.by_type.keys()
    }
}
