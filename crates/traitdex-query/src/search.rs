//! Regex search over the index.

use crate::index::ImplIndex;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use traitdex_core::TypePath;

/// Errors produced while building a search.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The search pattern is not a valid regular expression.
    #[error("invalid search pattern: {0}")]
    BadPattern(#[from] regex::Error),
}

/// A compiled search over trait and type paths.
#[derive(Debug, Clone)]
pub struct SearchFilter {
    pattern: Regex,
    crate_name: Option<String>,
    include_synthetic: bool,
}

impl SearchFilter {
    /// Compile a pattern. Matching is substring-style, the way `grep` is.
    pub fn new(pattern: &str) -> Result<Self, QueryError> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            crate_name: None,
            include_synthetic: true,
        })
    }

    /// Restrict hits to records registered by one crate.
    #[must_use]
    pub fn in_crate(mut self, crate_name: impl Into<String>) -> Self {
        self.crate_name = Some(crate_name.into());
        self
    }

    /// Exclude compiler-synthesized implementations.
    #[must_use]
    pub fn skip_synthetic(mut self) -> Self {
        self.include_synthetic = false;
        self
    }
}

/// One search result: a (trait, type) pairing that matched.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct SearchHit {
    /// The trait side of the pairing.
    pub trait_path: TypePath,
    /// The implementing type.
    pub type_path: TypePath,
    /// The crate that registered the record.
    pub crate_name: String,
    /// Whether the implementation was compiler-synthesized.
    pub synthetic: bool,
}

impl ImplIndex {
    /// Run a search. A hit is produced when the pattern matches either
    /// the trait path or the type path of a record. Results are sorted
    /// and deduplicated.
    #[must_use]
    pub fn search(&self, filter: &SearchFilter) -> Vec<SearchHit> {
        let mut hits = Vec::new();
        for trait_path in self.trait_paths() {
            let trait_matches = filter.pattern.is_match(trait_path.as_str());
            for entry in self.implementors_of(trait_path) {
                if !filter.include_synthetic && entry.record.synthetic {
                    continue;
                }
                if let Some(wanted) = &filter.crate_name {
                    if entry.crate_name != *wanted {
                        continue;
                    }
                }
                for ty in &entry.record.types {
                    if trait_matches || filter.pattern.is_match(ty.as_str()) {
                        hits.push(SearchHit {
                            trait_path: trait_path.clone(),
                            type_path: ty.clone(),
                            crate_name: entry.crate_name.clone(),
                            synthetic: entry.record.synthetic,
                        });
                    }
                }
            }
        }
        hits.sort();
        hits.dedup();
        hits
    }
}
