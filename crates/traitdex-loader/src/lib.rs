//! Documentation-root scanning and listing loading.
//!
//! A documentation root keeps one listing file per documented trait under
//! `implementors/<module path>/trait.<Name>.js`. This crate walks that
//! subtree, derives each listing's trait path from its location, and parses
//! the files in parallel. Parse failures are carried in the result instead
//! of aborting the scan, so a single corrupt file does not hide the rest of
//! the root from validation.
//!
//! # Example
//!
//! ```ignore
//! use traitdex_loader::DocRoot;
//!
//! let result = DocRoot::new("target/doc").scan()?;
//! for loaded in &result.listings {
//!     println!("{}: {} crates", loaded.listing.trait_path, loaded.listing.map.len());
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod fingerprint;
mod source_map;

pub use fingerprint::{fingerprint_listing, fingerprint_listings};
pub use source_map::{SourceFile, SourceMap};

use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use traitdex_core::{TraitListing, TypePath};
use traitdex_parser::ParseError;

/// Name of the listing subtree inside a documentation root.
pub const IMPLEMENTORS_DIR: &str = "implementors";

/// Errors that can occur during loading.
#[derive(Debug, Error)]
pub enum LoadError {
    /// IO error reading a file or directory.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The path that failed to read.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The root has no `implementors/` subtree.
    #[error("no '{IMPLEMENTORS_DIR}' directory under {root}")]
    MissingImplementorsDir {
        /// The documentation root.
        root: PathBuf,
    },

    /// A listing file's location does not encode a valid trait path.
    #[error("cannot derive a trait path from {path}")]
    InvalidTraitPath {
        /// The offending file.
        path: PathBuf,
    },

    /// Parse errors occurred in a listing file.
    #[error("parse errors in {path}")]
    ParseErrors {
        /// The file with parse errors.
        path: PathBuf,
        /// The parse errors.
        errors: Vec<ParseError>,
    },
}

/// A listing together with the file it came from.
#[derive(Debug, Clone)]
pub struct LoadedListing {
    /// Path of the listing file.
    pub path: PathBuf,
    /// The parsed listing.
    pub listing: TraitListing,
}

/// Result of scanning a documentation root.
#[derive(Debug)]
pub struct LoadResult {
    /// Parsed listings, sorted by trait path.
    pub listings: Vec<LoadedListing>,
    /// All errors encountered during the scan.
    pub errors: Vec<LoadError>,
    /// Contents of every file that was read, for diagnostic rendering.
    pub source_map: SourceMap,
}

impl LoadResult {
    /// The listings without their source paths.
    #[must_use]
    pub fn into_listings(self) -> Vec<TraitListing> {
        self.listings.into_iter().map(|l| l.listing).collect()
    }
}

/// A documentation root directory.
#[derive(Debug, Clone)]
pub struct DocRoot {
    root: PathBuf,
}

impl DocRoot {
    /// Create a handle for a documentation root.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// The `implementors/` subtree.
    #[must_use]
    pub fn implementors_dir(&self) -> PathBuf {
        self.root.join(IMPLEMENTORS_DIR)
    }

    /// Scan the root, parsing every listing file found.
    pub fn scan(&self) -> Result<LoadResult, LoadError> {
        let dir = self.implementors_dir();
        if !dir.is_dir() {
            return Err(LoadError::MissingImplementorsDir {
                root: self.root.clone(),
            });
        }

        let mut files = Vec::new();
        let mut errors = Vec::new();
        collect_listing_files(&dir, &mut files, &mut errors);
        // Deterministic processing order regardless of directory iteration.
        files.sort();
        debug!(count = files.len(), root = %self.root.display(), "scanning listings");

        let parsed: Vec<_> = files
            .par_iter()
            .map(|path| load_one(&dir, path))
            .collect();

        let mut listings = Vec::new();
        let mut source_map = SourceMap::new();
        for outcome in parsed {
            match outcome {
                Ok((loaded, content, parse_errors)) => {
                    source_map.add_file(loaded.path.clone(), content);
                    if !parse_errors.is_empty() {
                        errors.push(LoadError::ParseErrors {
                            path: loaded.path.clone(),
                            errors: parse_errors,
                        });
                    }
                    listings.push(loaded);
                }
                Err(err) => errors.push(err),
            }
        }
        listings.sort_by(|a, b| a.listing.trait_path.cmp(&b.listing.trait_path));

        Ok(LoadResult {
            listings,
            errors,
            source_map,
        })
    }

    /// The listing files under the root, in sorted order, without parsing
    /// them.
    pub fn listing_files(&self) -> Result<Vec<PathBuf>, LoadError> {
        let dir = self.implementors_dir();
        if !dir.is_dir() {
            return Err(LoadError::MissingImplementorsDir {
                root: self.root.clone(),
            });
        }
        let mut files = Vec::new();
        let mut errors = Vec::new();
        collect_listing_files(&dir, &mut files, &mut errors);
        if let Some(err) = errors.into_iter().next() {
            return Err(err);
        }
        files.sort();
        Ok(files)
    }
}

type LoadedFile = (LoadedListing, String, Vec<ParseError>);

fn load_one(dir: &Path, path: &Path) -> Result<LoadedFile, LoadError> {
    let relative = path.strip_prefix(dir).unwrap_or(path);
    let trait_path = trait_path_from_relative(relative).ok_or_else(|| LoadError::InvalidTraitPath {
        path: path.to_path_buf(),
    })?;
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let (listing, parse_errors) = traitdex_parser::parse_listing(&content, trait_path);
    Ok((
        LoadedListing {
            path: path.to_path_buf(),
            listing,
        },
        content,
        parse_errors,
    ))
}

/// Load a single listing file outside the context of a root scan.
///
/// The trait path is derived from the portion of the path below an
/// `implementors/` component when one is present, and from the file name
/// alone otherwise.
pub fn load_file(path: &Path) -> Result<(TraitListing, Vec<ParseError>, String), LoadError> {
    let relative = path
        .iter()
        .position(|c| c.to_str() == Some(IMPLEMENTORS_DIR))
        .map_or_else(
            || path.file_name().map_or_else(PathBuf::new, PathBuf::from),
            |idx| path.iter().skip(idx + 1).collect(),
        );
    let trait_path = trait_path_from_relative(&relative).ok_or_else(|| LoadError::InvalidTraitPath {
        path: path.to_path_buf(),
    })?;
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let (listing, errors) = traitdex_parser::parse_listing(&content, trait_path);
    Ok((listing, errors, content))
}

/// Derive a trait path from a path relative to `implementors/`.
///
/// `acme/plumbing/trait.Group.js` becomes `acme::plumbing::Group`. Returns
/// `None` when the file name does not follow the `trait.<Ident>.js`
/// convention or a directory component is not a valid identifier.
#[must_use]
pub fn trait_path_from_relative(relative: &Path) -> Option<TypePath> {
    let file_name = relative.file_name()?.to_str()?;
    let trait_name = file_name.strip_prefix("trait.")?.strip_suffix(".js")?;
    if !traitdex_core::type_path::is_ident(trait_name) {
        return None;
    }

    let mut segments = Vec::new();
    if let Some(parent) = relative.parent() {
        for component in parent.iter() {
            let segment = component.to_str()?;
            if segment.is_empty() {
                continue;
            }
            if !traitdex_core::type_path::is_ident(segment) {
                return None;
            }
            segments.push(segment);
        }
    }
    segments.push(trait_name);
    Some(TypePath::new(segments.join("::")))
}

fn collect_listing_files(dir: &Path, files: &mut Vec<PathBuf>, errors: &mut Vec<LoadError>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(source) => {
            errors.push(LoadError::Io {
                path: dir.to_path_buf(),
                source,
            });
            return;
        }
    };
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(source) => {
                errors.push(LoadError::Io {
                    path: dir.to_path_buf(),
                    source,
                });
                continue;
            }
        };
        let path = entry.path();
        if path.is_dir() {
            collect_listing_files(&path, files, errors);
        } else if is_listing_file(&path) {
            files.push(path);
        }
    }
}

/// Whether a file name follows the `trait.<Ident>.js` convention.
#[must_use]
pub fn is_listing_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.strip_prefix("trait."))
        .and_then(|n| n.strip_suffix(".js"))
        .is_some_and(traitdex_core::type_path::is_ident)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const LISTING: &str = r#"(function() {var implementors = {};
implementors["acme_db"] = [{"text":"impl Group for Storage","synthetic":false,"types":["acme_db::Storage"]}];
if (window.register_implementors) {window.register_implementors(implementors);} else {window.pending_implementors = implementors;}})()"#;

    fn write_listing(root: &Path, relative: &str) {
        let path = root.join(IMPLEMENTORS_DIR).join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, LISTING).unwrap();
    }

    #[test]
    fn trait_path_derivation() {
        assert_eq!(
            trait_path_from_relative(Path::new("acme/plumbing/trait.Group.js")),
            Some(TypePath::new("acme::plumbing::Group"))
        );
        assert_eq!(
            trait_path_from_relative(Path::new("trait.Group.js")),
            Some(TypePath::new("Group"))
        );
        assert_eq!(trait_path_from_relative(Path::new("acme/Group.js")), None);
        assert_eq!(trait_path_from_relative(Path::new("acme/trait..js")), None);
        assert_eq!(
            trait_path_from_relative(Path::new("bad-dir/trait.Group.js")),
            None
        );
    }

    #[test]
    fn listing_file_detection() {
        assert!(is_listing_file(Path::new("x/trait.Group.js")));
        assert!(!is_listing_file(Path::new("x/struct.Group.js")));
        assert!(!is_listing_file(Path::new("x/trait.Group.html")));
        assert!(!is_listing_file(Path::new("x/trait.not-ident.js")));
    }

    #[test]
    fn scan_finds_nested_listings() {
        let dir = tempfile::tempdir().unwrap();
        write_listing(dir.path(), "acme/plumbing/trait.Group.js");
        write_listing(dir.path(), "acme/trait.Database.js");
        fs::write(
            dir.path().join(IMPLEMENTORS_DIR).join("acme/ignore.txt"),
            "not a listing",
        )
        .unwrap();

        let result = DocRoot::new(dir.path()).scan().unwrap();
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        let traits: Vec<_> = result
            .listings
            .iter()
            .map(|l| l.listing.trait_path.as_str().to_string())
            .collect();
        assert_eq!(traits, vec!["acme::Database", "acme::plumbing::Group"]);
        assert_eq!(result.source_map.files().len(), 2);
    }

    #[test]
    fn scan_reports_parse_errors_but_keeps_going() {
        let dir = tempfile::tempdir().unwrap();
        write_listing(dir.path(), "acme/trait.Good.js");
        let bad = dir.path().join(IMPLEMENTORS_DIR).join("acme/trait.Bad.js");
        fs::write(&bad, "not a listing at all").unwrap();

        let result = DocRoot::new(dir.path()).scan().unwrap();
        assert_eq!(result.listings.len(), 2);
        assert!(result
            .errors
            .iter()
            .any(|e| matches!(e, LoadError::ParseErrors { path, .. } if *path == bad)));
    }

    #[test]
    fn listing_files_without_parsing() {
        let dir = tempfile::tempdir().unwrap();
        write_listing(dir.path(), "acme/trait.Group.js");
        write_listing(dir.path(), "trait.Database.js");
        fs::write(
            dir.path().join(IMPLEMENTORS_DIR).join("ignore.txt"),
            "not a listing",
        )
        .unwrap();

        let files = DocRoot::new(dir.path()).listing_files().unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| is_listing_file(f)));
    }

    #[test]
    fn missing_implementors_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = DocRoot::new(dir.path()).scan().unwrap_err();
        assert!(matches!(err, LoadError::MissingImplementorsDir { .. }));
    }

    #[test]
    fn load_single_file() {
        let dir = tempfile::tempdir().unwrap();
        write_listing(dir.path(), "acme/trait.Group.js");
        let path = dir
            .path()
            .join(IMPLEMENTORS_DIR)
            .join("acme/trait.Group.js");
        let (listing, errors, _content) = load_file(&path).unwrap();
        assert!(errors.is_empty());
        assert_eq!(listing.trait_path, TypePath::new("acme::Group"));
        assert_eq!(listing.map.len(), 1);
    }
}
