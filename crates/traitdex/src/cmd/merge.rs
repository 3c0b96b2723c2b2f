//! Shared implementation for the tdex-merge command.

use crate::cmd::completions::ShellType;
use anyhow::{Context, Result};
use clap::Parser;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use traitdex_core::{render_listing, TraitListing, TypePath};
use traitdex_loader::{fingerprint_listings, DocRoot, LoadError, IMPLEMENTORS_DIR};

/// Merge the listing sets of several documentation roots.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Directory to write the merged documentation root to
    #[arg(value_name = "OUT", required_unless_present = "generate_completions")]
    pub out: Option<PathBuf>,

    /// The documentation roots to merge
    #[arg(value_name = "ROOTS", required_unless_present = "generate_completions")]
    pub roots: Vec<PathBuf>,

    /// Generate shell completions and exit
    #[arg(long, value_name = "SHELL", hide = true)]
    pub generate_completions: Option<ShellType>,

    /// Show verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all output (just use exit code)
    #[arg(short, long)]
    pub quiet: bool,
}

fn run(args: &Args) -> Result<ExitCode> {
    let out = args.out.as_ref().context("output directory required")?;
    if args.roots.is_empty() {
        anyhow::bail!("at least one documentation root is required");
    }

    // Trait path to merged listing, plus the root that first contributed it.
    let mut merged: BTreeMap<TypePath, (TraitListing, PathBuf)> = BTreeMap::new();
    // Fingerprints of roots merged so far. A root whose listing set hashes
    // the same as an already merged one contributes nothing.
    let mut seen_roots: HashSet<String> = HashSet::new();

    for root in &args.roots {
        if args.verbose && !args.quiet {
            eprintln!("Scanning {}...", root.display());
        }
        let result = DocRoot::new(root)
            .scan()
            .with_context(|| format!("failed to scan {}", root.display()))?;

        for error in &result.errors {
            if let LoadError::ParseErrors { path, errors } = error {
                for parse_error in errors {
                    eprintln!("error: {}: {parse_error}", path.display());
                }
            } else {
                eprintln!("error: {error}");
            }
        }
        if !result.errors.is_empty() {
            anyhow::bail!("{} has errors, cannot merge", root.display());
        }

        let listings = result.into_listings();
        if !seen_roots.insert(fingerprint_listings(&listings)) {
            if args.verbose && !args.quiet {
                eprintln!(
                    "{} is identical to an already merged root, skipping",
                    root.display()
                );
            }
            continue;
        }

        for listing in listings {
            match merged.entry(listing.trait_path.clone()) {
                std::collections::btree_map::Entry::Vacant(slot) => {
                    slot.insert((listing, root.clone()));
                }
                std::collections::btree_map::Entry::Occupied(mut slot) => {
                    let (existing, first_root) = slot.get_mut();
                    existing.map.merge(listing.map).with_context(|| {
                        format!(
                            "conflict merging '{}' from {} into the copy from {}",
                            listing.trait_path,
                            root.display(),
                            first_root.display()
                        )
                    })?;
                }
            }
        }
    }

    for (trait_path, (listing, _)) in &merged {
        let path = out
            .join(IMPLEMENTORS_DIR)
            .join(relative_path_for(trait_path));
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&path, render_listing(listing))
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    if !args.quiet {
        let listings: Vec<TraitListing> =
            merged.into_values().map(|(listing, _)| listing).collect();
        println!(
            "Merged {} listings from {} roots into {}",
            listings.len(),
            args.roots.len(),
            out.display()
        );
        if args.verbose {
            eprintln!("fingerprint: {}", fingerprint_listings(&listings));
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// File location of a trait's listing relative to `implementors/`.
///
/// The inverse of the trait-path derivation used by the loader:
/// `acme::plumbing::Group` becomes `acme/plumbing/trait.Group.js`.
fn relative_path_for(trait_path: &TypePath) -> PathBuf {
    let segments: Vec<&str> = trait_path.segments().collect();
    let mut path = PathBuf::new();
    if let Some((name, modules)) = segments.split_last() {
        for module in modules {
            path.push(module);
        }
        path.push(format!("trait.{name}.js"));
    }
    path
}

/// Main entry point for the merge command.
pub fn main() -> ExitCode {
    main_with_name("tdex-merge")
}

/// Main entry point with custom binary name.
pub fn main_with_name(bin_name: &str) -> ExitCode {
    let args = Args::parse();

    // Handle shell completion generation
    if let Some(shell) = args.generate_completions {
        crate::cmd::completions::generate_completions::<Args>(shell, bin_name);
        return ExitCode::SUCCESS;
    }

    if args.verbose {
        tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .with_span_events(FmtSpan::CLOSE)
            .init();
    }

    match run(&args) {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    const LISTING: &str = r#"(function() {var implementors = {};
implementors["acme_db"] = [{"text":"impl Group for Storage","synthetic":false,"types":["acme_db::Storage"]}];
if (window.register_implementors) {window.register_implementors(implementors);} else {window.pending_implementors = implementors;}})()"#;

    fn write_root(root: &Path) {
        let path = root.join(IMPLEMENTORS_DIR).join("acme/trait.Group.js");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, LISTING).unwrap();
    }

    #[test]
    fn identical_roots_merge_once() {
        let left = tempfile::tempdir().unwrap();
        let right = tempfile::tempdir().unwrap();
        write_root(left.path());
        write_root(right.path());
        let out = tempfile::tempdir().unwrap();

        let args = Args {
            out: Some(out.path().to_path_buf()),
            roots: vec![left.path().to_path_buf(), right.path().to_path_buf()],
            generate_completions: None,
            verbose: false,
            quiet: true,
        };
        run(&args).unwrap();

        let written = fs::read_to_string(
            out.path().join(IMPLEMENTORS_DIR).join("acme/trait.Group.js"),
        )
        .unwrap();
        assert_eq!(written, LISTING);
    }

    #[test]
    fn trait_path_to_relative_path() {
        assert_eq!(
            relative_path_for(&TypePath::new("acme::plumbing::Group")),
            Path::new("acme/plumbing/trait.Group.js")
        );
        assert_eq!(
            relative_path_for(&TypePath::new("Group")),
            Path::new("trait.Group.js")
        );
    }
}
