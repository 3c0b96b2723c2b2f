//! Shared implementation for the tdex-format command.

use crate::cmd::completions::ShellType;
use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use traitdex_core::render_listing;
use traitdex_loader::{load_file, DocRoot};

/// Re-emit implementor listings in canonical form.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Listing files or documentation roots to format
    #[arg(value_name = "PATH", required_unless_present = "generate_completions")]
    pub paths: Vec<PathBuf>,

    /// Generate shell completions and exit
    #[arg(long, value_name = "SHELL", hide = true)]
    pub generate_completions: Option<ShellType>,

    /// Check whether files are canonical instead of rewriting (exit 1 if not)
    #[arg(long)]
    pub check: bool,

    /// Write the canonical form to stdout (single input file only)
    #[arg(long)]
    pub stdout: bool,

    /// Show verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all output (just use exit code)
    #[arg(short, long)]
    pub quiet: bool,
}

fn run(args: &Args) -> Result<ExitCode> {
    if args.stdout && args.check {
        anyhow::bail!("--stdout and --check cannot be used together");
    }

    // A directory argument means a documentation root: format every listing
    // under its implementors/ subtree.
    let mut files = Vec::new();
    for path in &args.paths {
        if path.is_dir() {
            let found = DocRoot::new(path)
                .listing_files()
                .with_context(|| format!("failed to scan {}", path.display()))?;
            if found.is_empty() && !args.quiet {
                eprintln!("warning: no listing files under {}", path.display());
            }
            files.extend(found);
        } else {
            files.push(path.clone());
        }
    }

    if args.stdout && files.len() > 1 {
        anyhow::bail!("--stdout can only be used with a single input file");
    }

    let mut any_needs_formatting = false;

    for file in &files {
        if format_file(file, args)? {
            any_needs_formatting = true;
        }
    }

    if args.check && any_needs_formatting {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Canonicalize one file. Returns whether it differed from canonical form.
fn format_file(file: &PathBuf, args: &Args) -> Result<bool> {
    if !file.exists() {
        anyhow::bail!("file not found: {}", file.display());
    }

    let (listing, parse_errors, original) =
        load_file(file).with_context(|| format!("failed to load {}", file.display()))?;

    if !parse_errors.is_empty() {
        for error in &parse_errors {
            eprintln!("error: {}: {error}", file.display());
        }
        anyhow::bail!("{} has parse errors, cannot format", file.display());
    }

    let canonical = render_listing(&listing);
    let differs = canonical != original;

    if args.stdout {
        let mut stdout = io::stdout().lock();
        stdout.write_all(canonical.as_bytes())?;
        writeln!(stdout)?;
        return Ok(differs);
    }

    if args.check {
        if differs && !args.quiet {
            println!("{}: not canonical", file.display());
        }
        return Ok(differs);
    }

    if differs {
        fs::write(file, canonical).with_context(|| format!("failed to write {}", file.display()))?;
        if args.verbose && !args.quiet {
            eprintln!("rewrote {}", file.display());
        }
    } else if args.verbose && !args.quiet {
        eprintln!("{} already canonical", file.display());
    }
    Ok(differs)
}

/// Main entry point for the format command.
pub fn main() -> ExitCode {
    main_with_name("tdex-format")
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
    use traitdex_loader::IMPLEMENTORS_DIR;

    // Crate keys out of sorted order, so the file is not canonical.
    const MESSY: &str = r#"(function() {var implementors = {};
implementors["zeta"] = [{"text":"impl Group for Z","synthetic":false,"types":["zeta::Z"]}];
implementors["alpha"] = [{"text":"impl Group for A","synthetic":false,"types":["alpha::A"]}];
if (window.register_implementors) {window.register_implementors(implementors);} else {window.pending_implementors = implementors;}})()"#;

    #[test]
    fn formats_every_listing_under_a_root() {
        let root = tempfile::tempdir().unwrap();
        let file = root
            .path()
            .join(IMPLEMENTORS_DIR)
            .join("acme")
            .join("trait.Group.js");
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(&file, MESSY).unwrap();

        let args = Args {
            paths: vec![root.path().to_path_buf()],
            generate_completions: None,
            check: false,
            stdout: false,
            verbose: false,
            quiet: true,
        };
        run(&args).unwrap();

        let rewritten = fs::read_to_string(&file).unwrap();
        let alpha = rewritten.find("implementors[\"alpha\"]").unwrap();
        let zeta = rewritten.find("implementors[\"zeta\"]").unwrap();
        assert!(alpha < zeta);
    }
}
