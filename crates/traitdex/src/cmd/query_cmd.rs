//! Shared implementation for the tdex-query command.

use crate::cmd::check::OutputFormat;
use crate::cmd::completions::ShellType;
use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use traitdex_core::{TraitListing, TypePath};
use traitdex_loader::{load_file, DocRoot};
use traitdex_parser::parse_fragment;
use traitdex_query::{ImplIndex, SearchFilter};

/// Cross-reference queries over a documentation root.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// A documentation root or a single listing file to query
    #[arg(value_name = "PATH", required_unless_present = "generate_completions")]
    pub path: Option<PathBuf>,

    /// Generate shell completions and exit
    #[arg(long, value_name = "SHELL", hide = true)]
    pub generate_completions: Option<ShellType>,

    /// List the implementors of a trait
    #[arg(long, value_name = "TRAIT", group = "query")]
    pub implementors_of: Option<String>,

    /// List the traits a type implements
    #[arg(long, value_name = "TYPE", group = "query")]
    pub traits_for: Option<String>,

    /// Search trait and type paths with a regular expression
    #[arg(long, value_name = "REGEX", group = "query")]
    pub grep: Option<String>,

    /// Restrict results to records registered by one crate
    #[arg(long = "crate", value_name = "NAME")]
    pub crate_name: Option<String>,

    /// Exclude compiler-synthesized implementations
    #[arg(long)]
    pub no_synthetic: bool,

    /// Output format (text or json)
    #[arg(long, short = 'f', value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Show verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress load warnings (results are still printed)
    #[arg(short, long)]
    pub quiet: bool,
}

fn run(args: &Args) -> Result<ExitCode> {
    let mut stdout = io::stdout().lock();

    // Path is guaranteed to be Some here (checked in main)
    let path = args.path.as_ref().context("path required")?;
    let listings = load(path, args)?;
    let index = ImplIndex::build(&listings);
    let json_mode = matches!(args.format, OutputFormat::Json);

    if let Some(trait_path) = &args.implementors_of {
        let trait_path = TypePath::new(trait_path.as_str());
        let entries: Vec<_> = index
            .implementors_of(&trait_path)
            .iter()
            .filter(|e| !args.no_synthetic || !e.record.synthetic)
            .filter(|e| args.crate_name.as_ref().map_or(true, |c| e.crate_name == *c))
            .collect();
        if json_mode {
            writeln!(stdout, "{}", serde_json::to_string_pretty(&entries)?)?;
        } else {
            for entry in &entries {
                let rendered = parse_fragment(&entry.record.text)
                    .map_or_else(|_| entry.record.text.clone(), |sig| sig.to_string());
                let marker = if entry.record.synthetic {
                    " (synthetic)"
                } else {
                    ""
                };
                writeln!(stdout, "{}: {rendered}{marker}", entry.crate_name)?;
            }
        }
    } else if let Some(type_path) = &args.traits_for {
        let type_path = TypePath::new(type_path.as_str());
        let traits = index.traits_for(&type_path);
        if json_mode {
            writeln!(stdout, "{}", serde_json::to_string_pretty(&traits)?)?;
        } else {
            for trait_path in &traits {
                writeln!(stdout, "{trait_path}")?;
            }
        }
    } else if let Some(pattern) = &args.grep {
        let mut filter = SearchFilter::new(pattern)?;
        if let Some(crate_name) = &args.crate_name {
            filter = filter.in_crate(crate_name.clone());
        }
        if args.no_synthetic {
            filter = filter.skip_synthetic();
        }
        let hits = index.search(&filter);
        if json_mode {
            writeln!(stdout, "{}", serde_json::to_string_pretty(&hits)?)?;
        } else {
            for hit in &hits {
                writeln!(
                    stdout,
                    "{} for {} [{}]",
                    hit.trait_path, hit.type_path, hit.crate_name
                )?;
            }
        }
    } else {
        anyhow::bail!("one of --implementors-of, --traits-for or --grep is required");
    }

    Ok(ExitCode::SUCCESS)
}

/// Load listings from a documentation root or a single file.
fn load(path: &Path, args: &Args) -> Result<Vec<TraitListing>> {
    if path.is_dir() {
        if args.verbose && !args.quiet {
            eprintln!("Scanning {}...", path.display());
        }
        let result = DocRoot::new(path)
            .scan()
            .with_context(|| format!("failed to scan {}", path.display()))?;
        if !args.quiet {
            for error in &result.errors {
                eprintln!("warning: {error}");
            }
        }
        Ok(result.into_listings())
    } else {
        let (listing, parse_errors, _) =
            load_file(path).with_context(|| format!("failed to load {}", path.display()))?;
        if !args.quiet {
            for error in &parse_errors {
                eprintln!("warning: {}: {error}", path.display());
            }
        }
        Ok(vec![listing])
    }
}

/// Main entry point for the query command.
pub fn main() -> ExitCode {
    main_with_name("tdex-query")
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
