//! Shared implementation for the tdex-check command.

use crate::cmd::completions::ShellType;
use crate::report;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use traitdex_core::TraitListing;
use traitdex_loader::{fingerprint_listings, load_file, DocRoot, LoadError};
use traitdex_validate::{validate_all, Severity};

/// Output format for diagnostics.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output (default)
    #[default]
    Text,
    /// JSON output for IDE/tooling integration
    Json,
}

/// A diagnostic message in JSON format.
#[derive(Debug, Serialize)]
pub struct JsonDiagnostic {
    /// Source file path
    pub file: String,
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based)
    pub column: usize,
    /// End line number (1-based)
    pub end_line: usize,
    /// End column number (1-based)
    pub end_column: usize,
    /// Severity: "error", "warning" or "note"
    pub severity: String,
    /// Error code (e.g., "P0004", "E1001")
    pub code: String,
    /// Error message
    pub message: String,
    /// Optional hint for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Optional context information
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// JSON output structure for all diagnostics.
#[derive(Debug, Serialize)]
pub struct JsonOutput {
    /// List of diagnostics
    pub diagnostics: Vec<JsonDiagnostic>,
    /// Total error count
    pub error_count: usize,
    /// Total warning count
    pub warning_count: usize,
}

/// Convert a byte offset to (line, column) in 1-based indexing.
fn byte_offset_to_line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut col = 1;
    for (i, ch) in source.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}

/// Validate implementor listings and report errors.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// A documentation root or a single listing file to check
    #[arg(value_name = "PATH", required_unless_present = "generate_completions")]
    pub path: Option<PathBuf>,

    /// Generate shell completions and exit
    #[arg(long, value_name = "SHELL", hide = true)]
    pub generate_completions: Option<ShellType>,

    /// Show verbose output including timing information
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all output (just use exit code)
    #[arg(short, long)]
    pub quiet: bool,

    /// Treat warnings as errors
    #[arg(long)]
    pub strict: bool,

    /// Output format (text or json)
    #[arg(long, short = 'f', value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// One listing's source, kept for diagnostic rendering.
struct CheckedFile {
    path: PathBuf,
    content: String,
    parse_errors: Vec<traitdex_parser::ParseError>,
}

fn run(args: &Args) -> Result<ExitCode> {
    let mut stdout = io::stdout().lock();
    let start = std::time::Instant::now();

    // Path is guaranteed to be Some here (checked in main)
    let path = args.path.as_ref().context("path required")?;
    if !path.exists() {
        anyhow::bail!("path not found: {}", path.display());
    }

    let json_mode = matches!(args.format, OutputFormat::Json);
    let mut diagnostics: Vec<JsonDiagnostic> = Vec::new();

    let (listings, files, io_errors) = load(path, args)?;

    // Map trait paths back to the files that declared them.
    let file_of_trait: HashMap<&str, &Path> = listings
        .iter()
        .zip(&files)
        .map(|(listing, file)| (listing.trait_path.as_str(), file.path.as_path()))
        .collect();

    let mut error_count = 0;
    let mut warning_count = 0;

    for message in &io_errors {
        if json_mode {
            diagnostics.push(JsonDiagnostic {
                file: path.display().to_string(),
                line: 1,
                column: 1,
                end_line: 1,
                end_column: 1,
                severity: "error".to_string(),
                code: "E0001".to_string(),
                message: message.clone(),
                hint: None,
                context: None,
            });
        } else if !args.quiet {
            writeln!(stdout, "error: {message}")?;
        }
        error_count += 1;
    }

    for file in &files {
        if file.parse_errors.is_empty() {
            continue;
        }
        if json_mode {
            for error in &file.parse_errors {
                let (start_line, start_col) =
                    byte_offset_to_line_col(&file.content, error.span.start);
                let (end_line, end_col) = byte_offset_to_line_col(&file.content, error.span.end);
                diagnostics.push(JsonDiagnostic {
                    file: file.path.display().to_string(),
                    line: start_line,
                    column: start_col,
                    end_line,
                    end_column: end_col,
                    severity: "error".to_string(),
                    code: format!("P{:04}", error.kind_code()),
                    message: error.message(),
                    hint: error.hint.clone(),
                    context: error.context.clone(),
                });
            }
            error_count += file.parse_errors.len();
        } else if args.quiet {
            error_count += file.parse_errors.len();
        } else {
            error_count += report::report_parse_errors(
                &file.parse_errors,
                &file.path,
                &file.content,
                &mut stdout,
            )?;
        }
    }

    if args.verbose && !args.quiet {
        eprintln!("Validating {} listings...", listings.len());
    }

    let validation_errors = validate_all(&listings);
    for error in &validation_errors {
        let severity = match error.code.severity() {
            Severity::Error => {
                error_count += 1;
                "error"
            }
            Severity::Warning => {
                if args.strict {
                    error_count += 1;
                } else {
                    warning_count += 1;
                }
                "warning"
            }
            Severity::Info => "note",
        };
        if json_mode {
            let file = file_of_trait
                .get(error.trait_path.as_str())
                .map_or_else(|| path.display().to_string(), |p| p.display().to_string());
            diagnostics.push(JsonDiagnostic {
                file,
                line: 1,
                column: 1,
                end_line: 1,
                end_column: 1,
                severity: severity.to_string(),
                code: error.code.code().to_string(),
                message: error.message.clone(),
                hint: None,
                context: Some(error.trait_path.as_str().to_string()),
            });
        }
    }
    if !json_mode && !args.quiet {
        report::report_validation_errors(&validation_errors, &mut stdout)?;
    }

    let elapsed = start.elapsed();
    if json_mode {
        let output = JsonOutput {
            diagnostics,
            error_count,
            warning_count,
        };
        writeln!(stdout, "{}", serde_json::to_string_pretty(&output)?)?;
    } else if !args.quiet {
        if args.verbose {
            writeln!(
                stdout,
                "\nChecked {} listings in {:.2}ms (fingerprint {})",
                listings.len(),
                elapsed.as_secs_f64() * 1000.0,
                fingerprint_listings(&listings)
            )?;
        }
        report::print_summary(error_count, warning_count, &mut stdout)?;
    }

    if error_count > 0 {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Load either a documentation root or a single listing file.
///
/// Returns listings, their sources with parse errors, and the messages of
/// any non-parse load errors.
fn load(path: &Path, args: &Args) -> Result<(Vec<TraitListing>, Vec<CheckedFile>, Vec<String>)> {
    if path.is_dir() {
        if args.verbose && !args.quiet {
            eprintln!("Scanning {}...", path.display());
        }
        let result = DocRoot::new(path)
            .scan()
            .with_context(|| format!("failed to scan {}", path.display()))?;

        let mut parse_errors_of: HashMap<PathBuf, Vec<traitdex_parser::ParseError>> =
            HashMap::new();
        let mut io_errors = Vec::new();
        for error in result.errors {
            match error {
                LoadError::ParseErrors { path, errors } => {
                    parse_errors_of.insert(path, errors);
                }
                other => io_errors.push(other.to_string()),
            }
        }

        let mut listings = Vec::new();
        let mut files = Vec::new();
        for loaded in result.listings {
            let content = result
                .source_map
                .get(&loaded.path)
                .map_or_else(String::new, |f| f.content.clone());
            files.push(CheckedFile {
                parse_errors: parse_errors_of.remove(&loaded.path).unwrap_or_default(),
                path: loaded.path,
                content,
            });
            listings.push(loaded.listing);
        }
        Ok((listings, files, io_errors))
    } else {
        let (listing, parse_errors, content) =
            load_file(path).with_context(|| format!("failed to load {}", path.display()))?;
        let files = vec![CheckedFile {
            path: path.to_path_buf(),
            content,
            parse_errors,
        }];
        Ok((vec![listing], files, Vec::new()))
    }
}

/// Main entry point for the check command.
pub fn main() -> ExitCode {
    main_with_name("tdex-check")
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
