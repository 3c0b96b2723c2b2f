//! Error reporting with source context.
//!
//! Uses ariadne for pretty-printed parse diagnostics and a plain
//! line-per-diagnostic format for validation output.

use ariadne::{ColorGenerator, Config, Label, Report, ReportKind, Source};
use std::io::Write;
use std::path::Path;
use traitdex_validate::{Severity, ValidationError};

/// Report parse errors to the given writer.
pub fn report_parse_errors<W: Write>(
    errors: &[traitdex_parser::ParseError],
    source_path: &Path,
    source: &str,
    writer: &mut W,
) -> std::io::Result<usize> {
    let path_str = source_path.display().to_string();
    let path_id = path_str.as_str();
    // Index the source once per file, not per diagnostic.
    let mut cache = (path_id, Source::from(source));
    let mut colors = ColorGenerator::new();

    for error in errors {
        let color = colors.next();
        let (start, end) = error.span();

        Report::build(ReportKind::Error, (path_id, start..end))
            .with_code(format!("P{:04}", error.kind_code()))
            .with_message(error.message())
            .with_label(
                Label::new((path_id, start..end))
                    .with_message(error.label())
                    .with_color(color),
            )
            .with_config(Config::default().with_compact(false))
            .finish()
            .write(&mut cache, &mut *writer)?;
    }

    Ok(errors.len())
}

/// Report validation diagnostics to the given writer.
///
/// Returns the number of hard errors written.
pub fn report_validation_errors<W: Write>(
    errors: &[ValidationError],
    writer: &mut W,
) -> std::io::Result<usize> {
    let mut error_count = 0;

    for error in errors {
        let kind = match error.code.severity() {
            Severity::Error => {
                error_count += 1;
                "error"
            }
            Severity::Warning => "warning",
            Severity::Info => "note",
        };
        write!(writer, "{kind}[{}]: {}", error.code, error.message)?;
        match (&error.crate_name, error.record) {
            (Some(crate_name), Some(record)) => {
                writeln!(writer, " (crate '{crate_name}', record {record})")?;
            }
            (Some(crate_name), None) => writeln!(writer, " (crate '{crate_name}')")?,
            _ => writeln!(writer)?,
        }
    }

    Ok(error_count)
}

/// Print a summary of errors and warnings.
pub fn print_summary<W: Write>(
    errors: usize,
    warnings: usize,
    writer: &mut W,
) -> std::io::Result<()> {
    if errors == 0 && warnings == 0 {
        writeln!(writer, "\x1b[32m\u{2713}\x1b[0m No errors found")?;
    } else {
        let error_text = if errors == 1 { "error" } else { "errors" };
        let warning_text = if warnings == 1 { "warning" } else { "warnings" };

        if errors > 0 && warnings > 0 {
            writeln!(
                writer,
                "\x1b[31m\u{2717}\x1b[0m {errors} {error_text}, {warnings} {warning_text}"
            )?;
        } else if errors > 0 {
            writeln!(writer, "\x1b[31m\u{2717}\x1b[0m {errors} {error_text}")?;
        } else {
            writeln!(writer, "\x1b[33m\u{26A0}\x1b[0m {warnings} {warning_text}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use traitdex_core::TypePath;
    use traitdex_validate::ErrorCode;

    #[test]
    fn summary_clean() {
        let mut out = Vec::new();
        print_summary(0, 0, &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("No errors found"));
    }

    #[test]
    fn summary_counts() {
        let mut out = Vec::new();
        print_summary(2, 1, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("2 errors"));
        assert!(text.contains("1 warning"));
    }

    #[test]
    fn parse_errors_render_with_source_context() {
        // Truncated listing: the epilogue is missing.
        let source = "(function() {var implementors = {};\nimplementors[\"acme_db\"] = [];";
        let result = traitdex_parser::parse(source);
        assert!(!result.errors.is_empty());

        let mut out = Vec::new();
        let count =
            report_parse_errors(&result.errors, Path::new("trait.Group.js"), source, &mut out)
                .unwrap();
        assert_eq!(count, result.errors.len());
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("trait.Group.js"));
    }

    #[test]
    fn validation_report_counts_only_errors() {
        let errors = vec![
            ValidationError {
                code: ErrorCode::EmptyTypes,
                message: "record 0 has an empty types list".to_string(),
                trait_path: TypePath::new("acme::Group"),
                crate_name: Some("acme_db".to_string()),
                record: Some(0),
            },
            ValidationError {
                code: ErrorCode::TextNotImpl,
                message: "record 1 text does not begin with 'impl'".to_string(),
                trait_path: TypePath::new("acme::Group"),
                crate_name: Some("acme_db".to_string()),
                record: Some(1),
            },
        ];
        let mut out = Vec::new();
        let count = report_validation_errors(&errors, &mut out).unwrap();
        assert_eq!(count, 1);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("error[E1001]"));
        assert!(text.contains("warning[W4001]"));
    }
}
