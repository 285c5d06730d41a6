//! Shared output formatting for lint reports.
//!
//! Text output colours severities with `colored`; whether colour is emitted at
//! all is decided by the caller through `colored::control`.

use std::io::Write;

use colored::Colorize;

use crate::diagnostic::{Diagnostic, Severity};
use crate::report::LintReport;

/// Format a `LintReport` as JSON to a writer.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json(report: &LintReport, writer: &mut dyn Write) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    writeln!(writer, "{json}")?;
    Ok(())
}

fn write_diagnostic(diagnostic: &Diagnostic, writer: &mut dyn Write) -> anyhow::Result<()> {
    let line = diagnostic.format_grouped();
    // The severity label is ASCII and padded to five columns.
    let (label, rest) = line.split_at(line.len().min(5));
    let label = match diagnostic.severity {
        Severity::Error => label.red().bold(),
        Severity::Warning => label.yellow(),
    };
    writeln!(writer, "  {label}{rest}")?;
    Ok(())
}

/// Format a `LintReport` as human-readable text, grouped by file.
///
/// With `quiet`, warnings and notices are left out; the summary line still
/// counts them.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_human(report: &LintReport, writer: &mut dyn Write, quiet: bool) -> anyhow::Result<()> {
    for file in &report.files {
        let shown: Vec<&Diagnostic> = file
            .diagnostics
            .iter()
            .filter(|d| !quiet || d.is_error())
            .collect();
        let notices: &[String] = if quiet { &[] } else { &file.notices };
        if shown.is_empty() && notices.is_empty() {
            continue;
        }

        writeln!(writer, "{}", file.file.display().to_string().bold())?;
        for diagnostic in shown {
            write_diagnostic(diagnostic, writer)?;
        }
        for notice in notices {
            writeln!(writer, "  {} {notice}", "note:".cyan())?;
        }
        writeln!(writer)?;
    }

    if let Some(fixed) = report.fixed_files {
        writeln!(writer, "Fixed {fixed} file(s).")?;
    }
    let summary = report.summary_line();
    if report.has_errors() {
        writeln!(writer, "{}", summary.red().bold())?;
    } else if report.warnings_count() > 0 {
        writeln!(writer, "{}", summary.yellow())?;
    } else {
        writeln!(writer, "{}", summary.green())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::diagnostic::RuleCategory;
    use crate::report::FileReport;

    fn sample() -> LintReport {
        let mut clean = FileReport::new(PathBuf::from("core/content/ear/clean.json"));
        clean.items = 1;
        let mut broken = FileReport::new(PathBuf::from("core/content/ear/otitis.json"));
        broken.items = 1;
        let mut missing = Diagnostic::error(
            "missing-level",
            RuleCategory::Structure,
            "missing complexity level 5",
        )
        .at("$.levels");
        missing.content_id = Some("ear-otitis-media".to_owned());
        let warning = Diagnostic::warning("missing-analogy", RuleCategory::Quality, "no analogy");
        broken.diagnostics = vec![missing, warning];
        broken.notices = vec!["legacy: custom content module, skipped strict schema".to_owned()];

        LintReport {
            scanned_files: 2,
            failed_files: 0,
            items: 2,
            custom_items: 0,
            fixed_files: None,
            files: vec![clean, broken],
        }
    }

    fn render(report: &LintReport, quiet: bool) -> String {
        colored::control::set_override(false);
        let mut buf = Vec::new();
        write_human(report, &mut buf, quiet).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_text_groups_by_file() {
        let text = render(&sample(), false);
        assert!(!text.contains("clean.json"));
        assert!(text.contains("core/content/ear/otitis.json\n"));
        assert!(text.contains(
            "  ERROR [structure/missing-level] ear-otitis-media: missing complexity level 5 (at $.levels)\n"
        ));
        assert!(text.contains("  WARN  [quality/missing-analogy] no analogy\n"));
        assert!(text.contains("  note: legacy: custom content module"));
        assert!(text.ends_with("1 errors, 1 warnings across 2 files\n"));
    }

    #[test]
    fn test_quiet_hides_warnings() {
        let text = render(&sample(), true);
        assert!(text.contains("missing-level"));
        assert!(!text.contains("missing-analogy"));
        assert!(!text.contains("note:"));
        assert!(text.ends_with("1 errors, 1 warnings across 2 files\n"));
    }

    #[test]
    fn test_json_output() {
        let mut buf = Vec::new();
        write_json(&sample(), &mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["scanned_files"], 2);
        let diag = &value["files"][1]["diagnostics"][0];
        assert_eq!(diag["rule_id"], "missing-level");
        assert_eq!(diag["severity"], "error");
        assert_eq!(diag["category"], "structure");
        assert_eq!(diag["pointer"], "$.levels");
    }
}
