//! # curriculum-lint
//!
//! Content-quality linter for graduated-complexity medical education modules.
//!
//! The crate separates the **lint engine** (input-agnostic rule passes over
//! loaded items) from the **filesystem strategy** that discovers and reads
//! content modules.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//! use curriculum_lint::{FsSourceConfig, LintConfig, lint_fs};
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut fs_config = FsSourceConfig::default();
//!     fs_config.paths = vec![PathBuf::from("core/content")];
//!
//!     let report = lint_fs(&fs_config, &LintConfig::default())?;
//!     println!("{}", report.summary_line());
//!     std::process::exit(i32::from(report.exit_status(true).code()));
//! }
//! ```

mod config;
mod diagnostic;
mod engine;
mod error;
mod fix;
mod format;
mod index;
mod loader;
mod markdown;
pub mod output;
mod report;
pub mod rules;
mod strategy;
mod typed;

use std::path::PathBuf;

use rayon::prelude::*;

pub use config::{
    DEFAULT_CONFIG_FILE, DEFAULT_ROOTS, FileConfig, FsSourceConfig, LengthLimits, LintConfig,
};
pub use diagnostic::{Diagnostic, RuleCategory, Severity};
pub use engine::Engine;
pub use error::{ConfigError, FixError, ScanError, ScanErrorKind};
pub use fix::{FixSummary, fix_file};
pub use index::{CorpusIndex, IdLocation};
pub use loader::{ContentEntry, ItemShape, LoadedFile, load_file};
pub use report::{ExitStatus, FileReport, LintReport};
pub use strategy::ContentFormat;

use strategy::fs::{apply_budget, find_files};

/// Lint content modules on disk.
///
/// This is the primary public API.
///
/// # Errors
///
/// Returns an error if `fs_config.paths` is empty, if any provided path does
/// not exist, or if `lint_config` is invalid. Per-file read and parse failures
/// are reported as `load-error` diagnostics, never as an `Err`.
pub fn lint_fs(fs_config: &FsSourceConfig, lint_config: &LintConfig) -> anyhow::Result<LintReport> {
    let engine = Engine::new(lint_config)?;
    let (files, discovery_errors) = load_corpus(fs_config)?;
    let report = engine.lint(&files, &discovery_errors);
    tracing::debug!(
        files = report.files_attempted(),
        errors = report.errors_count(),
        warnings = report.warnings_count(),
        "lint finished"
    );
    Ok(report)
}

/// Apply safe fixes to content modules on disk, then lint the result.
///
/// # Errors
///
/// Same conditions as [`lint_fs`]. Individual files that cannot be rewritten
/// are listed in [`FixSummary::errors`].
pub fn fix_fs(
    fs_config: &FsSourceConfig,
    lint_config: &LintConfig,
) -> anyhow::Result<(FixSummary, LintReport)> {
    lint_config.validate()?;
    let (paths, _) = discover(fs_config)?;
    let summary = fix::fix_files(&paths, fs_config.max_file_size, lint_config.max_file_lines);

    let mut report = lint_fs(fs_config, lint_config)?;
    report.fixed_files = Some(summary.files_fixed.len());
    Ok((summary, report))
}

/// Check the roots, walk them, and apply the scan budgets.
fn discover(fs_config: &FsSourceConfig) -> anyhow::Result<(Vec<PathBuf>, Vec<ScanError>)> {
    if fs_config.paths.is_empty() {
        anyhow::bail!("No paths provided for linting");
    }
    for path in &fs_config.paths {
        if !path.exists() {
            anyhow::bail!("Path does not exist: {}", path.display());
        }
    }

    let (files, mut scan_errors) = find_files(fs_config);
    let (files, truncated) = apply_budget(files, scan_errors.len(), fs_config);
    scan_errors.extend(truncated);
    Ok((files, scan_errors))
}

/// Discover and load every content module. Loading runs in parallel; the
/// result is ordered by path.
fn load_corpus(fs_config: &FsSourceConfig) -> anyhow::Result<(Vec<LoadedFile>, Vec<ScanError>)> {
    let (paths, discovery_errors) = discover(fs_config)?;
    let mut files: Vec<LoadedFile> = paths
        .par_iter()
        .filter_map(|path| load_file(path, fs_config.max_file_size))
        .collect();
    files.sort_by(|a, b| a.path.cmp(&b.path));
    tracing::debug!(
        files = files.len(),
        discovery_errors = discovery_errors.len(),
        "loaded content modules"
    );
    Ok((files, discovery_errors))
}
