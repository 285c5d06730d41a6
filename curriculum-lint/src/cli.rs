//! CLI argument definitions and the top-level run.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgAction, Parser, ValueEnum};
use curriculum_lint::output::{write_human, write_json};
use curriculum_lint::{
    DEFAULT_CONFIG_FILE, DEFAULT_ROOTS, ExitStatus, FileConfig, FsSourceConfig, LintConfig,
    fix_fs, lint_fs,
};

/// Content-quality linter for five-level medical education modules
#[derive(Parser, Debug)]
#[command(name = "content-linter")]
#[command(author, version, about, long_about = None)]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Content roots to scan (default: core/content and core/womens-health)
    pub paths: Vec<PathBuf>,

    /// Exit with status 1 if any error-severity diagnostic is found
    #[arg(long)]
    pub check: bool,

    /// Apply safe fixes (whitespace, bullets, level order) before linting
    #[arg(long)]
    pub fix: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Configuration file path (default: ./.content-lint.yaml if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Exclude files matching this glob (repeatable)
    #[arg(long)]
    pub exclude: Vec<String>,

    /// Follow symbolic links while scanning
    #[arg(long)]
    pub follow_links: bool,

    /// Disable coloured output
    #[arg(long)]
    pub no_color: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only print errors and the summary line
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Run the linter as configured by `cli` and report the process outcome.
pub fn run(cli: &Cli) -> anyhow::Result<ExitStatus> {
    let file_config = load_file_config(cli.config.as_deref())?;

    let mut lint_config = LintConfig::default();
    if let Some(file_config) = &file_config {
        file_config.apply_to(&mut lint_config);
    }
    let fs_config = fs_config(cli, file_config.as_ref())?;

    let report = if cli.fix {
        let (summary, report) = fix_fs(&fs_config, &lint_config)?;
        tracing::info!(
            fixed = summary.files_fixed.len(),
            failed = summary.errors.len(),
            "fix pass finished"
        );
        report
    } else {
        lint_fs(&fs_config, &lint_config)?
    };

    if cli.no_color || cli.format == OutputFormat::Json || !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }
    let mut stdout = std::io::stdout().lock();
    match cli.format {
        OutputFormat::Text => write_human(&report, &mut stdout, cli.quiet)?,
        OutputFormat::Json => write_json(&report, &mut stdout)?,
    }
    Ok(report.exit_status(cli.check))
}

/// The explicit `--config` file, or the default one if it exists.
fn load_file_config(explicit: Option<&Path>) -> anyhow::Result<Option<FileConfig>> {
    let path = match explicit {
        Some(path) => path,
        None => {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            if !default.is_file() {
                return Ok(None);
            }
            default
        }
    };
    let config = FileConfig::load(path)
        .with_context(|| format!("loading configuration from {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded config file");
    Ok(Some(config))
}

fn fs_config(cli: &Cli, file_config: Option<&FileConfig>) -> anyhow::Result<FsSourceConfig> {
    let mut fs_config = FsSourceConfig::default();
    fs_config.paths = resolve_roots(&cli.paths, file_config.and_then(|c| c.roots.as_deref()))?;
    if let Some(exclude) = file_config.and_then(|c| c.exclude.as_ref()) {
        fs_config.exclude.clone_from(exclude);
    }
    fs_config.exclude.extend(cli.exclude.iter().cloned());
    fs_config.follow_links = cli.follow_links;
    Ok(fs_config)
}

/// Pick the content roots: CLI paths, then config roots, then the defaults.
///
/// Explicit roots are passed through and must exist. Missing default roots are
/// skipped with a warning; if none exist the run fails.
fn resolve_roots(cli_paths: &[PathBuf], config_roots: Option<&[PathBuf]>) -> anyhow::Result<Vec<PathBuf>> {
    if !cli_paths.is_empty() {
        return Ok(cli_paths.to_vec());
    }
    if let Some(roots) = config_roots.filter(|r| !r.is_empty()) {
        return Ok(roots.to_vec());
    }

    let mut roots = Vec::new();
    for root in DEFAULT_ROOTS.iter().map(PathBuf::from) {
        if root.exists() {
            roots.push(root);
        } else {
            tracing::warn!(root = %root.display(), "default content root not found, skipping");
        }
    }
    if roots.is_empty() {
        anyhow::bail!(
            "none of the default content roots exist ({}); pass paths explicitly",
            DEFAULT_ROOTS.join(", ")
        );
    }
    Ok(roots)
}
