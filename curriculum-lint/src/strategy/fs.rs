//! Filesystem content source.
//!
//! Discovers content modules on disk and reads them safely for the lint pipeline.
//! Security properties enforced here:
//! - Symlinks are not followed by default (`follow_links: false`)
//! - Resolved paths are checked to remain within their scan root
//! - Device files, pipes, and sockets are skipped
//! - Maximum directory depth is enforced to prevent infinite recursion
//! - Bounded streaming reads prevent TOCTOU and memory `DoS`

use std::io::Read;
use std::path::{Path, PathBuf};

use glob::Pattern;
use walkdir::WalkDir;

use crate::config::FsSourceConfig;
use crate::error::{ScanError, ScanErrorKind};
use crate::strategy::ContentFormat;

/// Directories to skip
pub const SKIP_DIRS: &[&str] = &["target", "node_modules", ".git", "vendor"];

/// Result of attempting to read a file for linting.
pub enum ScanResult {
    /// File was read successfully; contains the UTF-8 content.
    Ok(String),
    /// File could not be read; contains the load error.
    Err(ScanError),
}

/// Check if a path matches any of the exclude patterns
fn matches_exclude(path: &Path, exclude_patterns: &[Pattern]) -> bool {
    let path_str = path.to_string_lossy();
    exclude_patterns.iter().any(|pattern| {
        pattern.matches(&path_str)
            || path
                .file_name()
                .is_some_and(|name| pattern.matches(&name.to_string_lossy()))
    })
}

/// Returns `true` if the entry should be **included** (i.e., is NOT a skip dir).
fn is_not_skip_dir(entry: &walkdir::DirEntry) -> bool {
    if entry.file_type().is_dir()
        && entry.depth() > 0
        && let Some(name) = entry.file_name().to_str()
    {
        return !SKIP_DIRS.contains(&name);
    }
    true
}

/// Find all content modules in the given paths.
///
/// Returns `(files, scan_errors)`:
/// - `files`: paths that passed all filters, sorted and deduplicated.
/// - `scan_errors`: walk errors, invalid exclude globs and root escapes.
///   These are never silently discarded.
pub fn find_files(config: &FsSourceConfig) -> (Vec<PathBuf>, Vec<ScanError>) {
    let mut files = Vec::new();
    let mut scan_errors = Vec::new();

    let mut exclude_patterns = Vec::with_capacity(config.exclude.len());
    for pat_str in &config.exclude {
        match Pattern::new(pat_str) {
            Ok(pat) => exclude_patterns.push(pat),
            Err(e) => scan_errors.push(ScanError::new(
                pat_str,
                ScanErrorKind::InvalidExcludePattern,
                format!("Invalid exclude glob pattern '{pat_str}': {e}"),
            )),
        }
    }

    for root in &config.paths {
        let canonical_root = match root.canonicalize() {
            Ok(r) => r,
            Err(e) => {
                scan_errors.push(ScanError::new(
                    root.clone(),
                    ScanErrorKind::IoError,
                    format!("Failed to canonicalize root path: {e}"),
                ));
                continue;
            }
        };

        if root.is_file() {
            if content_format_for(root).is_some() && !matches_exclude(root, &exclude_patterns) {
                files.push(root.clone());
            }
            continue;
        }

        if !root.is_dir() {
            continue;
        }

        for entry_result in WalkDir::new(root)
            .follow_links(config.follow_links)
            .max_depth(config.max_depth)
            .into_iter()
            .filter_entry(is_not_skip_dir)
        {
            let entry = match entry_result {
                Ok(e) => e,
                Err(walk_err) => {
                    let path = walk_err
                        .path()
                        .map_or_else(|| root.clone(), Path::to_path_buf);
                    scan_errors.push(ScanError::new(
                        path,
                        ScanErrorKind::WalkError,
                        format!("Directory traversal error: {walk_err}"),
                    ));
                    continue;
                }
            };

            let file_path = entry.path();

            if !file_path.is_file() || content_format_for(file_path).is_none() {
                continue;
            }

            if matches_exclude(file_path, &exclude_patterns) {
                continue;
            }

            match file_path.canonicalize() {
                Ok(canonical_path) if !canonical_path.starts_with(&canonical_root) => {
                    scan_errors.push(ScanError::new(
                        file_path,
                        ScanErrorKind::OutsideRoot,
                        format!(
                            "Path resolves outside content root: {} -> {}",
                            file_path.display(),
                            canonical_path.display()
                        ),
                    ));
                    continue;
                }
                Ok(_) => {}
                Err(e) => {
                    scan_errors.push(ScanError::new(
                        file_path,
                        ScanErrorKind::IoError,
                        format!("Failed to canonicalize path: {e}"),
                    ));
                    continue;
                }
            }

            // Skip devices, pipes, sockets. Only regular files.
            #[cfg(unix)]
            {
                use std::os::unix::fs::FileTypeExt;
                if let Ok(ft) = entry.metadata().map(|m| m.file_type())
                    && (ft.is_block_device()
                        || ft.is_char_device()
                        || ft.is_fifo()
                        || ft.is_socket())
                {
                    continue;
                }
            }

            files.push(file_path.to_path_buf());
        }
    }

    files.sort();
    files.dedup();
    (files, scan_errors)
}

/// Determine the content format from a file extension.
pub fn content_format_for(path: &Path) -> Option<ContentFormat> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Some(ContentFormat::Json),
        Some("yaml" | "yml") => Some(ContentFormat::Yaml),
        _ => None,
    }
}

/// Apply the file-count and byte budgets to a discovered file list.
///
/// Sizes come from metadata so nothing over budget is ever read. Files past
/// the first limit hit are dropped and one `LimitExceeded` error names where
/// the scan was truncated.
pub fn apply_budget(
    files: Vec<PathBuf>,
    already_failed: usize,
    config: &FsSourceConfig,
) -> (Vec<PathBuf>, Option<ScanError>) {
    let mut kept = Vec::with_capacity(files.len());
    let mut total_bytes: u64 = 0;

    for file in files {
        if kept.len() + already_failed >= config.max_files {
            let err = ScanError::new(
                file,
                ScanErrorKind::LimitExceeded,
                format!(
                    "Scan aborted: max_files limit ({}) reached; remaining files not scanned",
                    config.max_files
                ),
            );
            return (kept, Some(err));
        }

        // Unreadable metadata is reported later by the bounded read.
        let file_bytes = std::fs::metadata(&file).map_or(0, |m| m.len());
        if total_bytes.saturating_add(file_bytes) > config.max_total_bytes {
            let err = ScanError::new(
                file,
                ScanErrorKind::LimitExceeded,
                format!(
                    "Scan aborted: max_total_bytes limit ({}) reached; remaining files not scanned",
                    config.max_total_bytes
                ),
            );
            return (kept, Some(err));
        }
        total_bytes = total_bytes.saturating_add(file_bytes);
        kept.push(file);
    }

    (kept, None)
}

/// Read a file using a bounded streaming read, enforcing `max_file_size`.
///
/// Uses `Read::take` so the size check and the read are the same operation.
/// Never calls `read_to_string` on an unbounded handle.
pub fn read_file_bounded(path: &Path, max_file_size: u64) -> ScanResult {
    let file = match std::fs::File::open(path) {
        Ok(f) => f,
        Err(e) => {
            return ScanResult::Err(ScanError::new(
                path,
                ScanErrorKind::IoError,
                format!("Failed to open file: {e}"),
            ));
        }
    };

    // Read at most max_file_size + 1 bytes to detect oversized files
    let mut buffer = Vec::new();
    if let Err(e) = file
        .take(max_file_size.saturating_add(1))
        .read_to_end(&mut buffer)
    {
        return ScanResult::Err(ScanError::new(
            path,
            ScanErrorKind::IoError,
            format!("Failed to read file: {e}"),
        ));
    }

    if buffer.len() as u64 > max_file_size {
        return ScanResult::Err(ScanError::new(
            path,
            ScanErrorKind::FileTooLarge,
            format!("File exceeds maximum size of {max_file_size} bytes"),
        ));
    }

    match String::from_utf8(buffer) {
        Ok(content) => ScanResult::Ok(content),
        Err(_) => ScanResult::Err(ScanError::new(
            path,
            ScanErrorKind::InvalidEncoding,
            "File is not valid UTF-8",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn config_for(root: &Path) -> FsSourceConfig {
        let mut cfg = FsSourceConfig::default();
        cfg.paths = vec![root.to_path_buf()];
        cfg
    }

    #[test]
    fn test_find_files_filters_extensions_and_skip_dirs() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.json"), "{}").unwrap();
        fs::write(tmp.path().join("b.yaml"), "a: 1").unwrap();
        fs::write(tmp.path().join("c.ts"), "export {}").unwrap();
        fs::create_dir(tmp.path().join("node_modules")).unwrap();
        fs::write(tmp.path().join("node_modules/d.json"), "{}").unwrap();

        let (files, errors) = find_files(&config_for(tmp.path()));
        assert!(errors.is_empty(), "{errors:?}");
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.json", "b.yaml"]);
    }

    #[test]
    fn test_find_files_exclude_glob() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("keep.json"), "{}").unwrap();
        fs::write(tmp.path().join("draft.json"), "{}").unwrap();

        let mut cfg = config_for(tmp.path());
        cfg.exclude = vec!["draft*".to_owned()];
        let (files, _) = find_files(&cfg);
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("keep.json"));
    }

    #[test]
    fn test_invalid_exclude_pattern_is_reported() {
        let tmp = TempDir::new().unwrap();
        let mut cfg = config_for(tmp.path());
        cfg.exclude = vec!["[".to_owned()];
        let (_, errors) = find_files(&cfg);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ScanErrorKind::InvalidExcludePattern);
    }

    #[test]
    fn test_read_file_bounded_rejects_oversized() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("big.json");
        fs::write(&path, "x".repeat(64)).unwrap();
        match read_file_bounded(&path, 10) {
            ScanResult::Err(e) => assert_eq!(e.kind, ScanErrorKind::FileTooLarge),
            ScanResult::Ok(_) => panic!("oversized file must be rejected"),
        }
    }

    #[test]
    fn test_read_file_bounded_rejects_non_utf8() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bin.json");
        fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();
        match read_file_bounded(&path, 1024) {
            ScanResult::Err(e) => assert_eq!(e.kind, ScanErrorKind::InvalidEncoding),
            ScanResult::Ok(_) => panic!("non-UTF-8 file must be rejected"),
        }
    }

    #[test]
    fn test_apply_budget_truncates_on_file_count() {
        let tmp = TempDir::new().unwrap();
        let mut files = Vec::new();
        for i in 0..3 {
            let path = tmp.path().join(format!("{i}.json"));
            fs::write(&path, "{}").unwrap();
            files.push(path);
        }
        let mut cfg = config_for(tmp.path());
        cfg.max_files = 2;
        let (kept, err) = apply_budget(files, 0, &cfg);
        assert_eq!(kept.len(), 2);
        assert_eq!(err.unwrap().kind, ScanErrorKind::LimitExceeded);
    }

    #[test]
    fn test_apply_budget_truncates_on_bytes() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a.json");
        let b = tmp.path().join("b.json");
        fs::write(&a, "x".repeat(10)).unwrap();
        fs::write(&b, "x".repeat(10)).unwrap();
        let mut cfg = config_for(tmp.path());
        cfg.max_total_bytes = 15;
        let (kept, err) = apply_budget(vec![a, b], 0, &cfg);
        assert_eq!(kept.len(), 1);
        assert!(err.unwrap().message.contains("max_total_bytes"));
    }
}
