//! Runs the parsers and the detector over a batch of lock files.
//!
//! Files are handled one at a time. A file that can't be opened or read is
//! logged and counted as skipped; the rest of the batch carries on.

use crate::config::IgnoreConfig;
use crate::error::ReportError;
use crate::lockfile::{parse_file, LockFile};
use crate::model::{AnalyzeResult, Ecosystem, FileMismatches, RemotesResult};
use crate::output::ReportWriter;
use crate::registry::Registry;
use std::io;
use std::path::{Path, PathBuf};

/// Settings shared by both batch operations.
#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    pub ecosystem: Ecosystem,
    /// Dump every parsed remote to stderr.
    pub verbose: bool,
}

fn load(path: &Path, options: BatchOptions) -> Option<Box<dyn LockFile>> {
    tracing::info!(path = %path.display(), "parsing lock file");

    match parse_file(path, options.ecosystem) {
        Ok(lock_file) => {
            if options.verbose {
                let mut stderr = io::stderr().lock();
                if let Err(e) = lock_file.dump_remotes(&mut stderr) {
                    tracing::debug!(error = %e, "failed to dump remotes");
                }
            }
            Some(lock_file)
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "skipping unreadable lock file");
            None
        }
    }
}

/// Checks every lock file against the registry and writes a report for
/// each file that has mismatches.
///
/// `on_file` is called before each file is parsed.
///
/// # Errors
///
/// Returns an error only if a report cannot be written.
pub fn analyze_files(
    files: &[PathBuf],
    registry: &Registry,
    ignore: &IgnoreConfig,
    writer: &mut ReportWriter,
    options: BatchOptions,
    mut on_file: impl FnMut(&Path),
) -> Result<AnalyzeResult, ReportError> {
    let mut result = AnalyzeResult::new(registry.clone());

    for path in files {
        on_file(path);

        let Some(lock_file) = load(path, options) else {
            result.files_skipped += 1;
            continue;
        };
        result.files_scanned += 1;

        let mut mismatches = registry.dependency_mismatches(&*lock_file);
        ignore.filter_mismatches(&mut mismatches);

        if mismatches.is_empty() {
            continue;
        }

        tracing::info!(
            path = %path.display(),
            remotes = mismatches.len(),
            "dependency mismatches found"
        );

        let report_path = writer.write_mismatches(path, &mismatches)?;
        result.files.push(FileMismatches {
            lock_file: path.clone(),
            mismatches,
            report_path: Some(report_path),
        });
    }

    Ok(result)
}

/// Collects the remote URLs of every lock file that contain `pattern`,
/// ignoring case. An empty pattern collects them all.
pub fn collect_remotes(
    files: &[PathBuf],
    pattern: &str,
    options: BatchOptions,
    mut on_file: impl FnMut(&Path),
) -> RemotesResult {
    let mut result = RemotesResult::new();

    for path in files {
        on_file(path);

        let Some(lock_file) = load(path, options) else {
            result.files_skipped += 1;
            continue;
        };
        result.files_scanned += 1;

        result
            .remotes
            .extend(lock_file.remote_urls_matching(pattern));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const GEMFILE: &str = "GEM\n  remote: https://rubygems.org/\n  specs:\n    foo (1.0.0)\n    baz (2.0.0)\n";
    const CLEAN_GEMFILE: &str = "GEM\n  remote: https://pkg.acme.io/\n  specs:\n    foo (1.0.0)\n";

    fn options() -> BatchOptions {
        BatchOptions {
            ecosystem: Ecosystem::Ruby,
            verbose: false,
        }
    }

    #[test]
    fn test_analyze_skips_missing_files_and_clean_files() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("bad.lock");
        let clean = dir.path().join("clean.lock");
        let missing = dir.path().join("missing.lock");
        fs::write(&bad, GEMFILE).unwrap();
        fs::write(&clean, CLEAN_GEMFILE).unwrap();

        let registry = Registry::new("https://pkg.acme.io/", vec!["foo".into(), "bar".into()]);
        let mut writer = ReportWriter::for_analyze(dir.path()).unwrap();
        let mut seen = Vec::new();

        let result = analyze_files(
            &[bad.clone(), clean, missing],
            &registry,
            &IgnoreConfig::default(),
            &mut writer,
            options(),
            |p| seen.push(p.to_path_buf()),
        )
        .unwrap();

        assert_eq!(seen.len(), 3);
        assert_eq!(result.files_scanned, 2);
        assert_eq!(result.files_skipped, 1);
        assert_eq!(result.files.len(), 1);
        assert_eq!(result.files[0].lock_file, bad);
        assert_eq!(result.files[0].mismatches["https://rubygems.org/"], vec!["foo".to_string()]);

        let reports: Vec<_> = fs::read_dir(writer.dir()).unwrap().collect();
        assert_eq!(reports.len(), 1);
    }

    #[test]
    fn test_analyze_applies_ignore_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Gemfile.lock");
        fs::write(&path, GEMFILE).unwrap();

        let registry = Registry::new("https://pkg.acme.io/", vec!["foo".into()]);
        let ignore = IgnoreConfig {
            files: vec![],
            dependencies: vec!["foo".to_string()],
        };
        let mut writer = ReportWriter::for_analyze(dir.path()).unwrap();

        let result =
            analyze_files(&[path], &registry, &ignore, &mut writer, options(), |_| {}).unwrap();

        assert!(!result.has_mismatches());
        assert_eq!(fs::read_dir(writer.dir()).unwrap().count(), 0);
    }

    #[test]
    fn test_collect_remotes_unions_files() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.lock");
        let b = dir.path().join("b.lock");
        fs::write(&a, GEMFILE).unwrap();
        fs::write(&b, format!("{}\n{}", CLEAN_GEMFILE, GEMFILE)).unwrap();

        let all = collect_remotes(&[a.clone(), b.clone()], "", options(), |_| {});
        assert_eq!(
            all.remotes.into_iter().collect::<Vec<_>>(),
            vec!["https://pkg.acme.io/", "https://rubygems.org/"]
        );

        let filtered = collect_remotes(&[a, b], "ACME", options(), |_| {});
        assert_eq!(filtered.remotes.len(), 1);
        assert!(filtered.remotes.contains("https://pkg.acme.io/"));
    }
}
