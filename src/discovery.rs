//! Lock file discovery.
//!
//! `--path` may name a single lock file or a directory. Directories are
//! searched for files ending in `.lock`, either directly inside them or,
//! when recursive, throughout the tree. Symbolic links are followed.

use crate::config::IgnoreConfig;
use crate::error::DiscoveryError;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const LOCK_EXTENSION: &str = ".lock";

/// Options controlling which lock files are found.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOptions {
    pub recursive: bool,
    pub ignore: IgnoreConfig,
}

/// Returns the lock files to inspect under `path`, sorted by path.
///
/// # Errors
///
/// Returns an error if `path` doesn't exist, if it names a file that isn't a
/// `.lock` file, or if the directory itself cannot be read. Entries below it
/// that can't be read (broken links, unreadable subdirectories) are logged
/// and skipped.
///
/// # Example
///
/// ```no_run
/// use depinspect::discovery::{find_lock_files, DiscoveryOptions};
///
/// let files = find_lock_files("lock_files/ruby".as_ref(), &DiscoveryOptions::default())?;
/// println!("Found {} lock files", files.len());
/// # Ok::<(), depinspect::error::DiscoveryError>(())
/// ```
pub fn find_lock_files(
    path: &Path,
    options: &DiscoveryOptions,
) -> Result<Vec<PathBuf>, DiscoveryError> {
    let metadata = fs::metadata(path).map_err(|source| DiscoveryError::NotFound {
        path: path.to_path_buf(),
        source,
    })?;

    if !metadata.is_dir() {
        // An explicitly named file is never subject to the ignore list.
        return if is_lock_file(path) {
            Ok(vec![path.to_path_buf()])
        } else {
            Err(DiscoveryError::NotALockFile {
                path: path.to_path_buf(),
            })
        };
    }

    let max_depth = if options.recursive { usize::MAX } else { 1 };
    let mut lock_files = Vec::new();

    let walker = WalkDir::new(path)
        .follow_links(true)
        .min_depth(1)
        .max_depth(max_depth);

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(source) if source.depth() == 0 => {
                return Err(DiscoveryError::Walk {
                    path: path.to_path_buf(),
                    source,
                });
            }
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };

        if !entry.file_type().is_file() || !is_lock_file(entry.path()) {
            continue;
        }

        if options
            .ignore
            .should_ignore_file(&entry.file_name().to_string_lossy())
        {
            tracing::debug!(path = %entry.path().display(), "ignoring lock file");
            continue;
        }

        lock_files.push(entry.into_path());
    }

    lock_files.sort();
    Ok(lock_files)
}

fn is_lock_file(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().ends_with(LOCK_EXTENSION))
        .unwrap_or(false)
}

/// Returns the label used for a lock file's report: its name without `.lock`.
///
/// ```
/// use depinspect::discovery::report_stem;
///
/// assert_eq!(report_stem("apps/billing/Gemfile.lock".as_ref()), "Gemfile");
/// ```
pub fn report_stem(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    name.strip_suffix(LOCK_EXTENSION)
        .map(String::from)
        .unwrap_or(name)
}
