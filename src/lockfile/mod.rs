//! Lock file parsers.
//!
//! This module provides the [`LockFile`] trait and implementations for
//! extracting which remote supplied which dependency from a lock file.
//!
//! # Available Parsers
//!
//! | Parser | Ecosystem | File |
//! |--------|-----------|------|
//! | [`GemfileLock`] | Ruby | `Gemfile.lock` |
//! | [`YarnLock`] | JavaScript | `yarn.lock` |
//!
//! Both parsers are line-oriented and tolerant: a line that doesn't match
//! the grammar is skipped, never reported as an error.
//!
//! # Example
//!
//! ```
//! use depinspect::lockfile::{for_ecosystem, LockFile};
//! use depinspect::model::Ecosystem;
//!
//! let content = "GEM\n  remote: https://rubygems.org/\n  specs:\n    rake (13.0.6)\n";
//!
//! let mut lock_file = for_ecosystem(Ecosystem::Ruby);
//! lock_file.parse(&mut content.as_bytes()).unwrap();
//!
//! assert_eq!(lock_file.remote_urls_matching(""), vec!["https://rubygems.org/"]);
//! ```

mod gemfile;
mod yarn;

pub use gemfile::GemfileLock;
pub use yarn::YarnLock;

use crate::model::{Ecosystem, RemoteMap};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

/// Trait for reading the remotes and dependencies recorded in a lock file.
///
/// Implementors own the [`RemoteMap`] they build, so separate instances can
/// parse separate files independently.
pub trait LockFile {
    /// Returns the ecosystem whose grammar this parser understands.
    fn ecosystem(&self) -> Ecosystem;

    /// Reads the whole stream and records every remote and dependency in it.
    ///
    /// Lines that don't match the grammar are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error only if reading from `reader` fails. Whatever was
    /// parsed before the failure stays in the model.
    fn parse(&mut self, reader: &mut dyn BufRead) -> io::Result<()>;

    /// Returns the remotes parsed so far.
    fn remotes(&self) -> &RemoteMap;

    /// Returns the remote URLs containing `pattern`, ignoring case.
    ///
    /// An empty pattern returns every known URL.
    fn remote_urls_matching(&self, pattern: &str) -> Vec<String> {
        self.remotes().urls_matching(pattern)
    }

    /// Returns every remote URL except `excluded_url` that resolved `dependency`.
    fn remote_urls_with_dependency_mismatch(
        &self,
        excluded_url: &str,
        dependency: &str,
    ) -> Vec<String> {
        self.remotes().urls_with_dependency(excluded_url, dependency)
    }

    /// Writes every remote and its dependencies to `out`, for debugging.
    fn dump_remotes(&self, out: &mut dyn Write) -> io::Result<()> {
        self.remotes().dump(out)
    }
}

/// Returns an empty parser for the given ecosystem.
///
/// # Example
///
/// ```
/// use depinspect::lockfile::for_ecosystem;
/// use depinspect::model::Ecosystem;
///
/// let lock_file = for_ecosystem(Ecosystem::Js);
/// assert_eq!(lock_file.ecosystem(), Ecosystem::Js);
/// assert!(lock_file.remotes().is_empty());
/// ```
pub fn for_ecosystem(ecosystem: Ecosystem) -> Box<dyn LockFile> {
    match ecosystem {
        Ecosystem::Ruby => Box::new(GemfileLock::new()),
        Ecosystem::Js => Box::new(YarnLock::new()),
    }
}

/// Opens and parses the lock file at `path` with the ecosystem's parser.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn parse_file(path: &Path, ecosystem: Ecosystem) -> io::Result<Box<dyn LockFile>> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let mut lock_file = for_ecosystem(ecosystem);
    lock_file.parse(&mut reader)?;

    tracing::debug!(
        path = %path.display(),
        remotes = lock_file.remotes().len(),
        "parsed lock file"
    );

    Ok(lock_file)
}

/// Feeds each line of `reader` to `on_line`, without its line terminator.
///
/// Invalid UTF-8 is replaced rather than rejected so one bad byte can't
/// abort a whole file.
pub(crate) fn for_each_line(
    reader: &mut dyn BufRead,
    mut on_line: impl FnMut(&str),
) -> io::Result<()> {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }

        let line = String::from_utf8_lossy(&buf);
        let line = line.strip_suffix('\n').unwrap_or(&line);
        let line = line.strip_suffix('\r').unwrap_or(line);
        on_line(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_for_each_line_strips_terminators() {
        let mut lines = Vec::new();
        let mut reader: &[u8] = b"first\r\nsecond\n\nlast";
        for_each_line(&mut reader, |line| lines.push(line.to_string())).unwrap();

        assert_eq!(lines, vec!["first", "second", "", "last"]);
    }

    #[test]
    fn test_for_each_line_tolerates_invalid_utf8() {
        let mut count = 0;
        let mut reader: &[u8] = b"ok\n\xff\xfe\nok\n";
        for_each_line(&mut reader, |_| count += 1).unwrap();

        assert_eq!(count, 3);
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk on fire"))
        }
    }

    #[test]
    fn test_for_ecosystem_selects_parser() {
        assert_eq!(for_ecosystem(Ecosystem::Ruby).ecosystem(), Ecosystem::Ruby);
        assert_eq!(for_ecosystem(Ecosystem::Js).ecosystem(), Ecosystem::Js);
    }

    #[test]
    fn test_read_failure_is_returned() {
        for ecosystem in [Ecosystem::Ruby, Ecosystem::Js] {
            let mut lock_file = for_ecosystem(ecosystem);
            let mut reader = BufReader::new(FailingReader);
            assert!(lock_file.parse(&mut reader).is_err());
        }
    }

    #[test]
    fn test_parse_file_missing() {
        let result = parse_file(Path::new("/definitely/not/here.lock"), Ecosystem::Ruby);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_file_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("yarn.lock");
        std::fs::write(
            &path,
            "lodash@^4.17.21:\n  version \"4.17.21\"\n  resolved \"https://registry.yarnpkg.com/lodash/-/lodash-4.17.21.tgz#abc\"\n",
        )
        .unwrap();

        let lock_file = parse_file(&path, Ecosystem::Js).unwrap();
        assert_eq!(
            lock_file.remote_urls_matching(""),
            vec!["https://registry.yarnpkg.com".to_string()]
        );
    }
}
