//! Parser for Yarn v1 `yarn.lock` files.
//!
//! Each entry opens with a header listing the requested ranges, followed
//! by an indented body whose `resolved` field points into a registry:
//!
//! ```text
//! "@babel/code-frame@^7.0.0", "@babel/code-frame@^7.10.4":
//!   version "7.12.13"
//!   resolved "https://registry.yarnpkg.com/@babel/code-frame/-/code-frame-7.12.13.tgz#dad1..."
//! ```
//!
//! The remote is the part of the resolved URL in front of `/<name>/`.

use super::{for_each_line, LockFile};
use crate::model::{Ecosystem, RemoteMap};
use std::io::{self, BufRead};

const HEADER_SUFFIX: char = ':';
const RESOLVED_PREFIX: &str = "  resolved \"";
const VERSION_SEPARATOR: char = '@';

#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    Idle,
    InBlock { name: String },
}

/// Parsed view of a `yarn.lock`.
#[derive(Debug, Default)]
pub struct YarnLock {
    remotes: RemoteMap,
}

impl YarnLock {
    pub fn new() -> Self {
        Self::default()
    }

    fn parse_line(&mut self, state: State, line: &str) -> State {
        if line.is_empty() {
            return State::Idle;
        }

        match state {
            State::Idle if line.ends_with(HEADER_SUFFIX) => {
                match dependency_name_from_header(line) {
                    Some(name) => State::InBlock {
                        name: name.to_string(),
                    },
                    None => {
                        tracing::trace!(line, "skipping header without a package name");
                        State::Idle
                    }
                }
            }
            State::InBlock { name } => {
                if let Some(url) = remote_url_from_resolved(line, &name) {
                    self.remotes.add_dependency(url, &name);
                }
                State::InBlock { name }
            }
            other => other,
        }
    }
}

impl LockFile for YarnLock {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Js
    }

    fn parse(&mut self, reader: &mut dyn BufRead) -> io::Result<()> {
        let mut state = State::Idle;
        for_each_line(reader, |line| {
            state = self.parse_line(std::mem::replace(&mut state, State::Idle), line);
        })
    }

    fn remotes(&self) -> &RemoteMap {
        &self.remotes
    }
}

/// Extracts the package name from an entry header.
///
/// `"@scope/pkg@1.0.0":` gives `@scope/pkg` and `pkg@^2.3.1:` gives `pkg`.
/// Returns `None` when nothing is left of the name.
pub(crate) fn dependency_name_from_header(line: &str) -> Option<&str> {
    let header = line.strip_prefix('"').unwrap_or(line);

    let name = match header.strip_prefix(VERSION_SEPARATOR) {
        Some(scoped) => match scoped.find(VERSION_SEPARATOR) {
            Some(end) => &header[..end + 1],
            None => header,
        },
        None => header.split(VERSION_SEPARATOR).next().unwrap_or(header),
    };

    let name = name.trim_end_matches([HEADER_SUFFIX, '"']);
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Extracts the registry URL from a `  resolved "..."` line of `name`'s entry.
///
/// Returns `None` for lines that aren't a resolved field.
pub(crate) fn remote_url_from_resolved<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let resolved = line.strip_prefix(RESOLVED_PREFIX)?;
    let marker = format!("/{}/", name);

    let url = match resolved.find(&marker) {
        Some(end) => &resolved[..end],
        None => resolved.trim_end_matches('"'),
    };

    if url.is_empty() {
        None
    } else {
        Some(url)
    }
}
