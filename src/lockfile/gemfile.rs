//! Parser for Bundler `Gemfile.lock` files.
//!
//! Only the remote declarations and their direct specs matter here:
//!
//! ```text
//! GEM
//!   remote: https://rubygems.org/
//!   specs:
//!     actioncable (5.2.2)
//!       actionpack (= 5.2.2)
//! ```
//!
//! `remote:` and `specs:` are indented two spaces, gems four spaces and
//! the gems' own dependencies six spaces. The six-space lines are skipped.

use super::{for_each_line, LockFile};
use crate::model::{Ecosystem, RemoteMap};
use std::io::{self, BufRead};

const REMOTE_PREFIX: &str = "  remote:";
const SPECS_PREFIX: &str = "  specs:";
const SPEC_INDENT: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    Idle,
    InRemote { url: String },
    InSpecs { url: String },
}

/// Parsed view of a `Gemfile.lock`.
#[derive(Debug, Default)]
pub struct GemfileLock {
    remotes: RemoteMap,
}

impl GemfileLock {
    pub fn new() -> Self {
        Self::default()
    }

    fn parse_line(&mut self, state: State, line: &str) -> State {
        if let Some(rest) = line.strip_prefix(REMOTE_PREFIX) {
            let url = rest.trim();
            self.remotes.add_remote(url);
            return State::InRemote {
                url: url.to_string(),
            };
        }

        if line.is_empty() {
            return State::Idle;
        }

        match state {
            State::InRemote { url } | State::InSpecs { url } if line.starts_with(SPECS_PREFIX) => {
                State::InSpecs { url }
            }
            State::InSpecs { url } => {
                if let Some(name) = direct_dependency_name(line) {
                    self.remotes.add_dependency(&url, name);
                }
                State::InSpecs { url }
            }
            other => other,
        }
    }
}

impl LockFile for GemfileLock {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Ruby
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

/// Returns the gem name of a direct spec line, e.g. `    rails (7.1.0)`.
///
/// The line must start with exactly four whitespace characters followed by
/// a non-whitespace one. Deeper indented lines return `None`.
pub(crate) fn direct_dependency_name(line: &str) -> Option<&str> {
    let mut chars = line.char_indices();
    for _ in 0..SPEC_INDENT {
        match chars.next() {
            Some((_, c)) if c.is_whitespace() => {}
            _ => return None,
        }
    }

    let (start, first) = chars.next()?;
    if first.is_whitespace() {
        return None;
    }

    line[start..].split_whitespace().next()
}
