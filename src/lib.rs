//! depinspect - dependency confusion checks for lock files.
//!
//! Parses `Gemfile.lock` and `yarn.lock` files into a map of remote URL to
//! the dependencies resolved from it, then reports every dependency that a
//! trusted [`Registry`] owns but the lock file resolved from somewhere else.
//!
//! # Example
//!
//! ```
//! use depinspect::lockfile::{for_ecosystem, LockFile};
//! use depinspect::{Ecosystem, Registry};
//!
//! let registry = Registry::new("https://pkg.acme.io/", vec!["foo".into(), "bar".into()]);
//!
//! let content = "GEM\n  remote: https://rubygems.org/\n  specs:\n    foo (1.0.0)\n    baz (2.0.0)\n";
//! let mut lock_file = for_ecosystem(Ecosystem::Ruby);
//! lock_file.parse(&mut content.as_bytes()).unwrap();
//!
//! let mismatches = registry.dependency_mismatches(&*lock_file);
//! assert_eq!(mismatches["https://rubygems.org/"], vec!["foo"]);
//! assert_eq!(mismatches.len(), 1);
//! ```

pub mod config;
pub mod discovery;
pub mod error;
pub mod inspect;
pub mod lockfile;
pub mod model;
pub mod output;
pub mod registry;

pub use config::Config;
pub use lockfile::LockFile;
pub use model::{Dependency, Ecosystem, Remote, RemoteMap};
pub use registry::{Mismatches, Registry};
