//! Core data types for lock file remotes and their dependencies.
//!
//! This module contains the fundamental types used throughout depinspect:
//!
//! - [`Dependency`] - A single named package
//! - [`Remote`] - A source URL and the dependencies resolved from it
//! - [`RemoteMap`] - Every remote found in one lock file, keyed by URL
//! - [`Ecosystem`] - Which lock file grammar produced the data
//! - [`AnalyzeResult`] / [`RemotesResult`] - Results of a CLI run
//!
//! # Example
//!
//! ```
//! use depinspect::model::RemoteMap;
//!
//! let mut remotes = RemoteMap::new();
//! remotes.add_dependency("https://rubygems.org/", "rails");
//!
//! assert!(remotes.get("https://rubygems.org/").unwrap().has_dependency("rails"));
//! ```

mod ecosystem;
mod remote;
mod report;

pub use ecosystem::*;
pub use remote::*;
pub use report::*;
