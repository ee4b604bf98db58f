//! Error types for the fallible I/O edges of the library.
//!
//! Parsing itself never fails on content: malformed lines are skipped.
//! These errors cover loading the registry, locating lock files and
//! writing reports.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Failed to read registry {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse registry {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Lock file path {path} does not exist or cannot be read: {source}")]
    NotFound {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path} is not a .lock file")]
    NotALockFile { path: PathBuf },

    #[error("Failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write report {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}
