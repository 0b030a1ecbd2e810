// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Failure to get text out of one PDF. Never fatal to a run.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse PDF: {0}")]
    Parse(#[from] lopdf::Error),

    #[error("text extraction failed: {0}")]
    Text(String),
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write workbook: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to build workbook archive: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Errors that stop a whole run: directory-level I/O and report output.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to create output directory {}: {source}", path.display())]
    CreateOutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to list source directory {}: {source}", path.display())]
    ReadSourceDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Report(#[from] ReportError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
