// sparkscan - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// No string-based error propagation; all errors keep the causal chain
// for diagnostic logging.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all sparkscan operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum SparkscanError {
    /// Application-directory discovery failed.
    Discovery(DiscoveryError),

    /// Writing a report deliverable failed.
    Report(ReportError),

    /// I/O error with path context.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for SparkscanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discovery(e) => write!(f, "Discovery error: {e}"),
            Self::Report(e) => write!(f, "Report error: {e}"),
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for SparkscanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Discovery(e) => Some(e),
            Self::Report(e) => Some(e),
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Discovery errors
// ---------------------------------------------------------------------------

/// Errors related to locating application directories under the scan root.
///
/// Only root-level problems are fatal. Per-directory and per-file problems
/// are collected as warnings by the discovery walk and never surface here.
#[derive(Debug)]
pub enum DiscoveryError {
    /// The scan root does not exist.
    RootNotFound { path: PathBuf },

    /// The scan root is not a directory.
    NotADirectory { path: PathBuf },

    /// Permission denied accessing the scan root.
    PermissionDenied { path: PathBuf, source: io::Error },
}

impl fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootNotFound { path } => {
                write!(f, "Scan root '{}' does not exist", path.display())
            }
            Self::NotADirectory { path } => {
                write!(f, "Scan root '{}' is not a directory", path.display())
            }
            Self::PermissionDenied { path, source } => {
                write!(
                    f,
                    "Permission denied accessing '{}': {source}",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for DiscoveryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::PermissionDenied { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<DiscoveryError> for SparkscanError {
    fn from(e: DiscoveryError) -> Self {
        Self::Discovery(e)
    }
}

// ---------------------------------------------------------------------------
// Report errors
// ---------------------------------------------------------------------------

/// Errors related to writing the report deliverables.
#[derive(Debug)]
pub enum ReportError {
    /// I/O error writing a report file.
    Io { path: PathBuf, source: io::Error },

    /// CSV serialisation error.
    Csv { path: PathBuf, source: csv::Error },

    /// JSON serialisation error.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Report I/O error '{}': {source}", path.display())
            }
            Self::Csv { path, source } => {
                write!(f, "CSV report error '{}': {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "JSON report error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ReportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
        }
    }
}

impl From<ReportError> for SparkscanError {
    fn from(e: ReportError) -> Self {
        Self::Report(e)
    }
}

/// Convenience type alias for sparkscan results.
pub type Result<T> = std::result::Result<T, SparkscanError>;
