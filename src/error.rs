//! Error types for folio operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while building or writing XHTML documents.
///
/// Every variant is fatal for the file (or section) being processed. Nothing
/// is retried internally; callers decide how to report.
#[derive(Error, Debug)]
pub enum Error {
    /// The template file is missing, unreadable, or not well-formed markup.
    #[error("failed to load template {path:?}: {reason}")]
    TemplateLoad { path: PathBuf, reason: String },

    /// The requested operation is a known capability gap.
    #[error("not supported: {0}")]
    NotSupported(String),

    /// Writing the temporary file or replacing the target failed.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A section title was empty or whitespace-only.
    #[error("invalid title: {0:?}")]
    InvalidTitle(String),

    /// The configured encoding label is unknown or cannot be written.
    #[error("unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    /// Markup text that is not well-formed.
    #[error("malformed markup: {0}")]
    Markup(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn template(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::TemplateLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
