//! Error kinds for the bootstrap pipeline.
//!
//! One failure on one dependency must not abort the others, so every
//! fallible operation returns a `SetupError` that the orchestration loop
//! catches and reports at the per-dependency boundary.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SetupError {
    /// Filesystem access failed while probing or preparing the vendor tree.
    #[error("filesystem check failed for {path}: {source}")]
    PresenceCheck {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Network or IO failure during the single download attempt.
    #[error("download failed: {url}: {reason}")]
    Download { url: String, reason: String },

    /// Malformed archive, or a move/rename failure while normalizing layout.
    #[error("extraction failed: {0}")]
    Extraction(String),

    /// The native SDK environment probe came up empty.
    #[error("{var} is not set; install the SDK from {hint} and re-run")]
    MissingSdk { var: &'static str, hint: &'static str },

    /// The external build-file generator could not be run or exited non-zero.
    #[error("{program}: {reason}")]
    ExternalProcess { program: String, reason: String },
}

impl SetupError {
    pub(crate) fn presence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::PresenceCheck {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn download(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::Download {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn extraction(reason: impl Into<String>) -> Self {
        Self::Extraction(reason.into())
    }
}
