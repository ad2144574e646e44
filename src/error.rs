//! Error types for feed normalization and report assembly.
//!
//! Every failure is terminal for the call that produced it. The underlying
//! transport, parse, or filesystem error is kept as the source so callers can
//! branch on the kind instead of matching message text.

use crate::utils::error_chain;
use std::path::PathBuf;
use thiserror::Error;

/// Failures reported by a [`crate::api::FetchJson`] collaborator.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid feed URL {url}: {source}")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("request to {url} failed: {detail}")]
    Transport {
        /// Request URL with the token redacted.
        url: String,
        /// The transport error and its causes, outermost first.
        detail: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("upstream returned HTTP {status} for {url}")]
    Status { status: u16, url: String },
}

impl FetchError {
    /// Wrap a reqwest failure for the request to `url` (already redacted).
    ///
    /// reqwest renders the request URL, token included, in its own message,
    /// so the URL is stripped from the source before it is kept.
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        let source = source.without_url();
        FetchError::Transport {
            url: url.into(),
            detail: error_chain(&source),
            source,
        }
    }
}

/// Crate-level error returned by [`crate::normalizer`], [`crate::pipeline`]
/// and [`crate::outputs`].
#[derive(Debug, Error)]
pub enum Error {
    #[error("error fetching data from feed API: {0}")]
    Fetch(#[from] FetchError),

    #[error("error parsing feed API response: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("invalid pipeline step: {0}")]
    InvalidStep(#[source] serde_json::Error),

    #[error("error writing {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
