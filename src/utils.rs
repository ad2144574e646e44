//! Small helpers shared by the feed and report code paths.
//!
//! - Log-friendly string truncation and URL redaction
//! - JSON error classification for truncated upstream bodies
//! - Output directory creation

use crate::error::{Error, Result};
use std::path::Path;
use tokio::fs;
use tracing::{debug, instrument};
use url::Url;

/// Query parameter whose value never appears in logs or error messages.
pub const TOKEN_PARAM: &str = "token";

/// Truncate a string for logging purposes.
///
/// Long strings are cut after `max` characters with an ellipsis and a count of
/// the dropped bytes appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// Detect if a serde_json error indicates truncated/incomplete JSON.
///
/// An upstream body cut off mid-transfer fails with an EOF error rather than a
/// syntax error; the distinction is only used for diagnostics.
pub fn looks_truncated(e: &serde_json::Error) -> bool {
    use serde_json::error::Category;
    matches!(e.classify(), Category::Eof)
}

/// Render an error and every cause behind it, joined with `": "`.
///
/// Transport errors keep the useful part ("Connection refused", a DNS or TLS
/// failure) in their sources rather than their top-level message.
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut rendered = err.to_string();
    let mut cause = err.source();
    while let Some(e) = cause {
        let text = e.to_string();
        if !rendered.ends_with(&text) {
            rendered.push_str(": ");
            rendered.push_str(&text);
        }
        cause = e.source();
    }
    rendered
}

/// Render a URL with the value of the `token` query parameter replaced.
pub fn redact_token(url: &Url) -> String {
    if !url.query_pairs().any(|(k, _)| k == TOKEN_PARAM) {
        return url.to_string();
    }

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == TOKEN_PARAM {
                "REDACTED".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), v)
        })
        .collect();

    let mut redacted = url.clone();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted.to_string()
}

/// Create a directory and all of its parents if they are missing.
///
/// Succeeds without touching anything when the directory already exists.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub async fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .await
        .map_err(|e| Error::io(path, e))?;
    debug!("Output directory ready");
    Ok(())
}
