//! JSON output for normalized feeds.
//!
//! Writes a [`Feed`] as pretty-printed JSON so feed readers (RSSGuard and
//! friends) can load it from disk. Parent directories are created as needed
//! and an existing file is replaced.

use crate::error::{Error, Result};
use crate::models::Feed;
use crate::utils::ensure_dir;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Write `feed` to `path` as pretty JSON.
///
/// # Errors
///
/// [`Error::Io`] if the parent directory cannot be created or the file cannot
/// be written.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_feed(feed: &Feed, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(feed).map_err(|e| Error::io(path, e.into()))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent).await?;
    }

    fs::write(path, json).await.map_err(|e| Error::io(path, e))?;
    info!(items = feed.items.len(), "Wrote feed JSON");
    Ok(())
}
