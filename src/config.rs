//! Loading pipeline step files and report section files from disk.
//!
//! Both are read with `serde_yaml`, so plain JSON files work as well.
//!
//! A sections file is a list of blocks:
//!
//! ```yaml
//! - heading: Introduction
//!   text: "<p>Welcome to the sample report.</p>"
//!   script: "console.log('Intro section loaded!');"
//! - text: "<p>No heading here, so this becomes \"Section 2\".</p>"
//!   javascript: "console.log('legacy key');"
//! ```

use crate::models::{PipelineStep, ReportSection};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid step in {}: {source}", path.display())]
    Step {
        path: PathBuf,
        #[source]
        source: crate::error::Error,
    },
}

/// One entry of a sections file before defaults are applied.
#[derive(Debug, Deserialize)]
struct SectionEntry {
    heading: Option<String>,
    #[serde(default)]
    text: String,
    #[serde(default, alias = "javascript")]
    script: String,
}

impl SectionEntry {
    /// `position` is zero-based; untitled sections are numbered from 1.
    fn into_section(self, position: usize) -> ReportSection {
        let heading = self
            .heading
            .unwrap_or_else(|| format!("Section {}", position + 1));
        ReportSection::new(heading, self.text, self.script)
    }
}

async fn read(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).await.map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse a pipeline step from YAML or JSON text.
///
/// The text is read into the generic structure a pipeline host would pass
/// and then handed to [`PipelineStep::from_value`].
pub fn parse_step(text: &str, path: &Path) -> Result<PipelineStep, ConfigError> {
    let value: serde_json::Value =
        serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    PipelineStep::from_value(value).map_err(|source| ConfigError::Step {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse report sections from YAML or JSON text, in file order.
pub fn parse_sections(text: &str, path: &Path) -> Result<Vec<ReportSection>, ConfigError> {
    let entries: Vec<SectionEntry> =
        serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(entries
        .into_iter()
        .enumerate()
        .map(|(i, entry)| entry.into_section(i))
        .collect())
}

#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load_step(path: &Path) -> Result<PipelineStep, ConfigError> {
    let step = parse_step(&read(path).await?, path)?;
    debug!(output = %step.output, url = %step.config.url, "Loaded pipeline step");
    Ok(step)
}

#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load_sections(path: &Path) -> Result<Vec<ReportSection>, ConfigError> {
    let sections = parse_sections(&read(path).await?, path)?;
    debug!(count = sections.len(), "Loaded report sections");
    Ok(sections)
}
