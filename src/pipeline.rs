//! Pipeline step adapter for the feed normalizer.
//!
//! A pipeline host describes a fetch as
//! `{ "config": { "url": ..., "queryParams": {...} }, "output": "<key>" }`
//! and expects `{ "<key>": <feed> }` back. This module only translates between
//! that shape and [`normalize`]; it holds no logic of its own.

use crate::api::FetchJson;
use crate::error::{Error, Result};
use crate::models::{Feed, PipelineStep};
use crate::normalizer::{Clock, normalize};
use std::collections::BTreeMap;
use tracing::{info, instrument};

impl PipelineStep {
    /// Deserialize a step from the generic structure a pipeline host passes around.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidStep`] if `value` lacks an `output` key or has
    /// mistyped fields.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(Error::InvalidStep)
    }
}

/// Run one fetch step and return the feed under the step's output key.
#[instrument(
    level = "info",
    skip_all,
    fields(output = %step.output, url = %step.config.url)
)]
pub async fn run_step<F, C>(
    fetcher: &F,
    clock: &C,
    step: &PipelineStep,
) -> Result<BTreeMap<String, Feed>>
where
    F: FetchJson,
    C: Clock + ?Sized,
{
    let feed = normalize(fetcher, clock, &step.config.url, &step.config.query()).await?;
    info!(items = feed.items.len(), "Pipeline step produced feed");

    let mut produced = BTreeMap::new();
    produced.insert(step.output.clone(), feed);
    Ok(produced)
}
