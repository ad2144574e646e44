//! Data models for the normalized feed, report sections and pipeline steps.
//!
//! - [`Feed`] / [`FeedItem`]: the RSSGuard-compatible JSON feed this crate
//!   produces. Key names and default values are the external contract.
//! - [`ReportSection`]: one heading + markup + script block of an HTML report
//! - [`PipelineStep`] / [`FetchConfig`]: the step description a pipeline host
//!   hands to the fetch stage
//!
//! The feed models use camelCase keys where the feed format does, hence the
//! `#[serde(rename)]` attributes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Feed format version written into every [`Feed`].
pub const FEED_VERSION: u32 = 1;
pub const FEED_TITLE: &str = "Bloomberg News Feed";
pub const FEED_LINK: &str = "https://www.bloomberg.com/";
pub const FEED_DESCRIPTION: &str = "Bloomberg News";

/// Endpoint used when a step description does not name one.
pub const DEFAULT_API_URL: &str = "https://feeds.bloomberg.com/news.json";

/// A normalized news feed.
///
/// Header fields are constants; only `items` depends on the upstream response.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Feed {
    pub version: u32,
    pub title: String,
    pub link: String,
    pub description: String,
    /// Items in upstream order.
    pub items: Vec<FeedItem>,
}

impl Feed {
    /// Wrap `items` in the fixed feed header.
    pub fn new(items: Vec<FeedItem>) -> Self {
        Self {
            version: FEED_VERSION,
            title: FEED_TITLE.to_string(),
            link: FEED_LINK.to_string(),
            description: FEED_DESCRIPTION.to_string(),
            items,
        }
    }
}

/// One normalized news item.
///
/// Every field is always present; missing upstream values are replaced by the
/// defaults in [`crate::normalizer::FIELD_FALLBACKS`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    /// Upstream `id`.
    pub guid: String,
    pub description: String,
    /// ISO-8601 timestamp as sent upstream, or the fetch time if it was missing.
    #[serde(rename = "pubDate")]
    pub pub_date: String,
    pub author: String,
    pub categories: Vec<String>,
    pub tickers: Vec<String>,
}

/// A section of an HTML report.
///
/// `text` and `script` are inserted verbatim. Callers are trusted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSection {
    pub heading: String,
    pub text: String,
    pub script: String,
}

impl ReportSection {
    pub fn new(
        heading: impl Into<String>,
        text: impl Into<String>,
        script: impl Into<String>,
    ) -> Self {
        Self {
            heading: heading.into(),
            text: text.into(),
            script: script.into(),
        }
    }
}

/// A scalar query parameter value from a step description.
///
/// Step files are written by hand, so `ageHours: 120` is as common as
/// `ageHours: "120"`. Both end up as the same query string.
///
/// Integers past `i64::MAX` land in `UInt` so they are sent exactly. Floats
/// always carry a fractional part (`1.0`, not `1`).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(b) => write!(f, "{b}"),
            ParamValue::Int(i) => write!(f, "{i}"),
            ParamValue::UInt(u) => write!(f, "{u}"),
            ParamValue::Float(x) => match serde_json::Number::from_f64(*x) {
                Some(n) => write!(f, "{n}"),
                None => write!(f, "{x}"),
            },
            ParamValue::Text(s) => f.write_str(s),
        }
    }
}

/// The `config` block of a fetch step.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FetchConfig {
    #[serde(default = "default_api_url", alias = "api_url")]
    pub url: String,
    #[serde(default, rename = "queryParams", alias = "params")]
    pub query_params: BTreeMap<String, ParamValue>,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            url: default_api_url(),
            query_params: BTreeMap::new(),
        }
    }
}

impl FetchConfig {
    /// Query parameters rendered as strings, ready for the request.
    pub fn query(&self) -> BTreeMap<String, String> {
        self.query_params
            .iter()
            .map(|(k, v)| (k.clone(), v.to_string()))
            .collect()
    }
}

/// A pipeline step description for the fetch stage.
///
/// ```yaml
/// plugin: Bloomberg
/// config:
///   api_url: https://feeds.bloomberg.com/news.json
///   params:
///     ageHours: 120
///     tickers: "NTRS:US"
/// output: bloomberg_feed
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PipelineStep {
    /// Name the pipeline host used to route the step; informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin: Option<String>,
    #[serde(default)]
    pub config: FetchConfig,
    /// Key under which the produced feed is returned.
    pub output: String,
}
