//! Upstream news JSON to [`Feed`] normalization.
//!
//! The upstream API answers with `{ "items": [ {...}, ... ] }` where every item
//! field is optional. Each item is mapped on its own: fields that are present
//! pass through unchanged, missing ones take the fallback listed in
//! [`FIELD_FALLBACKS`], and unknown ones are ignored. A missing field is never
//! an error.
//!
//! # Field Mapping
//!
//! | Upstream | Output | Fallback |
//! |----------|--------|----------|
//! | `title` | `title` | `"No Title"` |
//! | `link` | `link` | `""` |
//! | `id` | `guid` | `""` |
//! | `description` | `description` | `""` |
//! | `pubDate` | `pubDate` | current time |
//! | `author` | `author` | `"Bloomberg"` |
//! | `categories` | `categories` | `[]` |
//! | `tickers` | `tickers` | `[]` |
//!
//! The "current time" fallback means two fetches of the same stale item can
//! disagree on `pubDate`. The time comes from an injected [`Clock`] so tests
//! can pin it.

use crate::api::FetchJson;
use crate::error::{Error, Result};
use crate::models::{Feed, FeedItem};
use crate::utils::{looks_truncated, truncate_for_log};
use chrono::{Local, NaiveDateTime};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};

/// Source of "now" for items without a publication date.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// [`Clock`] reading the local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Format a timestamp the way the feed writes generated publication dates.
pub fn iso_timestamp(t: NaiveDateTime) -> String {
    t.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

/// What a missing upstream field turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    Text(&'static str),
    Now,
    EmptyList,
}

/// Per-field fallback table, keyed by upstream field name.
pub const FIELD_FALLBACKS: [(&str, Fallback); 8] = [
    ("title", Fallback::Text("No Title")),
    ("link", Fallback::Text("")),
    ("id", Fallback::Text("")),
    ("description", Fallback::Text("")),
    ("pubDate", Fallback::Now),
    ("author", Fallback::Text("Bloomberg")),
    ("categories", Fallback::EmptyList),
    ("tickers", Fallback::EmptyList),
];

/// Look up the fallback for an upstream field.
pub fn fallback_for(key: &str) -> Option<Fallback> {
    FIELD_FALLBACKS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, fallback)| *fallback)
}

/// Reads fields of one upstream item, applying [`FIELD_FALLBACKS`].
struct FieldReader<'a, C: Clock + ?Sized> {
    fields: Option<&'a Map<String, Value>>,
    clock: &'a C,
}

impl<'a, C: Clock + ?Sized> FieldReader<'a, C> {
    fn new(item: &'a Value, clock: &'a C) -> Self {
        Self {
            fields: item.as_object(),
            clock,
        }
    }

    fn raw(&self, key: &str) -> Option<&'a Value> {
        self.fields.and_then(|m| m.get(key))
    }

    fn fallback_text(&self, key: &str) -> String {
        match fallback_for(key) {
            Some(Fallback::Text(s)) => s.to_string(),
            Some(Fallback::Now) => iso_timestamp(self.clock.now()),
            Some(Fallback::EmptyList) | None => String::new(),
        }
    }

    fn text(&self, key: &str) -> String {
        self.raw(key)
            .and_then(scalar_text)
            .unwrap_or_else(|| self.fallback_text(key))
    }

    fn list(&self, key: &str) -> Vec<String> {
        match self.raw(key) {
            Some(Value::Array(values)) => values.iter().filter_map(scalar_text).collect(),
            _ => Vec::new(),
        }
    }
}

/// Strings pass through; numbers and booleans become their JSON text.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Map one upstream item into a [`FeedItem`].
///
/// Anything that is not a JSON object yields an all-default item.
pub fn normalize_item<C: Clock + ?Sized>(item: &Value, clock: &C) -> FeedItem {
    let reader = FieldReader::new(item, clock);
    FeedItem {
        title: reader.text("title"),
        link: reader.text("link"),
        guid: reader.text("id"),
        description: reader.text("description"),
        pub_date: reader.text("pubDate"),
        author: reader.text("author"),
        categories: reader.list("categories"),
        tickers: reader.list("tickers"),
    }
}

/// Parse an upstream body and map its `items` into a [`Feed`].
///
/// # Errors
///
/// [`Error::Parse`] if `body` is not JSON or its top level is not an object.
/// A missing or non-array `items` is an empty feed, not an error.
pub fn normalize_body<C: Clock + ?Sized>(body: &str, clock: &C) -> Result<Feed> {
    let data: Value = serde_json::from_str(body).map_err(|e| {
        warn!(
            error = %e,
            truncated = looks_truncated(&e),
            body_preview = %truncate_for_log(body, 300),
            "Feed API returned malformed JSON"
        );
        Error::Parse(e)
    })?;

    let Value::Object(top) = data else {
        return Err(Error::Parse(serde::de::Error::custom(
            "expected a JSON object at the top level",
        )));
    };

    let items = match top.get("items") {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| normalize_item(item, clock))
            .collect(),
        Some(other) => {
            debug!(is_null = other.is_null(), "`items` is not an array; treating as empty");
            Vec::new()
        }
        None => Vec::new(),
    };

    Ok(Feed::new(items))
}

/// Fetch `source_url` once with `query_params` and normalize the response.
///
/// # Errors
///
/// - [`Error::Fetch`] on transport failure or a non-success status
/// - [`Error::Parse`] when the body is not a JSON object
#[instrument(level = "info", skip_all)]
pub async fn normalize<F, C>(
    fetcher: &F,
    clock: &C,
    source_url: &str,
    query_params: &BTreeMap<String, String>,
) -> Result<Feed>
where
    F: FetchJson,
    C: Clock + ?Sized,
{
    let body = fetcher.get(source_url, query_params).await?;
    let feed = normalize_body(&body, clock)?;
    info!(items = feed.items.len(), "Normalized feed");
    Ok(feed)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::FetchError;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::cell::RefCell;

    const FEED_URL: &str = "https://feeds.bloomberg.com/news.json";

    pub(crate) struct FixedClock(pub NaiveDateTime);

    impl Clock for FixedClock {
        fn now(&self) -> NaiveDateTime {
            self.0
        }
    }

    pub(crate) fn fixed_clock() -> FixedClock {
        FixedClock(
            NaiveDate::from_ymd_opt(2025, 5, 6)
                .unwrap()
                .and_hms_micro_opt(9, 15, 0, 250_000)
                .unwrap(),
        )
    }

    /// In-memory [`FetchJson`] that replays one canned outcome and records calls.
    pub(crate) struct CannedFetcher {
        outcome: RefCell<Option<std::result::Result<String, FetchError>>>,
        pub calls: RefCell<Vec<(String, BTreeMap<String, String>)>>,
    }

    impl CannedFetcher {
        pub(crate) fn body(body: &str) -> Self {
            Self {
                outcome: RefCell::new(Some(Ok(body.to_string()))),
                calls: RefCell::new(Vec::new()),
            }
        }

        pub(crate) fn failing(err: FetchError) -> Self {
            Self {
                outcome: RefCell::new(Some(Err(err))),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl FetchJson for CannedFetcher {
        async fn get(
            &self,
            url: &str,
            query: &BTreeMap<String, String>,
        ) -> std::result::Result<String, FetchError> {
            self.calls.borrow_mut().push((url.to_string(), query.clone()));
            self.outcome
                .borrow_mut()
                .take()
                .expect("CannedFetcher called more than once")
        }
    }

    #[test]
    fn test_fallback_table_covers_every_upstream_field() {
        for key in [
            "title",
            "link",
            "id",
            "description",
            "pubDate",
            "author",
            "categories",
            "tickers",
        ] {
            assert!(fallback_for(key).is_some(), "no fallback for {key}");
        }
        assert_eq!(fallback_for("title"), Some(Fallback::Text("No Title")));
        assert_eq!(fallback_for("author"), Some(Fallback::Text("Bloomberg")));
        assert_eq!(fallback_for("pubDate"), Some(Fallback::Now));
        assert_eq!(fallback_for("tickers"), Some(Fallback::EmptyList));
        assert_eq!(fallback_for("guid"), None);
    }

    #[test]
    fn test_empty_item_gets_all_defaults() {
        let item = normalize_item(&json!({}), &fixed_clock());
        assert_eq!(
            item,
            FeedItem {
                title: "No Title".to_string(),
                link: String::new(),
                guid: String::new(),
                description: String::new(),
                pub_date: "2025-05-06T09:15:00.250000".to_string(),
                author: "Bloomberg".to_string(),
                categories: vec![],
                tickers: vec![],
            }
        );
    }

    #[test]
    fn test_full_item_passes_through() {
        let upstream = json!({
            "title": "Northern Trust Beats Estimates",
            "link": "https://www.bloomberg.com/news/articles/ntrs",
            "id": "SV1ABC",
            "description": "Quarterly profit rose.",
            "pubDate": "2025-04-22T12:00:00Z",
            "author": "John Smith",
            "categories": ["Markets", "Banks"],
            "tickers": ["NTRS:US", "JPM:US"],
            "unexpected": {"nested": true}
        });
        let item = normalize_item(&upstream, &fixed_clock());
        assert_eq!(item.title, "Northern Trust Beats Estimates");
        assert_eq!(item.link, "https://www.bloomberg.com/news/articles/ntrs");
        assert_eq!(item.guid, "SV1ABC");
        assert_eq!(item.description, "Quarterly profit rose.");
        assert_eq!(item.pub_date, "2025-04-22T12:00:00Z");
        assert_eq!(item.author, "John Smith");
        assert_eq!(item.categories, vec!["Markets", "Banks"]);
        assert_eq!(item.tickers, vec!["NTRS:US", "JPM:US"]);
    }

    #[test]
    fn test_present_empty_string_is_not_defaulted() {
        let item = normalize_item(&json!({"title": "", "author": ""}), &fixed_clock());
        assert_eq!(item.title, "");
        assert_eq!(item.author, "");
    }

    #[test]
    fn test_odd_field_types_are_coerced_or_defaulted() {
        let upstream = json!({
            "title": null,
            "id": 12345,
            "author": ["not", "a", "name"],
            "categories": "Markets",
            "tickers": ["NTRS:US", 7, null, {"x": 1}]
        });
        let item = normalize_item(&upstream, &fixed_clock());
        assert_eq!(item.title, "No Title");
        assert_eq!(item.guid, "12345");
        assert_eq!(item.author, "Bloomberg");
        assert!(item.categories.is_empty());
        assert_eq!(item.tickers, vec!["NTRS:US", "7"]);
    }

    #[test]
    fn test_non_object_item_keeps_its_slot() {
        let body = r#"{"items": [{"title": "a"}, "junk", {"title": "b"}]}"#;
        let feed = normalize_body(body, &fixed_clock()).unwrap();
        let titles: Vec<_> = feed.items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "No Title", "b"]);
    }

    #[test]
    fn test_order_and_count_preserved() {
        let items: Vec<Value> = (0..25).map(|i| json!({ "id": format!("id-{i}") })).collect();
        let body = json!({ "items": items }).to_string();
        let feed = normalize_body(&body, &fixed_clock()).unwrap();
        assert_eq!(feed.items.len(), 25);
        for (i, item) in feed.items.iter().enumerate() {
            assert_eq!(item.guid, format!("id-{i}"));
        }
    }

    #[test]
    fn test_missing_items_is_empty_feed() {
        let feed = normalize_body(r#"{"status": "ok"}"#, &fixed_clock()).unwrap();
        assert!(feed.items.is_empty());
        assert_eq!(feed.title, "Bloomberg News Feed");

        let feed = normalize_body(r#"{"items": null}"#, &fixed_clock()).unwrap();
        assert!(feed.items.is_empty());
    }

    #[test]
    fn test_malformed_body_is_parse_error() {
        let err = normalize_body("<html>502 Bad Gateway</html>", &fixed_clock()).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
        assert!(err.to_string().starts_with("error parsing feed API response"));
    }

    #[test]
    fn test_top_level_array_is_parse_error() {
        let err = normalize_body("[1, 2, 3]", &fixed_clock()).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
        assert!(err.to_string().contains("expected a JSON object"));
    }

    #[test]
    fn test_system_clock_timestamp_is_iso_8601() {
        let stamp = iso_timestamp(SystemClock.now());
        assert!(NaiveDateTime::parse_from_str(&stamp, "%Y-%m-%dT%H:%M:%S%.f").is_ok());
    }

    #[tokio::test]
    async fn test_normalize_fetches_once_with_params() {
        let fetcher = CannedFetcher::body(r#"{"items": [{"title": "Only"}]}"#);
        let mut params = BTreeMap::new();
        params.insert("ageHours".to_string(), "120".to_string());

        let feed = normalize(&fetcher, &fixed_clock(), FEED_URL, &params)
            .await
            .unwrap();

        assert_eq!(feed.items.len(), 1);
        assert_eq!(feed.items[0].title, "Only");
        let calls = fetcher.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "https://feeds.bloomberg.com/news.json");
        assert_eq!(calls[0].1, params);
    }

    #[tokio::test]
    async fn test_normalize_status_failure_is_fetch_error() {
        let fetcher = CannedFetcher::failing(FetchError::Status {
            status: 404,
            url: "https://feeds.bloomberg.com/news.json".to_string(),
        });
        let err = normalize(&fetcher, &fixed_clock(), FEED_URL, &BTreeMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Fetch(FetchError::Status { status: 404, .. })));
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_normalize_malformed_body_is_parse_error() {
        let fetcher = CannedFetcher::body(r#"{"items": [{"title": "cut off"#);
        let err = normalize(&fetcher, &fixed_clock(), FEED_URL, &BTreeMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }
}
