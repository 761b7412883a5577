//! Query string construction for the Last.fm REST endpoint.

use std::sync::Arc;

use crate::cache::BoundedCache;
use crate::{ClientConfig, LastFmError, Result, WireFormat};

/// Full effective input of a query build. Any change to the API key, format or
/// endpoint yields a distinct key, so cached URLs can never go stale.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct QueryKey {
    base_url: String,
    api_key: String,
    format: WireFormat,
    method: String,
    params: Vec<(String, String)>,
}

/// Builds canonical request URLs and memoizes them.
///
/// Parameters are emitted as `method`, the caller's parameters in order,
/// `api_key`, and finally `format=json` when JSON is the configured format.
///
/// ```rust
/// use lastfm_api::{ClientConfig, QueryBuilder, WireFormat};
///
/// let builder = QueryBuilder::new(&ClientConfig::new("K").with_format(WireFormat::Xml));
/// let url = builder
///     .build("user.getRecentTracks", &[("user", "alice"), ("limit", "5")])
///     .unwrap();
/// assert_eq!(
///     url,
///     "http://ws.audioscrobbler.com/2.0/?method=user.getRecentTracks&user=alice&limit=5&api_key=K"
/// );
/// ```
#[derive(Debug)]
pub struct QueryBuilder {
    base_url: String,
    api_key: String,
    format: WireFormat,
    cache: BoundedCache<QueryKey, String>,
}

impl QueryBuilder {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            format: config.format,
            cache: BoundedCache::new(config.query_cache_capacity),
        }
    }

    pub fn format(&self) -> WireFormat {
        self.format
    }

    /// Build the request URL for `method` with the given parameters.
    pub fn build(&self, method: &str, params: &[(&str, &str)]) -> Result<String> {
        if method.trim().is_empty() {
            return Err(LastFmError::InvalidArgument(
                "API method name cannot be empty".to_string(),
            ));
        }

        let key = QueryKey {
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            format: self.format,
            method: method.to_string(),
            params: params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        };

        if let Some(url) = self.cache.get(&key) {
            log::trace!("Query cache hit for {method}");
            return Ok(url.as_ref().clone());
        }

        let url = render_url(&key);
        let url: Arc<String> = self.cache.insert(key, url);
        Ok(url.as_ref().clone())
    }

    pub fn clear(&self) {
        self.cache.clear();
    }

    pub(crate) fn cached_entries(&self) -> usize {
        self.cache.len()
    }
}

fn render_url(key: &QueryKey) -> String {
    let mut pairs: Vec<(&str, &str)> = Vec::with_capacity(key.params.len() + 3);
    pairs.push(("method", key.method.as_str()));
    pairs.extend(key.params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    pairs.push(("api_key", key.api_key.as_str()));
    if key.format == WireFormat::Json {
        pairs.push(("format", "json"));
    }

    let query = pairs
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    format!("{}?{}", key.base_url, query)
}
