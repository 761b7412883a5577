use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::LastFmError;

/// The Last.fm API endpoint.
pub const DEFAULT_BASE_URL: &str = "http://ws.audioscrobbler.com/2.0/";

/// Default capacity of the query string cache.
pub const DEFAULT_QUERY_CACHE_CAPACITY: usize = 32;

/// Default capacity of the response parse cache.
pub const DEFAULT_PARSE_CACHE_CAPACITY: usize = 16;

/// Wire format requested from the Last.fm API.
///
/// Last.fm answers in XML unless `format=json` is part of the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireFormat {
    #[default]
    Json,
    Xml,
}

impl WireFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            WireFormat::Json => "json",
            WireFormat::Xml => "xml",
        }
    }
}

impl fmt::Display for WireFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WireFormat {
    type Err = LastFmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(WireFormat::Json),
            "xml" => Ok(WireFormat::Xml),
            other => Err(LastFmError::InvalidArgument(format!(
                "API format must be json or xml, got '{other}'"
            ))),
        }
    }
}

/// How a response body should be interpreted.
///
/// - `Json`: strict JSON, falling back to XML when the body is not JSON
///   (Last.fm sometimes answers errors in XML regardless of `format=json`).
/// - `Xml`: strict XML only.
/// - `Auto`: JSON first, then XML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatHint {
    Json,
    Xml,
    Auto,
}

impl From<WireFormat> for FormatHint {
    fn from(format: WireFormat) -> Self {
        match format {
            WireFormat::Json => FormatHint::Json,
            WireFormat::Xml => FormatHint::Xml,
        }
    }
}

/// Client configuration supplied at construction time.
///
/// # Examples
///
/// ```rust
/// use lastfm_api::{ClientConfig, WireFormat};
///
/// let config = ClientConfig::new("my-api-key")
///     .with_format(WireFormat::Xml)
///     .with_query_cache_capacity(64);
///
/// assert_eq!(config.format, WireFormat::Xml);
/// assert_eq!(config.query_cache_capacity, 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Last.fm API key sent with every request
    pub api_key: String,
    /// Preferred wire format
    pub format: WireFormat,
    /// API endpoint, overridable for testing
    pub base_url: String,
    /// Maximum number of memoized query strings (0 disables the cache)
    pub query_cache_capacity: usize,
    /// Maximum number of memoized parsed responses (0 disables the cache)
    pub parse_cache_capacity: usize,
}

impl ClientConfig {
    /// Create a config with the given API key and default settings
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            format: WireFormat::default(),
            base_url: DEFAULT_BASE_URL.to_string(),
            query_cache_capacity: DEFAULT_QUERY_CACHE_CAPACITY,
            parse_cache_capacity: DEFAULT_PARSE_CACHE_CAPACITY,
        }
    }

    /// Set the preferred wire format
    pub fn with_format(mut self, format: WireFormat) -> Self {
        self.format = format;
        self
    }

    /// Set a custom API endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the query string cache capacity
    pub fn with_query_cache_capacity(mut self, capacity: usize) -> Self {
        self.query_cache_capacity = capacity;
        self
    }

    /// Set the parse cache capacity
    pub fn with_parse_cache_capacity(mut self, capacity: usize) -> Self {
        self.parse_cache_capacity = capacity;
        self
    }

    /// Disable both memoization caches
    pub fn without_caches(self) -> Self {
        self.with_query_cache_capacity(0).with_parse_cache_capacity(0)
    }
}
