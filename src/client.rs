use crate::events::{
    CacheKind, ClientEvent, ClientEventReceiver, ClientEventWatcher, RequestInfo,
    SharedEventBroadcaster,
};
use crate::parsing::{self, ResponseParser};
use crate::query::QueryBuilder;
use crate::{ClientConfig, LastFmApi, LastFmError, ParsedResponse, Result, Tag, Track, TrackRef, User};
use async_trait::async_trait;
use http_client::{HttpClient, Request};
use http_types::{Method, Url};
use std::sync::Arc;

/// HTTP-backed client for the Last.fm web-service API.
///
/// The client owns the transport, its configuration, the query and response
/// memoization caches and an event broadcaster. Clones share all of them.
///
/// # Examples
///
/// ```rust,no_run
/// use lastfm_api::{ClientConfig, LastFmApi, LastFmClient, Result};
///
/// #[tokio::main]
/// async fn main() -> Result<()> {
///     let http_client = http_client::native::NativeClient::new();
///     let client = LastFmClient::new(Box::new(http_client), ClientConfig::new("my-api-key"));
///
///     for track in client.get_tracks("rj", Some(10)).await? {
///         println!("{track}");
///     }
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct LastFmClient {
    client: Arc<dyn HttpClient + Send + Sync>,
    config: Arc<ClientConfig>,
    query: Arc<QueryBuilder>,
    parser: Arc<ResponseParser>,
    broadcaster: Arc<SharedEventBroadcaster>,
}

impl LastFmClient {
    pub fn new(client: Box<dyn HttpClient + Send + Sync>, config: ClientConfig) -> Self {
        Self {
            client: Arc::from(client),
            query: Arc::new(QueryBuilder::new(&config)),
            parser: Arc::new(ResponseParser::new(config.parse_cache_capacity)),
            config: Arc::new(config),
            broadcaster: Arc::new(SharedEventBroadcaster::new()),
        }
    }

    /// Create a client with its own transport and configuration that publishes
    /// events to the same subscribers as `self`.
    pub fn with_shared_broadcaster(
        &self,
        client: Box<dyn HttpClient + Send + Sync>,
        config: ClientConfig,
    ) -> Self {
        let mut other = Self::new(client, config);
        other.broadcaster = self.broadcaster.clone();
        other
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn subscribe(&self) -> ClientEventReceiver {
        self.broadcaster.subscribe()
    }

    pub fn latest_event(&self) -> Option<ClientEvent> {
        self.broadcaster.latest_event()
    }

    /// Watch the most recent event; the receiver only ever holds the latest.
    pub fn watch_events(&self) -> ClientEventWatcher {
        self.broadcaster.watch()
    }

    /// Drop every memoized query string and parsed response.
    ///
    /// Clones share the caches, so this affects all of them.
    pub fn clear_caches(&self) {
        self.query.clear();
        self.parser.clear();
        log::debug!("Cleared query and response caches");
    }

    /// Build the request URL for a method without sending it.
    pub fn build_url(&self, method: &str, params: &[(&str, &str)]) -> Result<String> {
        self.query.build(method, params)
    }

    /// Perform the GET request and return the body of a successful response.
    async fn fetch(&self, url: &str) -> Result<String> {
        let url: Url = url
            .parse()
            .map_err(|e| LastFmError::InvalidArgument(format!("invalid request URL: {e}")))?;

        let request_info = RequestInfo::from_url(&url);
        let request_start = std::time::Instant::now();
        log::debug!("Sending {}", request_info.short_description());

        self.broadcaster.broadcast_event(ClientEvent::RequestStarted {
            request: request_info.clone(),
        });

        let request = Request::new(Method::Get, url);
        let mut response = self
            .client
            .send(request)
            .await
            .map_err(transport_failure)?;

        let status = response.status();
        let duration_ms = u64::try_from(request_start.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.broadcaster.broadcast_event(ClientEvent::RequestCompleted {
            request: request_info,
            status_code: status.into(),
            duration_ms,
        });
        log::debug!("Response status: {status} after {duration_ms}ms");

        if !status.is_success() {
            let body = match response.body_string().await {
                Ok(body) => body,
                Err(e) => format!("<Server error: {e}>"),
            };
            log::debug!("Request failed with status {status}");
            return Err(LastFmError::Transport {
                status: status.into(),
                body,
            });
        }

        response.body_string().await.map_err(transport_failure)
    }

    async fn request(&self, method: &str, params: &[(&str, &str)]) -> Result<Arc<ParsedResponse>> {
        let url = self.query.build(method, params)?;
        let body = self.fetch(&url).await?;

        let (parsed, cache_hit) = self.parser.parse(&body, self.config.format.into())?;
        if cache_hit {
            log::trace!("Reusing parsed response for {method}");
            self.broadcaster.broadcast_event(ClientEvent::CacheHit {
                cache: CacheKind::Response,
            });
        }
        if parsed.format() != self.config.format {
            log::debug!(
                "{method} answered in {} although {} was requested",
                parsed.format(),
                self.config.format
            );
        }

        parsing::check_api_error(&parsed)?;
        Ok(parsed)
    }
}

/// Failures before a status line arrives (connect, timeout, cancellation) or
/// while reading the body take the same path as a non-success status.
fn transport_failure(error: http_client::Error) -> LastFmError {
    LastFmError::Transport {
        status: error.status().into(),
        body: error.to_string(),
    }
}

fn require_non_empty(value: &str, what: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(LastFmError::InvalidArgument(format!(
            "{what} cannot be empty"
        )));
    }
    Ok(())
}

fn limited<'a>(mut params: Vec<(&'a str, &'a str)>, limit: &'a Option<String>) -> Vec<(&'a str, &'a str)> {
    if let Some(limit) = limit {
        params.push(("limit", limit.as_str()));
    }
    params
}

fn track_info_params(track: &TrackRef, username: Option<&str>) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = Vec::new();
    if let Some(username) = username.filter(|u| !u.is_empty()) {
        params.push(("username".to_string(), username.to_string()));
    }
    params.extend(
        track
            .query_params()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v)),
    );
    params
}

#[async_trait(?Send)]
impl LastFmApi for LastFmClient {
    async fn call_api(
        &self,
        method: &str,
        params: Vec<(String, String)>,
    ) -> Result<ParsedResponse> {
        let params: Vec<(&str, &str)> = params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        let parsed = self.request(method, &params).await?;
        Ok(parsed.as_ref().clone())
    }

    async fn get_tracks(&self, user: &str, limit: Option<u32>) -> Result<Vec<Track>> {
        require_non_empty(user, "user")?;

        let limit = limit.map(|l| l.to_string());
        let params = limited(vec![("user", user), ("extended", "1")], &limit);
        let parsed = self.request("user.getRecentTracks", &params).await?;
        parsing::extract_tracks(&parsed)
    }

    async fn get_track_info(
        &self,
        track: TrackRef,
        username: Option<String>,
    ) -> Result<ParsedResponse> {
        let params = track_info_params(&track, username.as_deref());
        self.call_api("track.getInfo", params).await
    }

    async fn get_track(&self, track: TrackRef, username: Option<String>) -> Result<Track> {
        let params = track_info_params(&track, username.as_deref());
        let params: Vec<(&str, &str)> = params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        let parsed = self.request("track.getInfo", &params).await?;
        parsing::extract_track_info(&parsed)
    }

    async fn get_user_info(&self, user: &str) -> Result<User> {
        require_non_empty(user, "user")?;

        let parsed = self.request("user.getInfo", &[("user", user)]).await?;
        parsing::extract_user_info(&parsed)
    }

    async fn get_tag_info(&self, tag: &str) -> Result<Tag> {
        require_non_empty(tag, "tag")?;

        let parsed = self.request("tag.getInfo", &[("tag", tag)]).await?;
        parsing::extract_tag_info(&parsed)
    }

    async fn get_tag_top_tracks(&self, tag: &str, limit: Option<u32>) -> Result<Vec<Track>> {
        require_non_empty(tag, "tag")?;

        let limit = limit.map(|l| l.to_string());
        let params = limited(vec![("tag", tag)], &limit);
        let parsed = self.request("tag.getTopTracks", &params).await?;
        parsing::extract_top_tracks(&parsed)
    }

    async fn get_tag_top_artists(&self, tag: &str, limit: Option<u32>) -> Result<Vec<String>> {
        require_non_empty(tag, "tag")?;

        let limit = limit.map(|l| l.to_string());
        let params = limited(vec![("tag", tag)], &limit);
        let parsed = self.request("tag.getTopArtists", &params).await?;
        parsing::extract_top_artists(&parsed)
    }
}

impl std::fmt::Debug for LastFmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LastFmClient")
            .field("format", &self.config.format)
            .field("base_url", &self.config.base_url)
            .finish()
    }
}
