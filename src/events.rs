//! # Client Events
//!
//! A broadcast channel system for emitting request lifecycle events that
//! consumers can listen to, e.g. to display activity or record timings.

use http_types::Url;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};

/// Query parameters whose values are never exposed in events.
const REDACTED_PARAMS: &[&str] = &["api_key"];

/// Request information for client events
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestInfo {
    /// The API method (e.g. `user.getRecentTracks`), if present in the query
    pub api_method: Option<String>,
    /// The full URI being requested, with secrets redacted
    pub uri: String,
    /// Query parameters as key-value pairs, with secrets redacted
    pub query_params: Vec<(String, String)>,
}

impl RequestInfo {
    /// Create RequestInfo from a request URL
    pub fn from_url(url: &Url) -> Self {
        let query_params: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| {
                let value = if REDACTED_PARAMS.contains(&k.as_ref()) {
                    "REDACTED".to_string()
                } else {
                    v.into_owned()
                };
                (k.into_owned(), value)
            })
            .collect();

        let api_method = query_params
            .iter()
            .find(|(k, _)| k == "method")
            .map(|(_, v)| v.clone());

        let mut redacted = url.clone();
        redacted
            .query_pairs_mut()
            .clear()
            .extend_pairs(query_params.iter());

        Self {
            api_method,
            uri: redacted.to_string(),
            query_params,
        }
    }

    /// Get a short description of the request for logging
    pub fn short_description(&self) -> String {
        match &self.api_method {
            Some(method) => format!("GET {method}"),
            None => format!("GET {}", self.uri),
        }
    }
}

/// Which memoization cache produced a hit
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CacheKind {
    /// Parsed response reused for an identical body
    Response,
}

/// Event type to describe internal HTTP client activity
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ClientEvent {
    /// Request started
    RequestStarted {
        /// Request details
        request: RequestInfo,
    },
    /// Request completed, successfully or with an error status
    RequestCompleted {
        /// Request details
        request: RequestInfo,
        /// HTTP status code
        status_code: u16,
        /// Duration of the request in milliseconds
        duration_ms: u64,
    },
    /// A memoized result was reused
    CacheHit {
        /// The cache that was hit
        cache: CacheKind,
    },
}

/// Type alias for the broadcast receiver
pub type ClientEventReceiver = broadcast::Receiver<ClientEvent>;

/// Type alias for the watch receiver
pub type ClientEventWatcher = watch::Receiver<Option<ClientEvent>>;

/// Shared event broadcasting state that persists across client clones
#[derive(Clone)]
pub struct SharedEventBroadcaster {
    event_tx: broadcast::Sender<ClientEvent>,
    last_event_tx: watch::Sender<Option<ClientEvent>>,
}

impl SharedEventBroadcaster {
    /// Create a new shared event broadcaster
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(100);
        let (last_event_tx, _) = watch::channel(None);

        Self {
            event_tx,
            last_event_tx,
        }
    }

    /// Broadcast an event to all subscribers
    pub fn broadcast_event(&self, event: ClientEvent) {
        let _ = self.event_tx.send(event.clone());
        self.last_event_tx.send_replace(Some(event));
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> ClientEventReceiver {
        self.event_tx.subscribe()
    }

    /// Watch the most recent event
    pub fn watch(&self) -> ClientEventWatcher {
        self.last_event_tx.subscribe()
    }

    /// Get the latest event
    pub fn latest_event(&self) -> Option<ClientEvent> {
        self.last_event_tx.borrow().clone()
    }
}

impl Default for SharedEventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SharedEventBroadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedEventBroadcaster")
            .field("subscribers", &self.event_tx.receiver_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_info_redacts_api_key() {
        let url: Url = "http://ws.audioscrobbler.com/2.0/?method=tag.getInfo&tag=disco&api_key=SECRET&format=json"
            .parse()
            .unwrap();
        let info = RequestInfo::from_url(&url);

        assert_eq!(info.api_method.as_deref(), Some("tag.getInfo"));
        assert!(!info.uri.contains("SECRET"));
        assert!(info
            .query_params
            .contains(&("api_key".to_string(), "REDACTED".to_string())));
        assert!(info
            .query_params
            .contains(&("tag".to_string(), "disco".to_string())));
        assert_eq!(info.short_description(), "GET tag.getInfo");
    }

    #[test]
    fn test_latest_event_without_subscribers() {
        let broadcaster = SharedEventBroadcaster::new();
        assert!(broadcaster.latest_event().is_none());

        broadcaster.broadcast_event(ClientEvent::CacheHit {
            cache: CacheKind::Response,
        });
        assert_eq!(
            broadcaster.latest_event(),
            Some(ClientEvent::CacheHit {
                cache: CacheKind::Response
            })
        );
    }

    #[test]
    fn test_subscribers_receive_events() {
        let broadcaster = SharedEventBroadcaster::new();
        let mut rx = broadcaster.subscribe();
        let shared = broadcaster.clone();

        shared.broadcast_event(ClientEvent::CacheHit {
            cache: CacheKind::Response,
        });
        assert!(matches!(rx.try_recv(), Ok(ClientEvent::CacheHit { .. })));
    }
}
