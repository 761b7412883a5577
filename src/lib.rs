//! # lastfm-api
//!
//! A client for the Last.fm web-service API. Requests are plain HTTP GETs
//! against `ws.audioscrobbler.com`; responses are parsed as JSON or XML and
//! mapped into [`Track`], [`User`] and [`Tag`] values.
//!
//! ```rust,no_run
//! use lastfm_api::{ClientConfig, LastFmApi, LastFmClient, WireFormat};
//!
//! # tokio_test::block_on(async {
//! let client = LastFmClient::new(
//!     Box::new(http_client::native::NativeClient::new()),
//!     ClientConfig::new("my-api-key").with_format(WireFormat::Xml),
//! );
//!
//! let user = client.get_user("rj", Some(1)).await?;
//! if let Some(track) = user.current_track() {
//!     println!("{} is listening to {track}", user.username);
//! }
//! # Ok::<(), lastfm_api::LastFmError>(())
//! # });
//! ```

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod parsing;
pub mod query;
pub mod template;
pub mod types;
pub mod xml;

#[cfg(feature = "mock")]
pub use api::MockLastFmApi;
pub use api::LastFmApi;
pub use client::LastFmClient;
pub use config::{ClientConfig, FormatHint, WireFormat, DEFAULT_BASE_URL};
pub use error::LastFmError;
pub use events::{CacheKind, ClientEvent, ClientEventReceiver, ClientEventWatcher, RequestInfo};
pub use parsing::{parse_response, ParsedResponse};
pub use query::QueryBuilder;
pub use types::{Tag, Track, TrackRef, User};
pub use xml::{XmlElement, XmlNode};

pub type Result<T> = std::result::Result<T, LastFmError>;
