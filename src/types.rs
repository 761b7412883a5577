//! Data types for Last.fm music metadata.
//!
//! This module contains the value objects produced by the response mapper:
//! tracks, users and tags, plus the polymorphic [`TrackRef`] accepted by
//! track lookups. All of them are constructed fresh for every parsed response
//! and never mutated afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::template;
use crate::Result;

// ================================================================================================
// TRACK
// ================================================================================================

/// Represents a music track as reported by the Last.fm API.
///
/// `artist` and `title` are always present. Every other field is optional and
/// stays `None` when the response did not report it.
///
/// # Examples
///
/// ```rust
/// use lastfm_api::Track;
///
/// let track = Track::new("Radiohead", "Paranoid Android")
///     .with_album("OK Computer")
///     .with_loved(true);
///
/// assert_eq!(track.to_string(), "Paranoid Android by Radiohead");
/// assert_eq!(track.loved, Some(true));
/// assert!(!track.playing);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Track {
    /// The artist name
    pub artist: String,
    /// The track title
    pub title: String,
    /// The album name (if reported and non-empty)
    pub album: Option<String>,
    /// Tag names attached to the track (only from `track.getInfo`)
    pub tags: Option<Vec<String>>,
    /// Duration in seconds
    pub duration: Option<u32>,
    /// Whether the user loved this track.
    ///
    /// `None` means the response did not report it, which is different from
    /// `Some(false)`.
    pub loved: Option<bool>,
    /// MusicBrainz recording id; an empty id is stored as `None`
    pub mbid: Option<String>,
    /// Whether the track is currently being listened to
    pub playing: bool,
    /// Wiki summary (only from `track.getInfo`)
    pub description: Option<String>,
}

impl Track {
    pub fn new(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
            album: None,
            tags: None,
            duration: None,
            loved: None,
            mbid: None,
            playing: false,
            description: None,
        }
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    pub fn with_duration(mut self, seconds: u32) -> Self {
        self.duration = Some(seconds);
        self
    }

    pub fn with_loved(mut self, loved: bool) -> Self {
        self.loved = Some(loved);
        self
    }

    /// Set the MusicBrainz id. An empty id leaves the field absent.
    pub fn with_mbid(mut self, mbid: impl Into<String>) -> Self {
        let mbid = mbid.into();
        self.mbid = (!mbid.is_empty()).then_some(mbid);
        self
    }

    pub fn with_playing(mut self, playing: bool) -> Self {
        self.playing = playing;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Non-absent fields rendered as strings, keyed by field name.
    pub fn fields(&self) -> BTreeMap<String, String> {
        let mut fields = BTreeMap::new();
        fields.insert("artist".to_string(), self.artist.clone());
        fields.insert("title".to_string(), self.title.clone());
        fields.insert("playing".to_string(), self.playing.to_string());
        if let Some(album) = &self.album {
            fields.insert("album".to_string(), album.clone());
        }
        if let Some(tags) = &self.tags {
            fields.insert("tags".to_string(), tags.join(", "));
        }
        if let Some(duration) = self.duration {
            fields.insert("duration".to_string(), duration.to_string());
        }
        if let Some(loved) = self.loved {
            fields.insert("loved".to_string(), loved.to_string());
        }
        if let Some(mbid) = &self.mbid {
            fields.insert("mbid".to_string(), mbid.clone());
        }
        if let Some(description) = &self.description {
            fields.insert("description".to_string(), description.clone());
        }
        fields
    }

    /// Render `template`, substituting `{name}` placeholders with this track's
    /// fields and the caller's extra properties.
    ///
    /// Absent fields are not available for substitution, so referencing one
    /// is an error rather than printing a placeholder value. Extra properties
    /// override track fields of the same name. `{{` and `}}` produce literal
    /// braces.
    ///
    /// ```rust
    /// use lastfm_api::Track;
    ///
    /// let track = Track::new("Daft Punk", "One More Time").with_playing(true);
    /// let line = track
    ///     .format("{user} is playing {title} by {artist}", &[("user", "alice")])
    ///     .unwrap();
    /// assert_eq!(line, "alice is playing One More Time by Daft Punk");
    ///
    /// // `album` is absent, so it cannot be referenced
    /// assert!(track.format("{album}", &[]).is_err());
    /// ```
    pub fn format(&self, template: &str, extra: &[(&str, &str)]) -> Result<String> {
        let mut context = self.fields();
        for (key, value) in extra {
            context.insert(key.to_string(), value.to_string());
        }
        template::render(template, &context)
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} by {}", self.title, self.artist)
    }
}

/// A reference to a track accepted by `track.getInfo` lookups.
///
/// Converts from a MusicBrainz id string, an `(artist, title)` pair or an
/// existing [`Track`]:
///
/// ```rust
/// use lastfm_api::{Track, TrackRef};
///
/// let by_id = TrackRef::from("0383dadf-2a4e-4d10-a46a-e9e041da8eb3");
/// let by_name = TrackRef::from(("Cher", "Believe"));
/// let by_track = TrackRef::from(Track::new("Cher", "Believe"));
///
/// assert_eq!(by_name.query_params(), by_track.query_params());
/// assert_eq!(
///     by_id.query_params(),
///     vec![("mbid", "0383dadf-2a4e-4d10-a46a-e9e041da8eb3".to_string())]
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackRef {
    Mbid(String),
    ArtistTitle { artist: String, title: String },
    Track(Track),
}

impl TrackRef {
    /// Resolve into the `track.getInfo` parameters identifying the track.
    ///
    /// A [`Track`] with a MusicBrainz id is looked up by id, otherwise by
    /// artist and title.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        match self {
            TrackRef::Mbid(mbid) => vec![("mbid", mbid.clone())],
            TrackRef::ArtistTitle { artist, title } => {
                vec![("artist", artist.clone()), ("track", title.clone())]
            }
            TrackRef::Track(track) => match &track.mbid {
                Some(mbid) => vec![("mbid", mbid.clone())],
                None => vec![
                    ("artist", track.artist.clone()),
                    ("track", track.title.clone()),
                ],
            },
        }
    }
}

impl From<&str> for TrackRef {
    fn from(mbid: &str) -> Self {
        TrackRef::Mbid(mbid.to_string())
    }
}

impl From<String> for TrackRef {
    fn from(mbid: String) -> Self {
        TrackRef::Mbid(mbid)
    }
}

impl<A: Into<String>, T: Into<String>> From<(A, T)> for TrackRef {
    fn from((artist, title): (A, T)) -> Self {
        TrackRef::ArtistTitle {
            artist: artist.into(),
            title: title.into(),
        }
    }
}

impl From<Track> for TrackRef {
    fn from(track: Track) -> Self {
        TrackRef::Track(track)
    }
}

impl From<&Track> for TrackRef {
    fn from(track: &Track) -> Self {
        TrackRef::Track(track.clone())
    }
}

// ================================================================================================
// USER
// ================================================================================================

/// A Last.fm user with their most recent tracks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    /// Most recent first
    pub tracks: Vec<Track>,
    /// Total number of scrobbles
    pub listen_count: Option<u64>,
    /// Registration date
    pub birthday: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(username: impl Into<String>, tracks: Vec<Track>) -> Self {
        Self {
            username: username.into(),
            tracks,
            listen_count: None,
            birthday: None,
        }
    }

    /// Whether the user is listening to something right now.
    pub fn now_listening(&self) -> bool {
        self.tracks.first().is_some_and(|track| track.playing)
    }

    /// The track currently being listened to, if any.
    pub fn current_track(&self) -> Option<&Track> {
        self.tracks.first().filter(|track| track.playing)
    }
}

// ================================================================================================
// TAG
// ================================================================================================

/// A Last.fm tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub url: Option<String>,
    /// Number of distinct users who used the tag
    pub reach: Option<u64>,
    /// Number of times the tag was applied
    pub taggings: Option<u64>,
    pub top_tracks: Option<Vec<Track>>,
    /// Artist names, most popular first
    pub top_artists: Option<Vec<String>>,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: None,
            reach: None,
            taggings: None,
            top_tracks: None,
            top_artists: None,
        }
    }
}

// ================================================================================================
// TESTS
// ================================================================================================
