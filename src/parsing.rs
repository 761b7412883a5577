//! Response parsing and entity extraction for Last.fm API payloads.
//!
//! Last.fm encodes the same logical schema inconsistently across its two wire
//! formats: JSON nests text under `#text` (or `name` in extended responses)
//! and returns a bare object instead of an array for single-item lists, while
//! XML carries some fields as attributes. Parsing produces a [`ParsedResponse`]
//! tagged with the format that actually parsed; extraction then dispatches on
//! that tag. These functions are pure: the same body always yields the same
//! result.

use chrono::{DateTime, Utc};
use serde::de::IgnoredAny;
use serde::Deserialize;
use serde_json::{Map, Number, Value};
use std::sync::Arc;

use crate::cache::BoundedCache;
use crate::xml::XmlElement;
use crate::{FormatHint, LastFmError, Result, Tag, Track, User, WireFormat};

/// A parsed response body in whichever format it was written in.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedResponse {
    Json(Value),
    Xml(XmlElement),
}

impl ParsedResponse {
    pub fn format(&self) -> WireFormat {
        match self {
            ParsedResponse::Json(_) => WireFormat::Json,
            ParsedResponse::Xml(_) => WireFormat::Xml,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ParsedResponse::Json(value) => Some(value),
            ParsedResponse::Xml(_) => None,
        }
    }

    pub fn as_xml(&self) -> Option<&XmlElement> {
        match self {
            ParsedResponse::Xml(root) => Some(root),
            ParsedResponse::Json(_) => None,
        }
    }
}

/// Parse a response body according to `hint`.
///
/// `Json` falls back to XML when the body is not JSON, `Auto` tries JSON then
/// XML, and `Xml` only accepts XML. When every attempted format fails the
/// error lists each failure.
pub fn parse_response(body: &str, hint: FormatHint) -> Result<ParsedResponse> {
    match hint {
        FormatHint::Xml => parse_xml(body).map_err(|e| LastFmError::Parse(format!("invalid XML: {e}"))),
        FormatHint::Json | FormatHint::Auto => match serde_json::from_str::<Value>(body) {
            Ok(value) => Ok(ParsedResponse::Json(value)),
            Err(json_err) => {
                log::debug!("Response is not JSON ({json_err}), trying XML");
                parse_xml(body).map_err(|xml_err| {
                    LastFmError::Parse(format!(
                        "response is neither JSON ({json_err}) nor XML ({xml_err})"
                    ))
                })
            }
        },
    }
}

fn parse_xml(body: &str) -> std::result::Result<ParsedResponse, String> {
    XmlElement::parse(body).map(ParsedResponse::Xml)
}

/// Memoizing wrapper around [`parse_response`].
///
/// Only successful parses are cached, so a failed body never shadows a later
/// successful one.
#[derive(Debug)]
pub struct ResponseParser {
    cache: BoundedCache<(String, FormatHint), ParsedResponse>,
}

impl ResponseParser {
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: BoundedCache::new(capacity),
        }
    }

    /// Parse `body`, returning the cached tree and whether it was a cache hit.
    pub fn parse(&self, body: &str, hint: FormatHint) -> Result<(Arc<ParsedResponse>, bool)> {
        let key = (body.to_string(), hint);
        if let Some(parsed) = self.cache.get(&key) {
            return Ok((parsed, true));
        }

        let parsed = parse_response(body, hint)?;
        Ok((self.cache.insert(key, parsed), false))
    }

    pub fn clear(&self) {
        self.cache.clear();
    }
}

// ================================================================================================
// API ERROR DOCUMENTS
// ================================================================================================

/// Detect a Last.fm error document.
///
/// JSON errors look like `{"error": 6, "message": "..."}`; XML errors like
/// `<lfm status="failed"><error code="6">...</error></lfm>`.
pub fn check_api_error(parsed: &ParsedResponse) -> Result<()> {
    match parsed {
        ParsedResponse::Json(value) => {
            let Some(code) = value.get("error").and_then(json_u64) else {
                return Ok(());
            };
            let message = value
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            Err(LastFmError::Api {
                code: u32::try_from(code).unwrap_or_default(),
                message,
            })
        }
        ParsedResponse::Xml(root) => {
            if root.name != "lfm" || root.attribute("status") != Some("failed") {
                return Ok(());
            }
            let error = root.child("error");
            let code = error
                .and_then(|e| e.attribute("code"))
                .and_then(|c| c.trim().parse::<u32>().ok())
                .unwrap_or_default();
            let message = error
                .map(|e| e.text().trim().to_string())
                .unwrap_or_default();
            Err(LastFmError::Api { code, message })
        }
    }
}

// ================================================================================================
// TRACK LISTS
// ================================================================================================

/// Extract the tracks of a `user.getRecentTracks` response.
pub fn extract_tracks(parsed: &ParsedResponse) -> Result<Vec<Track>> {
    extract_track_list(parsed, &["recenttracks", "track"], "recenttracks")
}

/// Extract the tracks of a `tag.getTopTracks` response.
pub fn extract_top_tracks(parsed: &ParsedResponse) -> Result<Vec<Track>> {
    extract_track_list(parsed, &["tracks", "track"], "tracks")
}

/// Extract a track list found at `json_path` (JSON) or as the `<track>`
/// elements under `xml_container` (XML).
///
/// A document without the container is a parse error in both formats; a
/// container without tracks is an empty list.
pub fn extract_track_list(
    parsed: &ParsedResponse,
    json_path: &[&str],
    xml_container: &str,
) -> Result<Vec<Track>> {
    match parsed {
        ParsedResponse::Json(value) => {
            let list = json_path_get(value, json_path)?;
            let tracks = as_list(list)
                .into_iter()
                .map(track_from_json)
                .collect::<Result<Vec<_>>>()?;
            log::debug!("Extracted {} tracks from JSON", tracks.len());
            Ok(tracks)
        }
        ParsedResponse::Xml(root) => {
            let tracks = find_xml(root, xml_container)?
                .descendants("track")
                .into_iter()
                .map(track_from_xml)
                .collect::<Result<Vec<_>>>()?;
            log::debug!("Extracted {} tracks from XML", tracks.len());
            Ok(tracks)
        }
    }
}

/// Build a [`Track`] from one JSON list item.
pub fn track_from_json(item: &Value) -> Result<Track> {
    let entry = ApiTrack::deserialize(item)
        .map_err(|e| LastFmError::Validation(format!("malformed track entry: {e}")))?;

    let artist = entry
        .artist
        .and_then(ApiText::into_text)
        .ok_or_else(|| missing_field("artist"))?;
    let title = entry
        .name
        .and_then(ApiText::into_text)
        .ok_or_else(|| missing_field("name"))?;

    let mut track = Track::new(artist, title);
    track.album = entry
        .album
        .and_then(ApiText::into_text)
        .filter(|album| !album.is_empty());
    track.playing = entry.attr.is_some_and(|attr| attr.nowplaying.is_some());
    track.mbid = entry.mbid.filter(|mbid| !mbid.is_empty());
    track.loved = entry.loved.as_ref().map(json_flag);
    track.duration = entry
        .duration
        .and_then(ApiCount::into_count)
        .filter(|secs| *secs > 0)
        .and_then(|secs| u32::try_from(secs).ok());

    Ok(track)
}

/// Build a [`Track`] from one `<track>` element.
pub fn track_from_xml(element: &XmlElement) -> Result<Track> {
    let artist = element
        .child("artist")
        .map(xml_name_or_text)
        .ok_or_else(|| missing_field("artist"))?;
    let title = element
        .child_text("name")
        .ok_or_else(|| missing_field("name"))?;

    let mut track = Track::new(artist, title);
    track.album = element
        .child("album")
        .map(|album| album.child_text("title").unwrap_or_else(|| album.text()))
        .filter(|album| !album.is_empty());
    track.playing = element.has_attribute("nowplaying");
    track.mbid = element.child_text("mbid").filter(|mbid| !mbid.is_empty());
    track.loved = element.child_text("loved").map(|loved| loved == "1");
    track.duration = element
        .child_text("duration")
        .and_then(|d| d.trim().parse::<u32>().ok())
        .filter(|secs| *secs > 0);

    Ok(track)
}

// ================================================================================================
// JSON WIRE TYPES
// ================================================================================================

/// One entry of a JSON track list.
#[derive(Debug, Deserialize)]
struct ApiTrack {
    artist: Option<ApiText>,
    name: Option<ApiText>,
    album: Option<ApiText>,
    mbid: Option<String>,
    loved: Option<Value>,
    duration: Option<ApiCount>,
    #[serde(rename = "@attr")]
    attr: Option<ApiTrackAttr>,
}

#[derive(Debug, Deserialize)]
struct ApiTrackAttr {
    nowplaying: Option<Value>,
}

/// A text field in any of the shapes Last.fm uses: a plain string, an object
/// with the text under `#text`, or an extended object naming it `name` or
/// `title`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiText {
    Plain(String),
    Number(Number),
    Hash {
        #[serde(rename = "#text")]
        text: String,
    },
    Named {
        name: String,
    },
    Titled {
        title: String,
    },
    Other(IgnoredAny),
}

impl ApiText {
    fn into_text(self) -> Option<String> {
        match self {
            ApiText::Plain(text)
            | ApiText::Hash { text }
            | ApiText::Named { name: text }
            | ApiText::Titled { title: text } => Some(text),
            ApiText::Number(n) => Some(n.to_string()),
            ApiText::Other(_) => None,
        }
    }
}

/// A count sent either as a number or as a numeric string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiCount {
    Number(u64),
    Text(String),
    Other(IgnoredAny),
}

impl ApiCount {
    fn into_count(self) -> Option<u64> {
        match self {
            ApiCount::Number(n) => Some(n),
            ApiCount::Text(s) => s.trim().parse().ok(),
            ApiCount::Other(_) => None,
        }
    }
}

// ================================================================================================
// TRACK INFO
// ================================================================================================

/// Extract the [`Track`] described by a `track.getInfo` response.
///
/// Unlike list entries, the duration here is reported in milliseconds and the
/// loved flag is called `userloved`.
pub fn extract_track_info(parsed: &ParsedResponse) -> Result<Track> {
    match parsed {
        ParsedResponse::Json(value) => {
            let obj = json_path_get(value, &["track"])?
                .as_object()
                .ok_or_else(|| LastFmError::Parse("`track` is not an object".to_string()))?;

            let artist = obj
                .get("artist")
                .and_then(|v| json_text(v, &["name", "#text"]))
                .ok_or_else(|| missing_field("artist"))?;
            let title = obj
                .get("name")
                .and_then(json_scalar)
                .ok_or_else(|| missing_field("name"))?;

            let mut track = Track::new(artist, title);
            track.album = obj
                .get("album")
                .and_then(|v| json_text(v, &["title", "#text"]))
                .filter(|album| !album.is_empty());
            track.duration = obj.get("duration").and_then(json_u64).and_then(millis_to_secs);
            track.mbid = non_empty_str(obj, "mbid");
            track.loved = obj.get("userloved").map(json_flag);
            track.tags = obj.get("toptags").and_then(|t| t.get("tag")).map(|tags| {
                as_list(tags)
                    .into_iter()
                    .filter_map(|tag| tag.get("name").and_then(json_scalar))
                    .collect()
            });
            track.description = obj
                .get("wiki")
                .and_then(|w| w.get("summary"))
                .and_then(json_scalar)
                .filter(|s| !s.is_empty());
            Ok(track)
        }
        ParsedResponse::Xml(root) => {
            let element = find_xml(root, "track")?;

            let artist = element
                .child("artist")
                .map(xml_name_or_text)
                .ok_or_else(|| missing_field("artist"))?;
            let title = element
                .child_text("name")
                .ok_or_else(|| missing_field("name"))?;

            let mut track = Track::new(artist, title);
            track.album = element
                .child("album")
                .map(|album| album.child_text("title").unwrap_or_else(|| album.text()))
                .filter(|album| !album.is_empty());
            track.duration = element
                .child_text("duration")
                .and_then(|d| d.trim().parse::<u64>().ok())
                .and_then(millis_to_secs);
            track.mbid = element.child_text("mbid").filter(|mbid| !mbid.is_empty());
            track.loved = element.child_text("userloved").map(|loved| loved == "1");
            track.tags = element.child("toptags").map(|toptags| {
                toptags
                    .children_named("tag")
                    .filter_map(|tag| tag.child_text("name"))
                    .collect()
            });
            track.description = element
                .child("wiki")
                .and_then(|wiki| wiki.child_text("summary"))
                .filter(|s| !s.is_empty());
            Ok(track)
        }
    }
}

// ================================================================================================
// USERS AND TAGS
// ================================================================================================

/// Extract the [`User`] described by a `user.getInfo` response. The returned
/// user has no tracks.
pub fn extract_user_info(parsed: &ParsedResponse) -> Result<User> {
    match parsed {
        ParsedResponse::Json(value) => {
            let user = json_path_get(value, &["user"])?;
            let username = user
                .get("name")
                .and_then(json_scalar)
                .ok_or_else(|| missing_field("name"))?;

            let mut result = User::new(username, Vec::new());
            result.listen_count = user.get("playcount").and_then(json_u64);
            result.birthday = user
                .get("registered")
                .and_then(|r| r.get("unixtime").or_else(|| r.get("#text")))
                .and_then(json_u64)
                .and_then(timestamp);
            Ok(result)
        }
        ParsedResponse::Xml(root) => {
            let user = find_xml(root, "user")?;
            let username = user
                .child_text("name")
                .ok_or_else(|| missing_field("name"))?;

            let mut result = User::new(username, Vec::new());
            result.listen_count = user
                .child_text("playcount")
                .and_then(|p| p.trim().parse().ok());
            result.birthday = user
                .child("registered")
                .and_then(|r| r.attribute("unixtime"))
                .and_then(|t| t.trim().parse().ok())
                .and_then(timestamp);
            Ok(result)
        }
    }
}

/// Extract the [`Tag`] described by a `tag.getInfo` response. Top tracks and
/// artists are left unset.
pub fn extract_tag_info(parsed: &ParsedResponse) -> Result<Tag> {
    match parsed {
        ParsedResponse::Json(value) => {
            let tag = json_path_get(value, &["tag"])?;
            let name = tag
                .get("name")
                .and_then(json_scalar)
                .ok_or_else(|| missing_field("name"))?;

            let mut result = Tag::new(name);
            result.url = tag
                .get("url")
                .and_then(json_scalar)
                .filter(|u| !u.is_empty());
            result.reach = tag.get("reach").and_then(json_u64);
            result.taggings = tag
                .get("taggings")
                .or_else(|| tag.get("total"))
                .and_then(json_u64);
            Ok(result)
        }
        ParsedResponse::Xml(root) => {
            let tag = find_xml(root, "tag")?;
            let name = tag.child_text("name").ok_or_else(|| missing_field("name"))?;

            let mut result = Tag::new(name);
            result.url = tag.child_text("url").filter(|u| !u.is_empty());
            result.reach = tag.child_text("reach").and_then(|r| r.trim().parse().ok());
            result.taggings = tag
                .child_text("taggings")
                .or_else(|| tag.child_text("total"))
                .and_then(|t| t.trim().parse().ok());
            Ok(result)
        }
    }
}

/// Extract artist names from a `tag.getTopArtists` response.
pub fn extract_top_artists(parsed: &ParsedResponse) -> Result<Vec<String>> {
    match parsed {
        ParsedResponse::Json(value) => {
            let list = json_path_get(value, &["topartists", "artist"])?;
            as_list(list)
                .into_iter()
                .map(|artist| {
                    json_text(artist, &["name", "#text"]).ok_or_else(|| missing_field("name"))
                })
                .collect()
        }
        ParsedResponse::Xml(root) => find_xml(root, "topartists")?
            .children_named("artist")
            .map(|artist| artist.child_text("name").ok_or_else(|| missing_field("name")))
            .collect(),
    }
}

// ================================================================================================
// HELPERS
// ================================================================================================

fn missing_field(field: &str) -> LastFmError {
    LastFmError::Validation(format!("missing required field `{field}`"))
}

/// Walk nested object keys, failing with a parse error naming the first
/// missing key.
fn json_path_get<'a>(value: &'a Value, path: &[&str]) -> Result<&'a Value> {
    let mut current = value;
    for (depth, key) in path.iter().enumerate() {
        current = current.get(*key).ok_or_else(|| {
            LastFmError::Parse(format!(
                "unexpected response shape: missing `{}`",
                path[..=depth].join(".")
            ))
        })?;
    }
    Ok(current)
}

/// Last.fm returns a bare object instead of an array when a list has exactly
/// one item.
fn as_list(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

/// String form of a scalar; objects, arrays and null yield `None`.
fn json_scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// A text field that is either a plain scalar or an object carrying the text
/// under one of `keys`.
fn json_text(value: &Value, keys: &[&str]) -> Option<String> {
    match value {
        Value::Object(obj) => keys.iter().find_map(|k| obj.get(*k).and_then(json_scalar)),
        other => json_scalar(other),
    }
}

fn json_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Only the literal string `"1"` means true.
fn json_flag(value: &Value) -> bool {
    value.as_str() == Some("1")
}

fn non_empty_str(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn xml_name_or_text(element: &XmlElement) -> String {
    element.child_text("name").unwrap_or_else(|| element.text())
}

/// `root` itself or its first descendant with the given name.
fn find_xml<'a>(root: &'a XmlElement, name: &str) -> Result<&'a XmlElement> {
    if root.name == name {
        return Ok(root);
    }
    root.descendants(name)
        .into_iter()
        .next()
        .ok_or_else(|| LastFmError::Parse(format!("unexpected response shape: no <{name}> element")))
}

fn millis_to_secs(millis: u64) -> Option<u32> {
    let secs = millis / 1000;
    u32::try_from(secs).ok().filter(|secs| *secs > 0)
}

fn timestamp(secs: u64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(i64::try_from(secs).ok()?, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn json(body: &str) -> ParsedResponse {
        parse_response(body, FormatHint::Json).unwrap()
    }

    fn xml(body: &str) -> ParsedResponse {
        parse_response(body, FormatHint::Xml).unwrap()
    }

    #[test]
    fn test_parse_json_falls_back_to_xml() {
        let parsed = parse_response("<lfm status=\"ok\"/>", FormatHint::Json).unwrap();
        assert_eq!(parsed.format(), WireFormat::Xml);

        let parsed = parse_response("{}", FormatHint::Auto).unwrap();
        assert_eq!(parsed.format(), WireFormat::Json);
    }

    #[test]
    fn test_parse_xml_hint_is_strict() {
        assert!(matches!(
            parse_response("{\"a\": 1}", FormatHint::Xml),
            Err(LastFmError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_neither_format() {
        let err = parse_response("Internal error", FormatHint::Auto).unwrap_err();
        match err {
            LastFmError::Parse(msg) => {
                assert!(msg.contains("JSON"));
                assert!(msg.contains("XML"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_response_parser_caches_successes_only() {
        let parser = ResponseParser::new(4);

        let (first, hit) = parser.parse("{\"a\": 1}", FormatHint::Json).unwrap();
        assert!(!hit);
        let (second, hit) = parser.parse("{\"a\": 1}", FormatHint::Json).unwrap();
        assert!(hit);
        assert!(Arc::ptr_eq(&first, &second));

        assert!(parser.parse("garbage", FormatHint::Json).is_err());
        assert!(parser.parse("garbage", FormatHint::Json).is_err());
        assert_eq!(parser.cache.len(), 1);
    }

    #[test]
    fn test_json_artist_shapes_are_equivalent() {
        let nested = json(r##"{"recenttracks":{"track":[{"artist":{"#text":"Cher"},"name":"Believe"}]}}"##);
        let plain = json(r##"{"recenttracks":{"track":[{"artist":"Cher","name":"Believe"}]}}"##);
        let extended = json(r##"{"recenttracks":{"track":[{"artist":{"name":"Cher","url":"x"},"name":"Believe"}]}}"##);

        let nested = extract_tracks(&nested).unwrap();
        assert_eq!(nested[0].artist, "Cher");
        assert_eq!(extract_tracks(&plain).unwrap(), nested);
        assert_eq!(extract_tracks(&extended).unwrap(), nested);
    }

    #[test]
    fn test_json_bare_object_is_one_element_list() {
        let bare = json(r##"{"recenttracks":{"track":{"artist":"A","name":"T","album":{"#text":"B"}}}}"##);
        let list = json(r##"{"recenttracks":{"track":[{"artist":"A","name":"T","album":{"#text":"B"}}]}}"##);

        let tracks = extract_tracks(&bare).unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks, extract_tracks(&list).unwrap());
        assert_eq!(tracks[0].album.as_deref(), Some("B"));
    }

    #[test]
    fn test_json_optional_fields() {
        let parsed = json(
            r##"{"recenttracks":{"track":[
                {"artist":"A","name":"loved","mbid":"abc","loved":"1"},
                {"artist":"A","name":"not loved","mbid":"","loved":"0"},
                {"artist":"A","name":"unknown","album":{"#text":""}},
                {"artist":"A","name":"numeric","loved":1}
            ]}}"##,
        );
        let tracks = extract_tracks(&parsed).unwrap();

        assert_eq!(tracks[0].loved, Some(true));
        assert_eq!(tracks[0].mbid.as_deref(), Some("abc"));
        assert_eq!(tracks[1].loved, Some(false));
        assert_eq!(tracks[1].mbid, None);
        assert_eq!(tracks[2].loved, None);
        assert_eq!(tracks[2].album, None);
        assert_eq!(tracks[3].loved, Some(false));
        assert!(tracks.iter().all(|t| !t.playing));
    }

    #[test]
    fn test_json_missing_required_fields() {
        let no_artist = json(r##"{"recenttracks":{"track":[{"name":"T"}]}}"##);
        assert!(matches!(
            extract_tracks(&no_artist),
            Err(LastFmError::Validation(msg)) if msg.contains("artist")
        ));

        let no_title = json(r##"{"recenttracks":{"track":{"artist":"A"}}}"##);
        assert!(matches!(
            extract_tracks(&no_title),
            Err(LastFmError::Validation(msg)) if msg.contains("name")
        ));
    }

    #[test]
    fn test_json_missing_list_path() {
        let parsed = json(r##"{"recenttracks":{}}"##);
        assert!(matches!(
            extract_tracks(&parsed),
            Err(LastFmError::Parse(msg)) if msg.contains("recenttracks.track")
        ));
    }

    #[test]
    fn test_xml_tracks() {
        let parsed = xml(
            r#"<lfm status="ok">
                <recenttracks user="rj">
                    <track nowplaying="true">
                        <artist mbid="">Daft Punk</artist>
                        <name>One More Time</name>
                        <album mbid=""></album>
                        <mbid></mbid>
                    </track>
                    <track>
                        <artist><name>Cher</name><url>x</url></artist>
                        <name>Believe</name>
                        <album>Believe</album>
                        <mbid>abc</mbid>
                        <loved>0</loved>
                    </track>
                </recenttracks>
            </lfm>"#,
        );
        let tracks = extract_tracks(&parsed).unwrap();
        assert_eq!(tracks.len(), 2);

        assert_eq!(tracks[0].artist, "Daft Punk");
        assert_eq!(tracks[0].title, "One More Time");
        assert!(tracks[0].playing);
        assert_eq!(tracks[0].album, None);
        assert_eq!(tracks[0].mbid, None);
        assert_eq!(tracks[0].loved, None);

        assert_eq!(tracks[1].artist, "Cher");
        assert_eq!(tracks[1].album.as_deref(), Some("Believe"));
        assert_eq!(tracks[1].mbid.as_deref(), Some("abc"));
        assert_eq!(tracks[1].loved, Some(false));
        assert!(!tracks[1].playing);
    }

    #[test]
    fn test_wrong_document_shape_is_parse_error_in_both_formats() {
        let from_json = json(r#"{"user":{"name":"alice"}}"#);
        assert!(matches!(
            extract_tracks(&from_json),
            Err(LastFmError::Parse(msg)) if msg.contains("recenttracks")
        ));

        let from_xml = xml(r#"<lfm status="ok"><user><name>alice</name></user></lfm>"#);
        assert!(matches!(
            extract_tracks(&from_xml),
            Err(LastFmError::Parse(msg)) if msg.contains("<recenttracks>")
        ));
        assert!(matches!(
            extract_top_tracks(&from_xml),
            Err(LastFmError::Parse(msg)) if msg.contains("<tracks>")
        ));
        assert!(matches!(
            extract_top_artists(&from_xml),
            Err(LastFmError::Parse(msg)) if msg.contains("<topartists>")
        ));
    }

    #[test]
    fn test_xml_tracks_outside_container_are_ignored() {
        let parsed = xml(
            r#"<lfm status="ok">
                <track><artist>Stray</artist><name>Elsewhere</name></track>
                <recenttracks user="rj">
                    <track><artist>Chic</artist><name>Le Freak</name></track>
                </recenttracks>
            </lfm>"#,
        );
        let tracks = extract_tracks(&parsed).unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].artist, "Chic");

        let empty = xml(r#"<lfm status="ok"><recenttracks user="rj" total="0"/></lfm>"#);
        assert!(extract_tracks(&empty).unwrap().is_empty());
    }

    #[test]
    fn test_out_of_range_numbers_are_dropped() {
        let parsed = json(
            r##"{"recenttracks":{"track":[
                {"artist":"A","name":"huge","duration":"99999999999"},
                {"artist":"A","name":"negative","duration":-5},
                {"artist":"A","name":"fine","duration":300}
            ]}}"##,
        );
        let tracks = extract_tracks(&parsed).unwrap();
        assert_eq!(tracks[0].duration, None);
        assert_eq!(tracks[1].duration, None);
        assert_eq!(tracks[2].duration, Some(300));

        assert_eq!(millis_to_secs(u64::MAX), None);
        assert_eq!(millis_to_secs(999), None);
        assert_eq!(millis_to_secs(1500), Some(1));
        assert_eq!(timestamp(u64::MAX), None);

        let parsed = json(r#"{"error": 99999999999, "message": "odd"}"#);
        assert!(matches!(
            check_api_error(&parsed),
            Err(LastFmError::Api { code: 0, .. })
        ));
    }

    #[test]
    fn test_json_text_shapes() {
        let parsed = json(
            r##"{"recenttracks":{"track":[
                {"artist":{"#text":"Prince","mbid":""},"name":1999,"album":{"title":"1999"}},
                {"artist":{"name":"Prince"},"name":"Purple Rain","album":["odd"]}
            ]}}"##,
        );
        let tracks = extract_tracks(&parsed).unwrap();
        assert_eq!(tracks[0].artist, "Prince");
        assert_eq!(tracks[0].title, "1999");
        assert_eq!(tracks[0].album.as_deref(), Some("1999"));
        assert_eq!(tracks[1].artist, "Prince");
        assert_eq!(tracks[1].album, None);

        let no_artist = json(r##"{"recenttracks":{"track":[{"artist":[1],"name":"T"}]}}"##);
        assert!(matches!(
            extract_tracks(&no_artist),
            Err(LastFmError::Validation(msg)) if msg.contains("artist")
        ));

        let not_object = json(r##"{"recenttracks":{"track":["just a string"]}}"##);
        assert!(matches!(
            extract_tracks(&not_object),
            Err(LastFmError::Validation(msg)) if msg.contains("malformed track entry")
        ));
    }

    #[test]
    fn test_xml_missing_artist() {
        let parsed = xml("<lfm><recenttracks><track><name>T</name></track></recenttracks></lfm>");
        assert!(matches!(
            extract_tracks(&parsed),
            Err(LastFmError::Validation(_))
        ));
    }

    #[test]
    fn test_api_error_documents() {
        let parsed = json(r#"{"error": 6, "message": "User not found"}"#);
        assert!(matches!(
            check_api_error(&parsed),
            Err(LastFmError::Api { code: 6, message }) if message == "User not found"
        ));

        let parsed = xml(r#"<lfm status="failed"><error code="10">Invalid API key</error></lfm>"#);
        assert!(matches!(
            check_api_error(&parsed),
            Err(LastFmError::Api { code: 10, message }) if message == "Invalid API key"
        ));

        assert!(check_api_error(&json(r#"{"recenttracks": {}}"#)).is_ok());
        assert!(check_api_error(&xml(r#"<lfm status="ok"/>"#)).is_ok());
    }

    #[test]
    fn test_track_info_json() {
        let parsed = json(
            r##"{"track":{
                "name":"Believe","mbid":"","duration":"240000",
                "artist":{"name":"Cher","mbid":"x","url":"u"},
                "album":{"artist":"Cher","title":"Believe","mbid":""},
                "userplaycount":"12","userloved":"1",
                "toptags":{"tag":{"name":"pop","url":"u"}},
                "wiki":{"summary":"A song."}
            }}"##,
        );
        let track = extract_track_info(&parsed).unwrap();

        assert_eq!(track.artist, "Cher");
        assert_eq!(track.title, "Believe");
        assert_eq!(track.album.as_deref(), Some("Believe"));
        assert_eq!(track.duration, Some(240));
        assert_eq!(track.mbid, None);
        assert_eq!(track.loved, Some(true));
        assert_eq!(track.tags, Some(vec!["pop".to_string()]));
        assert_eq!(track.description.as_deref(), Some("A song."));
    }

    #[test]
    fn test_track_info_xml() {
        let parsed = xml(
            r#"<lfm status="ok"><track>
                <name>Believe</name><mbid/><duration>0</duration>
                <artist><name>Cher</name></artist>
                <album position="1"><artist>Cher</artist><title>Believe</title></album>
                <toptags><tag><name>pop</name></tag><tag><name>dance</name></tag></toptags>
            </track></lfm>"#,
        );
        let track = extract_track_info(&parsed).unwrap();

        assert_eq!(track.artist, "Cher");
        assert_eq!(track.album.as_deref(), Some("Believe"));
        assert_eq!(track.duration, None);
        assert_eq!(track.loved, None);
        assert_eq!(
            track.tags,
            Some(vec!["pop".to_string(), "dance".to_string()])
        );
    }

    #[test]
    fn test_user_info_both_formats() {
        let from_json = extract_user_info(&json(
            r##"{"user":{"name":"RJ","playcount":"150316","registered":{"unixtime":"1037793040","#text":1037793040}}}"##,
        ))
        .unwrap();
        let from_xml = extract_user_info(&xml(
            r#"<lfm status="ok"><user><name>RJ</name><playcount>150316</playcount><registered unixtime="1037793040">2002-11-20 11:50</registered></user></lfm>"#,
        ))
        .unwrap();

        assert_eq!(from_json, from_xml);
        assert_eq!(from_json.username, "RJ");
        assert_eq!(from_json.listen_count, Some(150316));
        assert_eq!(
            from_json.birthday.map(|b| b.timestamp()),
            Some(1037793040)
        );
        assert!(from_json.tracks.is_empty());
    }

    #[test]
    fn test_tag_info_both_formats() {
        let from_json = extract_tag_info(&json(
            r#"{"tag":{"name":"disco","url":"https://www.last.fm/tag/disco","reach":15855,"total":95674}}"#,
        ))
        .unwrap();
        let from_xml = extract_tag_info(&xml(
            r#"<lfm status="ok"><tag><name>disco</name><url>https://www.last.fm/tag/disco</url><reach>15855</reach><taggings>95674</taggings></tag></lfm>"#,
        ))
        .unwrap();

        assert_eq!(from_json, from_xml);
        assert_eq!(from_json.reach, Some(15855));
        assert_eq!(from_json.taggings, Some(95674));
        assert_eq!(from_json.top_tracks, None);
    }

    #[test]
    fn test_top_artists_and_tracks() {
        let artists = extract_top_artists(&json(
            r#"{"topartists":{"artist":[{"name":"ABBA"},{"name":"Chic"}]}}"#,
        ))
        .unwrap();
        assert_eq!(artists, vec!["ABBA", "Chic"]);

        let artists = extract_top_artists(&xml(
            r#"<lfm><topartists tag="disco"><artist rank="1"><name>ABBA</name></artist></topartists></lfm>"#,
        ))
        .unwrap();
        assert_eq!(artists, vec!["ABBA"]);

        let tracks = extract_top_tracks(&json(
            r#"{"tracks":{"track":[{"name":"Dancing Queen","duration":"230","mbid":"","artist":{"name":"ABBA","mbid":"m"}}]}}"#,
        ))
        .unwrap();
        assert_eq!(tracks[0].artist, "ABBA");
        assert_eq!(tracks[0].duration, Some(230));
        assert_eq!(tracks[0].mbid, None);
    }
}
