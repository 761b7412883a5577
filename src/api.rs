use crate::{ParsedResponse, Result, Tag, Track, TrackRef, User};
use async_trait::async_trait;

/// Trait for Last.fm API operations that can be mocked for testing.
///
/// [`LastFmClient`](crate::LastFmClient) is the HTTP-backed implementation.
/// Every method performs at most a handful of sequential requests and never
/// retries; errors are returned to the caller as-is.
///
/// # Mocking Support
///
/// When the `mock` feature is enabled, this crate provides `MockLastFmApi`
/// that implements this trait using the `mockall` library.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait(?Send)]
pub trait LastFmApi {
    /// Call an API method directly and return the parsed body.
    ///
    /// This is the building block of every other method: it builds the query
    /// string, performs the request, fails on non-success statuses and Last.fm
    /// error documents, and parses the body.
    async fn call_api(&self, method: &str, params: Vec<(String, String)>)
        -> Result<ParsedResponse>;

    /// Get the tracks recently listened to by a user, most recent first.
    ///
    /// The first track may be the one currently playing. `limit` caps the
    /// number of tracks; `None` lets the server decide.
    async fn get_tracks(&self, user: &str, limit: Option<u32>) -> Result<Vec<Track>>;

    /// Get the raw `track.getInfo` response for a track, optionally including
    /// the given user's play data.
    async fn get_track_info(
        &self,
        track: TrackRef,
        username: Option<String>,
    ) -> Result<ParsedResponse>;

    /// Get a track's metadata from `track.getInfo` as a [`Track`].
    async fn get_track(&self, track: TrackRef, username: Option<String>) -> Result<Track>;

    /// Get a user's profile without recent tracks.
    async fn get_user_info(&self, user: &str) -> Result<User>;

    /// Get a user's profile together with their recent tracks.
    async fn get_user(&self, user: &str, limit: Option<u32>) -> Result<User> {
        let mut profile = self.get_user_info(user).await?;
        profile.tracks = self.get_tracks(user, limit).await?;
        Ok(profile)
    }

    /// Get a tag's metadata without top tracks or artists.
    async fn get_tag_info(&self, tag: &str) -> Result<Tag>;

    /// Get the most popular tracks for a tag.
    async fn get_tag_top_tracks(&self, tag: &str, limit: Option<u32>) -> Result<Vec<Track>>;

    /// Get the most popular artist names for a tag.
    async fn get_tag_top_artists(&self, tag: &str, limit: Option<u32>) -> Result<Vec<String>>;

    /// Get a tag with its top tracks and artists filled in.
    async fn get_tag(&self, tag: &str, limit: Option<u32>) -> Result<Tag> {
        let mut info = self.get_tag_info(tag).await?;
        info.top_tracks = Some(self.get_tag_top_tracks(tag, limit).await?);
        info.top_artists = Some(self.get_tag_top_artists(tag, limit).await?);
        Ok(info)
    }
}
