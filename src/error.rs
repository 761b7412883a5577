use thiserror::Error;

/// Error types for Last.fm API operations.
///
/// The variants separate "the server rejected us" ([`LastFmError::Transport`],
/// [`LastFmError::Api`]) from "the server answered with something we could not
/// understand" ([`LastFmError::Parse`], [`LastFmError::Validation`]). None of
/// them are retried by the client; any retry policy belongs to the caller.
///
/// # Error Handling Examples
///
/// ```rust,no_run
/// use lastfm_api::{ClientConfig, LastFmApi, LastFmClient, LastFmError};
///
/// #[tokio::main]
/// async fn main() {
///     let client = LastFmClient::new(
///         Box::new(http_client::native::NativeClient::new()),
///         ClientConfig::new("my-api-key"),
///     );
///
///     match client.get_tracks("rj", Some(5)).await {
///         Ok(tracks) => println!("{} tracks", tracks.len()),
///         Err(LastFmError::Transport { status, body }) => {
///             eprintln!("Server returned {status}: {body}");
///         }
///         Err(LastFmError::Api { code, message }) => {
///             eprintln!("Last.fm error {code}: {message}");
///         }
///         Err(e) => eprintln!("Other error: {e}"),
///     }
/// }
/// ```
#[derive(Error, Debug)]
pub enum LastFmError {
    /// The request did not produce a successful response.
    ///
    /// Raised for a non-success HTTP status, with `body` holding the raw
    /// response text exactly as received, and for transport failures
    /// (connection errors, timeouts, cancellation), with the status the
    /// transport reported and its error message as `body`.
    #[error("Last.fm returned status {status}: {body}")]
    Transport {
        /// HTTP status code of the response
        status: u16,
        /// Raw response body
        body: String,
    },

    /// A well-formed Last.fm error document was returned.
    ///
    /// Last.fm reports some failures inside the payload, e.g.
    /// `{"error": 6, "message": "User not found"}` or
    /// `<lfm status="failed"><error code="6">User not found</error></lfm>`.
    #[error("Last.fm API error {code}: {message}")]
    Api {
        /// Last.fm error code
        code: u32,
        /// Human readable message from the payload
        message: String,
    },

    /// Failed to parse Last.fm's response.
    ///
    /// Raised when the body is neither valid JSON nor valid XML, or when the
    /// method-specific list path is missing from the parsed tree.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// A required entity field was missing from an otherwise valid response.
    #[error("Invalid response: {0}")]
    Validation(String),

    /// A caller-supplied argument was rejected before any request was made.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A format template could not be rendered.
    #[error("Template error: {0}")]
    Template(String),
}
