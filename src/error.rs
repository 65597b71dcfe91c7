//! Error types for the channel guide

/// Result type alias for channel guide operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading, persisting or playing channels
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("Request failed: {0}")]
    Http(#[from] ureq::Error),

    /// Server answered with a non-success status
    #[error("HTTP error: {0}")]
    HttpStatus(u16),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Playlist entry dropped while parsing in strict mode
    #[error("Playlist line {line}: {reason}")]
    Parse { line: usize, reason: String },

    /// Record has no stream or embed address
    #[error("Stream unavailable: {0}")]
    StreamUnavailable(String),

    /// External player could not be started
    #[error("Failed to launch player '{player}': {source}")]
    PlayerLaunch {
        player: String,
        #[source]
        source: std::io::Error,
    },

    /// Platform has no user configuration directory
    #[error("No configuration directory available")]
    NoConfigDir,
}

impl Error {
    /// Create a strict-mode parse error
    pub fn parse(line: usize, reason: impl Into<String>) -> Self {
        Self::Parse {
            line,
            reason: reason.into(),
        }
    }
}
