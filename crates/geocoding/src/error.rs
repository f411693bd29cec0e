use thiserror::Error;

pub type GeocodingResult<T> = Result<T, GeocodingError>;

/// Failure talking to the geocoding service.
///
/// Never fatal: callers degrade to "no results".
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GeocodingError {
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("geocoding request timed out")]
    Timeout,

    #[error("geocoding service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed geocoding response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for GeocodingError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GeocodingError::Timeout
        } else {
            GeocodingError::Network(err.to_string())
        }
    }
}
