//! Error types for editor operations.

use thiserror::Error;

/// Input rejected before any state change or network call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Not enough vertices to finish a shape
    #[error("add at least {required} points")]
    TooFewPoints {
        /// Minimum vertex count for the shape being drawn
        required: usize,
        /// Vertices collected so far
        got: usize,
    },

    /// A coordinate is NaN or infinite
    #[error("invalid coordinates: {message}")]
    InvalidCoordinates {
        /// Description of the bad coordinate
        message: String,
    },
}

impl ValidationError {
    /// Create a too-few-points error.
    pub fn too_few_points(required: usize, got: usize) -> Self {
        Self::TooFewPoints { required, got }
    }

    /// Create an invalid coordinates error.
    pub fn invalid_coordinates(message: impl Into<String>) -> Self {
        Self::InvalidCoordinates {
            message: message.into(),
        }
    }
}

/// The viewing surface cannot convert coordinates (no image loaded yet).
///
/// Events that hit this are dropped silently.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("viewing surface unavailable")]
pub struct Unavailable;

/// Errors from the persistence gateway and the page service behind it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    /// The server answered with a non-success status
    #[error("server returned {status}: {body}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Response text
        body: String,
    },

    /// Connection, DNS, TLS or timeout failure
    #[error("network error: {0}")]
    Transport(String),

    /// The response could not be decoded
    #[error("invalid response: {0}")]
    Decode(String),

    /// A line was saved before its region received a server id
    #[error("owning region has not been saved")]
    UnsavedOwner,

    /// The shape has no server id yet
    #[error("shape has not been saved yet")]
    NotSaved,

    /// The server reported failure in an otherwise successful response
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The background worker could not be started
    #[error("failed to start persistence worker: {0}")]
    Spawn(String),

    /// The background worker is gone
    #[error("persistence worker unavailable")]
    WorkerGone,
}

impl GatewayError {
    /// Create an HTTP status error.
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Self::Http {
            status,
            body: body.into(),
        }
    }

    /// Create a decode error.
    pub fn decode(message: impl ToString) -> Self {
        Self::Decode(message.to_string())
    }
}
