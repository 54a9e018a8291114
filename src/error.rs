// src/error.rs

use std::fmt;

/// Global Client Error Enum.
/// Every handler returns this so failures propagate with `?`.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientError {
    // Non-success HTTP status, body captured as text
    Http { status: u16, body: String },

    // Connection refused, timeout, DNS, ...
    Transport(String),

    // Body did not parse as the expected JSON
    Decode(String),

    // Missing or malformed configuration
    Config(String),

    // The page is not in a state the action can work with
    Invalid(String),
}

impl ClientError {
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        ClientError::Http {
            status,
            body: body.into(),
        }
    }

    /// The message carried by non-HTTP failures.
    pub fn message(&self) -> &str {
        match self {
            ClientError::Http { body, .. } => body,
            ClientError::Transport(msg)
            | ClientError::Decode(msg)
            | ClientError::Config(msg)
            | ClientError::Invalid(msg) => msg,
        }
    }
}

/// Renders the status-line text for the failure.
impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Http { status, body } => write!(f, "Error HTTP ({}): {}", status, body),
            other => write!(f, "Error: {}", other.message()),
        }
    }
}

impl std::error::Error for ClientError {}

/// Converts `reqwest::Error` into `ClientError`.
/// Body decoding failures are kept apart from transport failures.
impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::Config(err.to_string())
    }
}
