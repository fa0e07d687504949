//! Routing endpoint client error types.

use std::fmt;

/// Errors from the OTP HTTP client.
#[derive(Debug)]
pub enum OtpError {
    /// HTTP request failed (network error, timeout, etc.)
    Http(reqwest::Error),

    /// JSON deserialization failed
    Json {
        message: String,
        body: Option<String>,
    },

    /// Endpoint returned an error status code
    Api { status: u16, message: String },

    /// The GraphQL layer reported errors in an otherwise OK response
    GraphQl { message: String },

    /// Rate limited by the endpoint
    RateLimited,

    /// Invalid API key or unauthorized
    Unauthorized,
}

impl fmt::Display for OtpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OtpError::Http(e) => write!(f, "HTTP error: {e}"),
            OtpError::Json { message, body } => {
                write!(f, "JSON parse error: {message}")?;
                if let Some(body) = body {
                    write!(f, " (body: {body})")?;
                }
                Ok(())
            }
            OtpError::Api { status, message } => {
                write!(f, "API error {status}: {message}")
            }
            OtpError::GraphQl { message } => write!(f, "GraphQL error: {message}"),
            OtpError::RateLimited => write!(f, "rate limited by routing endpoint"),
            OtpError::Unauthorized => write!(f, "unauthorized (invalid API key)"),
        }
    }
}

impl std::error::Error for OtpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OtpError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for OtpError {
    fn from(err: reqwest::Error) -> Self {
        OtpError::Http(err)
    }
}
