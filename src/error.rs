//! Error types for schema registry client operations.
//!
//! All errors surface directly to the caller: no retries, no local recovery,
//! and nothing is cached on failure. Distinguishing "schema absent" from
//! "request failed" is done by inspecting the rendered error for the
//! [`NOT_FOUND_STATUS`] status line. That is the registry's actual error
//! contract, not a typed variant.

use thiserror::Error;

/// Convenience type alias for `Result<T, ClientError>`.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Status line the registry answers with when a subject or schema is absent.
pub const NOT_FOUND_STATUS: &str = "404 Not Found";

/// Error type for schema registry client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or connection failure while talking to the registry.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The registry answered with a non-2xx status.
    ///
    /// `status` is the HTTP status line (e.g. `"404 Not Found"`); `message`
    /// is the registry's `{error_code, message}` body message when the body
    /// decoded as one, otherwise `None`.
    #[error("{}{}", .status, .message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
    Registry {
        status: String,
        message: Option<String>,
    },

    /// A 2xx response body failed to decode as the expected JSON shape.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Invariant breakage inside the client. Indicates a bug or a registry
    /// answering outside its documented contract.
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_error_renders_status_and_message() {
        let err = ClientError::Registry {
            status: "404 Not Found".to_string(),
            message: Some("Subject 'orders-value' not found.".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "404 Not Found: Subject 'orders-value' not found."
        );
        assert!(err.to_string().contains(NOT_FOUND_STATUS));
    }

    #[test]
    fn registry_error_renders_bare_status() {
        let err = ClientError::Registry {
            status: "500 Internal Server Error".to_string(),
            message: None,
        };
        assert_eq!(err.to_string(), "500 Internal Server Error");
        assert!(!err.to_string().contains(NOT_FOUND_STATUS));
    }
}
