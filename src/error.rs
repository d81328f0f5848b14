use http::StatusCode;
use thiserror::Error;

/// Errors that can occur while talking to the NAM authorization server.
///
/// Every public operation of the adapter returns this single failure union;
/// the host platform only sees the human-readable message.
#[derive(Debug, Error)]
pub enum KeyManagerError {
    /// A mandatory configuration or request field is missing or empty.
    /// Detected before any network call is attempted.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection or protocol failure reaching the authorization server.
    #[error("Failed to send request to NAM: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-parseable response body, or a body missing a field the protocol
    /// guarantees.
    #[error("Invalid response from NAM: {0}")]
    ResponseFormat(String),

    /// Non-success status code from the authorization server. Carries the
    /// server's response payload verbatim.
    #[error("NAM request failed with status {status}: {body}")]
    ServerRejection { status: StatusCode, body: String },
}

impl KeyManagerError {
    /// Build a rejection from a status code and the raw server body.
    pub fn rejection(status: StatusCode, body: impl Into<String>) -> Self {
        Self::ServerRejection {
            status,
            body: body.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_message_contains_server_body() {
        let err = KeyManagerError::rejection(StatusCode::NOT_FOUND, r#"{"error":"not_found"}"#);
        let msg = err.to_string();
        assert!(msg.contains("404"));
        assert!(msg.contains("not_found"));
    }

    #[test]
    fn config_error_names_the_field() {
        let err = KeyManagerError::Config("mandatory parameter username is missing".to_string());
        assert!(err.to_string().contains("username"));
    }
}
