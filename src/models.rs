//! Key-manager data models exchanged with the host platform

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An OAuth client application record on the authorization server.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ApplicationInfo {
    /// Client identifier; chosen by the adapter before registration and
    /// immutable once assigned
    #[serde(default)]
    pub client_id: String,
    /// Display name of the client application
    #[serde(default)]
    pub client_name: String,
    /// Client secret, absent until the server issues one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    /// Redirect URI registered for the client
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
    /// Grant types enabled for the client
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grant_types: Vec<String>,
    /// Open set of additional registration attributes
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub parameters: HashMap<String, serde_json::Value>,
}

impl ApplicationInfo {
    /// Returns the named extension parameter when it is a non-empty string.
    pub fn string_parameter(&self, key: &str) -> Option<&str> {
        self.parameters
            .get(key)
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
    }
}

/// A request for a new application access token. Transient, exists only for
/// the duration of one token-issuance call; the client secret is looked up
/// from the authorization server, not supplied by the caller.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AccessTokenRequest {
    /// Client the token is issued for
    pub client_id: String,
    /// Grant type; defaults to "client_credentials" when absent
    #[serde(default)]
    pub grant_type: Option<String>,
    /// Requested scopes
    #[serde(default)]
    pub scope: Vec<String>,
}

/// Error codes reported on an invalid token result.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthErrorCode {
    /// The credentials or token presented were not accepted by the server
    InvalidCredentials,
}

/// Metadata of an access token, as reported by the authorization server.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct AccessTokenInfo {
    /// The access token itself, when one was issued
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Whether the token is currently valid
    pub valid: bool,
    /// Remaining validity in milliseconds
    #[serde(default)]
    pub validity_period_ms: u64,
    /// Scopes granted to the token
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scope: Vec<String>,
    /// Audience the token was issued to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumer_key: Option<String>,
    /// End user the token was issued for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_user_name: Option<String>,
    /// Set when the token is invalid
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<AuthErrorCode>,
    /// Additional token attributes (token id, issuer, ...)
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub parameters: HashMap<String, serde_json::Value>,
}

impl AccessTokenInfo {
    /// An invalid-token result carrying the given error code. Used where
    /// validation failures are an expected outcome rather than an error.
    pub fn invalid(error_code: AuthErrorCode) -> Self {
        Self {
            valid: false,
            error_code: Some(error_code),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_parameter_filters_empty_and_non_string() {
        let mut info = ApplicationInfo::default();
        info.parameters
            .insert("logo_uri".to_string(), json!("https://logo/"));
        info.parameters.insert("contacts".to_string(), json!(""));
        info.parameters.insert("ttl".to_string(), json!(42));

        assert_eq!(info.string_parameter("logo_uri"), Some("https://logo/"));
        assert_eq!(info.string_parameter("contacts"), None);
        assert_eq!(info.string_parameter("ttl"), None);
        assert_eq!(info.string_parameter("absent"), None);
    }

    #[test]
    fn test_invalid_token_info() {
        let info = AccessTokenInfo::invalid(AuthErrorCode::InvalidCredentials);
        assert!(!info.valid);
        assert_eq!(info.error_code, Some(AuthErrorCode::InvalidCredentials));
        assert!(info.access_token.is_none());
        assert_eq!(info.validity_period_ms, 0);
    }
}
