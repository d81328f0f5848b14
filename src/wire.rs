//! Wire codec for NAM's form-encoded requests and JSON responses

use crate::error::KeyManagerError;
use crate::models::ApplicationInfo;
use serde::Deserialize;

/// Optional OIDC registration attributes the protocol accepts. Each is sent
/// only when present and non-empty in the caller-supplied extension set.
const OPTIONAL_REGISTRATION_ATTRIBUTES: &[&str] = &[
    "application_type",
    "response_types",
    "alwaysIssueNewRefreshToken",
    "authzCodeTTL",
    "accessTokenTTL",
    "refreshTokenTTL",
    "corsdomains",
    "logo_uri",
    "policy_uri",
    "tos_uri",
    "contacts",
    "jwks_uri",
    "id_token_signed_response_alg",
    "id_token_encrypted_response_alg",
    "id_token_encrypted_response_enc",
];

/// Builds the form body for a client registration or update request.
///
/// Requires a non-empty client name; the client id is expected to have been
/// assigned by the caller already.
pub fn registration_form(
    info: &ApplicationInfo,
) -> Result<Vec<(String, String)>, KeyManagerError> {
    if info.client_name.is_empty() {
        return Err(KeyManagerError::Config(
            "Mandatory parameter client_name is missing.".to_string(),
        ));
    }

    let mut params = vec![
        ("client_id".to_string(), info.client_id.clone()),
        ("client_name".to_string(), info.client_name.clone()),
    ];

    if let Some(callback_url) = info.callback_url.as_deref().filter(|u| !u.is_empty()) {
        params.push(("redirection_uri".to_string(), callback_url.to_string()));
    }

    if !info.grant_types.is_empty() {
        // The server expects the grant type list as a JSON-array-encoded
        // string inside the form body.
        let encoded = serde_json::to_string(&info.grant_types)
            .map_err(|e| KeyManagerError::ResponseFormat(e.to_string()))?;
        params.push(("grant_types".to_string(), encoded));
    }

    for attribute in OPTIONAL_REGISTRATION_ATTRIBUTES {
        if let Some(value) = info.string_parameter(attribute) {
            params.push((attribute.to_string(), value.to_string()));
        }
    }

    Ok(params)
}

/// Converts a registration/retrieval response body into an
/// [`ApplicationInfo`]. The client id is not part of the response; the
/// caller supplies the id it registered under.
pub fn application_from_response(
    response: &serde_json::Value,
    client_id: &str,
) -> Result<ApplicationInfo, KeyManagerError> {
    if client_id.is_empty() {
        return Err(KeyManagerError::ResponseFormat(format!(
            "Mandatory parameter client_id is empty in the response {}.",
            response
        )));
    }

    let mut info = ApplicationInfo {
        client_id: client_id.to_string(),
        ..ApplicationInfo::default()
    };

    if let Some(client_name) = response.get("client_name").and_then(|v| v.as_str()) {
        if !client_name.is_empty() {
            info.client_name = client_name.to_string();
            info.parameters
                .insert("client_name".to_string(), client_name.into());
        }
    }

    if let Some(client_secret) = response.get("client_secret").and_then(|v| v.as_str()) {
        if !client_secret.is_empty() {
            info.client_secret = Some(client_secret.to_string());
        }
    }

    if let Some(redirect_uris) = response.get("redirect_uris").and_then(|v| v.as_array()) {
        if let Some(first) = redirect_uris.first().and_then(|v| v.as_str()) {
            info.callback_url = Some(first.to_string());
        }
        info.parameters
            .insert("redirect_uris".to_string(), redirect_uris.clone().into());
    }

    if let Some(grant_types) = response.get("grant_types") {
        if let Some(list) = grant_types.as_array() {
            info.grant_types = list
                .iter()
                .filter_map(|v| v.as_str())
                .map(str::to_string)
                .collect();
        }
        info.parameters
            .insert("grant_types".to_string(), grant_types.clone());
    }

    Ok(info)
}

/// Response body of the token endpoint, for both grant types.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Remaining lifetime in seconds
    #[serde(default)]
    pub expires_in: Option<u64>,
    /// Granted scopes, space-separated
    #[serde(default)]
    pub scope: Option<String>,
}

/// Response body of the token-info endpoint.
#[derive(Debug, Deserialize)]
pub struct TokenInfoResponse {
    /// Remaining lifetime in seconds
    #[serde(default)]
    pub exp: Option<u64>,
    #[serde(default)]
    pub scope: Option<Vec<String>>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub audience: Option<String>,
    #[serde(default)]
    pub token_id: Option<String>,
    #[serde(default)]
    pub issuer: Option<String>,
}

/// Joins scopes into the space-separated form the token endpoint expects.
pub fn join_scopes(scopes: &[String]) -> String {
    scopes.join(" ")
}

/// Splits a space-separated scope string from a token response.
pub fn split_scopes(scope: &str) -> Vec<String> {
    scope.split_whitespace().map(str::to_string).collect()
}
