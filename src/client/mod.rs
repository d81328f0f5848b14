//! HTTP client for the NAM authorization server

use crate::cache::TokenCache;
use crate::config::NamConfig;
use crate::error::KeyManagerError;
use http::StatusCode;
use log::{debug, error};
use reqwest::{Client, Response};
use tokio::sync::Mutex;

pub mod registrar;
pub mod token;

/// Dynamic client registration endpoint
pub const CLIENTS_ENDPOINT: &str = "/nidp/oauth/nam/clients";
/// Token endpoint, shared by the password and client-credentials grants
pub const TOKEN_ENDPOINT: &str = "/nidp/oauth/nam/token";
/// Token introspection endpoint
pub const TOKEN_INFO_ENDPOINT: &str = "/nidp/oauth/nam/tokeninfo";
/// Refresh-token revocation endpoint
pub const REVOKE_ENDPOINT: &str = "/nidp/oauth/nam/revoke";

/// Client for a single NAM instance.
///
/// Owns the cached service credentials used to authenticate registration
/// calls. The cache holds at most one access-token/refresh-token pair; the
/// mutex serializes the check-and-refresh sequence so a stale token is
/// replaced by exactly one password grant even under concurrent callers.
pub struct NamClient {
    http: Client,
    config: NamConfig,
    cache: Mutex<TokenCache>,
}

impl NamClient {
    /// Creates a new client for the NAM instance described by `config`.
    pub fn new(config: NamConfig) -> Self {
        Self {
            http: Client::new(),
            config,
            cache: Mutex::new(TokenCache::new()),
        }
    }

    /// The configuration this client was created with.
    pub fn config(&self) -> &NamConfig {
        &self.config
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    pub(crate) fn cache(&self) -> &Mutex<TokenCache> {
        &self.cache
    }

    /// Returns a service bearer token that passed introspection at call time.
    ///
    /// On a cache miss a fresh token is obtained via the password grant; a
    /// cached token that fails introspection is discarded and replaced the
    /// same way. Validity is always re-verified against the server, never
    /// computed locally from a stored expiry.
    pub async fn ensure_valid_access_token(&self) -> Result<String, KeyManagerError> {
        let mut cache = self.cache.lock().await;

        if let Some(cached) = cache.access_token() {
            let cached = cached.to_string();
            if self.introspect(&cached).await?.is_some() {
                return Ok(cached);
            }
            debug!("Cached service token failed introspection, requesting a new one");
            cache.invalidate_access_token();
        }

        let (access_token, refresh_token) = self.password_grant().await?;
        cache.store(access_token.clone(), refresh_token);
        Ok(access_token)
    }
}

/// Logs a failure at the point it is raised and hands it back for
/// propagation.
pub(crate) fn report(err: KeyManagerError) -> KeyManagerError {
    error!("{}", err);
    err
}

/// Reads a response expected to carry a JSON body, keeping the status code.
///
/// An empty body where one is expected is a [`KeyManagerError::ResponseFormat`]
/// failure, distinct from a non-success status code.
pub(crate) async fn read_json(
    response: Response,
) -> Result<(StatusCode, serde_json::Value), KeyManagerError> {
    let status = response.status();
    let text = response.text().await?;
    if text.is_empty() {
        return Err(report(KeyManagerError::ResponseFormat(format!(
            "Could not read response body for status {}.",
            status
        ))));
    }
    let body = serde_json::from_str(&text).map_err(|e| {
        report(KeyManagerError::ResponseFormat(format!(
            "Failed to parse response body: {}",
            e
        )))
    })?;
    Ok((status, body))
}
