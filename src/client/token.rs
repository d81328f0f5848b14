//! Token issuance, validation and revocation against NAM

use crate::client::{
    read_json, report, NamClient, REVOKE_ENDPOINT, TOKEN_ENDPOINT, TOKEN_INFO_ENDPOINT,
};
use crate::error::KeyManagerError;
use crate::models::{AccessTokenInfo, AccessTokenRequest, AuthErrorCode};
use crate::wire::{self, TokenInfoResponse, TokenResponse};
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use http::StatusCode;
use log::{debug, error};

const GRANT_TYPE_PASSWORD: &str = "password";
const GRANT_TYPE_CLIENT_CREDENTIALS: &str = "client_credentials";

impl NamClient {
    /// Obtains a service access token via the resource-owner password grant.
    ///
    /// All grant fields come from configuration; a missing one is reported
    /// before the call is attempted. Returns the access token and the
    /// refresh token the server issued alongside it, if any.
    pub(crate) async fn password_grant(
        &self,
    ) -> Result<(String, Option<String>), KeyManagerError> {
        let config = self.config();
        config.validate_password_grant().map_err(report)?;

        debug!(
            "Requesting a service access token for the client {}",
            config.client_id
        );
        let form = [
            ("username", config.username.as_str()),
            ("password", config.password.as_str()),
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.as_str()),
            ("grant_type", GRANT_TYPE_PASSWORD),
        ];
        let response = self
            .http()
            .post(config.url(TOKEN_ENDPOINT))
            .form(&form)
            .send()
            .await?;

        let (status, body) = read_json(response).await?;
        if status != StatusCode::OK {
            return Err(report(KeyManagerError::rejection(status, body.to_string())));
        }

        let token: TokenResponse = serde_json::from_value(body)
            .map_err(|e| report(KeyManagerError::ResponseFormat(e.to_string())))?;
        match token.access_token.filter(|t| !t.is_empty()) {
            Some(access_token) => Ok((access_token, token.refresh_token)),
            None => Err(report(KeyManagerError::ResponseFormat(format!(
                "Response body does not contain the access_token when requesting a new \
                 access token for {}.",
                config.client_id
            )))),
        }
    }

    /// Introspects an access token.
    ///
    /// HTTP 200 means valid and yields the token metadata; any other status
    /// means invalid and yields `None` rather than an error, so the caller
    /// can treat it as "needs refresh".
    pub(crate) async fn introspect(
        &self,
        access_token: &str,
    ) -> Result<Option<serde_json::Value>, KeyManagerError> {
        let response = self
            .http()
            .get(self.config().url(TOKEN_INFO_ENDPOINT))
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            debug!(
                "Status code {} received when requesting token metadata",
                status
            );
            return Ok(None);
        }
        let (_, body) = read_json(response).await?;
        Ok(Some(body))
    }

    /// Issues a new access token for an application, by default through the
    /// client-credentials grant.
    ///
    /// The application's client secret is looked up from the server, and any
    /// cached refresh token is revoked (and consumed) first. A token
    /// response without `expires_in` is an invalid-credentials outcome, not
    /// an error.
    pub async fn new_application_token(
        &self,
        request: &AccessTokenRequest,
    ) -> Result<AccessTokenInfo, KeyManagerError> {
        let client_id = &request.client_id;
        if client_id.is_empty() {
            return Err(report(KeyManagerError::Config(
                "Mandatory parameter client_id is missing while requesting a new \
                 application token."
                    .to_string(),
            )));
        }
        debug!(
            "Requesting a new application access token for the consumer key {}",
            client_id
        );

        let service_token = self.ensure_valid_access_token().await?;
        let application = self.get_application(&service_token, client_id).await?;
        let client_secret = super::registrar::client_secret_from(&application, client_id)?;

        let cached_refresh_token = self.cache().lock().await.take_refresh_token();
        if let Some(refresh_token) = cached_refresh_token {
            self.revoke_refresh_token(client_id, &client_secret, &refresh_token)
                .await?;
        }

        let grant_type = request
            .grant_type
            .clone()
            .unwrap_or_else(|| GRANT_TYPE_CLIENT_CREDENTIALS.to_string());
        let mut form = vec![("grant_type".to_string(), grant_type)];
        let scope = wire::join_scopes(&request.scope);
        if !scope.is_empty() {
            form.push(("scope".to_string(), scope));
        }
        form.push(("client_id".to_string(), client_id.clone()));
        form.push(("client_secret".to_string(), client_secret));

        let response = self
            .http()
            .post(self.config().url(TOKEN_ENDPOINT))
            .form(&form)
            .send()
            .await?;

        let (status, body) = read_json(response).await?;
        if status != StatusCode::OK {
            error!(
                "Failed to get an access token for the consumer key {}. Response: {}",
                client_id, body
            );
            return Ok(AccessTokenInfo::invalid(AuthErrorCode::InvalidCredentials));
        }

        let token: TokenResponse = serde_json::from_value(body)
            .map_err(|e| report(KeyManagerError::ResponseFormat(e.to_string())))?;
        let Some(expires_in) = token.expires_in else {
            debug!(
                "Token response for the consumer key {} carries no expiry, treating the \
                 credentials as invalid",
                client_id
            );
            return Ok(AccessTokenInfo::invalid(AuthErrorCode::InvalidCredentials));
        };

        Ok(AccessTokenInfo {
            access_token: token.access_token,
            valid: true,
            validity_period_ms: expires_in * 1000,
            scope: token
                .scope
                .as_deref()
                .map(wire::split_scopes)
                .unwrap_or_default(),
            ..AccessTokenInfo::default()
        })
    }

    /// Looks up the metadata of an arbitrary access token.
    ///
    /// A token the server rejects yields an invalid result rather than an
    /// error; validation is routinely called on expired or forged tokens. A
    /// token the server accepts must carry the guaranteed metadata fields.
    pub async fn token_metadata(
        &self,
        access_token: &str,
    ) -> Result<AccessTokenInfo, KeyManagerError> {
        let Some(body) = self.introspect(access_token).await? else {
            error!("Token failed introspection and is treated as invalid.");
            return Ok(AccessTokenInfo::invalid(AuthErrorCode::InvalidCredentials));
        };

        let metadata: TokenInfoResponse = serde_json::from_value(body)
            .map_err(|e| report(KeyManagerError::ResponseFormat(e.to_string())))?;

        let expires_in = metadata
            .exp
            .ok_or_else(|| missing_metadata_field("exp"))?;
        let scope = metadata
            .scope
            .ok_or_else(|| missing_metadata_field("scope"))?;
        let user_id = metadata
            .user_id
            .filter(|s| !s.is_empty())
            .ok_or_else(|| missing_metadata_field("user_id"))?;
        let audience = metadata
            .audience
            .filter(|s| !s.is_empty())
            .ok_or_else(|| missing_metadata_field("audience"))?;

        let mut info = AccessTokenInfo {
            valid: true,
            validity_period_ms: expires_in * 1000,
            scope,
            consumer_key: Some(audience),
            end_user_name: Some(user_id),
            ..AccessTokenInfo::default()
        };
        if let Some(token_id) = metadata.token_id.filter(|s| !s.is_empty()) {
            info.parameters
                .insert("token_id".to_string(), token_id.into());
        }
        if let Some(issuer) = metadata.issuer.filter(|s| !s.is_empty()) {
            info.parameters.insert("issuer".to_string(), issuer.into());
        }
        Ok(info)
    }

    /// Revokes a refresh token, authenticating with HTTP Basic credentials
    /// built from the owning client's id and secret. Success is HTTP 200.
    pub async fn revoke_refresh_token(
        &self,
        client_id: &str,
        client_secret: &str,
        refresh_token: &str,
    ) -> Result<(), KeyManagerError> {
        if client_id.is_empty() {
            return Err(report(KeyManagerError::Config(
                "Client id cannot be empty for a revoke token request.".to_string(),
            )));
        }
        if refresh_token.is_empty() {
            return Err(report(KeyManagerError::Config(
                "Refresh token cannot be empty for a revoke token request.".to_string(),
            )));
        }

        let credentials = BASE64_STANDARD.encode(format!("{}:{}", client_id, client_secret));
        let response = self
            .http()
            .post(self.config().url(REVOKE_ENDPOINT))
            .header("Authorization", format!("Basic {}", credentials))
            .form(&[("token", refresh_token)])
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(report(KeyManagerError::rejection(status, body)));
        }
        debug!(
            "Refresh token for the consumer key {} has been revoked",
            client_id
        );
        Ok(())
    }
}

fn missing_metadata_field(field: &str) -> KeyManagerError {
    report(KeyManagerError::ResponseFormat(format!(
        "Mandatory parameter {} is missing in the response when validating token.",
        field
    )))
}
