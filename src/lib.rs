//! # nam-keymanager
//!
//! Key-manager adapter that delegates OAuth2 client registration, token
//! issuance, token introspection and token revocation to a NetIQ Access
//! Manager (NAM) authorization server.
//!
//! ## Components
//!
//! - **[`NamClient`]:** HTTP client translating key-manager operations into
//!   NAM's REST endpoints.
//! - **[`KeyManager`]:** the capability set exposed to the host platform.
//! - **[`config::NamConfig`]:** connection and service-account settings.
//!
//! Registration calls authenticate with a service-level bearer token that the
//! client obtains via the password grant and caches; the cached token is
//! re-verified by introspection before every privileged call and replaced
//! when the server no longer accepts it.

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod wire;

#[cfg(test)]
mod test_utils;

use async_trait::async_trait;

pub use crate::client::NamClient;
pub use crate::config::NamConfig;
pub use crate::error::KeyManagerError;
pub use crate::models::{AccessTokenInfo, AccessTokenRequest, ApplicationInfo, AuthErrorCode};

/// The key-manager capability set the host platform consumes.
#[async_trait]
pub trait KeyManager {
    /// Registers a new OAuth client application on the authorization server.
    async fn create_application(
        &self,
        request: &ApplicationInfo,
    ) -> Result<ApplicationInfo, KeyManagerError>;

    /// Updates an existing OAuth client application.
    async fn update_application(
        &self,
        info: &ApplicationInfo,
    ) -> Result<ApplicationInfo, KeyManagerError>;

    /// Deletes an OAuth client application.
    async fn delete_application(&self, client_id: &str) -> Result<(), KeyManagerError>;

    /// Retrieves an OAuth client application record.
    async fn retrieve_application(
        &self,
        client_id: &str,
    ) -> Result<ApplicationInfo, KeyManagerError>;

    /// Issues a new access token for an application.
    async fn new_application_token(
        &self,
        request: &AccessTokenRequest,
    ) -> Result<AccessTokenInfo, KeyManagerError>;

    /// Looks up the client secret registered for an application.
    async fn new_consumer_secret(&self, client_id: &str) -> Result<String, KeyManagerError>;

    /// Looks up the metadata of an arbitrary access token.
    async fn token_metadata(&self, access_token: &str)
        -> Result<AccessTokenInfo, KeyManagerError>;
}

#[async_trait]
impl KeyManager for NamClient {
    async fn create_application(
        &self,
        request: &ApplicationInfo,
    ) -> Result<ApplicationInfo, KeyManagerError> {
        NamClient::create_application(self, request).await
    }

    async fn update_application(
        &self,
        info: &ApplicationInfo,
    ) -> Result<ApplicationInfo, KeyManagerError> {
        NamClient::update_application(self, info).await
    }

    async fn delete_application(&self, client_id: &str) -> Result<(), KeyManagerError> {
        NamClient::delete_application(self, client_id).await
    }

    async fn retrieve_application(
        &self,
        client_id: &str,
    ) -> Result<ApplicationInfo, KeyManagerError> {
        NamClient::retrieve_application(self, client_id).await
    }

    async fn new_application_token(
        &self,
        request: &AccessTokenRequest,
    ) -> Result<AccessTokenInfo, KeyManagerError> {
        NamClient::new_application_token(self, request).await
    }

    async fn new_consumer_secret(&self, client_id: &str) -> Result<String, KeyManagerError> {
        NamClient::new_consumer_secret(self, client_id).await
    }

    async fn token_metadata(
        &self,
        access_token: &str,
    ) -> Result<AccessTokenInfo, KeyManagerError> {
        NamClient::token_metadata(self, access_token).await
    }
}
