//! OAuth client application registration against NAM

use crate::client::{read_json, report, NamClient, CLIENTS_ENDPOINT};
use crate::error::KeyManagerError;
use crate::models::ApplicationInfo;
use crate::wire;
use http::StatusCode;
use log::debug;
use uuid::Uuid;

/// Extension entries the caller may attach to a registration request that
/// are carried through onto the created application unchanged.
const PASSTHROUGH_PARAMETERS: &[&str] = &["tokenScope", "tokenGrantType"];

impl NamClient {
    /// Registers a new OAuth client application.
    ///
    /// The adapter names the client in this protocol: a fresh id is assigned
    /// before registration and is immutable afterwards. Success is exactly
    /// HTTP 201; any other status is reported with the server's payload.
    pub async fn create_application(
        &self,
        request: &ApplicationInfo,
    ) -> Result<ApplicationInfo, KeyManagerError> {
        debug!(
            "Creating an OAuth client in NAM with application name {}",
            request.client_name
        );

        let mut registered = request.clone();
        registered.client_id = Uuid::new_v4().to_string();
        let form = wire::registration_form(&registered).map_err(report)?;

        let token = self.ensure_valid_access_token().await?;
        let response = self
            .http()
            .post(self.config().url(CLIENTS_ENDPOINT))
            .bearer_auth(&token)
            .form(&form)
            .send()
            .await?;

        let (status, body) = read_json(response).await?;
        if status != StatusCode::CREATED {
            return Err(report(KeyManagerError::rejection(status, body.to_string())));
        }

        let mut info = wire::application_from_response(&body, &registered.client_id)?;
        for key in PASSTHROUGH_PARAMETERS {
            if let Some(value) = request.parameters.get(*key) {
                info.parameters.insert(key.to_string(), value.clone());
            }
        }
        debug!(
            "OAuth client {} has been registered in NAM",
            info.client_id
        );
        Ok(info)
    }

    /// Updates an existing OAuth client application. Success is HTTP 200.
    pub async fn update_application(
        &self,
        info: &ApplicationInfo,
    ) -> Result<ApplicationInfo, KeyManagerError> {
        let client_id = &info.client_id;
        if client_id.is_empty() {
            return Err(report(KeyManagerError::Config(
                "Mandatory parameter client_id is missing while updating an application."
                    .to_string(),
            )));
        }
        debug!("Updating the OAuth client {} in NAM", client_id);

        let form = wire::registration_form(info).map_err(report)?;
        let token = self.ensure_valid_access_token().await?;
        let response = self
            .http()
            .put(format!(
                "{}/{}",
                self.config().url(CLIENTS_ENDPOINT),
                client_id
            ))
            .bearer_auth(&token)
            .form(&form)
            .send()
            .await?;

        let (status, body) = read_json(response).await?;
        if status != StatusCode::OK {
            return Err(report(KeyManagerError::rejection(status, body.to_string())));
        }
        wire::application_from_response(&body, client_id)
    }

    /// Deletes an OAuth client application. Success is HTTP 204 with no
    /// body; any other status is reported with the server's payload.
    pub async fn delete_application(&self, client_id: &str) -> Result<(), KeyManagerError> {
        debug!("Deleting the OAuth client {} in NAM", client_id);

        let token = self.ensure_valid_access_token().await?;
        let response = self
            .http()
            .delete(format!(
                "{}/{}",
                self.config().url(CLIENTS_ENDPOINT),
                client_id
            ))
            .bearer_auth(&token)
            .send()
            .await?;

        if response.status() == StatusCode::NO_CONTENT {
            debug!("OAuth client {} has been deleted", client_id);
            return Ok(());
        }
        let (status, body) = read_json(response).await?;
        Err(report(KeyManagerError::rejection(status, body.to_string())))
    }

    /// Retrieves the caller's client application record.
    ///
    /// The registration endpoint returns the caller's own application set;
    /// no server-side filtering by id takes place.
    pub async fn retrieve_application(
        &self,
        client_id: &str,
    ) -> Result<ApplicationInfo, KeyManagerError> {
        debug!("Retrieving the OAuth client {} from NAM", client_id);

        let token = self.ensure_valid_access_token().await?;
        let body = self.get_application(&token, client_id).await?;
        wire::application_from_response(&body, client_id)
    }

    /// Looks up the client secret registered for an application.
    pub async fn new_consumer_secret(&self, client_id: &str) -> Result<String, KeyManagerError> {
        let token = self.ensure_valid_access_token().await?;
        let application = self.get_application(&token, client_id).await?;
        client_secret_from(&application, client_id)
    }

    /// Raw application lookup, shared by retrieval, secret lookup and the
    /// client-credentials grant.
    pub(crate) async fn get_application(
        &self,
        token: &str,
        client_id: &str,
    ) -> Result<serde_json::Value, KeyManagerError> {
        let response = self
            .http()
            .get(self.config().url(CLIENTS_ENDPOINT))
            .bearer_auth(token)
            .send()
            .await?;

        let (status, body) = read_json(response).await?;
        if status != StatusCode::OK {
            return Err(report(KeyManagerError::rejection(status, body.to_string())));
        }
        debug!("Fetched client details for the consumer key {}", client_id);
        Ok(body)
    }
}

/// Extracts the client secret from an application record.
pub(crate) fn client_secret_from(
    application: &serde_json::Value,
    client_id: &str,
) -> Result<String, KeyManagerError> {
    application
        .get("client_secret")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            report(KeyManagerError::ResponseFormat(format!(
                "Failed to retrieve client secret for the client {}.",
                client_id
            )))
        })
}
