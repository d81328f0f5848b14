//! NAM connection configuration

use crate::error::KeyManagerError;
use confique::Config;

/// Connection settings for a NetIQ Access Manager instance.
///
/// Supplied by the host platform; the adapter only reads from it. The
/// service account and service client credentials are used for the
/// password grant that authenticates registration calls.
#[derive(Debug, Config, Clone, Default)]
pub struct NamConfig {
    /// Base URL of the NAM instance, e.g. "https://nam.example.com"
    #[config(env = "NAM_BASE_URL", default = "")]
    pub base_url: String,

    /// Service account username for the password grant
    #[config(env = "NAM_USERNAME", default = "")]
    pub username: String,

    /// Service account password for the password grant
    #[config(env = "NAM_PASSWORD", default = "")]
    pub password: String,

    /// Client id of the registered service client
    #[config(env = "NAM_CLIENT_ID", default = "")]
    pub client_id: String,

    /// Client secret of the registered service client
    #[config(env = "NAM_CLIENT_SECRET", default = "")]
    pub client_secret: String,
}

impl NamConfig {
    /// Loads the configuration from environment variables.
    pub fn from_env() -> Result<Self, KeyManagerError> {
        Self::builder()
            .env()
            .load()
            .map_err(|e| KeyManagerError::Config(e.to_string()))
    }

    /// Returns a properly formatted URL on the NAM instance for the given path.
    pub fn url<S: AsRef<str>>(&self, path: S) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.as_ref();
        if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        }
    }

    /// Checks that every field the password grant needs is present.
    ///
    /// Reports the first missing field, before any network call is made.
    pub fn validate_password_grant(&self) -> Result<(), KeyManagerError> {
        for (value, name) in [
            (&self.username, "username"),
            (&self.password, "password"),
            (&self.client_id, "client_id"),
            (&self.client_secret, "client_secret"),
        ] {
            if value.is_empty() {
                return Err(KeyManagerError::Config(format!(
                    "Mandatory parameter {} is missing in configuration.",
                    name
                )));
            }
        }
        Ok(())
    }

    #[cfg(test)]
    pub fn for_test_with_mock(server: &wiremock::MockServer) -> Self {
        Self {
            base_url: server.uri(),
            username: "svc-account".to_string(),
            password: "svc-password".to_string(),
            client_id: "svc-client".to_string(),
            client_secret: "svc-secret".to_string(),
        }
    }
}
