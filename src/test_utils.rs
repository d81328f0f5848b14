use crate::client::NamClient;
use crate::config::NamConfig;
use log::LevelFilter;
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Test fixture pairing a wiremock NAM server with a client configured
/// against it.
///
/// Mock helpers exist for the endpoints nearly every operation touches (the
/// password grant and introspection); individual tests mount their own mocks
/// for the endpoint under test. All helpers take an expected call count so
/// tests can pin down exactly how many grants or introspections an
/// operation performs.
pub struct TestFixture {
    pub server: MockServer,
    pub client: NamClient,
}

impl TestFixture {
    pub async fn new() -> Self {
        let _ = env_logger::builder()
            .filter_level(LevelFilter::Debug)
            .is_test(true)
            .try_init();

        let server = MockServer::start().await;
        let config = NamConfig::for_test_with_mock(&server);
        let client = NamClient::new(config);

        Self { server, client }
    }

    /// Mounts a successful password-grant response on the token endpoint.
    pub async fn mock_password_grant(
        &self,
        access_token: &str,
        refresh_token: Option<&str>,
        expect: u64,
    ) {
        let mut body = json!({ "access_token": access_token, "token_type": "bearer" });
        if let Some(refresh_token) = refresh_token {
            body.as_object_mut()
                .unwrap()
                .insert("refresh_token".to_string(), refresh_token.into());
        }
        Mock::given(method("POST"))
            .and(path("/nidp/oauth/nam/token"))
            .and(body_string_contains("grant_type=password"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(expect)
            .mount(&self.server)
            .await;
    }

    /// Mounts a failing response for any grant on the token endpoint.
    pub async fn mock_token_endpoint_error(&self, status: u16, body: &str) {
        Mock::given(method("POST"))
            .and(path("/nidp/oauth/nam/token"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    /// Mounts a successful introspection for the given bearer token.
    pub async fn mock_introspection_valid(&self, access_token: &str, expect: u64) {
        Mock::given(method("GET"))
            .and(path("/nidp/oauth/nam/tokeninfo"))
            .and(header("Authorization", format!("Bearer {}", access_token)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "exp": 3600,
                "scope": [],
                "user_id": "svc-account",
                "audience": "svc-client"
            })))
            .expect(expect)
            .mount(&self.server)
            .await;
    }

    /// Mounts a rejecting introspection for the given bearer token.
    pub async fn mock_introspection_rejected(&self, access_token: &str, status: u16, expect: u64) {
        Mock::given(method("GET"))
            .and(path("/nidp/oauth/nam/tokeninfo"))
            .and(header("Authorization", format!("Bearer {}", access_token)))
            .respond_with(ResponseTemplate::new(status))
            .expect(expect)
            .mount(&self.server)
            .await;
    }
}
