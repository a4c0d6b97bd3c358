// file: src/client/http.rs
// description: reqwest-backed transport with basic or bearer authentication
// reference: https://developer.atlassian.com/cloud/confluence/basic-auth-for-rest-apis/

use super::Transport;
use crate::config::ServiceConfig;
use crate::error::{ApiError, Result};
use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderValue};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    service: &'static str,
    base_url: String,
    username: String,
    api_token: String,
}

impl HttpTransport {
    pub fn new(service: &'static str, config: &ServiceConfig, timeout: Duration) -> Result<Self> {
        if !config.is_configured() {
            return Err(ApiError::Config(format!("{} base_url is not set", service)));
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ApiError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            service,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            api_token: config.api_token.clone(),
        })
    }
}

impl Transport for HttpTransport {
    fn service(&self) -> &'static str {
        self.service
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} GET {} {:?}", self.service, path, query);

        let mut request = self
            .client
            .get(&url)
            .query(query)
            .header(ACCEPT, HeaderValue::from_static("application/json"));

        // Cloud uses email + API token; Server/Data Center personal tokens go as bearer
        request = match (self.username.is_empty(), self.api_token.is_empty()) {
            (false, _) => request.basic_auth(&self.username, Some(&self.api_token)),
            (true, false) => request.bearer_auth(&self.api_token),
            (true, true) => request,
        };

        let response = request.send().await.map_err(|e| {
            error!("{} request to {} failed: {}", self.service, path, e);
            ApiError::Transport {
                service: self.service,
                message: e.to_string(),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let err = ApiError::from_status(self.service, status, path);
            error!(status = status.as_u16(), "{}", err);
            return Err(err);
        }

        response.json::<Value>().await.map_err(|e| ApiError::Decode {
            service: self.service,
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn service_config(base_url: &str) -> ServiceConfig {
        ServiceConfig {
            base_url: base_url.to_string(),
            username: "bot@example.com".to_string(),
            api_token: "token".to_string(),
        }
    }

    fn transport(server: &MockServer) -> HttpTransport {
        HttpTransport::new("Confluence", &service_config(&server.uri()), Duration::from_secs(5))
            .unwrap()
    }

    #[tokio::test]
    async fn test_get_json_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/api/content/1"))
            .and(query_param("expand", "metadata.labels"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "1"})))
            .expect(1)
            .mount(&server)
            .await;

        let value = transport(&server)
            .get_json(
                "/rest/api/content/1",
                &[("expand", "metadata.labels".to_string())],
            )
            .await
            .unwrap();
        assert_eq!(value["id"], "1");
    }

    #[tokio::test]
    async fn test_status_codes_are_classified() {
        let server = MockServer::start().await;
        for (route, status) in [("/a", 401u16), ("/b", 403), ("/c", 404), ("/d", 500)] {
            Mock::given(method("GET"))
                .and(path(route))
                .respond_with(ResponseTemplate::new(status))
                .mount(&server)
                .await;
        }

        let t = transport(&server);
        assert!(matches!(
            t.get_json("/a", &[]).await,
            Err(ApiError::Unauthorized { .. })
        ));
        assert!(matches!(
            t.get_json("/b", &[]).await,
            Err(ApiError::Forbidden { .. })
        ));
        assert!(matches!(
            t.get_json("/c", &[]).await,
            Err(ApiError::NotFound { .. })
        ));
        assert!(matches!(
            t.get_json("/d", &[]).await,
            Err(ApiError::Status { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let t = HttpTransport::new(
            "Jira",
            &service_config("http://127.0.0.1:9"),
            Duration::from_secs(2),
        )
        .unwrap();
        assert!(matches!(
            t.get_json("/rest/api/2/project", &[]).await,
            Err(ApiError::Transport { service: "Jira", .. })
        ));
    }

    #[test]
    fn test_unconfigured_service_is_rejected() {
        let err = HttpTransport::new("Jira", &ServiceConfig::default(), Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }
}
