use async_trait::async_trait;
use reqwest::{Client, header::AUTHORIZATION};
use tracing::{debug, warn};

use crate::config::BigFixSettings;
use crate::domain::query::QueryResponse;
use crate::error::{AppError, AppResult};
use crate::infra::basic_auth_header;
use crate::services::ActionSource;

pub struct BigFixClient {
    http: Client,
    base_url: String,
    auth: String,
}

impl BigFixClient {
    pub fn new(http: Client, settings: &BigFixSettings) -> Self {
        Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            auth: basic_auth_header(&settings.username, settings.password.expose()),
        }
    }

    fn login_endpoint(&self) -> String {
        format!("{}/api/login", self.base_url)
    }

    fn query_endpoint(&self) -> String {
        format!("{}/api/query", self.base_url)
    }

    async fn login(&self) -> AppResult<()> {
        let url = self.login_endpoint();
        let response = self
            .http
            .get(&url)
            .header(AUTHORIZATION, &self.auth)
            .send()
            .await
            .map_err(|err| AppError::Source(format!("failed to reach BigFix at {url}: {err}")))?;

        let status = response.status();
        if status.is_success() {
            debug!(%status, "BigFix login accepted");
        } else {
            warn!(%status, "BigFix login was not accepted, continuing with the query");
        }
        Ok(())
    }
}

#[async_trait]
impl ActionSource for BigFixClient {
    async fn run_query(&self, relevance: &str) -> AppResult<QueryResponse> {
        self.login().await?;

        let url = self.query_endpoint();
        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, &self.auth)
            .form(&[("relevance", relevance), ("output", "json")])
            .send()
            .await
            .map_err(|err| AppError::Source(format!("failed to call BigFix query: {err}")))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|err| AppError::Source(format!("failed to read BigFix answer: {err}")))?;

        Ok(QueryResponse { url, status, body })
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;
    use std::time::Duration;

    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::{HttpSettings, Secret};
    use crate::infra::http_client;

    fn client_at(base_url: String, timeout: Duration) -> BigFixClient {
        let http = http_client(&HttpSettings {
            accept_invalid_certs: false,
            timeout,
        })
        .unwrap();
        BigFixClient::new(
            http,
            &BigFixSettings {
                base_url,
                username: "bfuser".to_string(),
                password: Secret::new("bfpass"),
            },
        )
    }

    fn client_for(server: &MockServer) -> BigFixClient {
        client_at(format!("{}/", server.uri()), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn logs_in_then_posts_form_query() {
        let server = MockServer::start().await;
        let auth = basic_auth_header("bfuser", "bfpass");

        Mock::given(method("GET"))
            .and(path("/api/login"))
            .and(header("authorization", auth.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/query"))
            .and(header("authorization", auth.as_str()))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("output=json"))
            .and(body_string_contains("relevance=names+of+bes+computers"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"result": []}"#))
            .expect(1)
            .mount(&server)
            .await;

        let response = client_for(&server)
            .run_query("names of bes computers")
            .await
            .unwrap();

        assert!(response.is_success());
        assert_eq!(response.body, r#"{"result": []}"#);
        assert!(response.url.ends_with("/api/query"));
    }

    #[tokio::test]
    async fn returns_error_status_as_response() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/login"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/query"))
            .respond_with(ResponseTemplate::new(500).set_body_string("relevance error"))
            .mount(&server)
            .await;

        let response = client_for(&server).run_query("bad query").await.unwrap();

        assert!(!response.is_success());
        assert_eq!(response.status, 500);
        assert_eq!(response.body, "relevance error");
    }

    #[tokio::test]
    async fn unreachable_server_is_source_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        let client = client_at(format!("http://127.0.0.1:{port}"), Duration::from_secs(5));

        let err = client.run_query("names of bes computers").await.unwrap_err();
        assert!(matches!(err, AppError::Source(_)));
    }

    #[tokio::test]
    async fn slow_query_times_out_as_source_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/login"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/query"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"result": []}"#)
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let client = client_at(server.uri(), Duration::from_secs(1));
        let err = client.run_query("names of bes computers").await.unwrap_err();

        assert!(matches!(err, AppError::Source(ref msg) if msg.contains("BigFix query")));
    }
}
