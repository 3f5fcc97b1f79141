//! Provider adapters for the upstream news APIs.
//!
//! Every adapter implements [`NewsProvider`], translating a generic
//! [`QueryDescriptor`] into its provider's query vocabulary and mapping the
//! provider's response into [`Article`](crate::models::Article)s.
//!
//! | Provider | Module | Endpoints |
//! |----------|--------|-----------|
//! | NewsAPI | [`newsapi`] | `/top-headlines`, `/everything`, `/top-headlines/sources` |
//! | The Guardian | [`guardian`] | `/search`, `/sections` |
//! | The New York Times | [`nyt`] | article search, most popular, section list |
//!
//! URL building and response mapping are pure functions in each module; only
//! [`NewsProvider::query`] and [`NewsProvider::sections`] touch the network.
//! Adapters never retry: failures go back to the caller, which decides how to
//! isolate them.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::{ProviderResult, QueryDescriptor, SectionInfo};
use crate::utils::truncate_for_log;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};
use url::Url;

pub mod guardian;
pub mod newsapi;
pub mod nyt;

pub use guardian::GuardianProvider;
pub use newsapi::NewsApiProvider;
pub use nyt::NytProvider;

#[async_trait]
pub trait NewsProvider: Send + Sync {
    /// Source label from the catalog (e.g. `"The Guardian"`).
    fn name(&self) -> &str;

    /// Fetch one page of normalized articles.
    async fn query(&self, query: &QueryDescriptor) -> Result<ProviderResult>;

    /// Sections, topics or outlets the provider exposes.
    async fn sections(&self) -> Result<Vec<SectionInfo>>;
}

/// The three built-in providers, in catalog order.
pub fn default_providers(config: &Config) -> Result<Vec<Arc<dyn NewsProvider>>> {
    Ok(vec![
        Arc::new(NewsApiProvider::new(config)?),
        Arc::new(GuardianProvider::new(config)?),
        Arc::new(NytProvider::new(config)?),
    ])
}

/// HTTP plumbing shared by the adapters: one client, one base URL and an API
/// key appended as a query parameter.
#[derive(Debug, Clone)]
pub(crate) struct ApiClient {
    provider: &'static str,
    client: reqwest::Client,
    base_url: String,
    key_param: &'static str,
    api_key: Option<String>,
}

impl ApiClient {
    pub(crate) fn new(
        provider: &'static str,
        config: &Config,
        base_url: &str,
        key_param: &'static str,
        api_key: Option<String>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            provider,
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            key_param,
            api_key,
        })
    }

    /// Build `{base}{path}?{params}` without the credential.
    pub(crate) fn endpoint(&self, path: &str, params: &[(&str, String)]) -> Result<Url> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, path))?;
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// GET `url` with the API key attached and return the body.
    ///
    /// Non-success statuses become [`Error::Status`]; the body is only logged.
    pub(crate) async fn get(&self, mut url: Url) -> Result<String> {
        let key = self.api_key.as_deref().ok_or_else(|| Error::Api {
            provider: self.provider.to_string(),
            message: "no API key configured".to_string(),
        })?;
        debug!(provider = self.provider, %url, "Requesting");
        url.query_pairs_mut().append_pair(self.key_param, key);

        let t0 = Instant::now();
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        let elapsed_ms = t0.elapsed().as_millis() as u64;

        if !status.is_success() {
            warn!(
                provider = self.provider,
                %status,
                elapsed_ms,
                body = %truncate_for_log(&body, 300),
                "Request failed"
            );
            return Err(Error::Status {
                provider: self.provider.to_string(),
                status,
            });
        }
        debug!(provider = self.provider, bytes = body.len(), elapsed_ms, "Response received");
        Ok(body)
    }
}

pub(crate) fn api_error(provider: &str, message: Option<String>) -> Error {
    Error::Api {
        provider: provider.to_string(),
        message: message.unwrap_or_else(|| "unknown error".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QueryDescriptor;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve one canned HTTP response on 127.0.0.1 and hand back the base URL
    /// plus the request line the client sent.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request: Vec<u8> = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\
                 Connection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            String::from_utf8_lossy(&request)
                .lines()
                .next()
                .unwrap_or_default()
                .to_string()
        });
        (base, handle)
    }

    fn client(base: &str) -> ApiClient {
        ApiClient::new("Test", &Config::default(), base, "api-key", None).unwrap()
    }

    #[test]
    fn test_endpoint_joins_base_and_path() {
        let url = client("https://example.com/v2/")
            .endpoint("/search", &[("q", "rust lang".to_string())])
            .unwrap();
        assert_eq!(url.as_str(), "https://example.com/v2/search?q=rust+lang");
    }

    #[test]
    fn test_endpoint_without_params_has_no_query() {
        let url = client("https://example.com").endpoint("/sections", &[]).unwrap();
        assert_eq!(url.query(), None);
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_network() {
        let api = client("https://example.invalid");
        let url = api.endpoint("/search", &[]).unwrap();
        let err = api.get(url).await.unwrap_err();
        assert!(matches!(err, Error::Api { .. }));
    }

    #[test]
    fn test_default_providers_in_catalog_order() {
        let providers = default_providers(&Config::default()).unwrap();
        let names: Vec<&str> = providers.iter().map(|p| p.name()).collect();
        assert_eq!(
            names,
            vec![
                crate::catalog::NEWSAPI,
                crate::catalog::GUARDIAN,
                crate::catalog::NYTIMES
            ]
        );
    }

    #[tokio::test]
    async fn test_error_status_is_reported_and_key_is_sent() {
        let (base, request) = serve_once("503 Service Unavailable", "upstream down").await;
        let config = Config {
            guardian_base_url: base,
            guardian_key: Some("k".to_string()),
            ..Config::default()
        };
        let provider = GuardianProvider::new(&config).unwrap();

        let err = provider.query(&QueryDescriptor::default()).await.unwrap_err();
        match err {
            Error::Status { provider, status } => {
                assert_eq!(provider, crate::catalog::GUARDIAN);
                assert_eq!(status, reqwest::StatusCode::SERVICE_UNAVAILABLE);
            }
            other => panic!("expected status error, got {other:?}"),
        }

        let request_line = request.await.unwrap();
        assert!(request_line.starts_with("GET /search?page-size=10&page=1"));
        assert!(request_line.contains("&api-key=k "));
    }

    #[tokio::test]
    async fn test_fault_payload_with_ok_status_is_api_error() {
        let body = r#"{"fault":{"faultstring":"Invalid ApiKey"}}"#;
        let (base, request) = serve_once("200 OK", body).await;
        let config = Config {
            nyt_base_url: base,
            nyt_key: Some("k".to_string()),
            ..Config::default()
        };
        let provider = NytProvider::new(&config).unwrap();

        let err = provider.query(&QueryDescriptor::default()).await.unwrap_err();
        assert!(
            matches!(&err, Error::Api { message, .. } if message == "Invalid ApiKey"),
            "unexpected error {err:?}"
        );
        assert!(request.await.unwrap().starts_with("GET /search/v2/articlesearch.json?page=0"));
    }

    #[tokio::test]
    async fn test_successful_query_decodes_articles() {
        let body = r#"{"response":{"status":"ok","total":7,"results":[
            {"id":"science/x","webTitle":"X","webUrl":"https://g/x",
             "webPublicationDate":"2024-03-15T02:00:00Z"}]}}"#;
        let (base, _request) = serve_once("200 OK", body).await;
        let config = Config {
            guardian_base_url: base,
            guardian_key: Some("k".to_string()),
            ..Config::default()
        };
        let result = GuardianProvider::new(&config)
            .unwrap()
            .query(&QueryDescriptor::default())
            .await
            .unwrap();
        assert_eq!(result.total_results, 7);
        assert_eq!(result.articles[0].id, "guardian-science/x-0");
    }
}
