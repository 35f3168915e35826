use std::future::Future;

use crate::config::ClientConfig;
use crate::error::ConfigError;

pub type TransportError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Minimal HTTP seam: one request in, one response out.
///
/// Non-2xx responses are not errors at this level; only failures to get a
/// response at all are.
pub trait HttpClient: Send + Sync {
    fn send_http(
        &self,
        request: http::Request<Vec<u8>>,
    ) -> impl Future<Output = Result<http::Response<Vec<u8>>, TransportError>> + Send;
}

/// reqwest-backed [`HttpClient`].
#[derive(Clone, Default)]
pub struct ReqwestClient {
    pub client: reqwest::Client,
}

impl ReqwestClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ConfigError::HttpClient)?;
        Ok(Self { client })
    }
}

impl From<reqwest::Client> for ReqwestClient {
    fn from(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl HttpClient for ReqwestClient {
    async fn send_http(
        &self,
        request: http::Request<Vec<u8>>,
    ) -> Result<http::Response<Vec<u8>>, TransportError> {
        let response = self.client.execute(request.try_into()?).await?;
        let mut builder = http::Response::builder().status(response.status());
        for (k, v) in response.headers() {
            builder = builder.header(k, v);
        }
        builder
            .body(response.bytes().await?.to_vec())
            .map_err(Into::into)
    }
}
