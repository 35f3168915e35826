//! Authenticated request dispatch.
//!
//! Every request goes through [`Dispatcher::send`], which reads the credential
//! slot exactly once and attaches `Authorization: Bearer <token>` when a token
//! is present. How a caller reacts to a failure (401 or otherwise) is up to the
//! caller; the dispatcher neither retries nor redirects.

use std::sync::Arc;

use http::header::{self, HeaderMap, HeaderName, HeaderValue};
use http::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::credential::CredentialProvider;
use crate::error::DispatchError;
use crate::transport::HttpClient;

/// Per-request options: method, query, headers and an optional JSON body.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub json_body: Option<serde_json::Value>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            query: Vec::new(),
            headers: HeaderMap::new(),
            json_body: None,
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn method(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, DispatchError> {
        self.json_body = Some(serde_json::to_value(body).map_err(DispatchError::Encode)?);
        Ok(self)
    }
}

/// A successful (2xx) response.
#[derive(Debug, Clone)]
pub struct DispatchResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl DispatchResponse {
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, DispatchError> {
        serde_json::from_slice(&self.body).map_err(DispatchError::Decode)
    }
}

pub struct Dispatcher<H> {
    client: H,
    config: Arc<ClientConfig>,
    credential: Arc<dyn CredentialProvider>,
}

impl<H: HttpClient> Dispatcher<H> {
    pub fn new(client: H, config: ClientConfig, credential: Arc<dyn CredentialProvider>) -> Self {
        Self {
            client,
            config: Arc::new(config),
            credential,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn client(&self) -> &H {
        &self.client
    }

    /// Send a request, returning the raw body of a 2xx response.
    pub async fn send(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<DispatchResponse, DispatchError> {
        let credential = self.credential.credential();
        let credential_sent = credential.is_some();

        let mut url = self
            .config
            .endpoint_url(path)
            .map_err(|message| DispatchError::InvalidUrl {
                path: path.to_string(),
                message,
            })?;
        if !options.query.is_empty() {
            url.query_pairs_mut().extend_pairs(options.query.iter());
        }

        let body = match &options.json_body {
            Some(value) => serde_json::to_vec(value).map_err(DispatchError::Encode)?,
            None => Vec::new(),
        };

        let mut request = http::Request::builder()
            .method(options.method.clone())
            .uri(url.as_str())
            .body(body)?;

        let headers = request.headers_mut();
        headers.extend(options.headers);
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        if options.json_body.is_some() {
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
        }
        if let Some(credential) = &credential {
            let mut value =
                HeaderValue::from_str(&credential.bearer()).map_err(DispatchError::InvalidCredential)?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }

        debug!(
            method = %options.method,
            path = %path,
            authenticated = credential_sent,
            "dispatching request"
        );

        let response = self
            .client
            .send_http(request)
            .await
            .map_err(DispatchError::Transport)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            warn!(path = %path, credential_sent, "request unauthorized");
            return Err(DispatchError::Unauthorized { credential_sent });
        }
        if !status.is_success() {
            warn!(path = %path, status = %status, "request failed");
            return Err(DispatchError::Status { status });
        }

        let (parts, body) = response.into_parts();
        Ok(DispatchResponse {
            status: parts.status,
            headers: parts.headers,
            body,
        })
    }

    /// Send a request and decode its JSON body.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, DispatchError> {
        self.send(path, options).await?.json()
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, DispatchError> {
        self.fetch(path, RequestOptions::get()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::SharedCredential;
    use crate::testing::{Reply, ScriptedClient};
    use serde_json::json;
    use url::Url;

    fn dispatcher(client: ScriptedClient, credential: SharedCredential) -> Dispatcher<ScriptedClient> {
        let config = ClientConfig::new(Url::parse("https://ossia.example").unwrap())
            .with_api_endpoint("/api");
        Dispatcher::new(client, config, Arc::new(credential))
    }

    #[tokio::test]
    async fn test_attaches_bearer_when_present() {
        let client = ScriptedClient::new();
        client.route("/api/me/", Reply::json(StatusCode::OK, json!({"ok": true})));
        let d = dispatcher(client.clone(), SharedCredential::with_token("tok"));

        let body: serde_json::Value = d.get("/me/").await.unwrap();
        assert_eq!(body, json!({"ok": true}));

        let requests = client.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].uri, "https://ossia.example/api/me/");
        assert_eq!(requests[0].authorization.as_deref(), Some("Bearer tok"));
    }

    #[tokio::test]
    async fn test_omits_header_without_credential() {
        let client = ScriptedClient::new();
        client.route("/api/me/", Reply::json(StatusCode::OK, json!({})));
        let d = dispatcher(client.clone(), SharedCredential::new());

        let _: serde_json::Value = d.get("/me/").await.unwrap();
        assert_eq!(client.requests()[0].authorization, None);
    }

    #[tokio::test]
    async fn test_credential_overrides_explicit_header() {
        let client = ScriptedClient::new();
        client.route("/api/me/", Reply::json(StatusCode::OK, json!({})));
        let d = dispatcher(client.clone(), SharedCredential::with_token("fresh"));

        let options = RequestOptions::get().header(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer stale"),
        );
        d.send("/me/", options).await.unwrap();
        assert_eq!(
            client.requests()[0].authorization.as_deref(),
            Some("Bearer fresh")
        );
    }

    #[tokio::test]
    async fn test_401_reports_whether_credential_was_sent() {
        let client = ScriptedClient::new();
        client.route("/api/me/", Reply::status(StatusCode::UNAUTHORIZED));

        let anonymous = dispatcher(client.clone(), SharedCredential::new());
        let err = anonymous.send("/me/", RequestOptions::get()).await.unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Unauthorized {
                credential_sent: false
            }
        ));

        let authed = dispatcher(client, SharedCredential::with_token("tok"));
        let err = authed.send("/me/", RequestOptions::get()).await.unwrap_err();
        assert!(err.should_redirect_to_login());
    }

    #[tokio::test]
    async fn test_non_success_status_is_typed() {
        let client = ScriptedClient::new();
        client.route("/api/creators/", Reply::status(StatusCode::SERVICE_UNAVAILABLE));
        let d = dispatcher(client, SharedCredential::with_token("tok"));

        let err = d.send("/creators/", RequestOptions::get()).await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::SERVICE_UNAVAILABLE));
        assert!(!err.should_redirect_to_login());
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let client = ScriptedClient::new();
        client.route("/api/me/", Reply::transport("connection reset"));
        let d = dispatcher(client, SharedCredential::new());

        let err = d.send("/me/", RequestOptions::get()).await.unwrap_err();
        assert!(matches!(err, DispatchError::Transport(_)));
    }

    #[tokio::test]
    async fn test_decode_failure() {
        let client = ScriptedClient::new();
        client.route("/api/me/", Reply::raw(StatusCode::OK, b"<html>".to_vec()));
        let d = dispatcher(client, SharedCredential::new());

        let err = d.get::<serde_json::Value>("/me/").await.unwrap_err();
        assert!(matches!(err, DispatchError::Decode(_)));
        assert_eq!(err.status(), None);
    }

    #[tokio::test]
    async fn test_options_bag() {
        let client = ScriptedClient::new();
        client.route("/api/creators/", Reply::json(StatusCode::CREATED, json!({"id": "c9"})));
        let d = dispatcher(client.clone(), SharedCredential::with_token("tok"));

        let options = RequestOptions::method(Method::POST)
            .query("dry_run", "true")
            .json(&json!({"display_name": "New"}))
            .unwrap();
        let created: serde_json::Value = d.fetch("/creators/", options).await.unwrap();
        assert_eq!(created["id"], "c9");

        let request = &client.requests()[0];
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.uri, "https://ossia.example/api/creators/?dry_run=true");
        assert_eq!(request.content_type.as_deref(), Some("application/json"));
        assert_eq!(request.body, br#"{"display_name":"New"}"#.to_vec());
    }

    #[tokio::test]
    async fn test_rejects_absolute_paths() {
        let client = ScriptedClient::new();
        let d = dispatcher(client.clone(), SharedCredential::with_token("tok"));

        let err = d
            .send("https://evil.example/steal", RequestOptions::get())
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::InvalidUrl { .. }));
        assert!(client.requests().is_empty());
    }
}
