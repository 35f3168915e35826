use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

/// Connection settings for the API the session talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Site origin, e.g. `https://ossia.example`
    pub base_url: Url,
    /// Path prefix of the API under the origin, e.g. `/api`. May be empty.
    pub api_endpoint: String,
    /// Where the viewer is sent when an authenticated request is rejected.
    pub login_path: String,
    /// Name of the cookie holding the bearer token.
    pub credential_cookie: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ClientConfig {
    pub const DEFAULT_LOGIN_PATH: &'static str = "/me/login";
    pub const DEFAULT_CREDENTIAL_COOKIE: &'static str = "access_token";
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            api_endpoint: String::new(),
            login_path: Self::DEFAULT_LOGIN_PATH.to_string(),
            credential_cookie: Self::DEFAULT_CREDENTIAL_COOKIE.to_string(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    pub fn with_api_endpoint(mut self, api_endpoint: impl Into<String>) -> Self {
        self.api_endpoint = api_endpoint.into();
        self
    }

    pub fn with_login_path(mut self, login_path: impl Into<String>) -> Self {
        self.login_path = login_path.into();
        self
    }

    pub fn with_credential_cookie(mut self, credential_cookie: impl Into<String>) -> Self {
        self.credential_cookie = credential_cookie.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `OSSIA_BASE_URL`: Site origin
    ///
    /// Optional env vars:
    /// - `OSSIA_API_ENDPOINT`: API path prefix (default: empty)
    /// - `OSSIA_LOGIN_PATH`: Login entry point (default: `/me/login`)
    /// - `OSSIA_CREDENTIAL_COOKIE`: Token cookie name (default: `access_token`)
    /// - `OSSIA_TIMEOUT_SECS`: Request timeout in seconds (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&'static str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let base_str = lookup("OSSIA_BASE_URL").ok_or(ConfigError::MissingEnv {
            var: "OSSIA_BASE_URL",
        })?;
        let base_url = Url::parse(&base_str).map_err(|e| ConfigError::UrlParse {
            url: base_str,
            message: e.to_string(),
        })?;

        let mut config = Self::new(base_url);
        if let Some(endpoint) = lookup("OSSIA_API_ENDPOINT") {
            config.api_endpoint = endpoint;
        }
        if let Some(login_path) = lookup("OSSIA_LOGIN_PATH") {
            config.login_path = login_path;
        }
        if let Some(cookie) = lookup("OSSIA_CREDENTIAL_COOKIE") {
            if cookie.is_empty() {
                return Err(ConfigError::InvalidValue {
                    var: "OSSIA_CREDENTIAL_COOKIE",
                    message: "cookie name must not be empty".to_string(),
                });
            }
            config.credential_cookie = cookie;
        }
        if let Some(secs) = lookup("OSSIA_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidValue {
                    var: "OSSIA_TIMEOUT_SECS",
                    message: e.to_string(),
                }
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Origin plus API prefix, always ending in `/` so relative paths join
    /// underneath it.
    pub fn api_base(&self) -> Result<Url, url::ParseError> {
        let origin = self.base_url.as_str().trim_end_matches('/');
        let endpoint = self.api_endpoint.trim_matches('/');
        if endpoint.is_empty() {
            Url::parse(&format!("{origin}/"))
        } else {
            Url::parse(&format!("{origin}/{endpoint}/"))
        }
    }

    /// Resolve a request path such as `/me/` against [`Self::api_base`].
    ///
    /// Absolute URLs, scheme-relative paths and `..` segments that climb out
    /// of the API prefix are refused, so the resolved URL always sits under
    /// the API base.
    pub fn endpoint_url(&self, path: &str) -> Result<Url, String> {
        if path.contains("://") || path.starts_with("//") {
            return Err("path must be relative to the API base".to_string());
        }
        let base = self.api_base().map_err(|e| e.to_string())?;
        let url = base
            .join(path.trim_start_matches('/'))
            .map_err(|e| e.to_string())?;
        if !url.as_str().starts_with(base.as_str()) {
            return Err("path escapes the API base".to_string());
        }
        Ok(url)
    }

    /// Absolute URL of the login entry point.
    pub fn login_url(&self) -> Result<Url, url::ParseError> {
        self.base_url.join(&self.login_path)
    }
}
