//! Error types for the session client.

use http::StatusCode;
use http::header::InvalidHeaderValue;
use miette::Diagnostic;
use thiserror::Error;

/// Coarse classification of a dispatch failure.
///
/// The session store only cares whether a failure was an authorization
/// rejection; everything else collapses into "fetch failed".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// HTTP 401
    Unauthorized,
    /// Any other non-2xx status
    HttpStatus,
    /// Network, timeout, decode or request construction failure
    Transport,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Unauthorized => "unauthorized",
            FailureKind::HttpStatus => "http_status",
            FailureKind::Transport => "transport",
        }
    }
}

/// Errors surfaced by [`crate::Dispatcher`].
#[derive(Debug, Error, Diagnostic)]
pub enum DispatchError {
    #[error("request was rejected as unauthorized")]
    #[diagnostic(
        code(ossia::dispatch::unauthorized),
        help("the access token is missing, invalid or expired")
    )]
    Unauthorized {
        /// Whether a bearer credential was attached to the rejected request.
        credential_sent: bool,
    },

    #[error("request failed with status {status}")]
    #[diagnostic(code(ossia::dispatch::status))]
    Status { status: StatusCode },

    #[error("transport failure")]
    #[diagnostic(code(ossia::dispatch::transport))]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),

    #[error("failed to decode response body")]
    #[diagnostic(code(ossia::dispatch::decode))]
    Decode(#[source] serde_json::Error),

    #[error("failed to encode request body")]
    #[diagnostic(code(ossia::dispatch::encode))]
    Encode(#[source] serde_json::Error),

    #[error("invalid request path {path:?}: {message}")]
    #[diagnostic(code(ossia::dispatch::url))]
    InvalidUrl { path: String, message: String },

    #[error("credential is not a valid header value")]
    #[diagnostic(code(ossia::dispatch::credential))]
    InvalidCredential(#[source] InvalidHeaderValue),

    #[error("failed to build request")]
    #[diagnostic(code(ossia::dispatch::request))]
    Request(#[from] http::Error),
}

impl DispatchError {
    /// HTTP status of the failed response, if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            DispatchError::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED),
            DispatchError::Status { status } => Some(*status),
            _ => None,
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            DispatchError::Unauthorized { .. } => FailureKind::Unauthorized,
            DispatchError::Status { .. } => FailureKind::HttpStatus,
            _ => FailureKind::Transport,
        }
    }

    /// A 401 only sends the viewer to the login page when a credential was
    /// actually presented; anonymous 401s are expected.
    pub fn should_redirect_to_login(&self) -> bool {
        matches!(
            self,
            DispatchError::Unauthorized {
                credential_sent: true
            }
        )
    }
}

/// Configuration errors
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("missing required environment variable: {var}")]
    #[diagnostic(code(config::missing_env))]
    MissingEnv { var: &'static str },

    #[error("invalid URL {url}: {message}")]
    #[diagnostic(code(config::url_parse))]
    UrlParse { url: String, message: String },

    #[error("invalid value for {var}: {message}")]
    #[diagnostic(code(config::invalid_value))]
    InvalidValue { var: &'static str, message: String },

    #[error("failed to build HTTP client")]
    #[diagnostic(code(config::http_client))]
    HttpClient(#[source] reqwest::Error),
}
