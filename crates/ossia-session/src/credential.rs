//! Bearer credential sources.
//!
//! The session never owns the token. It asks a [`CredentialProvider`] for the
//! current value right before each request; whatever login flow issued the
//! token is responsible for writing it.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use reqwest::cookie::{CookieStore, Jar};
use url::Url;

use crate::config::ClientConfig;
use crate::error::ConfigError;

/// An opaque bearer token. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Empty strings are not credentials.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub(crate) fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Synchronous read of "current token, if any".
pub trait CredentialProvider: Send + Sync {
    fn credential(&self) -> Option<Credential>;
}

/// In-memory credential slot, cheap to clone. All clones see the same token.
#[derive(Clone, Default)]
pub struct SharedCredential {
    slot: Arc<RwLock<Option<Credential>>>,
}

impl SharedCredential {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let shared = Self::new();
        shared.set(token);
        shared
    }

    pub fn set(&self, token: impl Into<String>) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Credential::new(token);
    }

    pub fn clear(&self) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl CredentialProvider for SharedCredential {
    fn credential(&self) -> Option<Credential> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Reads the token from a named cookie in a shared cookie jar, the way the
/// browser client keeps it in `access_token`.
#[derive(Clone)]
pub struct CookieCredential {
    jar: Arc<Jar>,
    url: Url,
    name: String,
}

impl CookieCredential {
    pub fn new(jar: Arc<Jar>, url: Url, name: impl Into<String>) -> Self {
        Self {
            jar,
            url,
            name: name.into(),
        }
    }

    /// Read `config.credential_cookie` as sent to the API base.
    pub fn from_config(jar: Arc<Jar>, config: &ClientConfig) -> Result<Self, ConfigError> {
        let url = config.api_base().map_err(|e| ConfigError::UrlParse {
            url: format!("{}{}", config.base_url, config.api_endpoint),
            message: e.to_string(),
        })?;
        Ok(Self::new(jar, url, config.credential_cookie.clone()))
    }

    pub fn jar(&self) -> &Arc<Jar> {
        &self.jar
    }
}

impl CredentialProvider for CookieCredential {
    fn credential(&self) -> Option<Credential> {
        let header = self.jar.cookies(&self.url)?;
        let header = header.to_str().ok()?;
        header
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.name)
            .and_then(|(_, value)| Credential::new(value))
    }
}
