//! Client-side session state for the ossia web API.
//!
//! A [`SessionStore`] tracks whether the current viewer is authenticated, holds
//! their profile and the creators they own, and keeps a url index over those
//! creators. All network access goes through a [`Dispatcher`], which attaches
//! the bearer credential from a [`CredentialProvider`] to every request.
//!
//! ```ignore
//! use std::sync::Arc;
//! use ossia_session::{ClientConfig, NoopNavigator, ReqwestClient, SessionStore, SharedCredential};
//!
//! let config = ClientConfig::from_env()?;
//! let client = ReqwestClient::new(&config)?;
//! let store = SessionStore::from_parts(
//!     client,
//!     config,
//!     Arc::new(SharedCredential::with_token(token)),
//!     Arc::new(NoopNavigator),
//! );
//! store.refresh_all().await;
//! if let Some(creator) = store.lookup_creator_by_url("alice-music") { /* ... */ }
//! ```

pub mod config;
pub mod credential;
pub mod dispatch;
pub mod error;
pub mod model;
pub mod navigation;
pub mod state;
pub mod store;
pub mod telemetry;
pub mod transport;

#[cfg(test)]
mod testing;

pub use crate::config::ClientConfig;
pub use crate::credential::{CookieCredential, Credential, CredentialProvider, SharedCredential};
pub use crate::dispatch::{DispatchResponse, Dispatcher, RequestOptions};
pub use crate::error::{ConfigError, DispatchError, FailureKind};
pub use crate::model::{CreatorRecord, UserCreators, UserProfile, ViewerIdentity};
pub use crate::navigation::{ChannelNavigator, NavigationRequest, Navigator, NoopNavigator};
pub use crate::state::{CreatorIndex, SessionState};
pub use crate::store::{CREATORS_PATH, PROFILE_PATH, SessionStore};
pub use crate::transport::{HttpClient, ReqwestClient, TransportError};
