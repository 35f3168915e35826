//! The session store: single source of truth for who is viewing.
//!
//! Two independent tracks live in one [`SessionState`]:
//! - identity, refreshed from `GET /me/`
//! - creators (plus the derived url index), refreshed from `GET /creators/`
//!
//! A refresh never returns an error. Failures reset the track they belong to,
//! and a 401 on a request that carried a credential additionally asks the
//! [`Navigator`] to go to the login page.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::credential::CredentialProvider;
use crate::dispatch::Dispatcher;
use crate::error::DispatchError;
use crate::model::{CreatorRecord, UserCreators, UserProfile, ViewerIdentity};
use crate::navigation::Navigator;
use crate::state::SessionState;
use crate::telemetry::record_refresh;
use crate::transport::HttpClient;
use crate::ClientConfig;

pub const PROFILE_PATH: &str = "/me/";
pub const CREATORS_PATH: &str = "/creators/";

/// Handle to the session. Clones share the same state, so pass it around as
/// a context object rather than keeping a global.
pub struct SessionStore<H> {
    dispatcher: Arc<Dispatcher<H>>,
    navigator: Arc<dyn Navigator>,
    state: Arc<watch::Sender<SessionState>>,
}

impl<H> Clone for SessionStore<H> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: self.dispatcher.clone(),
            navigator: self.navigator.clone(),
            state: self.state.clone(),
        }
    }
}

impl<H: HttpClient> SessionStore<H> {
    /// Starts unauthorized with no creators loaded.
    pub fn new(dispatcher: Dispatcher<H>, navigator: Arc<dyn Navigator>) -> Self {
        let (state, _) = watch::channel(SessionState::new());
        Self {
            dispatcher: Arc::new(dispatcher),
            navigator,
            state: Arc::new(state),
        }
    }

    pub fn from_parts(
        client: H,
        config: ClientConfig,
        credential: Arc<dyn CredentialProvider>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self::new(Dispatcher::new(client, config, credential), navigator)
    }

    pub fn dispatcher(&self) -> &Dispatcher<H> {
        &self.dispatcher
    }

    /// Fetch the viewer's profile and update the identity track.
    pub async fn refresh_profile(&self) {
        match self.dispatcher.get::<UserProfile>(PROFILE_PATH).await {
            Ok(profile) => {
                let identity = ViewerIdentity::from(profile);
                info!(user_id = %identity.id, username = %identity.username, "viewer authorized");
                self.state.send_if_modified(|s| s.set_identity(identity));
                record_refresh("profile", "ok");
            }
            Err(err) => {
                self.state.send_if_modified(SessionState::clear_identity);
                self.on_failure("profile", &err);
            }
        }
    }

    /// Fetch the viewer's creators, replacing the list and index wholesale.
    pub async fn refresh_creators(&self) {
        match self.dispatcher.get::<UserCreators>(CREATORS_PATH).await {
            Ok(body) => {
                info!(count = body.creators.len(), "creators loaded");
                self.state
                    .send_if_modified(|s| s.set_creators(Some(body.creators)));
                record_refresh("creators", "ok");
            }
            Err(err) => {
                self.state.send_if_modified(|s| s.set_creators(None));
                self.on_failure("creators", &err);
            }
        }
    }

    /// Run both refreshes concurrently. They touch disjoint state.
    pub async fn refresh_all(&self) {
        futures_util::future::join(self.refresh_profile(), self.refresh_creators()).await;
    }

    fn on_failure(&self, op: &'static str, err: &DispatchError) {
        warn!(op, error = %err, status = ?err.status(), "refresh failed, session track reset");
        record_refresh(op, err.kind().as_str());
        if err.should_redirect_to_login() {
            let login_path = &self.dispatcher.config().login_path;
            info!(op, path = %login_path, "credential rejected, redirecting to login");
            self.navigator.goto_login(login_path);
        }
    }
}

impl<H> SessionStore<H> {
    /// Put the session back into its initial unauthorized, unloaded state.
    pub fn reset(&self) {
        self.state.send_if_modified(SessionState::reset);
    }

    /// Observe state changes. The receiver sees whole transitions only.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn is_authorized(&self) -> bool {
        self.state.borrow().is_authorized()
    }

    pub fn identity(&self) -> Option<ViewerIdentity> {
        self.state.borrow().identity().cloned()
    }

    /// `None` when creators are not loaded; `Some(vec![])` when the viewer
    /// has none.
    pub fn creators(&self) -> Option<Vec<CreatorRecord>> {
        self.state.borrow().creators().map(<[_]>::to_vec)
    }

    pub fn lookup_creator_by_url(&self, url: &str) -> Option<CreatorRecord> {
        self.state.borrow().creator_by_url(url).cloned()
    }
}
