use tokio::sync::mpsc;

/// A navigation the session asks the host application to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationRequest {
    /// Send the viewer to the login entry point.
    Login { path: String },
}

/// Fire-and-forget navigation primitive provided by the host application.
pub trait Navigator: Send + Sync {
    fn goto_login(&self, login_path: &str);
}

/// Ignores every navigation request.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn goto_login(&self, login_path: &str) {
        tracing::debug!(path = %login_path, "login navigation ignored");
    }
}

/// Forwards navigation requests over an unbounded channel to whatever owns
/// the router.
#[derive(Debug, Clone)]
pub struct ChannelNavigator {
    tx: mpsc::UnboundedSender<NavigationRequest>,
}

impl ChannelNavigator {
    /// Navigator plus the receiving end the host application drains.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<NavigationRequest>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Navigator for ChannelNavigator {
    fn goto_login(&self, login_path: &str) {
        let request = NavigationRequest::Login {
            path: login_path.to_string(),
        };
        if self.tx.send(request).is_err() {
            tracing::debug!(path = %login_path, "navigation receiver dropped");
        }
    }
}
