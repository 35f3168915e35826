//! Scripted [`HttpClient`] double for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use http::{Method, StatusCode, header};
use tokio::sync::oneshot;

use crate::transport::{HttpClient, TransportError};

#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Response { status: StatusCode, body: Vec<u8> },
    Transport(String),
}

impl Reply {
    pub(crate) fn json(status: StatusCode, body: serde_json::Value) -> Self {
        Reply::Response {
            status,
            body: serde_json::to_vec(&body).unwrap(),
        }
    }

    pub(crate) fn status(status: StatusCode) -> Self {
        Self::json(status, serde_json::json!({"detail": status.as_str()}))
    }

    pub(crate) fn raw(status: StatusCode, body: Vec<u8>) -> Self {
        Reply::Response { status, body }
    }

    pub(crate) fn transport(message: &str) -> Self {
        Reply::Transport(message.to_string())
    }
}

#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub method: Method,
    pub uri: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

#[derive(Default)]
struct Script {
    routes: HashMap<String, VecDeque<Reply>>,
    gates: HashMap<String, VecDeque<oneshot::Receiver<Reply>>>,
    requests: Vec<RecordedRequest>,
}

enum Next {
    Ready(Option<Reply>),
    Gated(oneshot::Receiver<Reply>),
}

/// Replies are queued per URI path. The last queued reply for a path is
/// sticky and answers every further request.
///
/// A gated path holds each request open until the test sends its reply, so
/// overlapping requests can be resolved in any order. Gates are taken in
/// request order and win over routed replies.
#[derive(Clone, Default)]
pub(crate) struct ScriptedClient {
    inner: Arc<Mutex<Script>>,
}

impl ScriptedClient {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn route(&self, path: &str, reply: Reply) {
        self.inner
            .lock()
            .unwrap()
            .routes
            .entry(path.to_string())
            .or_default()
            .push_back(reply);
    }

    /// Drop any queued replies for `path` and answer with `reply` from now on.
    pub(crate) fn replace(&self, path: &str, reply: Reply) {
        let mut script = self.inner.lock().unwrap();
        script.routes.insert(path.to_string(), VecDeque::from([reply]));
    }

    /// Hold the next request to `path` until a reply is sent on the
    /// returned sender.
    pub(crate) fn gate(&self, path: &str) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.inner
            .lock()
            .unwrap()
            .gates
            .entry(path.to_string())
            .or_default()
            .push_back(rx);
        tx
    }

    pub(crate) fn requests(&self) -> Vec<RecordedRequest> {
        self.inner.lock().unwrap().requests.clone()
    }

    fn next_reply(&self, request: &http::Request<Vec<u8>>) -> Next {
        let header_str = |name: header::HeaderName| {
            request
                .headers()
                .get(name)
                .and_then(|v: &http::HeaderValue| v.to_str().ok())
                .map(str::to_string)
        };
        let mut script = self.inner.lock().unwrap();
        script.requests.push(RecordedRequest {
            method: request.method().clone(),
            uri: request.uri().to_string(),
            authorization: header_str(header::AUTHORIZATION),
            content_type: header_str(header::CONTENT_TYPE),
            body: request.body().clone(),
        });

        let path = request.uri().path();
        if let Some(gate) = script.gates.get_mut(path).and_then(VecDeque::pop_front) {
            return Next::Gated(gate);
        }
        Next::Ready(script.routes.get_mut(path).and_then(|queue| {
            if queue.len() > 1 {
                queue.pop_front()
            } else {
                queue.front().cloned()
            }
        }))
    }
}

impl HttpClient for ScriptedClient {
    async fn send_http(
        &self,
        request: http::Request<Vec<u8>>,
    ) -> Result<http::Response<Vec<u8>>, TransportError> {
        let reply = match self.next_reply(&request) {
            Next::Ready(reply) => reply,
            Next::Gated(gate) => gate.await.ok(),
        };
        match reply {
            Some(Reply::Response { status, body }) => Ok(http::Response::builder()
                .status(status)
                .header(header::CONTENT_TYPE, "application/json")
                .body(body)?),
            Some(Reply::Transport(message)) => Err(message.into()),
            None => Ok(http::Response::builder()
                .status(StatusCode::NOT_FOUND)
                .body(Vec::new())?),
        }
    }
}
