//! In-memory transport that answers from registered fixtures.
//!
//! Fixtures are matched by method and URL suffix, so a fixture for
//! `worksheets/s1/private/full` answers regardless of the configured base URL.
//! Every request is recorded, matched or not.

use super::{FeedRequest, FeedResponse, Method, Transport, TransportError};
use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};

pub type RecordedRequest = FeedRequest;

#[derive(Clone, Debug)]
enum Reply {
    Ok { status: u16, body: String },
    Fail { status: u16, message: String },
}

#[derive(Clone, Debug)]
struct Route {
    method: Method,
    path: String,
    reply: Reply,
}

#[derive(Debug, Default)]
pub struct FixtureTransport {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl FixtureTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `method path` with a 200 and `body`. Replaces any existing fixture for the route.
    pub fn respond(&self, method: Method, path: &str, body: impl Into<String>) -> &Self {
        self.set(method, path, Reply::Ok {
            status: 200,
            body: body.into(),
        })
    }

    /// Answer `method path` with an error status and literal message.
    pub fn fail(&self, method: Method, path: &str, status: u16, message: impl Into<String>) -> &Self {
        self.set(method, path, Reply::Fail {
            status,
            message: message.into(),
        })
    }

    /// Drop the fixture for `method path`, if any.
    pub fn remove(&self, method: Method, path: &str) {
        lock(&self.routes).retain(|r| !(r.method == method && r.path == path));
    }

    fn set(&self, method: Method, path: &str, reply: Reply) -> &Self {
        self.remove(method, path);
        lock(&self.routes).push(Route {
            method,
            path: path.trim_start_matches('/').to_string(),
            reply,
        });
        self
    }

    /// All requests issued so far, in order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        lock(&self.requests).last().cloned()
    }

    fn lookup(&self, method: Method, url: &str) -> Option<Reply> {
        let url = url.split('?').next().unwrap_or(url);
        lock(&self.routes)
            .iter()
            .find(|r| r.method == method && url.ends_with(&format!("/{}", r.path)))
            .map(|r| r.reply.clone())
    }
}

#[async_trait]
impl Transport for FixtureTransport {
    async fn request(&self, request: FeedRequest) -> Result<FeedResponse, TransportError> {
        let reply = self.lookup(request.method, &request.url);
        let missing = format!("No fixture for {} {}", request.method, request.url);
        lock(&self.requests).push(request);

        match reply {
            Some(Reply::Ok { status, body }) => Ok(FeedResponse { status, body }),
            Some(Reply::Fail { status, message }) => Err(TransportError::new(message, Some(status))),
            None => Err(TransportError::new(missing, Some(404))),
        }
    }
}
