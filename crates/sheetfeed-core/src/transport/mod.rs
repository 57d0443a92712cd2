//! Transport abstraction over the remote feed API.
//!
//! The core never talks HTTP directly: every request goes through a
//! [`Transport`], so workflows can run against [`HttpTransport`] in production
//! and [`FixtureTransport`] in tests.

mod fixture;
#[cfg(feature = "http")]
mod http;

use async_trait::async_trait;
use std::fmt;

pub use fixture::{FixtureTransport, RecordedRequest};
#[cfg(feature = "http")]
pub use http::HttpTransport;

/// HTTP method of a feed request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single request to the feed API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedRequest {
    pub method: Method,
    pub url: String,
    pub content_type: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl FeedRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        FeedRequest {
            method,
            url: url.into(),
            content_type: None,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, content_type: impl Into<String>, body: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self.body = Some(body.into());
        self
    }

    /// Value of the first header with this name (case-insensitive).
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A successful (2xx) response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedResponse {
    pub status: u16,
    pub body: String,
}

/// A failed request: the server's literal error text plus the status, when
/// there was one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportError {
    pub message: String,
    pub status: Option<u16>,
}

impl TransportError {
    pub fn new(message: impl Into<String>, status: Option<u16>) -> Self {
        TransportError {
            message: message.into(),
            status,
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for TransportError {}

/// Issues feed requests. Implementations must surface the server's error body
/// verbatim in [`TransportError::message`] for non-2xx responses.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(&self, request: FeedRequest) -> Result<FeedResponse, TransportError>;
}
