//! reqwest-backed transport.

use super::{FeedRequest, FeedResponse, Method, Transport, TransportError};
use async_trait::async_trait;
use log::debug;
use reqwest::header::CONTENT_TYPE;

/// Sends feed requests over HTTPS, optionally with a bearer token.
#[derive(Clone, Debug, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
    access_token: Option<String>,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(&self, request: FeedRequest) -> Result<FeedResponse, TransportError> {
        debug!("{} {}", request.method, request.url);

        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(token) = &self.access_token {
            builder = builder.bearer_auth(token);
        }
        if let Some(content_type) = &request.content_type {
            builder = builder.header(CONTENT_TYPE, content_type.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::new(e.to_string(), e.status().map(|s| s.as_u16())))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::new(e.to_string(), Some(status.as_u16())))?;

        if status.is_success() {
            Ok(FeedResponse {
                status: status.as_u16(),
                body,
            })
        } else {
            // Non-2xx: the body is the server's error message.
            Err(TransportError::new(body, Some(status.as_u16())))
        }
    }
}
