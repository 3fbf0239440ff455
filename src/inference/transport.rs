use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::foundation::core::Credential;
use crate::foundation::error::{SketchError, SketchResult};

/// Status and body of a completed HTTP exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpReply {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl HttpReply {
    /// Build a reply.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Return `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The request never produced an HTTP status.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct TransportError {
    /// Transport detail.
    pub message: String,
    /// Whether the configured timeout elapsed.
    pub timed_out: bool,
}

impl TransportError {
    /// Build a transport error.
    pub fn new(message: impl Into<String>, timed_out: bool) -> Self {
        Self {
            message: message.into(),
            timed_out,
        }
    }
}

/// Authenticated JSON POST, the only network operation the pipeline needs.
pub trait HttpTransport: Send + Sync {
    /// POST `body` as JSON to `url` with a bearer `Authorization` header.
    fn post_json(
        &self,
        url: &str,
        credential: &Credential,
        body: &serde_json::Value,
    ) -> impl Future<Output = Result<HttpReply, TransportError>> + Send;
}

impl<T: HttpTransport> HttpTransport for Arc<T> {
    fn post_json(
        &self,
        url: &str,
        credential: &Credential,
        body: &serde_json::Value,
    ) -> impl Future<Output = Result<HttpReply, TransportError>> + Send {
        (**self).post_json(url, credential, body)
    }
}

/// [`HttpTransport`] backed by a pooled `reqwest` client.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a client whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> SketchResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SketchError::config(format!("build http client: {e}")))?;
        Ok(Self { client })
    }
}

impl HttpTransport for ReqwestTransport {
    async fn post_json(
        &self,
        url: &str,
        credential: &Credential,
        body: &serde_json::Value,
    ) -> Result<HttpReply, TransportError> {
        let response = self
            .client
            .post(url)
            .header(reqwest::header::AUTHORIZATION, credential.bearer())
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError::new(format!("request to {url} failed: {e}"), e.is_timeout()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::new(format!("read response body: {e}"), e.is_timeout()))?;
        Ok(HttpReply { status, body: text })
    }
}

/// One request observed by [`ScriptedTransport`].
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedRequest {
    /// Target URL.
    pub url: String,
    /// `Authorization` header value.
    pub authorization: String,
    /// JSON body.
    pub body: serde_json::Value,
}

/// In-memory transport for tests and offline runs.
///
/// Replies are replayed in the order they were queued; requests are recorded. When the script
/// runs dry, requests fail with a transport error.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<HttpReply, TransportError>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedTransport {
    /// Create a transport with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply.
    pub fn push_reply(&self, status: u16, body: impl Into<String>) -> &Self {
        lock(&self.replies).push_back(Ok(HttpReply::new(status, body)));
        self
    }

    /// Queue a transport failure.
    pub fn push_error(&self, message: impl Into<String>, timed_out: bool) -> &Self {
        lock(&self.replies).push_back(Err(TransportError::new(message, timed_out)));
        self
    }

    /// Requests seen so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    /// Number of requests seen so far.
    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }
}

impl HttpTransport for ScriptedTransport {
    async fn post_json(
        &self,
        url: &str,
        credential: &Credential,
        body: &serde_json::Value,
    ) -> Result<HttpReply, TransportError> {
        lock(&self.requests).push(RecordedRequest {
            url: url.to_string(),
            authorization: credential.bearer(),
            body: body.clone(),
        });
        lock(&self.replies)
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::new("no scripted reply", false)))
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
