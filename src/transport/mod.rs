//! Transport layer: one polymorphic interface, two implementations.
//!
//! | Implementation | Behavior |
//! |----------------|----------|
//! | [`LiveTransport`] | real HTTP with auth injection and a hard deadline |
//! | [`MockTransport`](crate::mock::MockTransport) | canned fixtures after an artificial delay |
//!
//! A client picks one implementation at construction from its backend's
//! mock flag. Domain operations only ever talk to `dyn Transport`.

pub mod http;

pub use http::LiveTransport;

use crate::backend::BackendId;
use crate::Result;
use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;
use std::fmt;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// One JSON request. Built per call and dropped afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestEnvelope {
    pub method: HttpMethod,
    /// Path relative to the backend base URL, starting with `/`.
    pub path: String,
    pub body: Option<Value>,
    /// Per-call deadline; `None` uses the registry timeout.
    pub timeout: Option<Duration>,
    /// Caller arguments a fixture echoes back. Never sent over the wire.
    pub fixture_input: Option<Value>,
}

impl RequestEnvelope {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            timeout: None,
            fixture_input: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(HttpMethod::Post, path).with_body(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_fixture_input(mut self, input: Value) -> Self {
        self.fixture_input = Some(input);
        self
    }
}

/// An in-memory file for multipart uploads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub mime_type: Option<String>,
    pub data: Bytes,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: None,
            data: data.into(),
        }
    }

    pub fn with_mime_type(mut self, mime: impl Into<String>) -> Self {
        self.mime_type = Some(mime.into());
        self
    }

    /// Read a file from disk; the upload name is the path's final component.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.bin".to_string());
        Ok(Self::new(file_name, data))
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A multipart upload: every file goes under the same form field.
#[derive(Debug, Clone, PartialEq)]
pub struct MultipartRequest {
    pub method: HttpMethod,
    pub path: String,
    pub field: &'static str,
    pub files: Vec<UploadFile>,
    pub timeout: Option<Duration>,
}

impl MultipartRequest {
    pub fn post(path: impl Into<String>, field: &'static str, files: Vec<UploadFile>) -> Self {
        Self {
            method: HttpMethod::Post,
            path: path.into(),
            field,
            files,
            timeout: None,
        }
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    fn backend(&self) -> BackendId;

    fn is_mock(&self) -> bool;

    /// Send a JSON request and return the decoded JSON response verbatim.
    async fn send(&self, request: RequestEnvelope) -> Result<Value>;

    /// Send a multipart upload and return the decoded JSON response verbatim.
    async fn send_multipart(&self, request: MultipartRequest) -> Result<Value>;
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request aborted before a response arrived")]
    Aborted,

    #[error("Transport error: {0}")]
    Other(String),
}
