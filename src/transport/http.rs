use super::{HttpMethod, MultipartRequest, RequestEnvelope, Transport, TransportError};
use crate::backend::{BackendId, BackendRegistry};
use crate::store::CredentialStore;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Proxy, RequestBuilder};
use serde_json::Value;
use std::env;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Real HTTP transport for one backend.
///
/// The base URL is resolved on every call, so a settings override written
/// after construction applies to the next request.
pub struct LiveTransport {
    backend: BackendId,
    client: reqwest::Client,
    registry: Arc<BackendRegistry>,
    credentials: CredentialStore,
}

enum Outcome {
    Done(Result<Value>),
    TimedOut,
    Cancelled,
}

impl LiveTransport {
    pub fn new(
        backend: BackendId,
        registry: Arc<BackendRegistry>,
        credentials: CredentialStore,
    ) -> Result<Self> {
        Ok(Self::with_client(
            backend,
            registry,
            credentials,
            Self::default_client()?,
        ))
    }

    pub fn with_client(
        backend: BackendId,
        registry: Arc<BackendRegistry>,
        credentials: CredentialStore,
        client: reqwest::Client,
    ) -> Self {
        Self {
            backend,
            client,
            registry,
            credentials,
        }
    }

    /// Pooled client with env-overridable knobs. The per-request deadline is
    /// enforced by the transport itself, not by reqwest.
    pub fn default_client() -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder()
            .pool_max_idle_per_host(
                env::var("DATAORCH_HTTP_POOL_MAX_IDLE_PER_HOST")
                    .ok()
                    .and_then(|s| s.parse::<usize>().ok())
                    .unwrap_or(16),
            )
            .pool_idle_timeout(Some(Duration::from_secs(
                env::var("DATAORCH_HTTP_POOL_IDLE_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(90),
            )));

        if let Ok(proxy_url) = env::var("DATAORCH_PROXY_URL") {
            if let Ok(proxy) = Proxy::all(&proxy_url) {
                builder = builder.proxy(proxy);
            }
        }

        builder
            .build()
            .map_err(|e| Error::Transport(TransportError::Other(e.to_string())))
    }

    pub fn base_url(&self) -> Result<String> {
        self.registry
            .resolve_base_url(self.backend, self.credentials.backing_store().as_ref())
    }

    fn url(&self, path: &str) -> Result<String> {
        Ok(format!("{}{}", self.base_url()?, path))
    }

    fn authorize(&self, builder: RequestBuilder) -> Result<RequestBuilder> {
        Ok(match self.credentials.token()? {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    /// Execute a JSON request under the registry (or per-envelope) deadline.
    pub async fn execute(&self, request: RequestEnvelope) -> Result<Value> {
        self.execute_with_cancel(request, CancellationToken::new())
            .await
    }

    /// Execute a JSON request, stopping early if `cancel` fires.
    ///
    /// The deadline cancels the same token, so anything else watching it
    /// observes the timeout as well.
    pub async fn execute_with_cancel(
        &self,
        request: RequestEnvelope,
        cancel: CancellationToken,
    ) -> Result<Value> {
        let url = self.url(&request.path)?;
        let request_id = Uuid::new_v4().to_string();
        info!(
            backend = %self.backend,
            method = %request.method,
            url = url.as_str(),
            body = ?request.body,
            request_id = request_id.as_str(),
            "dataorch request"
        );

        let mut builder = self
            .client
            .request(request.method.into(), &url)
            .header(CONTENT_TYPE, "application/json");
        builder = self.authorize(builder)?;
        if let Some(body) = &request.body {
            builder = builder.body(serde_json::to_vec(body)?);
        }

        let timeout = request
            .timeout
            .unwrap_or_else(|| self.registry.request_timeout());
        self.dispatch(builder, request.method, &url, timeout, cancel, &request_id)
            .await
    }

    /// Execute a multipart upload. No JSON content type is sent; the form
    /// supplies its own boundary header.
    pub async fn execute_multipart(&self, request: MultipartRequest) -> Result<Value> {
        let url = self.url(&request.path)?;
        let request_id = Uuid::new_v4().to_string();
        let names: Vec<&str> = request.files.iter().map(|f| f.file_name.as_str()).collect();
        let total_bytes: usize = request.files.iter().map(|f| f.len()).sum();
        info!(
            backend = %self.backend,
            method = %request.method,
            url = url.as_str(),
            field = request.field,
            files = ?names,
            total_bytes,
            request_id = request_id.as_str(),
            "dataorch multipart request"
        );

        let mut form = reqwest::multipart::Form::new();
        for file in &request.files {
            let mut part = reqwest::multipart::Part::bytes(file.data.to_vec())
                .file_name(file.file_name.clone());
            if let Some(mime) = &file.mime_type {
                part = part.mime_str(mime).map_err(|e| {
                    Error::configuration(format!(
                        "Invalid mime type {:?} for {}: {}",
                        mime, file.file_name, e
                    ))
                })?;
            }
            form = form.part(request.field, part);
        }

        let builder = self
            .client
            .request(request.method.into(), &url)
            .multipart(form);
        let builder = self.authorize(builder)?;

        let timeout = request
            .timeout
            .unwrap_or_else(|| self.registry.request_timeout());
        self.dispatch(
            builder,
            request.method,
            &url,
            timeout,
            CancellationToken::new(),
            &request_id,
        )
        .await
    }

    async fn dispatch(
        &self,
        builder: RequestBuilder,
        method: HttpMethod,
        url: &str,
        timeout: Duration,
        cancel: CancellationToken,
        request_id: &str,
    ) -> Result<Value> {
        let start = Instant::now();

        // Dropping the losing branch drops the in-flight reqwest future,
        // which aborts the connection.
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Outcome::Cancelled,
            _ = tokio::time::sleep(timeout) => {
                cancel.cancel();
                Outcome::TimedOut
            }
            res = self.round_trip(builder) => Outcome::Done(res),
        };

        let duration_ms = start.elapsed().as_millis();
        let timeout_ms = timeout.as_millis() as u64;
        match outcome {
            Outcome::Done(Ok(value)) => {
                debug!(
                    backend = %self.backend,
                    method = %method,
                    url,
                    duration_ms,
                    request_id,
                    "dataorch request completed"
                );
                Ok(value)
            }
            Outcome::Done(Err(e)) => {
                warn!(
                    backend = %self.backend,
                    method = %method,
                    url,
                    duration_ms,
                    request_id,
                    error = %e,
                    "dataorch request failed"
                );
                Err(e)
            }
            Outcome::TimedOut => {
                warn!(
                    backend = %self.backend,
                    method = %method,
                    url,
                    timeout_ms,
                    request_id,
                    "dataorch request timed out"
                );
                Err(Error::Timeout {
                    backend: self.backend,
                    timeout_ms,
                })
            }
            Outcome::Cancelled => {
                warn!(
                    backend = %self.backend,
                    method = %method,
                    url,
                    duration_ms,
                    request_id,
                    "dataorch request cancelled"
                );
                Err(Error::Transport(TransportError::Aborted))
            }
        }
    }

    async fn round_trip(&self, builder: RequestBuilder) -> Result<Value> {
        let resp = builder
            .send()
            .await
            .map_err(|e| Error::Transport(TransportError::Http(e)))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::HttpStatus {
                backend: self.backend,
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("").to_string(),
                body,
            });
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| Error::Transport(TransportError::Http(e)))?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl Transport for LiveTransport {
    fn backend(&self) -> BackendId {
        self.backend
    }

    fn is_mock(&self) -> bool {
        false
    }

    async fn send(&self, request: RequestEnvelope) -> Result<Value> {
        self.execute(request).await
    }

    async fn send_multipart(&self, request: MultipartRequest) -> Result<Value> {
        self.execute_multipart(request).await
    }
}
