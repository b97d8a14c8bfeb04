use crate::backend::{BackendId, BackendRegistry};
use crate::store::CredentialStore;
use crate::transport::{MultipartRequest, RequestEnvelope, Transport};
use crate::{Error, Result};
use serde_json::Value;
use std::sync::Arc;

/// Client for one backend.
///
/// Cheap to share behind an `Arc`; calls are independent and may run
/// concurrently. Callers that need two calls ordered (e.g. two chat turns in
/// the same session) must await the first before issuing the second.
pub struct ApiClient {
    pub(crate) backend: BackendId,
    pub(crate) registry: Arc<BackendRegistry>,
    pub(crate) credentials: CredentialStore,
    pub(crate) transport: Arc<dyn Transport>,
}

impl ApiClient {
    /// Client for the named backend with default registry (plus env knobs) and
    /// the default on-disk store. Unknown names fail before anything else happens.
    pub fn new(backend: &str) -> Result<Self> {
        crate::client::builder::ApiClientBuilder::new().build(backend)
    }

    pub fn builder() -> crate::client::builder::ApiClientBuilder {
        crate::client::builder::ApiClientBuilder::new()
    }

    pub fn backend(&self) -> BackendId {
        self.backend
    }

    pub fn is_mock(&self) -> bool {
        self.transport.is_mock()
    }

    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Effective base URL right now (settings override or registry value).
    pub fn base_url(&self) -> Result<String> {
        self.registry
            .resolve_base_url(self.backend, self.credentials.backing_store().as_ref())
    }

    /// Persist a user base URL override for this client's backend.
    ///
    /// For the data platform, pass the server root; the API segment is added on resolution.
    pub fn set_base_url_override(&self, url: &str) -> Result<()> {
        self.credentials
            .backing_store()
            .set(self.backend.settings_key(), url)
    }

    pub fn clear_base_url_override(&self) -> Result<()> {
        self.credentials
            .backing_store()
            .remove(self.backend.settings_key())
    }

    pub(crate) async fn request(&self, envelope: RequestEnvelope) -> Result<Value> {
        self.transport.send(envelope).await
    }

    pub(crate) async fn request_multipart(&self, request: MultipartRequest) -> Result<Value> {
        self.transport.send_multipart(request).await
    }

    /// File and session-file routes exist only on the agent service.
    pub(crate) fn require_file_support(&self, operation: &'static str) -> Result<()> {
        if self.backend.supports_files() {
            Ok(())
        } else {
            Err(Error::unsupported_backend(operation, self.backend))
        }
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("backend", &self.backend)
            .field("mock", &self.transport.is_mock())
            .field("credentials", &self.credentials)
            .finish()
    }
}
