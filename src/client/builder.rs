use crate::backend::{BackendId, BackendRegistry};
use crate::client::core::ApiClient;
use crate::mock::MockTransport;
use crate::store::{CredentialStore, FileStore, KeyValueStore};
use crate::transport::{LiveTransport, Transport};
use crate::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Builder for creating clients with custom configuration.
///
/// Keep this surface area small and predictable.
pub struct ApiClientBuilder {
    registry: Option<BackendRegistry>,
    store: Option<Arc<dyn KeyValueStore>>,
    http_client: Option<reqwest::Client>,
    request_timeout: Option<Duration>,
    mock_overrides: Vec<(BackendId, bool)>,
    base_url_overrides: Vec<(BackendId, String)>,
    transport: Option<Arc<dyn Transport>>,
}

/// One client per backend, sharing the same registry and store.
#[derive(Debug)]
pub struct BackendClients {
    pub data_platform: ApiClient,
    pub opencode_agent: ApiClient,
}

impl BackendClients {
    pub fn get(&self, id: BackendId) -> &ApiClient {
        match id {
            BackendId::DataPlatform => &self.data_platform,
            BackendId::OpencodeAgent => &self.opencode_agent,
        }
    }
}

impl ApiClientBuilder {
    pub fn new() -> Self {
        Self {
            registry: None,
            store: None,
            http_client: None,
            request_timeout: None,
            mock_overrides: Vec::new(),
            base_url_overrides: Vec::new(),
            transport: None,
        }
    }

    /// Use this registry instead of defaults plus `DATAORCH_*` env knobs.
    pub fn registry(mut self, registry: BackendRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Inject the persisted state store. Default is a [`FileStore`] in the user config dir.
    pub fn store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Reuse an existing reqwest client (shared connection pool).
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Override the registry's request deadline.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn mock_mode(mut self, backend: BackendId, enabled: bool) -> Self {
        self.mock_overrides.push((backend, enabled));
        self
    }

    /// Override a backend's compiled-in base URL.
    ///
    /// This is primarily for testing with mock servers. A persisted settings
    /// override still takes precedence at call time.
    pub fn base_url(mut self, backend: BackendId, url: impl Into<String>) -> Self {
        self.base_url_overrides.push((backend, url.into()));
        self
    }

    /// Inject a custom transport, bypassing mock/live selection.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the client for a backend named by its identifier.
    ///
    /// The name is checked first, so an unknown backend fails before any
    /// store, registry or network resource is touched.
    pub fn build(self, backend: &str) -> Result<ApiClient> {
        let id: BackendId = backend.parse()?;
        self.build_for(id)
    }

    pub fn build_for(self, backend: BackendId) -> Result<ApiClient> {
        let (registry, credentials, http_client) = self.shared_parts()?;
        let transport = match self.transport {
            Some(t) => t,
            None => select_transport(backend, &registry, &credentials, http_client)?,
        };
        Ok(ApiClient {
            backend,
            registry,
            credentials,
            transport,
        })
    }

    /// Build both clients over one registry and one store.
    pub fn build_all(self) -> Result<BackendClients> {
        let (registry, credentials, http_client) = self.shared_parts()?;
        let make = |id: BackendId| -> Result<ApiClient> {
            Ok(ApiClient {
                backend: id,
                registry: registry.clone(),
                credentials: credentials.clone(),
                transport: select_transport(id, &registry, &credentials, http_client.clone())?,
            })
        };
        Ok(BackendClients {
            data_platform: make(BackendId::DataPlatform)?,
            opencode_agent: make(BackendId::OpencodeAgent)?,
        })
    }

    fn shared_parts(&self) -> Result<(Arc<BackendRegistry>, CredentialStore, reqwest::Client)> {
        let mut registry = match &self.registry {
            Some(r) => r.clone(),
            None => BackendRegistry::from_env()?,
        };
        for (id, url) in &self.base_url_overrides {
            registry = registry.with_base_url(*id, url)?;
        }
        for (id, enabled) in &self.mock_overrides {
            registry = registry.with_mock_mode(*id, *enabled);
        }
        if let Some(timeout) = self.request_timeout {
            registry = registry.with_request_timeout(timeout)?;
        }

        let store: Arc<dyn KeyValueStore> = match &self.store {
            Some(s) => s.clone(),
            None => Arc::new(FileStore::from_default_location()?),
        };

        let http_client = match &self.http_client {
            Some(c) => c.clone(),
            None => LiveTransport::default_client()?,
        };

        Ok((Arc::new(registry), CredentialStore::new(store), http_client))
    }
}

impl Default for ApiClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn select_transport(
    backend: BackendId,
    registry: &Arc<BackendRegistry>,
    credentials: &CredentialStore,
    http_client: reqwest::Client,
) -> Result<Arc<dyn Transport>> {
    let live = LiveTransport::with_client(backend, registry.clone(), credentials.clone(), http_client);
    let mock = registry.is_mock(backend);
    debug!(backend = %backend, mock, "selected transport");
    Ok(if mock {
        Arc::new(MockTransport::with_passthrough(backend, live))
    } else {
        Arc::new(live)
    })
}
