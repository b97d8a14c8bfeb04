//! Backend registry: maps each backend identifier to its base URL and mock flag.
//!
//! The two backends are a closed set. Anything else is rejected while parsing
//! the identifier, so no client can ever be built for an unknown backend.
//!
//! Defaults can be replaced from a YAML file or from environment knobs:
//! - `DATAORCH_DATA_PLATFORM_URL` / `DATAORCH_OPENCODE_AGENT_URL`
//! - `DATAORCH_DATA_PLATFORM_MOCK` / `DATAORCH_OPENCODE_AGENT_MOCK` (`1`, `true`, `yes`, `on`)
//! - `DATAORCH_REQUEST_TIMEOUT_MS`

use crate::store::KeyValueStore;
use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Hard deadline applied to every live request.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 60_000;

/// Path segment appended to a user-supplied data platform URL.
pub const DATA_PLATFORM_API_SEGMENT: &str = "/api";

const DEFAULT_DATA_PLATFORM_URL: &str = "http://localhost:8001/api";
const DEFAULT_OPENCODE_AGENT_URL: &str = "http://localhost:8001";

/// Identifier of one of the two backend services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendId {
    /// Data / workflow service (`/api/...` paths).
    DataPlatform,
    /// Agent / chat service (root paths), also hosting sessions, skills and files.
    OpencodeAgent,
}

impl BackendId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DataPlatform => "data_platform",
            Self::OpencodeAgent => "opencode_agent",
        }
    }

    pub fn all() -> &'static [BackendId] {
        &[Self::DataPlatform, Self::OpencodeAgent]
    }

    /// Persisted settings key holding the user's base URL override.
    pub fn settings_key(&self) -> &'static str {
        match self {
            Self::DataPlatform => "dataPlatformUrl",
            Self::OpencodeAgent => "opencodeAgentUrl",
        }
    }

    /// Whether multipart upload and session file routes exist on this backend.
    pub fn supports_files(&self) -> bool {
        matches!(self, Self::OpencodeAgent)
    }

    fn env_prefix(&self) -> &'static str {
        match self {
            Self::DataPlatform => "DATAORCH_DATA_PLATFORM",
            Self::OpencodeAgent => "DATAORCH_OPENCODE_AGENT",
        }
    }

    fn default_base_url(&self) -> &'static str {
        match self {
            Self::DataPlatform => DEFAULT_DATA_PLATFORM_URL,
            Self::OpencodeAgent => DEFAULT_OPENCODE_AGENT_URL,
        }
    }
}

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "data_platform" => Ok(Self::DataPlatform),
            "opencode_agent" => Ok(Self::OpencodeAgent),
            other => Err(Error::configuration_with_context(
                format!("Unknown backend: {}", other),
                ErrorContext::new()
                    .with_details("expected one of: data_platform, opencode_agent")
                    .with_source("backend_registry"),
            )),
        }
    }
}

/// Static description of one backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendDescriptor {
    pub id: BackendId,
    /// Normalized base URL (never ends with a slash).
    pub base_url: String,
    pub mock_mode: bool,
}

/// YAML shape accepted by [`BackendRegistry::from_yaml_str`].
///
/// ```yaml
/// request_timeout_ms: 30000
/// backends:
///   data_platform:
///     base_url: http://localhost:8000/api
///     mock_mode: true
///   opencode_agent:
///     base_url: http://localhost:8001
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,
    #[serde(default)]
    pub backends: BTreeMap<String, BackendConfigEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendConfigEntry {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub mock_mode: Option<bool>,
}

/// Registry holding exactly one descriptor per backend.
#[derive(Debug, Clone)]
pub struct BackendRegistry {
    descriptors: HashMap<BackendId, BackendDescriptor>,
    request_timeout: Duration,
}

impl BackendRegistry {
    /// Compiled-in defaults: both backends live on `localhost:8001`, mock mode off.
    pub fn new() -> Self {
        let descriptors = BackendId::all()
            .iter()
            .map(|id| {
                (
                    *id,
                    BackendDescriptor {
                        id: *id,
                        base_url: id.default_base_url().to_string(),
                        mock_mode: false,
                    },
                )
            })
            .collect();
        Self {
            descriptors,
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }

    /// Defaults with the `DATAORCH_*` environment knobs applied.
    pub fn from_env() -> Result<Self> {
        Self::new().with_env_overrides()
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: RegistryConfig = serde_yaml::from_str(yaml).map_err(|e| {
            Error::configuration_with_context(
                format!("Invalid registry config: {}", e),
                ErrorContext::new().with_source("backend_registry"),
            )
        })?;
        Self::from_config(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration_with_context(
                format!("Failed to read registry config: {}", e),
                ErrorContext::new()
                    .with_details(path.display().to_string())
                    .with_source("backend_registry"),
            )
        })?;
        Self::from_yaml_str(&raw)
    }

    pub fn from_config(config: RegistryConfig) -> Result<Self> {
        let mut registry = Self::new();
        if let Some(ms) = config.request_timeout_ms {
            registry = registry.with_request_timeout(Duration::from_millis(ms))?;
        }
        for (name, entry) in config.backends {
            let id: BackendId = name.parse()?;
            if let Some(url) = entry.base_url {
                registry = registry.with_base_url(id, &url)?;
            }
            if let Some(mock) = entry.mock_mode {
                registry = registry.with_mock_mode(id, mock);
            }
        }
        Ok(registry)
    }

    /// Apply the `DATAORCH_*` environment knobs on top of the current values.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Same as [`with_env_overrides`](Self::with_env_overrides), reading from an arbitrary lookup.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        for id in BackendId::all() {
            let prefix = id.env_prefix();
            if let Some(url) = lookup(&format!("{}_URL", prefix)) {
                self = self.with_base_url(*id, &url)?;
            }
            if let Some(flag) = lookup(&format!("{}_MOCK", prefix)) {
                self = self.with_mock_mode(*id, parse_flag(&flag));
            }
        }
        if let Some(raw) = lookup("DATAORCH_REQUEST_TIMEOUT_MS") {
            let ms = raw.trim().parse::<u64>().map_err(|_| {
                Error::configuration_with_context(
                    "Request timeout must be a whole number of milliseconds",
                    ErrorContext::new()
                        .with_field_path("DATAORCH_REQUEST_TIMEOUT_MS")
                        .with_details(raw.clone())
                        .with_source("backend_registry"),
                )
            })?;
            self = self.with_request_timeout(Duration::from_millis(ms))?;
        }
        Ok(self)
    }

    pub fn with_base_url(mut self, id: BackendId, url: &str) -> Result<Self> {
        let base_url = validate_base_url(id, url)?;
        if let Some(d) = self.descriptors.get_mut(&id) {
            d.base_url = base_url;
        }
        Ok(self)
    }

    pub fn with_mock_mode(mut self, id: BackendId, enabled: bool) -> Self {
        if let Some(d) = self.descriptors.get_mut(&id) {
            d.mock_mode = enabled;
        }
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Result<Self> {
        if timeout.is_zero() {
            return Err(Error::configuration_with_context(
                "Request timeout must be greater than zero",
                ErrorContext::new()
                    .with_field_path("request_timeout_ms")
                    .with_source("backend_registry"),
            ));
        }
        self.request_timeout = timeout;
        Ok(self)
    }

    pub fn descriptor(&self, id: BackendId) -> &BackendDescriptor {
        // Every id is inserted in `new()` and never removed.
        &self.descriptors[&id]
    }

    pub fn is_mock(&self, id: BackendId) -> bool {
        self.descriptor(id).mock_mode
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Effective base URL for `id`: persisted user override first, then the registry value.
    ///
    /// A data platform override names the server root, so the API segment is appended.
    pub fn resolve_base_url(&self, id: BackendId, settings: &dyn KeyValueStore) -> Result<String> {
        if let Some(raw) = settings.get(id.settings_key())? {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                let base = normalize(trimmed);
                return Ok(match id {
                    BackendId::DataPlatform => format!("{}{}", base, DATA_PLATFORM_API_SEGMENT),
                    BackendId::OpencodeAgent => base,
                });
            }
        }
        Ok(self.descriptor(id).base_url.clone())
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

fn validate_base_url(id: BackendId, url: &str) -> Result<String> {
    let trimmed = url.trim();
    let parsed = url::Url::parse(trimmed).map_err(|e| {
        Error::configuration_with_context(
            format!("Invalid base URL for {}: {}", id, e),
            ErrorContext::new()
                .with_field_path(format!("backends.{}.base_url", id))
                .with_details(trimmed.to_string())
                .with_source("backend_registry"),
        )
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::configuration_with_context(
            format!("Base URL for {} must use http or https", id),
            ErrorContext::new()
                .with_field_path(format!("backends.{}.base_url", id))
                .with_details(trimmed.to_string())
                .with_source("backend_registry"),
        ));
    }
    Ok(normalize(trimmed))
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
