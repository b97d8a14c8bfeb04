//! Mock responder: canned answers for a backend running in mock mode.
//!
//! Fixtures are static and selected by a lookup on one input field (for chat,
//! the exact prompt text). They do not simulate any backend logic. Each
//! route resolves after a fixed delay so callers keep seeing asynchronous
//! latency.
//!
//! | Route | Backend | Delay | Keyed on |
//! |-------|---------|-------|----------|
//! | `POST /workflow/run` | data_platform | 1500 ms | caller's `query`, `date` (echoed back) |
//! | `POST /session/chat` | opencode_agent | 1000 ms | `parts[0].text` |
//! | `GET /skills` | opencode_agent | 500 ms | nothing |
//! | `POST /skills/execute` | opencode_agent | 1500 ms | `skill_name` (echoed in the plan) |
//!
//! Session and file routes have no fixtures. A [`MockTransport`] built with
//! a passthrough sends them to the live backend unchanged; without one they
//! fail with a configuration error.

pub mod fixtures;

use crate::backend::BackendId;
use crate::transport::{HttpMethod, LiveTransport, MultipartRequest, RequestEnvelope, Transport};
use crate::{Error, ErrorContext, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::info;

/// A route answered from fixtures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockRoute {
    WorkflowRun,
    Chat,
    ListSkills,
    ExecuteSkill,
}

impl MockRoute {
    /// Fixture route for `backend`, if any. Each route belongs to the one
    /// backend that serves it.
    pub fn match_route(backend: BackendId, method: HttpMethod, path: &str) -> Option<Self> {
        let path = path.split('?').next().unwrap_or(path);
        let route = match (method, path) {
            (HttpMethod::Post, "/workflow/run") => Self::WorkflowRun,
            (HttpMethod::Post, "/session/chat") => Self::Chat,
            (HttpMethod::Get, "/skills") => Self::ListSkills,
            (HttpMethod::Post, "/skills/execute") => Self::ExecuteSkill,
            _ => return None,
        };
        (route.backend() == backend).then_some(route)
    }

    pub fn backend(&self) -> BackendId {
        match self {
            Self::WorkflowRun => BackendId::DataPlatform,
            Self::Chat | Self::ListSkills | Self::ExecuteSkill => BackendId::OpencodeAgent,
        }
    }

    pub fn delay(&self) -> Duration {
        match self {
            Self::WorkflowRun => Duration::from_millis(1500),
            Self::Chat => Duration::from_millis(1000),
            Self::ListSkills => Duration::from_millis(500),
            Self::ExecuteSkill => Duration::from_millis(1500),
        }
    }

    /// Build the fixture for this route from the request. Pure.
    ///
    /// The workflow result is labelled from `fixture_input` when present,
    /// otherwise from the body.
    pub fn respond(&self, request: &RequestEnvelope) -> Value {
        let body = request.body.as_ref();
        let field = |name: &str| body.and_then(|b| b.get(name)).cloned().unwrap_or(Value::Null);
        match self {
            Self::WorkflowRun => match &request.fixture_input {
                Some(input) => fixtures::workflow_result(
                    input.get("query").unwrap_or(&Value::Null),
                    input.get("date").unwrap_or(&Value::Null),
                ),
                None => fixtures::workflow_result(&field("request"), &field("date")),
            },
            Self::Chat => {
                let prompt = body
                    .and_then(|b| b.pointer("/parts/0/text"))
                    .and_then(Value::as_str)
                    .unwrap_or("");
                fixtures::chat_reply(prompt)
            }
            Self::ListSkills => fixtures::skills(),
            Self::ExecuteSkill => {
                let name = field("skill_name");
                let context = match field("context") {
                    Value::Null => Value::Object(Default::default()),
                    other => other,
                };
                fixtures::skill_execution(
                    name.as_str().unwrap_or_default(),
                    &field("user_request"),
                    &context,
                )
            }
        }
    }
}

/// Transport answering fixture routes locally, never touching the network for them.
pub struct MockTransport {
    backend: BackendId,
    passthrough: Option<LiveTransport>,
}

impl MockTransport {
    /// Fixture-only transport: routes without a fixture fail.
    pub fn new(backend: BackendId) -> Self {
        Self {
            backend,
            passthrough: None,
        }
    }

    /// Routes without a fixture go to `live`.
    pub fn with_passthrough(backend: BackendId, live: LiveTransport) -> Self {
        Self {
            backend,
            passthrough: Some(live),
        }
    }

    fn no_fixture(&self, method: HttpMethod, path: &str) -> Error {
        Error::configuration_with_context(
            format!("No mock fixture for {} {} and no live passthrough", method, path),
            ErrorContext::new()
                .with_details(format!("backend: {}", self.backend))
                .with_source("mock_transport"),
        )
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn backend(&self) -> BackendId {
        self.backend
    }

    fn is_mock(&self) -> bool {
        true
    }

    async fn send(&self, request: RequestEnvelope) -> Result<Value> {
        match MockRoute::match_route(self.backend, request.method, &request.path) {
            Some(route) => {
                info!(
                    backend = %self.backend,
                    method = %request.method,
                    path = request.path.as_str(),
                    route = ?route,
                    "using mock mode"
                );
                tokio::time::sleep(route.delay()).await;
                Ok(route.respond(&request))
            }
            None => match &self.passthrough {
                Some(live) => live.execute(request).await,
                None => Err(self.no_fixture(request.method, &request.path)),
            },
        }
    }

    async fn send_multipart(&self, request: MultipartRequest) -> Result<Value> {
        match &self.passthrough {
            Some(live) => live.execute_multipart(request).await,
            None => Err(self.no_fixture(request.method, &request.path)),
        }
    }
}
