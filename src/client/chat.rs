use super::core::ApiClient;
use super::types::{Agent, ChatRequest};
use crate::transport::RequestEnvelope;
use crate::Result;
use serde_json::Value;

impl ApiClient {
    /// Send one chat turn with a single text part.
    ///
    /// `agent` defaults to [`Agent::Default`]; names outside [`Agent::all`] are
    /// passed through to the server as-is.
    pub async fn chat(
        &self,
        prompt: &str,
        agent: Option<&str>,
        session_id: Option<&str>,
    ) -> Result<Value> {
        let request = ChatRequest::new(
            prompt,
            agent.unwrap_or(Agent::Default.as_str()),
            session_id.map(str::to_string),
        );
        self.request(RequestEnvelope::post(
            "/session/chat",
            serde_json::to_value(&request)?,
        ))
        .await
    }

    /// Agents the agent service routes to, with descriptions.
    pub fn agents(&self) -> &'static [Agent] {
        Agent::all()
    }
}
