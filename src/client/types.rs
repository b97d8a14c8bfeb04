//! Request and response shapes for the domain operations.

use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Agents known to the agent service. `chat` also accepts any other name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Agent {
    Default,
    Excel,
    Data,
    Action,
    Plan,
}

impl Agent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Excel => "excel",
            Self::Data => "data",
            Self::Action => "action",
            Self::Plan => "plan",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Default => "Orchestrator: Routes tasks to specialized agents automatically",
            Self::Excel => "Excel Agent: Specialized in Excel file processing",
            Self::Data => "Data Agent: Queries business data and databases",
            Self::Action => "Action Agent: Sends emails and notifications",
            Self::Plan => "Plan Agent: Complex task planning and decomposition",
        }
    }

    pub fn all() -> &'static [Agent] {
        &[
            Self::Default,
            Self::Excel,
            Self::Data,
            Self::Action,
            Self::Plan,
        ]
    }
}

impl Default for Agent {
    fn default() -> Self {
        Self::Default
    }
}

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Agent {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Agent::all()
            .iter()
            .copied()
            .find(|a| a.as_str() == s.trim())
            .ok_or_else(|| {
                Error::configuration_with_context(
                    format!("Unknown agent: {}", s),
                    ErrorContext::new().with_source("agent"),
                )
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePart {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

impl MessagePart {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: "text".to_string(),
            text: text.into(),
        }
    }
}

/// Body of `POST /session/chat`. `sessionId` is sent as `null` when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub parts: Vec<MessagePart>,
    pub agent: String,
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
    pub no_reply: bool,
}

impl ChatRequest {
    pub fn new(prompt: impl Into<String>, agent: impl Into<String>, session_id: Option<String>) -> Self {
        Self {
            parts: vec![MessagePart::text(prompt)],
            agent: agent.into(),
            session_id,
            no_reply: false,
        }
    }
}

/// Typed view of a chat result. The raw JSON stays the source of truth.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub tool_calls: Vec<Value>,
}

impl ChatReply {
    pub fn from_value(value: &Value) -> Result<Self> {
        Ok(serde_json::from_value(value.clone())?)
    }

    /// Human-readable text: `message`, falling back to `response`.
    pub fn text(&self) -> Option<&str> {
        self.message
            .as_deref()
            .or(self.response.as_deref())
    }
}

/// Body of `POST /skills/execute`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillExecuteRequest {
    pub skill_name: String,
    pub user_request: String,
    pub context: Value,
}

/// Response of `POST /upload`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    /// Location usable as `context.file_path` in a skill execution.
    pub file_path: String,
    pub file_name: String,
    #[serde(default)]
    pub file_size: u64,
    #[serde(default)]
    pub mime_type: Option<String>,
}
