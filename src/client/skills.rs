use super::core::ApiClient;
use super::types::SkillExecuteRequest;
use crate::transport::RequestEnvelope;
use crate::Result;
use serde_json::Value;

impl ApiClient {
    pub async fn list_skills(&self) -> Result<Value> {
        self.request(RequestEnvelope::get("/skills")).await
    }

    /// Invoke a skill. A `null` context is sent as an empty object.
    pub async fn execute_skill(
        &self,
        skill_name: &str,
        user_request: &str,
        context: Value,
    ) -> Result<Value> {
        let context = if context.is_null() {
            Value::Object(Default::default())
        } else {
            context
        };
        let request = SkillExecuteRequest {
            skill_name: skill_name.to_string(),
            user_request: user_request.to_string(),
            context,
        };
        self.request(RequestEnvelope::post(
            "/skills/execute",
            serde_json::to_value(&request)?,
        ))
        .await
    }
}
