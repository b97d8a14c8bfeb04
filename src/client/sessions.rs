//! Chat session CRUD. No fixtures exist for these routes, so they reach the
//! live backend even when the client runs in mock mode.

use super::core::ApiClient;
use crate::transport::RequestEnvelope;
use crate::Result;
use serde_json::Value;

impl ApiClient {
    pub async fn get_sessions(&self) -> Result<Value> {
        self.request(RequestEnvelope::get("/sessions")).await
    }

    pub async fn create_session(&self, data: Value) -> Result<Value> {
        self.request(RequestEnvelope::post("/sessions", data)).await
    }

    pub async fn delete_session(&self, session_id: &str) -> Result<Value> {
        self.request(RequestEnvelope::delete(format!("/sessions/{}", session_id)))
            .await
    }
}
