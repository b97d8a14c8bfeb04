use super::core::ApiClient;
use crate::transport::RequestEnvelope;
use crate::Result;
use serde_json::{json, Map, Value};

impl ApiClient {
    /// Run a data workflow: `POST /workflow/run {request, date, ...extra}`.
    ///
    /// Keys in `extra` are merged last and win over `request`/`date` on the
    /// wire. A mock result is still labelled with the `query` and `date` given here.
    pub async fn run_workflow(
        &self,
        query: &str,
        date: &str,
        extra: Map<String, Value>,
    ) -> Result<Value> {
        let mut body = Map::new();
        body.insert("request".into(), Value::String(query.to_string()));
        body.insert("date".into(), Value::String(date.to_string()));
        body.extend(extra);
        let envelope = RequestEnvelope::post("/workflow/run", Value::Object(body))
            .with_fixture_input(json!({ "query": query, "date": date }));
        self.request(envelope).await
    }
}
