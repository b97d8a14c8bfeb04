//! Static fixtures. Each builder is pure: same input, same output.

use once_cell::sync::Lazy;
use serde_json::{json, Value};
use std::collections::HashMap;

pub const DEFAULT_CHAT_REPLY: &str = "我已经收到了你的消息，正在处理中...";

static CHAT_REPLIES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([(
        "hello 你是谁啊？",
        "你好！我是DataOrchestrator AI助手，可以帮助你查询数据、分析报表、上传文件等各种数据操作。",
    )])
});

static WORKFLOW_RESULT: Lazy<Value> = Lazy::new(|| {
    json!({
        "status": "completed",
        "task_results": {
            "fetch_sales_invoice": {
                "sales_invoice_df": [
                    { "id": 1, "date": "2025-01-20", "product": "Product A", "quantity": 10, "revenue": 1250.00 },
                    { "id": 2, "date": "2025-01-20", "product": "Product B", "quantity": 5, "revenue": 875.00 },
                    { "id": 3, "date": "2025-01-20", "product": "Product C", "quantity": 8, "revenue": 2100.00 }
                ],
                "total_rows": 3
            },
            "sql_task_0": {
                "sql_query": "SELECT date, product, SUM(quantity) as total_qty, SUM(revenue) as total_revenue FROM sales_invoice WHERE date = \"2025-01-20\" GROUP BY product",
                "data": [
                    { "product": "Product A", "total_qty": 10, "total_revenue": 1250.00 },
                    { "product": "Product B", "total_qty": 5, "total_revenue": 875.00 },
                    { "product": "Product C", "total_qty": 8, "total_revenue": 2100.00 }
                ],
                "metrics": {
                    "total_revenue": 4225.00,
                    "total_quantity": 23,
                    "average_revenue": 183.70
                }
            }
        },
        "completed_steps": ["preflight", "plan_to_graph", "run_manifest"],
        "error": null
    })
});

static SKILLS: Lazy<Value> = Lazy::new(|| {
    json!({
        "skills": [
            {
                "name": "excel-unstructured",
                "type": "function_based",
                "path": "skills/excel-unstructured",
                "description": "Excel 非结构化数据处理",
                "metadata": {
                    "function_count": 4,
                    "function_names": ["load_raw_data", "get_analysis_prompt", "parse_llm_response", "save_structured_data"]
                }
            },
            {
                "name": "test-e2e-minimal",
                "type": "function_based",
                "path": "skills/test-e2e-minimal",
                "description": "Minimal test skill for E2E",
                "metadata": {
                    "function_count": 1,
                    "function_names": ["echo"]
                }
            }
        ],
        "total": 2
    })
});

/// Reply text for a prompt: exact match on the whole prompt, else the default.
pub fn chat_reply_text(prompt: &str) -> &'static str {
    CHAT_REPLIES.get(prompt).copied().unwrap_or(DEFAULT_CHAT_REPLY)
}

/// `{message, response, tool_calls}` with no tool calls.
pub fn chat_reply(prompt: &str) -> Value {
    let text = chat_reply_text(prompt);
    json!({
        "message": text,
        "response": text,
        "tool_calls": []
    })
}

/// The fixed workflow result, tagged with the caller's query and date.
pub fn workflow_result(query: &Value, date: &Value) -> Value {
    let mut out = WORKFLOW_RESULT.clone();
    if let Value::Object(map) = &mut out {
        map.insert("query".into(), query.clone());
        map.insert("date".into(), date.clone());
    }
    out
}

pub fn skills() -> Value {
    SKILLS.clone()
}

/// A synthetic single-step plan echoing the request back.
pub fn skill_execution(skill_name: &str, user_request: &Value, context: &Value) -> Value {
    json!({
        "success": true,
        "result": {
            "message": format!("Mock execution of skill: {}", skill_name),
            "output": "Mock output data"
        },
        "plan": {
            "skill_name": skill_name,
            "user_request": user_request,
            "context": context,
            "steps": [
                {
                    "step_id": 1,
                    "action": "Mock step 1",
                    "function": "mock_function",
                    "args": {}
                }
            ]
        }
    })
}
