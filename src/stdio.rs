//! One-shot JSON request/response over stdin/stdout.
//!
//! Reads a single JSON object from stdin, runs it, and prints a single JSON
//! response. Every failure mode produces a structured `{ok: false, ...}`
//! response rather than a crash.
//!
//! # Requests
//!
//! ```json
//! {"command": "list_tools"}
//! {"tool": "hn_get_top_posts", "args": {"limit": 3}}
//! ```
//!
//! # Responses
//!
//! ```json
//! {"ok": true, "command": "list_tools", "manifest": {...}}
//! {"ok": true, "tool": "hn_get_top_posts", "result": [...]}
//! {"ok": false, "error": "Unknown tool 'x'", "available_tools": [...]}
//! ```
//!
//! `result` may itself be an `{error, details}` envelope when the upstream
//! fetch failed; the request was still handled, so `ok` stays `true`.

use anyhow::{Context, Result};
use serde_json::{json, Value};
use tokio::io::AsyncReadExt;

use crate::tools::manifest;
use crate::traits::{ToolContext, ToolError, ToolRegistry};

/// Read one request from stdin and write the response to stdout.
pub async fn run_stdio(registry: &ToolRegistry, ctx: &ToolContext) -> Result<()> {
    let mut input = String::new();
    tokio::io::stdin()
        .read_to_string(&mut input)
        .await
        .context("Failed to read request from stdin")?;

    let response = handle_request(registry, ctx, &input).await;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

/// Handle one raw request text and build the response value.
pub async fn handle_request(registry: &ToolRegistry, ctx: &ToolContext, input: &str) -> Value {
    let input = input.trim();
    if input.is_empty() {
        return json!({ "ok": false, "error": "No input received on stdin" });
    }

    let request: Value = match serde_json::from_str(input) {
        Ok(v) => v,
        Err(e) => {
            return json!({
                "ok": false,
                "error": "Invalid JSON in request",
                "details": e.to_string(),
            })
        }
    };

    let Some(request) = request.as_object() else {
        return json!({ "ok": false, "error": "Request must be a JSON object" });
    };

    if request.get("command").and_then(Value::as_str) == Some("list_tools") {
        return json!({
            "ok": true,
            "command": "list_tools",
            "manifest": manifest(registry),
        });
    }

    let tool_name = request.get("tool").and_then(Value::as_str).unwrap_or("");
    if registry.find(tool_name).is_none() {
        return json!({
            "ok": false,
            "error": format!("Unknown tool '{}'", tool_name),
            "available_tools": registry.names(),
        });
    }

    let args = request.get("args").cloned().unwrap_or_else(|| json!({}));
    if !args.is_object() {
        return json!({ "ok": false, "error": "Request 'args' must be an object/dict" });
    }

    match registry.call(tool_name, args, ctx).await {
        Ok(outcome) => json!({
            "ok": true,
            "tool": tool_name,
            "result": outcome,
        }),
        Err(e @ ToolError::UnknownTool { .. }) => json!({
            "ok": false,
            "error": e.to_string(),
            "available_tools": registry.names(),
        }),
        Err(e) => json!({
            "ok": false,
            "error": format!("Tool '{}' raised an exception", tool_name),
            "details": e.to_string(),
        }),
    }
}
