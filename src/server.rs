//! HTTP server: JSON tool API plus a browser page.
//!
//! Every tool in the [`ToolRegistry`] is reachable through the same
//! `POST /tools/{name}` handler.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/` | HTML table of one feed (`?source=&limit=`) |
//! | `GET`  | `/tools/list` | List all registered tools with schemas |
//! | `POST` | `/tools/{name}` | Call any registered tool by name |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! Dispatch failures use one JSON shape:
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "Invalid source. Use one of: hackernews, producthunt, reddit." } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `unavailable` (503).
//!
//! A failed upstream fetch is not a dispatch failure: it returns `200` with
//! `{"result": {"error": ..., "details": ...}}`.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so browser-based clients
//! can call the tool API directly.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::limit::LimitPolicy;
use crate::traits::{ErrorEnvelope, ToolContext, ToolError, ToolOutcome, ToolRegistry};
use crate::ui::{render_page, PageQuery};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    tools: Arc<ToolRegistry>,
    /// Context with [`LimitPolicy::AGENT`]; callers here are untrusted.
    ctx: ToolContext,
}

/// Build the router without binding it.
pub fn app(tools: Arc<ToolRegistry>, ctx: &ToolContext) -> Router {
    let state = AppState {
        tools,
        ctx: ctx.with_limits(LimitPolicy::AGENT),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handle_index))
        .route("/tools/list", get(handle_list_tools))
        .route("/tools/{name}", post(handle_tool_call))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state)
}

/// Bind to `[server].bind` and serve until the process is terminated.
pub async fn run_server(
    config: &Config,
    tools: Arc<ToolRegistry>,
    ctx: &ToolContext,
) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let app = app(tools, ctx);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(bind = %bind_addr, "HTTP server listening");
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    /// Machine-readable error code (e.g., `"bad_request"`, `"not_found"`).
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: message.into(),
    }
}

impl From<ToolError> for AppError {
    fn from(err: ToolError) -> Self {
        match err {
            ToolError::InvalidArgument(msg) => bad_request(msg),
            e @ ToolError::UnknownTool { .. } => not_found(e.to_string()),
            e @ ToolError::Unavailable(_) => AppError {
                status: StatusCode::SERVICE_UNAVAILABLE,
                code: "unavailable".to_string(),
                message: e.to_string(),
            },
        }
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET /tools/list ============

#[derive(Serialize)]
struct ToolListEntry {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Serialize)]
struct ToolListResponse {
    tools: Vec<ToolListEntry>,
}

async fn handle_list_tools(State(state): State<AppState>) -> Json<ToolListResponse> {
    let tools = state
        .tools
        .tools()
        .iter()
        .map(|t| ToolListEntry {
            name: t.name().to_string(),
            description: t.description().to_string(),
            parameters: t.parameters_schema(),
        })
        .collect();

    Json(ToolListResponse { tools })
}

// ============ POST /tools/{name} ============

/// Unified tool dispatch.
///
/// Returns `404` if the tool is not found and `400` for a non-object body
/// or an invalid argument.
async fn handle_tool_call(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(params): Json<Value>,
) -> Result<Json<Value>, AppError> {
    if state.tools.find(&name).is_none() {
        return Err(not_found(format!("no tool registered with name: {}", name)));
    }
    if !params.is_object() {
        return Err(bad_request("request body must be a JSON object"));
    }

    let result = state.tools.call(&name, params, &state.ctx).await?;
    Ok(Json(json!({ "result": result })))
}

// ============ GET / ============

async fn handle_index(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Html<String> {
    let request = query.resolve();
    let params = json!({ "source": request.source.key(), "limit": request.limit });

    let outcome = match state.tools.call("get_feed", params, &state.ctx).await {
        Ok(outcome) => outcome,
        Err(e) => ToolOutcome::Error(ErrorEnvelope {
            error: "Request failed".to_string(),
            details: Some(e.to_string()),
        }),
    };

    Html(render_page(&request, &outcome))
}
