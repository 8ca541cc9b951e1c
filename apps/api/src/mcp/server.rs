//! MCP over HTTP: one JSON-RPC message per `POST /mcp`.
//!
//! Requests get a JSON-RPC response body. Notifications (no `id`) are
//! acknowledged with `202 Accepted` and no body.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::mcp::protocol::*;
use crate::mcp::tools::{call_tool, get_tools};
use crate::state::AppState;

pub const SERVER_NAME: &str = "onet-translation";

/// POST /mcp
pub async fn handle_mcp(State(state): State<AppState>, body: String) -> Response {
    let req: JsonRpcRequest = match serde_json::from_str(&body) {
        Ok(r) => r,
        Err(e) => {
            warn!("Unparseable MCP message: {e}");
            let response = JsonRpcResponse::error(None, PARSE_ERROR, e.to_string());
            return Json(response).into_response();
        }
    };

    if req.id.is_none() {
        debug!("MCP notification: {}", req.method);
        return StatusCode::ACCEPTED.into_response();
    }

    Json(dispatch(&state, req).await).into_response()
}

/// Handles a single JSON-RPC request.
async fn dispatch(state: &AppState, req: JsonRpcRequest) -> JsonRpcResponse {
    let id = req.id.clone();

    if req.jsonrpc != "2.0" {
        return JsonRpcResponse::error(
            id,
            INVALID_REQUEST,
            format!("Unsupported jsonrpc version: {}", req.jsonrpc),
        );
    }

    match req.method.as_str() {
        "initialize" => {
            let params: InitializeParams = serde_json::from_value(req.params).unwrap_or_default();
            let result = InitializeResult {
                protocol_version: params.negotiated_version().into(),
                capabilities: ServerCapabilities {
                    tools: ToolsCapability {
                        list_changed: false,
                    },
                },
                server_info: ServerInfo {
                    name: SERVER_NAME.into(),
                    version: env!("CARGO_PKG_VERSION").into(),
                },
            };
            respond(id, &result)
        }

        "ping" => JsonRpcResponse::success(id, json!({})),

        "tools/list" => respond(id, &ToolsListResult { tools: get_tools() }),

        "tools/call" => {
            let params: ToolCallParams = match serde_json::from_value(req.params) {
                Ok(p) => p,
                Err(e) => return JsonRpcResponse::error(id, INVALID_PARAMS, e.to_string()),
            };

            info!("Calling tool: {}", params.name);
            match call_tool(&state.search, &params.name, params.arguments).await {
                Ok(outcome) => match serde_json::to_value(&outcome) {
                    Ok(v) => respond(id, &ToolCallResult::json(&v)),
                    Err(e) => serialization_error(id, e),
                },
                Err(e @ AppError::UnknownTool(_)) => {
                    JsonRpcResponse::error(id, INVALID_PARAMS, e.to_string())
                }
                Err(e @ AppError::Validation(_)) => {
                    warn!("Rejected tool call: {e}");
                    respond(id, &ToolCallResult::error(e.to_string()))
                }
            }
        }

        _ => JsonRpcResponse::error(
            id,
            METHOD_NOT_FOUND,
            format!("Unknown method: {}", req.method),
        ),
    }
}

fn respond<T: Serialize>(id: Option<Value>, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(v) => JsonRpcResponse::success(id, v),
        Err(e) => serialization_error(id, e),
    }
}

fn serialization_error(id: Option<Value>, e: serde_json::Error) -> JsonRpcResponse {
    JsonRpcResponse::error(id, INTERNAL_ERROR, format!("Serialization error: {e}"))
}
