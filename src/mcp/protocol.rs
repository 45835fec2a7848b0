//! JSON-RPC 2.0 framing and the MCP tool catalogue.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{AppError, Result};

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;

/// Incoming frame. A missing `id` marks a notification.
#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct RpcResponse {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    pub fn ok(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn err(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Tool arguments
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct RewardsArgs {
    pub force: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OpportunitiesArgs {
    pub min_rate_per_day: Option<f64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SponsorsArgs {
    pub limit: Option<u64>,
}

/// Decode tool arguments; absent or `null` arguments mean "all defaults".
pub fn parse_args<T: DeserializeOwned + Default>(args: Option<&Value>) -> Result<T> {
    match args {
        None | Some(Value::Null) => Ok(T::default()),
        Some(v) => {
            serde_json::from_value(v.clone()).map_err(|e| AppError::InvalidParams(e.to_string()))
        }
    }
}

pub fn limit_to_usize(limit: Option<u64>) -> Result<Option<usize>> {
    limit
        .map(|l| usize::try_from(l).map_err(|_| AppError::InvalidParams(format!("limit {l} is too large"))))
        .transpose()
}

// ---------------------------------------------------------------------------
// Tool catalogue
// ---------------------------------------------------------------------------

pub const TOOL_REWARDS: &str = "get_sponsored_rewards";
pub const TOOL_OPPORTUNITIES: &str = "get_active_opportunities";
pub const TOOL_SPONSORS: &str = "get_top_sponsors";

pub fn tool_definitions() -> Value {
    json!([
        {
            "name": TOOL_REWARDS,
            "description": "Get all Polymarket sponsored reward data including overall stats and every sponsorship event. Returns total deposited, consumed and returned USDC, unique sponsor and market counts, and the full event list.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "force": {
                        "type": "boolean",
                        "description": "Bypass cache and fetch fresh on-chain data (default false)"
                    }
                }
            }
        },
        {
            "name": TOOL_OPPORTUNITIES,
            "description": "Get active sponsored reward opportunities on Polymarket, sorted by daily reward rate. Filters out expired and withdrawn events. Use this to find the best markets to provide liquidity on.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "min_rate_per_day": {
                        "type": "number",
                        "description": "Minimum daily reward rate in USD (default 0)"
                    },
                    "limit": {
                        "type": "integer",
                        "minimum": 0,
                        "description": "Maximum number of results to return (default 50)"
                    }
                }
            }
        },
        {
            "name": TOOL_SPONSORS,
            "description": "Get the top sponsors on Polymarket by net USDC deposited. Shows address, net amount, and number of markets sponsored.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "limit": {
                        "type": "integer",
                        "minimum": 0,
                        "description": "Number of sponsors to return (default 10)"
                    }
                }
            }
        }
    ])
}

/// Successful tool output: one text content block per entry.
pub fn tool_result(texts: Vec<String>) -> Value {
    let content: Vec<Value> = texts
        .into_iter()
        .map(|text| json!({ "type": "text", "text": text }))
        .collect();
    json!({ "content": content, "isError": false })
}

pub fn tool_error(message: &str) -> Value {
    json!({
        "content": [{ "type": "text", "text": format!("Error: {message}") }],
        "isError": true
    })
}
