use std::sync::Arc;

use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::{
    CHANNEL_CAPACITY, MCP_PROTOCOL_VERSION, SERVER_NAME, SUPPORTED_PROTOCOL_VERSIONS,
};
use crate::engine::RankParams;
use crate::error::{AppError, Result};
use crate::format::{opportunities_text, rewards_summary, sponsors_text};
use crate::gateway::SnapshotSource;
use crate::mcp::protocol::{
    limit_to_usize, parse_args, tool_definitions, tool_error, tool_result, OpportunitiesArgs,
    RewardsArgs, RpcRequest, RpcResponse, SponsorsArgs, INVALID_PARAMS, INVALID_REQUEST,
    METHOD_NOT_FOUND, PARSE_ERROR, TOOL_OPPORTUNITIES, TOOL_REWARDS, TOOL_SPONSORS,
};
use crate::service::QueryService;

/// Dispatches MCP requests to the query service.
pub struct McpHandler<S> {
    service: Arc<QueryService<S>>,
}

impl<S: SnapshotSource> McpHandler<S> {
    pub fn new(service: Arc<QueryService<S>>) -> Self {
        Self { service }
    }

    /// Handle one raw frame. Returns the serialized reply, or `None` for
    /// notifications.
    pub async fn handle_line(&self, line: &str) -> Option<String> {
        let response = match serde_json::from_str::<Value>(line) {
            Err(e) => Some(RpcResponse::err(Value::Null, PARSE_ERROR, format!("Parse error: {e}"))),
            Ok(raw) => self.handle_value(raw).await,
        }?;

        match serde_json::to_string(&response) {
            Ok(s) => Some(s),
            Err(e) => {
                error!("[MCP] failed to serialize response: {e}");
                None
            }
        }
    }

    async fn handle_value(&self, raw: Value) -> Option<RpcResponse> {
        let fallback_id = raw.get("id").cloned().unwrap_or(Value::Null);
        let req = match serde_json::from_value::<RpcRequest>(raw) {
            Ok(r) => r,
            Err(e) => {
                return Some(RpcResponse::err(
                    fallback_id,
                    INVALID_REQUEST,
                    format!("Invalid request: {e}"),
                ))
            }
        };

        let Some(id) = req.id else {
            debug!(method = %req.method, "[MCP] notification");
            return None;
        };

        if req.jsonrpc.as_deref() != Some("2.0") {
            return Some(RpcResponse::err(
                id,
                INVALID_REQUEST,
                "Invalid request: jsonrpc must be \"2.0\"",
            ));
        }

        let response = match req.method.as_str() {
            "initialize" => RpcResponse::ok(id, initialize_result(&req.params)),
            "ping" => RpcResponse::ok(id, json!({})),
            "tools/list" => RpcResponse::ok(id, json!({ "tools": tool_definitions() })),
            "tools/call" => match self.call_tool(&req.params).await {
                Ok(result) => RpcResponse::ok(id, result),
                Err(AppError::InvalidParams(msg)) => RpcResponse::err(id, INVALID_PARAMS, msg),
                Err(e) => {
                    warn!("[MCP] tool call failed: {e}");
                    RpcResponse::ok(id, tool_error(&e.to_string()))
                }
            },
            other => RpcResponse::err(id, METHOD_NOT_FOUND, format!("Method not found: {other}")),
        };
        Some(response)
    }

    async fn call_tool(&self, params: &Value) -> Result<Value> {
        let name = params
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| AppError::InvalidParams("tools/call requires a tool name".to_string()))?;
        let args = params.get("arguments");
        debug!(tool = name, "[MCP] tools/call");

        match name {
            TOOL_REWARDS => {
                let args: RewardsArgs = parse_args(args)?;
                let snapshot = self
                    .service
                    .get_sponsored_rewards(args.force.unwrap_or(false))
                    .await?;
                let raw = snapshot.pass_through_json()?;
                Ok(tool_result(vec![rewards_summary(&snapshot), raw]))
            }
            TOOL_OPPORTUNITIES => {
                let args: OpportunitiesArgs = parse_args(args)?;
                let defaults = RankParams::default();
                let params = RankParams {
                    min_rate_per_day: args.min_rate_per_day.unwrap_or(defaults.min_rate_per_day),
                    limit: limit_to_usize(args.limit)?.unwrap_or(defaults.limit),
                };
                let report = self.service.get_active_opportunities(params).await?;
                Ok(tool_result(vec![opportunities_text(&report)]))
            }
            TOOL_SPONSORS => {
                let args: SponsorsArgs = parse_args(args)?;
                let ranked = self.service.get_top_sponsors(limit_to_usize(args.limit)?).await?;
                Ok(tool_result(vec![sponsors_text(&ranked)]))
            }
            other => Err(AppError::InvalidParams(format!("Tool {other} not found"))),
        }
    }
}

fn initialize_result(params: &Value) -> Value {
    let version = params
        .get("protocolVersion")
        .and_then(Value::as_str)
        .filter(|v| SUPPORTED_PROTOCOL_VERSIONS.contains(v))
        .unwrap_or(MCP_PROTOCOL_VERSION);
    json!({
        "protocolVersion": version,
        "capabilities": { "tools": { "listChanged": false } },
        "serverInfo": { "name": SERVER_NAME, "version": env!("CARGO_PKG_VERSION") }
    })
}

/// Serve newline-delimited JSON-RPC until `reader` reaches EOF.
///
/// Each request runs on its own task; replies funnel through one writer task
/// so frames never interleave on `writer`.
pub async fn serve<S, R, W>(handler: Arc<McpHandler<S>>, reader: R, writer: W) -> Result<()>
where
    S: SnapshotSource + 'static,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (reply_tx, mut reply_rx) = mpsc::channel::<String>(CHANNEL_CAPACITY);

    let writer_task = tokio::spawn(async move {
        let mut writer = writer;
        while let Some(frame) = reply_rx.recv().await {
            writer.write_all(frame.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }
        Ok::<(), std::io::Error>(())
    });

    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let handler = Arc::clone(&handler);
        let tx = reply_tx.clone();
        tokio::spawn(async move {
            if let Some(reply) = handler.handle_line(&line).await {
                if let Err(e) = tx.send(reply).await {
                    warn!("[MCP] reply channel closed: {e}");
                }
            }
        });
    }

    info!("[MCP] input closed, draining replies");
    drop(reply_tx);
    match writer_task.await {
        Ok(res) => res?,
        Err(e) => error!("[MCP] writer task panicked: {e}"),
    }
    Ok(())
}

/// Run the MCP server on this process's stdin/stdout.
pub async fn run_stdio<S: SnapshotSource + 'static>(service: Arc<QueryService<S>>) -> Result<()> {
    let handler = Arc::new(McpHandler::new(service));
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    info!("Polymarket Rewards MCP server running on stdio");
    serve(handler, stdin, tokio::io::stdout()).await
}
