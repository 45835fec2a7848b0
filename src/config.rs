use crate::error::{AppError, Result};

pub const REWARDS_API_URL: &str = "https://cheff-phi.vercel.app/api/sponsored";
pub const POLYMARKET_EVENT_URL: &str = "https://polymarket.com/event";
pub const POLYGONSCAN_TX_URL: &str = "https://polygonscan.com/tx";

pub const SERVER_NAME: &str = "polymarket-rewards";

/// MCP protocol revision advertised when the client does not request one.
pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";
/// Versions a client may negotiate; anything else is answered with ours.
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2024-11-05", "2025-03-26", "2025-06-18"];

/// Default result size for `get_active_opportunities`.
pub const DEFAULT_OPPORTUNITY_LIMIT: usize = 50;

/// Default result size for `get_top_sponsors`.
pub const DEFAULT_SPONSOR_LIMIT: usize = 10;

pub const MS_PER_DAY: f64 = 86_400_000.0;

/// Width of the market id shown when an event carries no question.
pub const MARKET_ID_FALLBACK_CHARS: usize = 40;

/// Channel capacity for MCP response routing.
pub const CHANNEL_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// MCP over stdin/stdout.
    Stdio,
    /// JSON HTTP API.
    Http,
}

impl std::str::FromStr for Transport {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdio" | "mcp" => Ok(Transport::Stdio),
            "http" => Ok(Transport::Http),
            other => Err(AppError::Config(format!(
                "TRANSPORT must be 'stdio' or 'http', got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub rewards_api_url: String,
    pub transport: Transport,
    pub log_level: String,
    pub api_port: u16,
    /// Upstream request timeout (HTTP_TIMEOUT_SECS)
    pub http_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            rewards_api_url: std::env::var("REWARDS_API_URL")
                .unwrap_or_else(|_| REWARDS_API_URL.to_string()),
            transport: std::env::var("TRANSPORT")
                .unwrap_or_else(|_| "stdio".to_string())
                .parse()?,
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse::<u16>()
                .map_err(|_| AppError::Config("API_PORT must be a valid port number".to_string()))?,
            http_timeout_secs: std::env::var("HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse::<u64>()
                .unwrap_or(30),
        })
    }
}
