use std::path::PathBuf;

use anyhow::Context;
use time::{macros::format_description, UtcOffset};

pub const DEFAULT_GATEWAY_URL: &str = "https://ai.gateway.lovable.dev/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "google/gemini-2.5-flash";

#[derive(Debug, Clone)]
pub struct AiConfig {
    pub gateway_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Unset: meals live in memory only.
    pub storage_dir: Option<PathBuf>,
    /// Unset: the host's local offset, or UTC when that cannot be read.
    pub utc_offset: Option<UtcOffset>,
    pub ai: AiConfig,
    /// Remote relay for analyze-and-log; unset uses the in-process relay.
    pub relay_base_url: Option<String>,
}

fn non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let port = match non_empty("APP_PORT") {
            Some(p) => p.parse::<u16>().with_context(|| format!("APP_PORT={}", p))?,
            None => 8080,
        };
        let utc_offset = non_empty("LEDGER_UTC_OFFSET")
            .map(|raw| parse_offset(&raw))
            .transpose()?;
        let ai = AiConfig {
            gateway_url: non_empty("AI_GATEWAY_URL").unwrap_or_else(|| DEFAULT_GATEWAY_URL.into()),
            api_key: non_empty("AI_API_KEY").or_else(|| non_empty("OPENAI_API_KEY")),
            model: non_empty("AI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into()),
            timeout_secs: non_empty("AI_TIMEOUT_SECS")
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60),
        };
        Ok(Self {
            host: non_empty("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            storage_dir: non_empty("STORAGE_DIR").map(PathBuf::from),
            utc_offset,
            ai,
            relay_base_url: non_empty("RELAY_BASE_URL"),
        })
    }
}

/// `Z`, `UTC`, `+05:30`, `-08:00`.
pub fn parse_offset(raw: &str) -> anyhow::Result<UtcOffset> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("z") || raw.eq_ignore_ascii_case("utc") {
        return Ok(UtcOffset::UTC);
    }
    UtcOffset::parse(
        raw,
        format_description!("[offset_hour sign:mandatory]:[offset_minute]"),
    )
    .with_context(|| format!("invalid LEDGER_UTC_OFFSET {:?}", raw))
}
