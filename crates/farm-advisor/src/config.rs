use std::time::Duration;

use farm_common::language::Language;

use crate::error::AppError;

/// Application configuration loaded explicitly from environment variables.
///
/// Model and weather client settings are read by their own `from_env` constructors.
#[derive(Debug, Clone)]
pub struct Config {
    /// Model ID sent with every completion request.
    pub model: String,
    /// Language used when a tool call does not name one.
    pub default_language: Language,
    /// Maximum characters per line in generated guides.
    pub guide_line_width: usize,
    /// When set, serve MCP over TCP on this address instead of stdio.
    pub tcp_listen_addr: Option<String>,
    /// Idle time after which a chat session is discarded.
    pub chat_ttl: Duration,
}

impl Config {
    /// Required:
    /// - `OPENAI_MODEL`: model ID on the OpenAI-compatible host
    ///
    /// Optional:
    /// - `FARM_LANGUAGE` (default: "english")
    /// - `GUIDE_LINE_WIDTH` (default: 80)
    /// - `MCP_TCP_LISTEN_ADDR`
    /// - `CHAT_TTL_SECS` (default: 86400)
    pub fn from_env() -> Result<Self, AppError> {
        let model = std::env::var("OPENAI_MODEL")
            .ok()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .ok_or_else(|| {
                AppError::Config("OPENAI_MODEL environment variable is required".to_string())
            })?;

        let default_language = match std::env::var("FARM_LANGUAGE") {
            Ok(raw) => raw
                .parse::<Language>()
                .map_err(|e| AppError::Config(e.to_string()))?,
            Err(_) => Language::default(),
        };

        let guide_line_width = match std::env::var("GUIDE_LINE_WIDTH") {
            Ok(raw) => parse_line_width(&raw)?,
            Err(_) => 80,
        };

        let chat_ttl = match std::env::var("CHAT_TTL_SECS") {
            Ok(raw) => parse_chat_ttl(&raw)?,
            Err(_) => Duration::from_secs(86_400),
        };

        Ok(Self {
            model,
            default_language,
            guide_line_width,
            tcp_listen_addr: std::env::var("MCP_TCP_LISTEN_ADDR").ok(),
            chat_ttl,
        })
    }
}

fn parse_line_width(raw: &str) -> Result<usize, AppError> {
    raw.trim()
        .parse::<usize>()
        .ok()
        .filter(|&w| w > 0)
        .ok_or_else(|| {
            AppError::Config(format!("GUIDE_LINE_WIDTH must be a positive integer, got {raw:?}"))
        })
}

fn parse_chat_ttl(raw: &str) -> Result<Duration, AppError> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|&s| s > 0)
        .map(Duration::from_secs)
        .ok_or_else(|| {
            AppError::Config(format!("CHAT_TTL_SECS must be a positive integer, got {raw:?}"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_width_must_be_positive() {
        assert_eq!(parse_line_width("72").unwrap(), 72);
        assert!(parse_line_width("0").is_err());
        assert!(parse_line_width("wide").is_err());
    }

    #[test]
    fn chat_ttl_is_whole_seconds() {
        assert_eq!(parse_chat_ttl(" 3600 ").unwrap(), Duration::from_secs(3600));
        assert!(parse_chat_ttl("0").is_err());
        assert!(parse_chat_ttl("1h").is_err());
    }
}
