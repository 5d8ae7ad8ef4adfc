mod advisor;
mod chat;
mod config;
mod error;
mod server;

use std::sync::Arc;

use rmcp::{ServiceExt, transport::stdio};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use farm_common::openai::{OpenAiClient, OpenAiClientConfig};
use farm_common::weather::{WeatherClient, WeatherClientConfig};

use advisor::Advisor;
use chat::ChatStore;
use config::Config;
use server::FarmAdvisorServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout is reserved for MCP JSON-RPC
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting farm-advisor MCP server");

    let config = Config::from_env()?;
    info!(
        model = %config.model,
        language = %config.default_language,
        guide_line_width = config.guide_line_width,
        chat_ttl_secs = config.chat_ttl.as_secs(),
        "configuration loaded"
    );

    let openai_config = OpenAiClientConfig::from_env();
    info!(
        base_url = %openai_config.base_url,
        timeout_ms = openai_config.default_timeout.as_millis(),
        api_key = openai_config.api_key.is_some(),
        "openai client configured"
    );
    let openai = Arc::new(OpenAiClient::new(openai_config)?);

    let weather = Arc::new(WeatherClient::new(WeatherClientConfig::from_env())?);
    if !weather.is_configured() {
        warn!("OPENWEATHER_API_KEY not set, get_weather will fail");
    }

    let advisor = Advisor::new(openai, weather, config.model.clone());
    let chats = ChatStore::new(config.chat_ttl);
    let server = FarmAdvisorServer::new(advisor, chats, config.clone());

    if let Some(addr) = config.tcp_listen_addr.as_deref() {
        let listener = TcpListener::bind(addr).await?;
        info!(listen_addr = %addr, "MCP server ready, serving on TCP");
        loop {
            let (stream, peer) = listener.accept().await?;
            let server = server.clone();
            tokio::spawn(async move {
                info!(peer = %peer, "MCP client connected");
                let service = server.serve(stream).await.inspect_err(|e| {
                    tracing::error!(error = %e, "MCP server error");
                })?;
                service.waiting().await?;
                info!(peer = %peer, "MCP client disconnected");
                Ok::<(), anyhow::Error>(())
            });
        }
    } else {
        info!("MCP server ready, serving on stdio");
        let service = server.serve(stdio()).await.inspect_err(|e| {
            tracing::error!(error = %e, "MCP server error");
        })?;
        service.waiting().await?;
        info!("MCP server shut down");
    }
    Ok(())
}
