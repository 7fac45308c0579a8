// Stdio harness: browser actions driven by JSON lines
//
// Reads one `{"tool": "...", "args": {...}}` request per stdin line and
// writes each result as one JSON string line on stdout. Logs go to stderr.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use kodegen_browser_actions::tools::{BROWSER_NAVIGATE, browser_tool_schemas};
use kodegen_browser_actions::{
    ActionSettings, BrowserManager, BrowserSession, FAILURE_PREFIX, ToolRegistry,
    load_yaml_config,
};

#[derive(Debug, Parser)]
#[command(name = "kodegen-browser-actions", version, about = "Drive a browser with JSON tool calls on stdin")]
struct Cli {
    /// YAML config file; defaults apply when it does not exist
    #[arg(long, env = "KODEGEN_BROWSER_CONFIG", default_value = "config.yaml")]
    config: PathBuf,

    /// Page to open before reading requests
    #[arg(long)]
    url: Option<String>,

    /// Print the tool schemas as JSON and exit
    #[arg(long)]
    list_tools: bool,
}

#[derive(Debug, Deserialize)]
struct ToolRequest {
    tool: String,
    #[serde(default)]
    args: Value,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

async fn write_line(stdout: &mut tokio::io::Stdout, result: &str) -> Result<()> {
    let mut line = serde_json::to_string(result).context("Failed to encode result")?;
    line.push('\n');
    stdout.write_all(line.as_bytes()).await?;
    stdout.flush().await?;
    Ok(())
}

async fn serve(registry: &ToolRegistry) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read stdin")?,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, shutting down");
                return Ok(());
            }
        };
        let Some(line) = line else {
            info!("stdin closed, shutting down");
            return Ok(());
        };
        if line.trim().is_empty() {
            continue;
        }

        let request: ToolRequest = match serde_json::from_str(&line) {
            Ok(request) => request,
            Err(e) => {
                warn!("Malformed request: {}", e);
                write_line(&mut stdout, &format!("{}Invalid request: {}", FAILURE_PREFIX, e)).await?;
                continue;
            }
        };

        let result = registry.dispatch(&request.tool, request.args).await;
        write_line(&mut stdout, &result).await?;

        if registry.is_terminal(&request.tool) && !result.starts_with(FAILURE_PREFIX) {
            info!("{} finished the task", request.tool);
            return Ok(());
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = load_yaml_config(&cli.config)?;

    if cli.list_tools {
        println!("{}", serde_json::to_string_pretty(&browser_tool_schemas())?);
        return Ok(());
    }

    let manager = BrowserManager::new(config.browser.clone());
    let page = match manager.open_page().await {
        Ok(page) => page,
        Err(e) => {
            manager.shutdown().await?;
            return Err(e.into());
        }
    };
    let session = BrowserSession::new(Arc::new(page), ActionSettings::from(&config.actions));
    let registry = ToolRegistry::for_session(session);

    if let Some(url) = &cli.url {
        let result = registry.dispatch(BROWSER_NAVIGATE, json!({ "url": url })).await;
        info!("{}", result);
    }

    let served = serve(&registry).await;
    if let Err(e) = &served {
        error!("Request loop failed: {:#}", e);
    }

    manager.shutdown().await?;
    served
}
