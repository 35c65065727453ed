use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use form_agent::{
    close_browser, fill_form, find_form_and_inputs, generate_screenshot, open_webpage,
    prepare_dummy_data, BrowserBuilder, BrowserConfig, SessionStore, Toolbox,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "form-agent",
    version,
    about = "Open a page, fill its first form with placeholder data and submit it"
)]
struct Cli {
    /// Run Chrome without a window.
    #[arg(long, global = true)]
    headless: bool,

    /// Chrome/Chromium executable to launch instead of the auto-detected one.
    #[arg(long, global = true, env = "CHROME_PATH")]
    chrome_path: Option<String>,

    /// Where screenshots are written.
    #[arg(long, global = true, default_value = "screenshots")]
    screenshot_dir: PathBuf,

    /// Skip the automation-fingerprint evasions.
    #[arg(long, global = true)]
    no_stealth: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the tool definitions as JSON.
    Tools,
    /// Open URL, fill the first form with placeholder data and submit it.
    Fill {
        url: String,
        /// Save a full-page screenshot after submitting.
        #[arg(long)]
        screenshot: bool,
        /// Leave the browser open until Ctrl-C.
        #[arg(long)]
        keep_open: bool,
    },
    /// Serve tool calls as JSON lines on stdin/stdout.
    Serve,
}

#[derive(Deserialize)]
struct ToolRequest {
    tool: String,
    #[serde(default)]
    arguments: Value,
}

impl Cli {
    fn browser_config(&self) -> BrowserConfig {
        let mut builder = BrowserBuilder::new()
            .headless(self.headless)
            .stealth(!self.no_stealth)
            .screenshot_dir(&self.screenshot_dir);
        if let Some(ref path) = self.chrome_path {
            builder = builder.chrome_path(path);
        }
        builder.build_config()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries tool output; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.browser_config();

    match cli.command {
        Command::Tools => {
            let toolbox = Toolbox::new(Arc::new(SessionStore::new()), config);
            println!("{}", serde_json::to_string_pretty(&toolbox.definitions())?);
        }
        Command::Fill {
            ref url,
            screenshot,
            keep_open,
        } => {
            let summary = run_fill(&config, url, screenshot, keep_open).await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Serve => {
            let toolbox = Toolbox::new(Arc::new(SessionStore::new()), config);
            serve(
                &toolbox,
                BufReader::new(tokio::io::stdin()),
                tokio::io::stdout(),
            )
            .await?
        }
    }
    Ok(())
}

async fn run_fill(
    config: &BrowserConfig,
    url: &str,
    screenshot: bool,
    keep_open: bool,
) -> Result<Value> {
    let store = SessionStore::new();
    let opened = open_webpage(&store, config, url)
        .await
        .with_context(|| format!("failed to open {url}"))?;
    let session_id = opened.session_id.clone();
    let session_id = session_id.as_str();

    let result = async {
        let inputs = find_form_and_inputs(&store, session_id).await?;
        let inputs = prepare_dummy_data(inputs);
        let outcome = fill_form(&store, session_id, &inputs).await?;
        let screenshot_path = if screenshot {
            Some(generate_screenshot(&store, config, session_id).await?)
        } else {
            None
        };
        Ok::<_, form_agent::Error>(json!({
            "session": opened,
            "inputDetails": inputs,
            "result": outcome,
            "screenshot": screenshot_path,
        }))
    }
    .await;

    if let Err(e) = &result {
        tracing::error!(error = %e, kind = e.kind().as_str(), "form run failed");
    }

    if keep_open {
        tracing::info!("browser left open, press Ctrl-C to exit");
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "cannot listen for Ctrl-C, closing now");
        }
    }
    finish_run(&store, session_id, result).await
}

/// Close the run's session, then hand back the run's own outcome. A failed
/// close is logged and never replaces that outcome.
async fn finish_run(
    store: &SessionStore,
    session_id: &str,
    result: form_agent::Result<Value>,
) -> Result<Value> {
    if let Err(e) = close_browser(store, session_id).await {
        tracing::warn!(session_id, error = %e, "failed to close browser");
    }
    result.context("form run failed")
}

/// Answer requests until `input` ends or fails, then close every session.
async fn serve<R, W>(toolbox: &Toolbox, input: R, output: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let served = answer_requests(toolbox, input, output).await;
    tracing::info!("shutting down sessions");
    toolbox.store().close_all().await;
    served
}

async fn answer_requests<R, W>(toolbox: &Toolbox, input: R, mut output: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();

    while let Some(line) = lines.next_line().await.context("failed to read request")? {
        if line.trim().is_empty() {
            continue;
        }
        let response = match serde_json::from_str::<ToolRequest>(&line) {
            Ok(request) => match toolbox.call(&request.tool, request.arguments).await {
                Ok(value) => json!({ "ok": true, "output": value }),
                Err(e) => json!({ "ok": false, "error": e.to_string(), "kind": e.kind().as_str() }),
            },
            Err(e) => json!({
                "ok": false,
                "error": format!("malformed request: {e}"),
                "kind": "invalid_input",
            }),
        };
        output.write_all(format!("{response}\n").as_bytes()).await?;
        output.flush().await?;
    }

    tracing::debug!("input closed");
    Ok(())
}
