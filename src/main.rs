//! gitlane: parse captured git output into JSON records.
//!
//! The command runs nothing itself: it reads the stdout (and optionally the
//! stderr and exit code) of a git invocation the caller already ran, hands
//! them to the matching `parse/*` method and prints the result as JSON.
//!
//! Usage:
//!   git status --porcelain=v2 --branch | gitlane status
//!   gitlane diff --input staged.diff --pretty
//!   gitlane merge --input out.txt --stderr err.txt --exit-code 1
//!   gitlane blame --input blame.txt --now 1700000000
//!   gitlane hunkPatch --input a.diff --params '{"hunk":0,"lines":[1]}'
//!   gitlane --serve                      # line-delimited JSON-RPC on stdin

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::Parser;
use gitlane_protocol::methods::{ALL_METHODS, is_known_method};
use gitlane_protocol::{RpcError, RpcRequest, RpcResponse};
use gitlane_services::{ParseService, Service};
use serde_json::{Map, Value, json};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gitlane", version, about = "Parse captured git output into JSON records")]
struct Cli {
    /// Parse method, e.g. `status`, `diff` or `parse/log`
    #[arg(required_unless_present_any = ["serve", "list"])]
    method: Option<String>,

    /// File holding the command's stdout (read from stdin when omitted)
    #[arg(long)]
    input: Option<PathBuf>,

    /// File holding the command's stderr
    #[arg(long)]
    stderr: Option<PathBuf>,

    /// Exit code of the command
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    exit_code: i32,

    /// Unix time used as "now" for relative blame dates
    #[arg(long)]
    now: Option<i64>,

    /// Extra method parameters as a JSON object
    #[arg(long)]
    params: Option<String>,

    /// Indent the JSON output
    #[arg(long)]
    pretty: bool,

    /// Answer line-delimited JSON-RPC requests from stdin
    #[arg(long, conflicts_with = "method")]
    serve: bool,

    /// List the supported methods and exit
    #[arg(long, conflicts_with = "method")]
    list: bool,

    /// Enable verbose logging
    #[arg(long)]
    verbose: bool,

    /// Append logs to a file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_file.as_deref())?;

    if cli.list {
        for method in ALL_METHODS {
            println!("{method}");
        }
        return Ok(());
    }

    let service = ParseService::new();

    if cli.serve {
        return serve(&service).await;
    }

    let method = qualify(cli.method.as_deref().unwrap_or_default());
    if !is_known_method(&method) {
        bail!("unknown method: {method}");
    }

    let params = build_params(&cli).await?;
    debug!(%method, "dispatching");
    let result = service.handle(&method, Some(params)).await?;

    let out = if cli.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{out}");
    Ok(())
}

fn init_tracing(verbose: bool, log_file: Option<&Path>) -> anyhow::Result<()> {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    if let Some(path) = log_file {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

/// `status` → `parse/status`; already-qualified names pass through.
fn qualify(method: &str) -> String {
    if method.contains('/') {
        method.to_string()
    } else {
        format!("parse/{method}")
    }
}

/// Assemble `{ stdout, stderr, exitCode, now? }` plus any `--params` keys.
async fn build_params(cli: &Cli) -> anyhow::Result<Value> {
    let stdout = match &cli.input {
        Some(path) => read_text(path).await?,
        None => {
            let mut buf = Vec::new();
            tokio::io::stdin()
                .read_to_end(&mut buf)
                .await
                .context("Failed to read stdin")?;
            String::from_utf8_lossy(&buf).into_owned()
        }
    };
    let stderr = match &cli.stderr {
        Some(path) => read_text(path).await?,
        None => String::new(),
    };

    let mut params = Map::new();
    params.insert("stdout".into(), json!(stdout));
    params.insert("stderr".into(), json!(stderr));
    params.insert("exitCode".into(), json!(cli.exit_code));
    if let Some(now) = cli.now {
        params.insert("now".into(), json!(now));
    }

    if let Some(extra) = &cli.params {
        let extra: Value = serde_json::from_str(extra).context("--params is not valid JSON")?;
        let Value::Object(extra) = extra else {
            bail!("--params must be a JSON object");
        };
        params.extend(extra);
    }

    Ok(Value::Object(params))
}

/// Git output is not guaranteed to be UTF-8; invalid bytes are replaced.
async fn read_text(path: &Path) -> anyhow::Result<String> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// One JSON-RPC request per line in, one response per line out.
async fn serve(service: &ParseService) -> anyhow::Result<()> {
    info!("serving JSON-RPC on stdin");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let response = respond(service, &line).await;
        let mut encoded = serde_json::to_string(&response)?;
        encoded.push('\n');
        stdout.write_all(encoded.as_bytes()).await?;
        stdout.flush().await?;
    }

    info!("stdin closed");
    Ok(())
}

async fn respond(service: &ParseService, line: &str) -> RpcResponse {
    let request: RpcRequest = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(e) => {
            warn!("unparseable request: {e}");
            return RpcResponse::error(None, RpcError::parse_error(format!("Parse error: {e}")));
        }
    };

    if !request.is_valid() {
        return RpcResponse::error(Some(request.id), RpcError::invalid_request("Invalid JSON-RPC 2.0 request"));
    }
    if !service.owns(&request.method) {
        return RpcResponse::error(Some(request.id), RpcError::method_not_found(&request.method));
    }

    let result = service.handle(&request.method, request.params).await;
    RpcResponse::from_result(request.id, result)
}
