//! Line-delimited JSON front end for the wellness runtime.
//!
//! Each stdin line is a request `{"tool":"<namespace>.<name>","arguments":{...}}`.
//! Each request produces exactly one stdout line, either `{"ok":<outcome>}` or
//! `{"error":"<message>"}`. Logs go to stderr.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use holistic_wellness::primitives::CapabilityRef;
use holistic_wellness::runtime::Runtime;
use holistic_wellness::tools::InvocationOutcome;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

#[derive(Parser)]
#[command(name = "stdio-agent")]
#[command(about = "Serve the wellness capability mesh over stdin/stdout")]
struct Cli {
    /// Path to a JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Request {
    tool: CapabilityRef,
    #[serde(default = "empty_arguments")]
    arguments: Value,
}

fn empty_arguments() -> Value {
    Value::Object(serde_json::Map::new())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum Response {
    Ok(InvocationOutcome),
    Error(String),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = holistic_wellness::config::load(cli.config.as_deref())?;
    holistic_wellness::telemetry::tracing_support::init(&config.log_filter)?;

    let runtime = Runtime::from_config(&config)?;

    let mut stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    let mut line = Vec::new();
    let mut served = 0_u64;

    loop {
        line.clear();
        let read = stdin
            .read_until(b'\n', &mut line)
            .await
            .context("failed to read stdin")?;
        if read == 0 {
            break;
        }

        let Some(response) = handle_raw(&runtime, &line).await else {
            continue;
        };
        let mut encoded = serde_json::to_vec(&response)?;
        encoded.push(b'\n');
        stdout.write_all(&encoded).await.context("failed to write stdout")?;
        stdout.flush().await?;
        served += 1;
    }

    info!(served, "stdin closed, shutting down");
    Ok(())
}

/// Answers one raw stdin line; blank lines get no response.
async fn handle_raw(runtime: &Runtime, raw: &[u8]) -> Option<Response> {
    let line = match std::str::from_utf8(raw) {
        Ok(line) => line.trim(),
        Err(err) => {
            warn!(error = %err, "request is not valid UTF-8");
            return Some(Response::Error(format!("malformed request: {err}")));
        }
    };
    if line.is_empty() {
        return None;
    }
    Some(handle(runtime, line).await)
}

async fn handle(runtime: &Runtime, line: &str) -> Response {
    let request: Request = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(err) => {
            warn!(error = %err, "malformed request");
            return Response::Error(format!("malformed request: {err}"));
        }
    };

    debug!(tool = %request.tool, "request received");
    match runtime.call(&request.tool, request.arguments).await {
        Ok(outcome) => Response::Ok(outcome),
        Err(err) => Response::Error(err.to_string()),
    }
}
