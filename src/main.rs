//! Area Chrome replay harness
//!
//! Reads a JSON-lines script on stdin, drives a chrome controller bound to an
//! in-memory window, and prints every published change as a JSON line.
//!
//! Usage: `area-chrome [--config <path>] < script.jsonl`

use anyhow::{Context, Result};
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use area_chrome::config::Config;
use area_chrome::script::{self, Harness};

fn config_arg() -> Result<Option<PathBuf>> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" || arg == "-c" {
            let path = args.next().context("--config requires a path")?;
            return Ok(Some(PathBuf::from(path)));
        }
    }
    Ok(None)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize logging (stdout carries the script output)
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "area_chrome=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match config_arg()? {
        Some(path) => Config::from_path(&path)?,
        None => Config::load()?,
    };

    let mut harness = Harness::new(&config).context("Failed to bind chrome controller")?;
    info!("Replaying chrome script from stdin");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let stdout = std::io::stdout();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read script")?,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping replay");
                break;
            }
        };
        let Some(line) = line else { break };

        let step = match script::parse_line(&line) {
            Ok(Some(step)) => step,
            Ok(None) => continue,
            Err(e) => {
                error!("Bad script line {:?}: {}", line, e);
                continue;
            }
        };

        let mut out = stdout.lock();
        for record in harness.step(step) {
            serde_json::to_writer(&mut out, &record).context("Failed to encode output")?;
            writeln!(out).context("Failed to write output")?;
        }
    }

    Ok(())
}
