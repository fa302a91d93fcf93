use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::env;
use std::path::Path;
use tracing_subscriber::EnvFilter;

use bank_wash::{Registry, TypeRouter};

/// One CSV row: `bank_type,received_at,message`
#[derive(Debug, Deserialize)]
struct Notification {
    bank_type: String,
    received_at: DateTime<Utc>,
    message: String,
}

#[derive(Debug, Default)]
struct BatchSummary {
    extracted: usize,
    non_deposit: usize,
    failed: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bank_wash=info")))
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: bank-wash <notifications.csv> [registry.json]");
        std::process::exit(2);
    }

    let registry = match args.get(2) {
        Some(path) => Registry::from_file(path)?,
        None => Registry::new(),
    };
    let router = TypeRouter::new(registry);

    let notifications = load_notifications(Path::new(&args[1]))?;
    let summary = run_batch(&router, &notifications)?;

    tracing::info!(
        extracted = summary.extracted,
        non_deposit = summary.non_deposit,
        failed = summary.failed,
        "batch complete: {} rows",
        notifications.len()
    );

    Ok(())
}

fn load_notifications(csv_path: &Path) -> Result<Vec<Notification>> {
    let mut rdr = csv::Reader::from_path(csv_path)
        .with_context(|| format!("Failed to open CSV file: {:?}", csv_path))?;

    let mut notifications = Vec::new();
    for result in rdr.deserialize() {
        let notification: Notification = result.context("Failed to deserialize notification")?;
        notifications.push(notification);
    }

    Ok(notifications)
}

/// Print each record as a JSON line; count the rest.
fn run_batch(router: &TypeRouter, notifications: &[Notification]) -> Result<BatchSummary> {
    let mut summary = BatchSummary::default();

    for (i, n) in notifications.iter().enumerate() {
        // header is line 1
        let line = i + 2;
        match router.dispatch(&n.bank_type, &n.message, n.received_at) {
            Ok(record) => {
                println!("{}", serde_json::to_string(&record).context("Failed to serialize record")?);
                summary.extracted += 1;
            }
            Err(e) if e.is_non_deposit() => summary.non_deposit += 1,
            Err(e) => {
                tracing::warn!(line, tag = %n.bank_type, "{e}");
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}
