//! Report commands for the `vault` CLI.
//!
//! Each command opens the SQLite-backed store, binds a [`ReportStore`] to
//! the resolved user, performs one operation and prints the result. These
//! are the UI-layer callers of the core store and render dispatcher.

use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use report_vault_core::listing::{filter_reports, ReportStats};
use report_vault_core::models::{Report, ReportStatus};
use report_vault_core::render::render_report;
use report_vault_core::reports::{LoadStatus, ReportStore};
use report_vault_core::store::{KeyValueStore, LEGACY_KEY};

use crate::config::Config;
use crate::render_text::render_report_text;
use crate::sqlite_store::SqliteKvStore;

/// The active identity: `--user` wins over `session.user`.
pub fn resolve_user(config: &Config, cli_user: Option<&str>) -> Result<String> {
    cli_user
        .map(str::to_string)
        .or_else(|| config.session.user.clone())
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| anyhow!("No user identity: pass --user or set session.user in the config"))
}

struct Session {
    kv: Arc<SqliteKvStore>,
    store: ReportStore,
    user_id: String,
}

impl Session {
    async fn open(config: &Config, user_id: String) -> Result<Self> {
        let kv = Arc::new(SqliteKvStore::open(config).await?);
        let mut store = ReportStore::new(kv.clone());
        match store.initialize(Some(&user_id)).await {
            LoadStatus::Migrated { count } => {
                eprintln!("Migrated {} legacy report(s) to user '{}'.", count, user_id)
            }
            LoadStatus::Recovered { reason } => {
                eprintln!("Warning: stored reports could not be read ({}); starting empty.", reason)
            }
            _ => {}
        }
        Ok(Self { kv, store, user_id })
    }

    async fn close(self) {
        self.kv.close().await;
    }
}

/// Build a report from producer JSON, generating `id` and `timestamp` when absent.
pub fn report_from_json(raw: &str) -> Result<Report> {
    let mut value: Value = serde_json::from_str(raw).context("Report is not valid JSON")?;
    let obj = value
        .as_object_mut()
        .ok_or_else(|| anyhow!("Report must be a JSON object"))?;

    let fresh = Report::new(ReportStatus::Pending);
    obj.entry("id").or_insert_with(|| Value::String(fresh.id));
    if let Some(ts) = fresh.timestamp {
        obj.entry("timestamp").or_insert(Value::String(ts));
    }

    serde_json::from_value(value).context("Report does not match the expected shape")
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read report from stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read report file: {}", path.display()))
    }
}

pub async fn run_list(config: &Config, user_id: String, filter: Option<&str>) -> Result<()> {
    let session = Session::open(config, user_id).await?;
    let reports = session.store.reports();

    if reports.is_empty() {
        println!("No reports for user '{}'. Run an audit to populate this archive.", session.user_id);
        session.close().await;
        return Ok(());
    }

    let stats = ReportStats::from_reports(reports);
    println!("Reports for '{}'", session.user_id);
    println!("  Reports:     {}", stats.total_reports);
    println!("  Services:    {}", stats.total_services);
    println!("  Completed:   {}%", stats.completion_rate);
    println!();

    let shown = filter_reports(reports, filter.unwrap_or(""));
    if shown.is_empty() {
        println!("No reports match '{}'.", filter.unwrap_or(""));
    }
    for report in shown {
        let date = report
            .created_at()
            .map(|dt| dt.format("%b %-d, %Y").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{}  {:<9}  {:<12}  {:>2} services  {}{}",
            report.id,
            report.status.as_str(),
            date,
            report.service_count(),
            report.channel_name.as_deref().unwrap_or("Channel Analysis"),
            report
                .email
                .as_deref()
                .map(|e| format!(" <{}>", e))
                .unwrap_or_default(),
        );
    }

    session.close().await;
    Ok(())
}

pub async fn run_add(config: &Config, user_id: String, path: &Path) -> Result<()> {
    let report = report_from_json(&read_input(path)?)?;
    let id = report.id.clone();

    let mut session = Session::open(config, user_id).await?;
    session.store.add(report).await;
    println!("{}", id);
    session.close().await;
    Ok(())
}

pub async fn run_get(config: &Config, user_id: String, id: &str) -> Result<()> {
    let session = Session::open(config, user_id).await?;
    let found = session.store.get(id).await;
    session.close().await;

    match found {
        Some(report) => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        None => {
            eprintln!("Error: report not found: {}", id);
            std::process::exit(1);
        }
    }
}

async fn load_report(config: &Config, user_id: String, id: &str) -> Result<Report> {
    let session = Session::open(config, user_id).await?;
    let found = session.store.get(id).await;
    session.close().await;
    found.ok_or_else(|| anyhow!("report not found: {}", id))
}

pub async fn run_show(config: &Config, user_id: String, id: &str, json: bool) -> Result<()> {
    let report = load_report(config, user_id, id).await?;
    let view = render_report(&report);
    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print!("{}", render_report_text(&report, &view, config.render.color));
    }
    Ok(())
}

/// Write the rendered text of one report to `output`, or stdout.
pub async fn run_export(
    config: &Config,
    user_id: String,
    id: &str,
    output: Option<&Path>,
) -> Result<()> {
    let report = load_report(config, user_id, id).await?;
    let text = render_report_text(&report, &render_report(&report), config.render.color);

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &text)?;
            eprintln!("Exported report {} to {}", report.id, path.display());
        }
        None => {
            print!("{}", text);
        }
    }
    Ok(())
}

pub async fn run_delete(config: &Config, user_id: String, id: &str) -> Result<()> {
    let mut session = Session::open(config, user_id).await?;
    session.store.delete(id).await;
    println!("Deleted {} (if present). {} report(s) remain.", id, session.store.len());
    session.close().await;
    Ok(())
}

pub async fn run_clear(config: &Config, user_id: String) -> Result<()> {
    let mut session = Session::open(config, user_id).await?;
    let user = session.user_id.clone();
    session.store.clear(&user).await;
    println!("Cleared all reports for '{}'.", user);
    session.close().await;
    Ok(())
}

/// Print the raw legacy entry so unreadable data can be recovered by hand.
pub async fn run_legacy_show(config: &Config) -> Result<()> {
    let kv = SqliteKvStore::open(config).await?;
    let raw = kv.get(LEGACY_KEY).await?;
    kv.close().await;

    match raw {
        Some(raw) => println!("{}", raw),
        None => eprintln!("No legacy entry."),
    }
    Ok(())
}
