//! # Report Vault
//!
//! A local archive of channel-audit reports, scoped per user.
//!
//! Report Vault keeps each user's reports in a SQLite-backed key-value
//! table, migrates the pre-identity shared archive into the first user that
//! signs in, and renders each report's per-service analysis payloads as
//! structured views or terminal text.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌───────────┐
//! │  vault CLI   │──▶│ ReportStore  │──▶│  SQLite   │
//! │  (commands)  │   │  + migration │   │ kv_entries│
//! └──────┬───────┘   └──────────────┘   └───────────┘
//!        │
//!        ▼
//! ┌──────────────┐   ┌──────────────┐
//! │   render     │──▶│ render_text  │
//! │  dispatcher  │   │  (terminal)  │
//! └──────────────┘   └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! vault init                          # create database
//! vault --user alice add report.json  # archive a report
//! vault --user alice list             # summary + listing
//! vault --user alice show <id>        # render one report
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |
//! | [`sqlite_store`] | SQLite key-value backend |
//! | [`reports_cmd`] | CLI command implementations |
//! | [`render_text`] | Terminal rendering of report views |
//! | [`logging`] | Tracing subscriber setup |

pub mod config;
pub mod db;
pub mod logging;
pub mod migrate;
pub mod render_text;
pub mod reports_cmd;
pub mod sqlite_store;
