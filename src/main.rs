//! # Report Vault CLI (`vault`)
//!
//! The `vault` binary is the interface to a user's report archive. It
//! provides commands for database initialization, archiving reports,
//! listing and filtering them, rendering a single report, and recovering
//! the legacy shared archive.
//!
//! ## Usage
//!
//! ```bash
//! vault --config ./config/vault.toml [--user <id>] <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `vault init` | Create the SQLite database and schema |
//! | `vault list` | Summary statistics and the report listing |
//! | `vault add <file>` | Archive a report read from a JSON file (`-` for stdin) |
//! | `vault get <id>` | Print one report as JSON |
//! | `vault show <id>` | Render one report's services |
//! | `vault export <id>` | Write the rendered report to a file |
//! | `vault delete <id>` | Remove one report |
//! | `vault clear` | Remove every report for the user |
//! | `vault legacy show` | Print the unscoped legacy archive, if any |
//!
//! ## Examples
//!
//! ```bash
//! # Initialize the database
//! vault init --config ./config/vault.toml
//!
//! # Archive a report for alice
//! vault --user alice add ./audit.json
//!
//! # List reports whose channel name or email mentions "rust"
//! vault --user alice list --filter rust
//!
//! # Render a report as JSON views
//! vault --user alice show 0b6c... --json
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use report_vault::{config, logging, migrate, reports_cmd};

/// Report Vault CLI: a per-user archive of channel-audit reports.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/vault.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "vault",
    about = "Report Vault: a per-user archive of channel-audit reports",
    version,
    long_about = "Report Vault keeps channel-audit reports in a local SQLite archive scoped \
    per user, migrates the legacy shared archive on first sign-in, and renders each \
    report's service analyses for the terminal."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/vault.toml`.
    #[arg(long, global = true, default_value = "./config/vault.toml")]
    config: PathBuf,

    /// User identity. Overrides `session.user` from the config file.
    #[arg(long, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and the key-value table.
    /// Running it multiple times is safe.
    Init,

    /// Show summary statistics and list the user's reports, newest first.
    List {
        /// Case-insensitive substring matched against channel name and email.
        #[arg(long)]
        filter: Option<String>,
    },

    /// Archive a report read from a JSON file.
    ///
    /// Missing `id` and `timestamp` fields are generated. Use `-` to read
    /// the report from stdin.
    Add {
        /// Path to the report JSON, or `-` for stdin.
        path: PathBuf,
    },

    /// Print one report as JSON.
    Get {
        /// Report id.
        id: String,
    },

    /// Render one report's service analyses.
    Show {
        /// Report id.
        id: String,

        /// Print the structured views as JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Write the rendered text of one report to a file.
    Export {
        /// Report id.
        id: String,

        /// Output file. Prints to stdout when omitted.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Delete one report.
    Delete {
        /// Report id.
        id: String,
    },

    /// Delete every report for the user.
    Clear,

    /// Inspect the legacy shared archive.
    Legacy {
        #[command(subcommand)]
        action: LegacyAction,
    },
}

/// Legacy archive subcommands.
#[derive(Subcommand)]
enum LegacyAction {
    /// Print the raw legacy archive so it can be recovered by hand.
    Show,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // `init` works without a config file
    let cfg = match cli.command {
        Commands::Init => {
            config::load_config(&cli.config).unwrap_or_else(|_| config::Config::minimal())
        }
        _ => config::load_config(&cli.config)?,
    };

    logging::init(&cfg.logging.level);

    let user = || reports_cmd::resolve_user(&cfg, cli.user.as_deref());

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::List { filter } => {
            reports_cmd::run_list(&cfg, user()?, filter.as_deref()).await?;
        }
        Commands::Add { path } => {
            reports_cmd::run_add(&cfg, user()?, &path).await?;
        }
        Commands::Get { id } => {
            reports_cmd::run_get(&cfg, user()?, &id).await?;
        }
        Commands::Show { id, json } => {
            reports_cmd::run_show(&cfg, user()?, &id, json).await?;
        }
        Commands::Export { id, output } => {
            reports_cmd::run_export(&cfg, user()?, &id, output.as_deref()).await?;
        }
        Commands::Delete { id } => {
            reports_cmd::run_delete(&cfg, user()?, &id).await?;
        }
        Commands::Clear => {
            reports_cmd::run_clear(&cfg, user()?).await?;
        }
        Commands::Legacy {
            action: LegacyAction::Show,
        } => {
            reports_cmd::run_legacy_show(&cfg).await?;
        }
    }

    Ok(())
}
