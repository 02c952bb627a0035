//! Heirloom CLI — manage a passphrase-protected vault file.
//!
//! A thin front over `heirloom-core`: every command opens the vault file at
//! `--vault`, performs one operation, and exits. The passphrase comes from
//! `--passphrase` or the `HEIRLOOM_PASSPHRASE` environment variable; it is
//! never written anywhere.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use heirloom_core::schema::HistoryAction;
use heirloom_core::{SaltLength, VaultSession};
use heirloom_storage::FileStore;

/// Heirloom — a local-first encrypted vault for the records that outlive you.
#[derive(Parser)]
#[command(
    name = "heirloom",
    version,
    about = "Heirloom CLI — create, inspect, export, and import encrypted vault files",
    long_about = None,
    after_help = "Environment variables:\n  \
         HEIRLOOM_VAULT       Vault file path (default: vault.heirloom)\n  \
         HEIRLOOM_PASSPHRASE  Vault passphrase\n\n\
         Examples:\n  \
         heirloom init\n  \
         heirloom show\n  \
         heirloom history --limit 20\n  \
         heirloom export backup.heirloom"
)]
struct Cli {
    /// Path to the vault file.
    #[arg(long, env = "HEIRLOOM_VAULT", default_value = "vault.heirloom", global = true)]
    vault: PathBuf,

    /// Vault passphrase.
    #[arg(long, env = "HEIRLOOM_PASSPHRASE", global = true, hide_env_values = true)]
    passphrase: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new empty vault file.
    Init {
        /// KDF salt length in bytes (16 or 32).
        #[arg(long, default_value = "16")]
        salt_length: u32,
    },
    /// Show whether the vault file exists, without a passphrase.
    Status,
    /// Unlock the vault and list its entries and categories.
    Show,
    /// Unlock the vault and print its change history, newest first.
    History {
        /// Maximum entries to print.
        #[arg(long, default_value = "25")]
        limit: usize,
    },
    /// Unlock the vault and list retained snapshots.
    Versions,
    /// Re-encrypt the vault to a portable backup file.
    Export {
        /// Destination path.
        out: PathBuf,
    },
    /// Import an exported vault file, replacing this vault.
    Import {
        /// Source path.
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let session = VaultSession::new(Arc::new(FileStore::new(&cli.vault)));

    match cli.command {
        Commands::Init { salt_length } => {
            let salt_length = usize::try_from(salt_length)
                .ok()
                .and_then(SaltLength::from_bytes)
                .context("salt length must be 16 or 32")?;
            let passphrase = require_passphrase(cli.passphrase.as_deref())?;
            session.create(passphrase, Some(salt_length)).await?;
            println!("created vault at {}", cli.vault.display());
        }
        Commands::Status => {
            if session.exists().await? {
                println!("vault exists at {}", cli.vault.display());
            } else {
                println!("no vault at {}", cli.vault.display());
            }
        }
        Commands::Show => {
            let passphrase = require_passphrase(cli.passphrase.as_deref())?;
            let payload = session.unlock(passphrase).await?;
            let state = &payload.current;

            println!("format version: {}", state.format_version);
            if !state.user_aka.is_empty() {
                println!("aka: {}", state.user_aka);
            }
            println!("entries ({}):", state.entries.len());
            for entry in &state.entries {
                let category = entry
                    .category_id
                    .and_then(|id| state.categories.iter().find(|c| c.id == id))
                    .map_or("uncategorized", |c| c.name.as_str());
                println!("  {}  [{category}]  {}", entry.id, entry.title);
            }
            println!("categories ({}):", state.categories.len());
            for category in &state.categories {
                println!("  {}  {}", category.id, category.name);
            }
            println!("uploaded keys: {}", state.uploaded_keys.len());
            println!(
                "snapshots: {} (limit {})",
                payload.versions.len(),
                payload.version_history_limit
            );
        }
        Commands::History { limit } => {
            let passphrase = require_passphrase(cli.passphrase.as_deref())?;
            let payload = session.unlock(passphrase).await?;
            for record in payload.current.history.iter().take(limit) {
                let action = match record.action {
                    HistoryAction::StoreCreated => "store_created",
                    HistoryAction::VaultImported => "vault_imported",
                    HistoryAction::EntryCreated => "entry_created",
                    HistoryAction::EntryUpdated => "entry_updated",
                    HistoryAction::EntryDeleted => "entry_deleted",
                };
                let title = record.entry_title.as_deref().unwrap_or("");
                println!("{}  {action}  {title}", record.at.to_rfc3339());
            }
        }
        Commands::Versions => {
            let passphrase = require_passphrase(cli.passphrase.as_deref())?;
            let payload = session.unlock(passphrase).await?;
            if payload.versions.is_empty() {
                println!("no snapshots retained");
            }
            for (index, snapshot) in payload.versions.iter().enumerate() {
                let saved_at = snapshot
                    .history
                    .first()
                    .map_or_else(|| "unknown".to_owned(), |h| h.at.to_rfc3339());
                println!(
                    "#{index}  {} entries, last change {saved_at}",
                    snapshot.entries.len()
                );
            }
        }
        Commands::Export { out } => {
            let passphrase = require_passphrase(cli.passphrase.as_deref())?;
            session.unlock(passphrase).await?;
            let bytes = session.export(passphrase).await?;
            tokio::fs::write(&out, &bytes)
                .await
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("exported vault to {}", out.display());
        }
        Commands::Import { input } => {
            let passphrase = require_passphrase(cli.passphrase.as_deref())?;
            let bytes = tokio::fs::read(&input)
                .await
                .with_context(|| format!("failed to read {}", input.display()))?;
            let payload = session.import(passphrase, &bytes).await?;
            println!(
                "imported vault with {} entries to {}",
                payload.current.entries.len(),
                cli.vault.display()
            );
        }
    }

    Ok(())
}

fn require_passphrase(passphrase: Option<&str>) -> Result<&str> {
    match passphrase {
        Some(p) if !p.is_empty() => Ok(p),
        _ => bail!("a passphrase is required (--passphrase or HEIRLOOM_PASSPHRASE)"),
    }
}
