//! bossplit terminal front end.
//!
//! Drives the whole pipeline without a browser: load a catalog, build a
//! session from a JSON file or a share token, run the settlement engine,
//! and print the transfer table plus the NESO summary.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use bossplit_catalog::Catalog;
use bossplit_codec::{decode_or_starter, decode_session, encode_session, share_url, token_from_url};
use bossplit_engine::{compute_settlement, neso_summary, SettlementOutcome};
use bossplit_types::SessionState;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bossplit", about = "Boss-loot proceeds splitter")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and summarize a boss/item catalog CSV
    Catalog {
        /// File path or http(s) URL of the catalog CSV
        #[arg(short, long)]
        source: String,
    },

    /// Compute settlement transfers for a session
    Settle {
        /// Session state as a JSON file
        #[arg(short = 'f', long, conflicts_with_all = ["token", "url"])]
        session: Option<PathBuf>,

        /// Share token (as produced by `bossplit share`)
        #[arg(short, long, conflicts_with = "url")]
        token: Option<String>,

        /// Full share URL carrying a `data` parameter
        #[arg(short, long)]
        url: Option<String>,
    },

    /// Encode a session into a share token or URL
    Share {
        /// Session state as a JSON file
        #[arg(short = 'f', long)]
        session: PathBuf,

        /// Base address; when set, a full URL is printed instead of a token
        #[arg(short, long)]
        base: Option<String>,
    },

    /// Decode a share token back into session JSON
    Decode {
        #[arg(short, long)]
        token: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Catalog { source } => catalog_command(&source).await,
        Commands::Settle {
            session,
            token,
            url,
        } => settle_command(session, token, url),
        Commands::Share { session, base } => share_command(&session, base.as_deref()),
        Commands::Decode { token } => decode_command(&token),
    }
}

async fn catalog_command(source: &str) -> Result<()> {
    let text = if source.starts_with("http://") || source.starts_with("https://") {
        reqwest::get(source)
            .await
            .with_context(|| format!("fetching catalog from {}", source))?
            .error_for_status()?
            .text()
            .await?
    } else {
        std::fs::read_to_string(source)
            .with_context(|| format!("reading catalog file {}", source))?
    };

    let catalog = Catalog::parse(&text).context("parsing catalog CSV")?;
    debug!(rows = catalog.len(), source, "catalog loaded");
    if catalog.is_empty() {
        eprintln!("warning: catalog loaded but contains no rows");
    }
    println!("{} rows, {} bosses", catalog.len(), catalog.boss_names().len());
    for boss in catalog.boss_names() {
        println!("  {} ({} sellable items)", boss, catalog.sellable_items(boss).len());
    }
    Ok(())
}

fn settle_command(
    session: Option<PathBuf>,
    token: Option<String>,
    url: Option<String>,
) -> Result<()> {
    let state = if let Some(path) = session {
        read_session(&path)?
    } else if let Some(token) = token {
        decode_or_starter(Some(&token))
    } else if let Some(url) = url {
        decode_or_starter(token_from_url(&url))
    } else {
        bail!("one of --session, --token, or --url is required");
    };
    debug!(
        members = state.members.len(),
        groups = state.groups.len(),
        "session loaded"
    );

    let outcome = compute_settlement(&state);
    for warning in outcome.warnings() {
        eprintln!("warning: {}", warning);
    }

    match &outcome {
        SettlementOutcome::NoData { .. } => {
            println!("No computable distribution (no priced items or NESO amounts).");
        }
        SettlementOutcome::Settled(report) if report.transfers.is_empty() => {
            println!("Everyone already holds their share; no transfers needed.");
        }
        SettlementOutcome::Settled(report) => {
            println!("{:<16} {:<16} {:>12}", "From", "To", "Amount");
            for t in &report.transfers {
                println!("{:<16} {:<16} {:>12.2}", t.from, t.to, t.amount);
            }
        }
    }

    let summary = neso_summary(&state);
    if !summary.is_empty() || summary.total > 0.0 {
        println!();
        println!("NESO total: {}", summary.total);
        for row in &summary.per_owner {
            println!("  {:<16} {:>12}", row.owner, row.amount);
        }
    }
    Ok(())
}

fn share_command(session: &Path, base: Option<&str>) -> Result<()> {
    let state = read_session(session)?;
    match base {
        Some(base) => println!("{}", share_url(base, &state)?),
        None => println!("{}", encode_session(&state)?),
    }
    Ok(())
}

fn decode_command(token: &str) -> Result<()> {
    let state = match decode_session(token) {
        Ok(state) => state,
        Err(err) => {
            eprintln!("warning: {}; falling back to starter session", err);
            SessionState::starter()
        }
    };
    println!("{}", serde_json::to_string_pretty(&state)?);
    Ok(())
}

fn read_session(path: &Path) -> Result<SessionState> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading session file {}", path.display()))?;
    serde_json::from_str(&text).context("parsing session JSON")
}
