//! CLI administration tool for quota-shortener.
//!
//! Inspects and repairs the links and quotas keyspaces without going through
//! the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Show a client's remaining quota
//! cargo run --bin admin -- quota show 203.0.113.7
//!
//! # Restore a client's full quota
//! cargo run --bin admin -- quota reset 203.0.113.7
//!
//! # Look up a short code without counting a resolution
//! cargo run --bin admin -- link show abc123
//!
//! # Show the global resolution counter
//! cargo run --bin admin -- counter
//!
//! # Check both keyspaces are reachable
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! Same as the server; see [`quota_shortener::config`]. Without Redis the
//! tool works against an empty in-memory store, which is only useful for
//! trying the commands out.

use quota_shortener::config::{self, Config};
use quota_shortener::domain::entities::minutes_ceil;
use quota_shortener::server::connect_keyspaces;
use quota_shortener::state::AppState;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;

/// CLI tool for managing quota-shortener.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Inspect or reset client quotas
    Quota {
        #[command(subcommand)]
        action: QuotaAction,
    },

    /// Inspect short links
    Link {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Show the global resolution counter
    Counter,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Quota subcommands.
#[derive(Subcommand)]
enum QuotaAction {
    /// Show remaining quota and reset time for a client IP
    Show { ip: String },

    /// Restore the full quota for a client IP
    Reset {
        ip: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Link subcommands.
#[derive(Subcommand)]
enum LinkAction {
    /// Show the URL and remaining lifetime of a short code
    Show { code: String },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check both keyspaces respond
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env()?;
    if !config.is_redis_enabled() {
        println!(
            "{}",
            "⚠️  Redis not configured, using an empty in-memory store".yellow()
        );
    }

    let keyspaces = connect_keyspaces(&config).await?;
    let state = AppState::new(keyspaces, &config);

    match cli.command {
        Commands::Quota { action } => handle_quota_action(action, &state).await?,
        Commands::Link { action } => handle_link_action(action, &state).await?,
        Commands::Counter => handle_counter(&state).await?,
        Commands::Db { action } => handle_db_action(action, &state, &config).await?,
    }

    Ok(())
}

/// Dispatches quota commands.
async fn handle_quota_action(action: QuotaAction, state: &AppState) -> Result<()> {
    let quota = &state.quota_service;

    match action {
        QuotaAction::Show { ip } => {
            println!("{}", "📊 Quota".bright_blue().bold());
            println!();

            let usage = quota.peek(&ip).await?;

            let remaining = if usage.remaining > 0 {
                usage.remaining.to_string().bright_green().bold()
            } else {
                usage.remaining.to_string().red().bold()
            };

            println!("  Client:    {}", ip.cyan());
            println!("  Remaining: {} / {}", remaining, quota.limit());
            println!(
                "  Resets in: {} min",
                usage.reset_minutes().to_string().bright_white()
            );
            println!();
        }
        QuotaAction::Reset { ip, yes } => {
            println!("{}", "🔄 Reset Quota".bright_blue().bold());
            println!();
            println!("  Client: {}", ip.cyan());
            println!(
                "  New quota: {} for {} min",
                quota.limit(),
                minutes_ceil(quota.window())
            );
            println!();

            if !yes {
                let confirmed = Confirm::new()
                    .with_prompt("Reset this client's quota?")
                    .default(false)
                    .interact()?;

                if !confirmed {
                    println!("{}", "❌ Cancelled".red());
                    return Ok(());
                }
            }

            quota.reset(&ip).await?;

            println!("{}", "✅ Quota reset".green().bold());
            println!();
        }
    }

    Ok(())
}

/// Dispatches link commands.
async fn handle_link_action(action: LinkAction, state: &AppState) -> Result<()> {
    match action {
        LinkAction::Show { code } => {
            println!("{}", "🔗 Link".bright_blue().bold());
            println!();

            let links = &state.keyspaces.links;

            let Some(long_url) = links.get(&code).await? else {
                println!("  {}", "Not found (unknown or expired)".yellow());
                println!();
                return Ok(());
            };

            let ttl = links.ttl(&code).await?;

            println!(
                "  Short:      {}",
                state.link_service.short_url(&code).cyan()
            );
            println!("  URL:        {}", long_url.bright_white());
            match ttl {
                Some(ttl) => println!("  Expires in: {} min", minutes_ceil(ttl)),
                None => println!("  Expires in: {}", "never".bright_black()),
            }
            println!();
        }
    }

    Ok(())
}

/// Prints the global resolution counter.
async fn handle_counter(state: &AppState) -> Result<()> {
    let count = state.link_service.usage_count().await?;

    println!(
        "  Resolutions: {}",
        count.to_string().bright_green().bold()
    );

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, state: &AppState, config: &Config) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking keyspaces...".bright_blue());

            let checks = [
                ("links", config.links_db, &state.keyspaces.links),
                ("quotas", config.quota_db, &state.keyspaces.quotas),
            ];

            let mut healthy = true;
            for (name, db, store) in checks {
                if store.ping().await {
                    println!("  {} {} (db {})", "✅".green(), name, db);
                } else {
                    println!("  {} {} (db {})", "❌".red(), name, db);
                    healthy = false;
                }
            }

            if !healthy {
                anyhow::bail!("One or more keyspaces are unreachable");
            }

            println!("{}", "✅ Keyspaces OK".green().bold());
        }
    }

    Ok(())
}
