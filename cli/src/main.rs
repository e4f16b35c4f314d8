//! Raseed CLI - talk to the receipt backend from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Is the backend up?
//! raseed health
//!
//! # Sign in and show warranty products plus upcoming reminders
//! RASEED_PASSWORD=... raseed home -e priya@example.com
//!
//! # Add a calendar reminder for one product
//! raseed remind -u priya@example.com -p "Air Fryer"
//! ```

use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use raseed_core::{ApiConfig, PassType, DEFAULT_DAYS_AHEAD, DEFAULT_GRAPH_LIMIT, DEFAULT_RECEIPT_LIMIT};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "raseed")]
#[command(author, version, about = "Raseed receipt backend client")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Backend base URL (overrides RASEED_API_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Timeout for ordinary requests, in seconds
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: Option<u64>,

    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Check whether the backend is reachable
    Health,

    /// Sign in with email and password
    SignIn {
        #[arg(short, long)]
        email: String,
        #[arg(short, long, env = "RASEED_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account
    SignUp {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long, env = "RASEED_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign in, then show warranty products and upcoming reminders
    Home {
        #[arg(short, long)]
        email: String,
        #[arg(short, long, env = "RASEED_PASSWORD", hide_env_values = true)]
        password: String,
        /// Look-ahead window for reminders
        #[arg(short, long, default_value_t = DEFAULT_DAYS_AHEAD)]
        days: u32,
    },

    /// List products with warranty or expiry information
    Products {
        #[arg(short, long)]
        user: String,
    },

    /// List warranties expiring soon
    Reminders {
        #[arg(short, long)]
        user: String,
        #[arg(short, long, default_value_t = DEFAULT_DAYS_AHEAD)]
        days: u32,
    },

    /// Create a calendar reminder for one product
    Remind {
        #[arg(short, long)]
        user: String,
        #[arg(short, long)]
        product: String,
    },

    /// Create calendar reminders for every expiring warranty
    RemindAll {
        #[arg(short, long)]
        user: String,
    },

    /// List receipts and warranties eligible for Google Wallet
    WalletItems {
        #[arg(short, long)]
        user: String,
    },

    /// List the user's wallet passes
    Passes {
        #[arg(short, long)]
        user: String,
    },

    /// Generate a wallet pass for an eligible item
    GeneratePass {
        #[arg(short, long)]
        user: String,
        #[arg(short, long)]
        item: String,
        /// `receipt` or `warranty`
        #[arg(short = 't', long = "type")]
        pass_type: PassType,
    },

    /// Show the status of a wallet pass
    PassStatus {
        #[arg(short, long)]
        pass: String,
    },

    /// Revoke a wallet pass
    RevokePass {
        #[arg(short, long)]
        pass: String,
    },

    /// List the user's receipts
    Receipts {
        #[arg(short, long)]
        user: String,
        #[arg(short, long, default_value_t = DEFAULT_RECEIPT_LIMIT,
              value_parser = clap::value_parser!(u32).range(1..=100))]
        limit: u32,
        #[arg(short, long, default_value_t = 0)]
        offset: u32,
    },

    /// Show one receipt
    Receipt {
        #[arg(short, long)]
        id: String,
    },

    /// Spending summary, optionally between two ISO dates
    Analytics {
        #[arg(short, long)]
        user: String,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
    },

    /// Ask the spending assistant a question
    Chat {
        #[arg(short, long)]
        user: String,
        #[arg(short, long)]
        message: String,
    },

    /// Show the dashboard summary
    Dashboard {
        #[arg(short, long)]
        user: String,
    },

    /// List the user's knowledge graphs
    Graphs {
        #[arg(short, long)]
        user: String,
        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,
        #[arg(short, long, default_value_t = DEFAULT_GRAPH_LIMIT,
              value_parser = clap::value_parser!(u32).range(1..=50))]
        limit: u32,
    },

    /// Show one knowledge graph in detail
    Graph {
        #[arg(short, long)]
        id: String,
    },
}

/// `-v` raises the default level; `RUST_LOG` directives still apply on top.
fn default_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::builder()
        .with_default_directive(default_level(cli.verbose).into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = ApiConfig::from_env()?;
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url);
    }
    if let Some(secs) = cli.timeout_secs {
        config = config.with_request_timeout(Duration::from_secs(secs));
    }
    tracing::debug!(base_url = %config.base_url, "using backend");

    commands::run(cli.command, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_timeout_is_rejected() {
        let err = Cli::try_parse_from(["raseed", "--timeout-secs", "0", "health"]);
        assert!(err.is_err());
        let cli = Cli::try_parse_from(["raseed", "--timeout-secs", "5", "health"]).unwrap();
        assert_eq!(cli.timeout_secs, Some(5));
    }

    #[test]
    fn verbosity_raises_default_level() {
        assert_eq!(default_level(0), LevelFilter::INFO);
        assert_eq!(default_level(1), LevelFilter::DEBUG);
        assert_eq!(default_level(4), LevelFilter::TRACE);
    }

    #[test]
    fn receipt_limit_is_capped() {
        assert!(Cli::try_parse_from(["raseed", "receipts", "-u", "u@example.com", "-l", "101"]).is_err());
        let cli = Cli::try_parse_from(["raseed", "receipts", "-u", "u@example.com"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Receipts { limit: DEFAULT_RECEIPT_LIMIT, offset: 0, .. }
        ));
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
