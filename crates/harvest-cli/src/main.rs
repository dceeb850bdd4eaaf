// crates/harvest-cli/src/main.rs
//
// CLI entrypoint for the Harvest Protocol.
//
// Every state-changing subcommand signs a transaction with the local key
// (`harvest init` creates it) and submits it to the daemon over JSON-RPC.

mod commands;
mod keystore;
mod output;
mod rpc_client;

use clap::{Parser, Subcommand};
use commands::account::AccountCmd;
use commands::certify::CertifyCmd;
use commands::dao::DaoCmd;
use commands::events::EventsCmd;
use commands::init::InitCmd;
use commands::inspect::InspectCmd;
use commands::lot::LotCmd;
use commands::token::TokenCmd;
use commands::Context;
use keystore::CliConfig;
use output::OutputFormat;

/// Harvest Protocol CLI: producers, inspectors, and the governance DAO.
#[derive(Parser, Debug)]
#[command(
    name = "harvest",
    version = "0.1.0",
    about = "Harvest Protocol CLI: harvest lots, certification, and DAO governance"
)]
struct Cli {
    /// RPC endpoint for the harvest-daemon (defaults to ~/.harvest/cli.toml).
    #[arg(long, global = true)]
    rpc: Option<String>,

    /// Print JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Create the local signing key and client config.
    Init(InitCmd),

    /// Identity registry: register, show.
    #[command(subcommand)]
    Account(AccountCmd),

    /// Harvest lots: mint, burn, balances, metadata.
    #[command(subcommand)]
    Lot(LotCmd),

    /// Lot certification: request, accept, approve, reject.
    #[command(subcommand)]
    Certify(CertifyCmd),

    /// Governance DAO: members, proposals, votes, purchases.
    #[command(subcommand)]
    Dao(DaoCmd),

    /// Process inspections of passed proposals.
    #[command(subcommand)]
    Inspect(InspectCmd),

    /// Settlement token: balances, transfers, allowances.
    #[command(subcommand)]
    Token(TokenCmd),

    /// Committed event log.
    Events(EventsCmd),

    /// Display node status and platform counters.
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let home = keystore::harvest_home()?;
    let rpc = match cli.rpc {
        Some(rpc) => rpc,
        None => CliConfig::load(&home)?.rpc,
    };
    let ctx = Context {
        rpc,
        format: if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Table
        },
        home,
    };

    match &cli.command {
        Commands::Init(cmd) => commands::init::run(cmd, &ctx).await?,
        Commands::Account(cmd) => commands::account::run(cmd, &ctx).await?,
        Commands::Lot(cmd) => commands::lot::run(cmd, &ctx).await?,
        Commands::Certify(cmd) => commands::certify::run(cmd, &ctx).await?,
        Commands::Dao(cmd) => commands::dao::run(cmd, &ctx).await?,
        Commands::Inspect(cmd) => commands::inspect::run(cmd, &ctx).await?,
        Commands::Token(cmd) => commands::token::run(cmd, &ctx).await?,
        Commands::Events(cmd) => commands::events::run(cmd, &ctx).await?,
        Commands::Status => commands::status::run(&ctx).await?,
    }

    Ok(())
}
