// crates/harvest-cli/src/commands/lot.rs
//
// `harvest lot {mint, burn, show, balance, metadata}`: harvest ledger.

use clap::Subcommand;
use serde_json::json;

use harvest_core::transaction::Call;
use harvest_core::{Address, LotId};
use harvest_rpc::handlers::query::{GetLotResponse, LotBalanceResponse};

use super::Context;
use crate::output::{self, OutputFormat};
use crate::rpc_client;

#[derive(Debug, Subcommand)]
pub enum LotCmd {
    /// Mint a new lot to the local account (producers only).
    Mint {
        /// Total units in the lot.
        #[arg(long)]
        units: u64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        units_per_token: u64,
    },
    /// Burn units of a lot held by the local account.
    Burn {
        #[arg(long)]
        lot: LotId,
        #[arg(long)]
        amount: u64,
    },
    /// Show lot metadata and circulating units.
    Show {
        #[arg(long)]
        lot: LotId,
    },
    /// Units of a lot held by an account.
    Balance {
        #[arg(long)]
        lot: LotId,
        /// Defaults to the local account.
        #[arg(long)]
        address: Option<Address>,
    },
    /// Print the marketplace metadata document of a lot.
    Metadata {
        #[arg(long)]
        lot: LotId,
    },
}

pub async fn run(cmd: &LotCmd, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        LotCmd::Mint {
            units,
            name,
            units_per_token,
        } => {
            ctx.submit(Call::MintLot {
                total_units: *units,
                name: name.clone(),
                units_per_token: *units_per_token,
            })
            .await
        }
        LotCmd::Burn { lot, amount } => {
            ctx.submit(Call::BurnLot {
                lot_id: *lot,
                amount: *amount,
            })
            .await
        }
        LotCmd::Show { lot } => {
            let resp: GetLotResponse =
                rpc_client::query(&ctx.rpc, "lot/get", json!({ "lot_id": lot })).await?;
            if ctx.format == OutputFormat::Json {
                println!("{}", output::format_json(&resp));
            } else {
                output::print_fields(&resp.lot, ctx.format);
                println!("Circulating units: {}", resp.circulating_units);
            }
            Ok(())
        }
        LotCmd::Balance { lot, address } => {
            let account = ctx.account_or_self(*address)?;
            let resp: LotBalanceResponse = rpc_client::query(
                &ctx.rpc,
                "lot/balance",
                json!({ "account": account, "lot_id": lot }),
            )
            .await?;
            output::print_fields(&resp, ctx.format);
            Ok(())
        }
        LotCmd::Metadata { lot } => {
            let doc: serde_json::Value =
                rpc_client::query(&ctx.rpc, "lot/metadata", json!({ "lot_id": lot })).await?;
            println!("{}", output::format_json(&doc));
            Ok(())
        }
    }
}
