// crates/harvest-cli/src/commands/token.rs
//
// `harvest token {balance, transfer, approve, allowance}`: settlement token.

use clap::Subcommand;
use serde_json::json;

use harvest_core::transaction::Call;
use harvest_core::{Address, Amount};
use harvest_rpc::handlers::query::{AllowanceResponse, TokenBalanceResponse};

use super::Context;
use crate::output;
use crate::rpc_client;

#[derive(Debug, Subcommand)]
pub enum TokenCmd {
    Balance {
        /// Defaults to the local account.
        #[arg(long)]
        address: Option<Address>,
    },
    Transfer {
        #[arg(long)]
        to: Address,
        #[arg(long)]
        amount: Amount,
    },
    /// Set the allowance of a spender over the local account's tokens.
    Approve {
        #[arg(long)]
        spender: Address,
        #[arg(long)]
        amount: Amount,
    },
    Allowance {
        /// Defaults to the local account.
        #[arg(long)]
        owner: Option<Address>,
        #[arg(long)]
        spender: Address,
    },
}

pub async fn run(cmd: &TokenCmd, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        TokenCmd::Balance { address } => {
            let account = ctx.account_or_self(*address)?;
            let resp: TokenBalanceResponse =
                rpc_client::query(&ctx.rpc, "token/balance", json!({ "account": account })).await?;
            output::print_fields(&resp, ctx.format);
            Ok(())
        }
        TokenCmd::Transfer { to, amount } => {
            ctx.submit(Call::TransferToken {
                to: *to,
                amount: *amount,
            })
            .await
        }
        TokenCmd::Approve { spender, amount } => {
            ctx.submit(Call::ApproveToken {
                spender: *spender,
                amount: *amount,
            })
            .await
        }
        TokenCmd::Allowance { owner, spender } => {
            let owner = ctx.account_or_self(*owner)?;
            let resp: AllowanceResponse = rpc_client::query(
                &ctx.rpc,
                "token/allowance",
                json!({ "owner": owner, "spender": spender }),
            )
            .await?;
            output::print_fields(&resp, ctx.format);
            Ok(())
        }
    }
}
