// crates/harvest-cli/src/commands/account.rs
//
// `harvest account {register, show, address}`: identity registry.

use clap::Subcommand;
use serde_json::json;

use harvest_core::transaction::Call;
use harvest_core::{Address, Role};
use harvest_rpc::handlers::query::GetAccountResponse;

use super::Context;
use crate::output::{self, OutputFormat};
use crate::rpc_client;

#[derive(Debug, Subcommand)]
pub enum AccountCmd {
    /// Register the local account with a role (once per account).
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        /// producer or inspector.
        #[arg(long)]
        role: Role,
    },
    /// Show profile, nonce, and balances of an account.
    Show {
        /// Defaults to the local account.
        #[arg(long)]
        address: Option<Address>,
    },
    /// Print the local account address.
    Address,
}

pub async fn run(cmd: &AccountCmd, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        AccountCmd::Register {
            username,
            email,
            role,
        } => {
            ctx.submit(Call::Register {
                username: username.clone(),
                email: email.clone(),
                role: *role,
            })
            .await
        }
        AccountCmd::Show { address } => {
            let account = ctx.account_or_self(*address)?;
            let resp: GetAccountResponse =
                rpc_client::query(&ctx.rpc, "account/get", json!({ "account": account })).await?;
            if ctx.format == OutputFormat::Json {
                println!("{}", output::format_json(&resp));
                return Ok(());
            }

            println!("Account {}", resp.account);
            match &resp.profile {
                Some(profile) => {
                    println!("  Username:   {}", profile.username);
                    println!("  Email:      {}", profile.email);
                    println!("  Role:       {}", profile.role);
                    println!("  Registered: {}", profile.registered_at);
                }
                None => println!("  Not registered"),
            }
            println!("  Next nonce: {}", resp.next_nonce);
            println!("  Tokens:     {}", resp.token_balance);
            println!("  DAO member: {}", if resp.dao_member { "yes" } else { "no" });
            for (lot_id, units) in &resp.lots {
                println!("  Lot #{}: {} units", lot_id, units);
            }
            Ok(())
        }
        AccountCmd::Address => {
            println!("{}", ctx.keypair()?.address());
            Ok(())
        }
    }
}
