// crates/harvest-cli/src/commands/inspect.rs
//
// `harvest inspect {assign, approve, fail, guarantee}`: process
// inspections through the inspector desk.
//
// Assigning locks a stake with the desk as spender, so the inspector
// must approve the desk address first (`--approve-desk` does both).

use clap::Subcommand;
use serde_json::json;

use harvest_core::transaction::Call;
use harvest_core::{Address, Amount, ProposalId};
use harvest_rpc::handlers::node::GetNodeInfoResponse;
use harvest_rpc::handlers::query::GetGuaranteeResponse;

use super::Context;
use crate::output;
use crate::rpc_client;

#[derive(Debug, Subcommand)]
pub enum InspectCmd {
    /// Take the process inspection of a passed proposal, staking tokens.
    Assign {
        #[arg(long)]
        proposal: ProposalId,
        /// Settlement tokens to lock as guarantee.
        #[arg(long)]
        stake: Amount,
        /// Approve the desk for the stake before assigning.
        #[arg(long)]
        approve_desk: bool,
    },
    /// Pass the inspection: stake refunded plus the inspector fee.
    Approve {
        #[arg(long)]
        proposal: ProposalId,
    },
    /// Fail the inspection: stake forfeited to governance holdings.
    Fail {
        #[arg(long)]
        proposal: ProposalId,
    },
    /// Show the guarantee locked for a proposal.
    Guarantee {
        #[arg(long)]
        proposal: ProposalId,
        /// Defaults to the local account.
        #[arg(long)]
        inspector: Option<Address>,
    },
}

pub async fn run(cmd: &InspectCmd, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        InspectCmd::Assign {
            proposal,
            stake,
            approve_desk,
        } => {
            if *approve_desk {
                let info: GetNodeInfoResponse =
                    rpc_client::query(&ctx.rpc, "node/info", json!({})).await?;
                ctx.submit(Call::ApproveToken {
                    spender: info.desk_address,
                    amount: *stake,
                })
                .await?;
            }
            ctx.submit(Call::AssignInspectorToProposal {
                proposal_id: *proposal,
                guaranteed_amount: *stake,
            })
            .await
        }
        InspectCmd::Approve { proposal } => {
            ctx.submit(Call::ApproveProcessInspection {
                proposal_id: *proposal,
            })
            .await
        }
        InspectCmd::Fail { proposal } => {
            ctx.submit(Call::FailProcessInspection {
                proposal_id: *proposal,
            })
            .await
        }
        InspectCmd::Guarantee {
            proposal,
            inspector,
        } => {
            let inspector = ctx.account_or_self(*inspector)?;
            let resp: GetGuaranteeResponse = rpc_client::query(
                &ctx.rpc,
                "governance/guarantee",
                json!({ "inspector": inspector, "proposal_id": proposal }),
            )
            .await?;
            match &resp.entry {
                Some(entry) => output::print_fields(entry, ctx.format),
                None => println!(
                    "No guarantee from {} on proposal #{}",
                    resp.inspector, resp.proposal_id
                ),
            }
            Ok(())
        }
    }
}
