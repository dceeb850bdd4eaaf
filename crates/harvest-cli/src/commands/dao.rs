// crates/harvest-cli/src/commands/dao.rs
//
// `harvest dao ...`: governance center. Protocol requests, membership,
// proposals and voting, execution, marketplace purchases, and owner
// withdrawals.

use clap::Subcommand;
use serde_json::json;
use tabled::Tabled;

use harvest_core::transaction::Call;
use harvest_core::{Address, Amount, ProposalId, ProtocolId};
use harvest_rpc::handlers::query::{
    GetCreditedResponse, GetMemberResponse, GetProposalResponse, ListProposalsResponse,
};

use super::Context;
use crate::output::{self, OutputFormat};
use crate::rpc_client;

#[derive(Debug, Subcommand)]
pub enum DaoCmd {
    /// Ask the DAO to govern a protocol for you (producers).
    RequestProtocol {
        #[arg(long)]
        protocol: ProtocolId,
    },
    /// Add an inspector to the DAO (owner only).
    AddMember {
        #[arg(long)]
        account: Address,
    },
    /// Remove a DAO member (owner only).
    RemoveMember {
        #[arg(long)]
        account: Address,
    },
    /// Open a proposal for a requested protocol (members).
    Propose {
        #[arg(long)]
        description: String,
        #[arg(long)]
        protocol: ProtocolId,
        #[arg(long)]
        producer: Address,
    },
    /// Vote on an open proposal; in favor unless --against is given.
    Vote {
        #[arg(long)]
        proposal: ProposalId,
        #[arg(long)]
        against: bool,
    },
    /// Execute a passed proposal after its deadline, crediting the producer.
    Execute {
        #[arg(long)]
        proposal: ProposalId,
        #[arg(long)]
        credit: Amount,
    },
    /// Report a marketplace sale (marketplace operator).
    Purchase {
        #[arg(long)]
        producer: Address,
        #[arg(long)]
        price: Amount,
    },
    /// Move settlement tokens out of governance holdings (owner only).
    Withdraw {
        #[arg(long)]
        amount: Amount,
    },
    /// Show one proposal.
    Proposal {
        #[arg(long)]
        proposal: ProposalId,
    },
    /// List proposals, optionally by status
    /// (voting, awaiting_execution, defeated, executed, under_inspection,
    /// inspection_passed, inspection_failed).
    Proposals {
        #[arg(long)]
        status: Option<String>,
    },
    /// Check DAO membership of an account.
    Member {
        /// Defaults to the local account.
        #[arg(long)]
        account: Option<Address>,
    },
    /// Outstanding credit of a producer.
    Credited {
        #[arg(long)]
        producer: Address,
    },
}

#[derive(Tabled)]
struct ProposalRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Protocol")]
    protocol: u64,
    #[tabled(rename = "Producer")]
    producer: String,
    #[tabled(rename = "For")]
    for_votes: u64,
    #[tabled(rename = "Against")]
    against_votes: u64,
    #[tabled(rename = "Deadline")]
    deadline: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl From<&GetProposalResponse> for ProposalRow {
    fn from(entry: &GetProposalResponse) -> Self {
        let p = &entry.proposal;
        Self {
            id: p.id,
            description: p.description.clone(),
            protocol: p.protocol_id,
            producer: p.producer.to_string(),
            for_votes: p.for_votes,
            against_votes: p.against_votes,
            deadline: p.deadline.format("%Y-%m-%d %H:%M").to_string(),
            status: entry.status.clone(),
        }
    }
}

pub async fn run(cmd: &DaoCmd, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        DaoCmd::RequestProtocol { protocol } => {
            ctx.submit(Call::RequestProtocolWithDao {
                protocol_id: *protocol,
            })
            .await
        }
        DaoCmd::AddMember { account } => ctx.submit(Call::AddMember { account: *account }).await,
        DaoCmd::RemoveMember { account } => {
            ctx.submit(Call::RemoveMember { account: *account }).await
        }
        DaoCmd::Propose {
            description,
            protocol,
            producer,
        } => {
            ctx.submit(Call::CreateProposal {
                description: description.clone(),
                protocol_id: *protocol,
                producer: *producer,
            })
            .await
        }
        DaoCmd::Vote { proposal, against } => {
            ctx.submit(Call::Vote {
                proposal_id: *proposal,
                support: !*against,
            })
            .await
        }
        DaoCmd::Execute { proposal, credit } => {
            ctx.submit(Call::ExecuteProposal {
                proposal_id: *proposal,
                credit_amount: *credit,
            })
            .await
        }
        DaoCmd::Purchase { producer, price } => {
            ctx.submit(Call::HandlePurchase {
                producer: *producer,
                total_price: *price,
            })
            .await
        }
        DaoCmd::Withdraw { amount } => {
            ctx.submit(Call::WithdrawSettlementToken { amount: *amount })
                .await
        }
        DaoCmd::Proposal { proposal } => {
            let resp: GetProposalResponse = rpc_client::query(
                &ctx.rpc,
                "governance/proposal",
                json!({ "proposal_id": proposal }),
            )
            .await?;
            if ctx.format == OutputFormat::Json {
                println!("{}", output::format_json(&resp));
            } else {
                output::print_fields(&resp.proposal, ctx.format);
                println!("Status: {}", resp.status);
            }
            Ok(())
        }
        DaoCmd::Proposals { status } => {
            let resp: ListProposalsResponse = rpc_client::query(
                &ctx.rpc,
                "governance/proposals",
                json!({ "status": status }),
            )
            .await?;
            if ctx.format == OutputFormat::Json {
                println!("{}", output::format_json(&resp));
            } else if resp.proposals.is_empty() {
                println!("No proposals ({} total).", resp.total);
            } else {
                let rows: Vec<ProposalRow> = resp.proposals.iter().map(ProposalRow::from).collect();
                println!("{}", output::format_table(&rows));
            }
            Ok(())
        }
        DaoCmd::Member { account } => {
            let account = ctx.account_or_self(*account)?;
            let resp: GetMemberResponse =
                rpc_client::query(&ctx.rpc, "governance/member", json!({ "account": account }))
                    .await?;
            output::print_fields(&resp, ctx.format);
            Ok(())
        }
        DaoCmd::Credited { producer } => {
            let resp: GetCreditedResponse = rpc_client::query(
                &ctx.rpc,
                "governance/credited",
                json!({ "producer": producer }),
            )
            .await?;
            output::print_fields(&resp, ctx.format);
            Ok(())
        }
    }
}
