// crates/harvest-cli/src/commands/certify.rs
//
// `harvest certify {request, accept, approve, reject, status}`: lot
// certification workflow.

use clap::Subcommand;
use serde_json::json;

use harvest_core::transaction::Call;
use harvest_core::LotId;
use harvest_rpc::handlers::query::GetCertificationResponse;

use super::Context;
use crate::output::{self, OutputFormat};
use crate::rpc_client;

#[derive(Debug, Subcommand)]
pub enum CertifyCmd {
    /// Ask for certification of a lot you hold (producers).
    Request {
        #[arg(long)]
        lot: LotId,
    },
    /// Take an open certification request (inspectors).
    Accept {
        #[arg(long)]
        lot: LotId,
    },
    /// Certify a lot whose request you accepted (inspectors).
    Approve {
        #[arg(long)]
        lot: LotId,
    },
    /// Reject a lot whose request you accepted (inspectors).
    Reject {
        #[arg(long)]
        lot: LotId,
    },
    /// Show certification state of a lot.
    Status {
        #[arg(long)]
        lot: LotId,
    },
}

pub async fn run(cmd: &CertifyCmd, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        CertifyCmd::Request { lot } => ctx.submit(Call::RequestCertification { lot_id: *lot }).await,
        CertifyCmd::Accept { lot } => {
            ctx.submit(Call::AcceptCertificationRequest { lot_id: *lot })
                .await
        }
        CertifyCmd::Approve { lot } => ctx.submit(Call::ApproveCertification { lot_id: *lot }).await,
        CertifyCmd::Reject { lot } => ctx.submit(Call::RejectCertification { lot_id: *lot }).await,
        CertifyCmd::Status { lot } => {
            let resp: GetCertificationResponse =
                rpc_client::query(&ctx.rpc, "certification/get", json!({ "lot_id": lot })).await?;
            if ctx.format == OutputFormat::Json {
                println!("{}", output::format_json(&resp));
                return Ok(());
            }

            println!("Lot #{}", resp.lot_id);
            println!("  Certified: {}", if resp.certified { "yes" } else { "no" });
            match &resp.request {
                Some(request) => {
                    println!("  Open request by {} at {}", request.producer, request.requested_at);
                    match &request.inspector {
                        Some(inspector) => println!("  Accepted by {}", inspector),
                        None => println!("  Awaiting an inspector"),
                    }
                }
                None => println!("  No open request"),
            }
            Ok(())
        }
    }
}
