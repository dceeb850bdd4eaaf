// crates/harvest-cli/src/commands/status.rs
//
// `harvest status`: node version, height, storage health, and platform
// counters.

use serde_json::json;

use harvest_rpc::handlers::node::{GetHealthResponse, GetNodeInfoResponse};

use super::Context;
use crate::output::{self, OutputFormat};
use crate::rpc_client;

pub async fn run(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let info: GetNodeInfoResponse = match rpc_client::query(&ctx.rpc, "node/info", json!({})).await {
        Ok(info) => info,
        Err(e) => {
            println!("Harvest node at {}: not reachable ({})", ctx.rpc, e);
            return Ok(());
        }
    };
    let health: GetHealthResponse = rpc_client::query(&ctx.rpc, "node/health", json!({})).await?;

    if ctx.format == OutputFormat::Json {
        println!(
            "{}",
            output::format_json(&json!({ "info": info, "health": health }))
        );
        return Ok(());
    }

    println!("Harvest Protocol v{}", info.version);
    println!();
    println!("Node Status");
    println!("-----------");
    println!("  RPC endpoint:   {}", ctx.rpc);
    println!("  Health:         {}", health.status);
    if let Some(details) = &health.details {
        println!("  Details:        {}", details);
    }
    println!("  Height:         {}", info.height);
    println!("  Uptime:         {}s", info.uptime_seconds);
    println!();
    println!("Platform");
    println!("--------");
    println!("  Owner:          {}", info.owner);
    println!("  Marketplace:    {}", info.marketplace_operator);
    println!("  Governance:     {} ({} tokens)", info.governance_address, info.governance_holdings);
    println!("  Inspector desk: {}", info.desk_address);
    println!("  Accounts:       {}", info.registered_accounts);
    println!("  Lots:           {}", info.lot_count);
    println!("  Open requests:  {}", info.open_certification_requests);
    println!("  DAO members:    {}", info.dao_members);
    println!("  Proposals:      {}", info.proposal_count);
    println!(
        "  Parameters:     voting window {}s, inspector fee {}, producer fee {}%",
        info.params.voting_window_secs, info.params.inspector_fee, info.params.producer_fee_percentage
    );

    Ok(())
}
