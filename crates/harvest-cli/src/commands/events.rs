// crates/harvest-cli/src/commands/events.rs
//
// `harvest events`: page through the committed event log.

use clap::Args;
use serde_json::json;

use harvest_rpc::handlers::query::EventsSinceResponse;

use super::Context;
use crate::output;
use crate::rpc_client;

#[derive(Debug, Args)]
pub struct EventsCmd {
    /// Only events committed above this height.
    #[arg(long, default_value_t = 0)]
    since: u64,
    #[arg(long, default_value_t = 50)]
    limit: usize,
}

pub async fn run(cmd: &EventsCmd, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let resp: EventsSinceResponse = rpc_client::query(
        &ctx.rpc,
        "events/since",
        json!({ "height": cmd.since, "limit": cmd.limit }),
    )
    .await?;
    output::print_events(&resp.events, ctx.format);
    if !resp.events.is_empty() && ctx.format == output::OutputFormat::Table {
        println!("Next page: --since {}", resp.last_height);
    }
    Ok(())
}
