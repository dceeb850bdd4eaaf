// crates/harvest-cli/src/commands/init.rs
//
// `harvest init`: create the local signing key and client config.

use clap::Args;

use harvest_core::crypto::Keypair;

use super::Context;
use crate::keystore::{self, CliConfig};

#[derive(Debug, Args)]
pub struct InitCmd {
    /// Replace an existing signing key.
    #[arg(long)]
    force: bool,
}

pub async fn run(cmd: &InitCmd, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig {
        rpc: ctx.rpc.clone(),
    };
    let config_path = config.save(&ctx.home)?;
    println!("Config written to {}", config_path.display());

    if keystore::has_keypair(&ctx.home) && !cmd.force {
        let keypair = keystore::load_keypair(&ctx.home)?;
        println!("Signing key already exists (use --force to replace).");
        println!("  Address: {}", keypair.address());
        return Ok(());
    }

    let keypair = Keypair::generate();
    let secret_path = keystore::save_keypair(&ctx.home, &keypair)?;

    println!("Signing key created.");
    println!("  Address:    {}", keypair.address());
    println!("  Public key: {}", hex::encode(keypair.public_key_bytes()));
    println!();
    println!("IMPORTANT: Back up your secret key file securely.");
    println!("  Secret key: {}", secret_path.display());

    Ok(())
}
