// crates/harvest-cli/src/commands/mod.rs
//
// Command module declarations for the Harvest CLI, and the context every
// command runs with.

pub mod account;
pub mod certify;
pub mod dao;
pub mod events;
pub mod init;
pub mod inspect;
pub mod lot;
pub mod status;
pub mod token;

use std::path::PathBuf;

use harvest_core::crypto::Keypair;
use harvest_core::transaction::Call;
use harvest_core::Address;

use crate::keystore;
use crate::output::{self, OutputFormat};
use crate::rpc_client;

/// Resolved global options.
#[derive(Debug, Clone)]
pub struct Context {
    /// RPC endpoint for the harvest-daemon.
    pub rpc: String,
    pub format: OutputFormat,
    /// Local state directory (`~/.harvest`).
    pub home: PathBuf,
}

impl Context {
    pub fn keypair(&self) -> Result<Keypair, Box<dyn std::error::Error>> {
        keystore::load_keypair(&self.home)
    }

    /// The given address, or the local account when omitted.
    pub fn account_or_self(&self, account: Option<Address>) -> Result<Address, Box<dyn std::error::Error>> {
        match account {
            Some(account) => Ok(account),
            None => Ok(self.keypair()?.address()),
        }
    }

    /// Sign with the local key, submit, and print the receipt.
    pub async fn submit(&self, call: Call) -> Result<(), Box<dyn std::error::Error>> {
        let keypair = self.keypair()?;
        let receipt = rpc_client::submit(&self.rpc, &keypair, call).await?;
        output::print_receipt(&receipt, self.format);
        Ok(())
    }
}
