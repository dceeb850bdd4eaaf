// crates/harvest-cli/src/keystore.rs
//
// Local CLI state under `~/.harvest`:
//   - `keys/account.secret`  hex-encoded ed25519 secret key
//   - `cli.toml`             client settings (RPC endpoint)

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use harvest_core::crypto::Keypair;

pub const DEFAULT_RPC_ENDPOINT: &str = "http://127.0.0.1:50061";

/// Settings persisted by `harvest init`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default = "default_rpc")]
    pub rpc: String,
}

fn default_rpc() -> String {
    DEFAULT_RPC_ENDPOINT.to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self { rpc: default_rpc() }
    }
}

impl CliConfig {
    /// Read `cli.toml` from `home`, or defaults if it is missing.
    pub fn load(home: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let path = home.join("cli.toml");
        if !path.exists() {
            return Ok(Self::default());
        }
        Ok(toml::from_str(&fs::read_to_string(path)?)?)
    }

    pub fn save(&self, home: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
        fs::create_dir_all(home)?;
        let path = home.join("cli.toml");
        fs::write(&path, toml::to_string(self)?)?;
        Ok(path)
    }
}

/// `~/.harvest`.
pub fn harvest_home() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let home = dirs::home_dir().ok_or("Could not determine home directory")?;
    Ok(home.join(".harvest"))
}

fn secret_path(home: &Path) -> PathBuf {
    home.join("keys").join("account.secret")
}

/// Write `keypair` as the local signing key.
pub fn save_keypair(home: &Path, keypair: &Keypair) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let path = secret_path(home);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(&path, hex::encode(keypair.signing_key.to_bytes()))?;
    Ok(path)
}

pub fn has_keypair(home: &Path) -> bool {
    secret_path(home).exists()
}

/// Load the local signing key.
pub fn load_keypair(home: &Path) -> Result<Keypair, Box<dyn std::error::Error>> {
    let path = secret_path(home);
    let contents = fs::read_to_string(&path).map_err(|e| {
        format!(
            "No signing key at {} ({}). Run `harvest init` first.",
            path.display(),
            e
        )
    })?;
    Ok(Keypair::from_secret_hex(contents.trim())?)
}
