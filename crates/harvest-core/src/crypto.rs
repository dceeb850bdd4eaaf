// crates/harvest-core/src/crypto.rs

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use crate::address::Address;
use crate::error::HarvestError;

/// An ed25519 keypair for signing transactions.
pub struct Keypair {
    pub signing_key: SigningKey,
    pub verifying_key: VerifyingKey,
}

impl Keypair {
    /// Generate a new random ed25519 keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        let verifying_key = signing_key.verifying_key();
        Keypair {
            signing_key,
            verifying_key,
        }
    }

    /// Rebuild a keypair from its 32-byte secret.
    pub fn from_secret_bytes(secret: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(secret);
        let verifying_key = signing_key.verifying_key();
        Keypair {
            signing_key,
            verifying_key,
        }
    }

    /// Parse a hex-encoded 32-byte secret (as written by `harvest init`).
    pub fn from_secret_hex(secret_hex: &str) -> Result<Self, HarvestError> {
        let bytes = hex::decode(secret_hex.trim())
            .map_err(|e| HarvestError::Crypto(format!("Invalid secret key hex: {}", e)))?;
        let secret: [u8; 32] = bytes
            .try_into()
            .map_err(|_| HarvestError::Crypto("Secret key must be exactly 32 bytes".to_string()))?;
        Ok(Self::from_secret_bytes(&secret))
    }

    /// Get the public key bytes (32 bytes).
    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.verifying_key.to_bytes()
    }

    /// The account address controlled by this keypair.
    pub fn address(&self) -> Address {
        Address::from_public_key(&self.public_key_bytes())
    }

    /// Sign a message and return the signature bytes.
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        let signature = self.signing_key.sign(message);
        signature.to_bytes().to_vec()
    }
}

/// Sign a message with the given signing key bytes.
///
/// Returns the ed25519 signature as a 64-byte vector.
pub fn sign_message(signing_key_bytes: &[u8; 32], message: &[u8]) -> Result<Vec<u8>, HarvestError> {
    let signing_key = SigningKey::from_bytes(signing_key_bytes);
    let signature = signing_key.sign(message);
    Ok(signature.to_bytes().to_vec())
}

/// Verify an ed25519 signature.
///
/// Returns `true` if the signature is valid for the given message and public key.
pub fn verify_signature(
    public_key_bytes: &[u8; 32],
    message: &[u8],
    signature_bytes: &[u8],
) -> Result<bool, HarvestError> {
    let verifying_key = VerifyingKey::from_bytes(public_key_bytes)
        .map_err(|e| HarvestError::Crypto(format!("Invalid public key: {}", e)))?;

    let signature_array: [u8; 64] = signature_bytes
        .try_into()
        .map_err(|_| HarvestError::Crypto("Signature must be exactly 64 bytes".to_string()))?;

    let signature = ed25519_dalek::Signature::from_bytes(&signature_array);

    match verifying_key.verify(message, &signature) {
        Ok(()) => Ok(true),
        Err(_) => Ok(false),
    }
}

/// Compute SHA-256 hash of the given bytes.
pub fn hash_bytes(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypair_sign_verify() {
        let keypair = Keypair::generate();
        let message = b"cucumber lot 0";

        let signature = keypair.sign(message);
        let pubkey = keypair.public_key_bytes();

        assert!(verify_signature(&pubkey, message, &signature).unwrap());
        assert!(!verify_signature(&pubkey, b"tomato lot 0", &signature).unwrap());
    }

    #[test]
    fn test_secret_hex_roundtrip() {
        let keypair = Keypair::generate();
        let secret_hex = hex::encode(keypair.signing_key.to_bytes());
        let restored = Keypair::from_secret_hex(&secret_hex).unwrap();
        assert_eq!(restored.address(), keypair.address());
    }

    #[test]
    fn test_secret_hex_rejects_short_input() {
        assert!(matches!(
            Keypair::from_secret_hex("abcd"),
            Err(HarvestError::Crypto(_))
        ));
    }

    #[test]
    fn test_signature_length_checked() {
        let keypair = Keypair::generate();
        let result = verify_signature(&keypair.public_key_bytes(), b"m", &[0u8; 10]);
        assert!(result.is_err());
    }

    #[test]
    fn test_hash_bytes() {
        let hash = hash_bytes(b"harvest");
        assert_eq!(hash, hash_bytes(b"harvest"));
        assert_ne!(hash, hash_bytes(b"different"));
    }
}
