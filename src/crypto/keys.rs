use anyhow::{anyhow, Result};
use bip39::Mnemonic;
use ed25519_dalek::{PublicKey as DalekPublic, SecretKey};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::crypto::hash::sha3_256_hex;

/// Passphrase the wallet clients mix into the BIP39 seed.
const SEED_PASSPHRASE: &str = "0chain-client-split-key";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey(pub [u8; 32]);

impl PublicKey {
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Client id: hex SHA3-256 over the raw public key bytes.
    pub fn client_id(&self) -> String {
        sha3_256_hex(self.0)
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct PrivateKey(pub [u8; 32]);

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PrivateKey(..)")
    }
}

/// Wallet key pair. The secret is kept as raw bytes; dalek keypairs are rebuilt on use.
#[derive(Clone, Debug)]
pub struct Keypair {
    secret: PrivateKey,
    public: PublicKey,
}

impl Keypair {
    /// Construct from raw secret bytes
    pub fn from_bytes(secret: &[u8]) -> Result<Self> {
        let sk = SecretKey::from_bytes(secret)?;
        let pk = DalekPublic::from(&sk);
        Ok(Self { secret: PrivateKey(sk.to_bytes()), public: PublicKey(pk.to_bytes()) })
    }

    /// Derive deterministically from a BIP39 phrase.
    pub fn from_mnemonic(phrase: &str) -> Result<Self> {
        let mnemonic = Mnemonic::parse_normalized(phrase).map_err(|e| anyhow!("invalid mnemonic: {e}"))?;
        let seed = mnemonic.to_seed(SEED_PASSPHRASE);
        Self::from_bytes(&seed[..32])
    }

    pub fn public(&self) -> PublicKey {
        self.public
    }

    /// Export secret as bytes
    pub fn secret_bytes(&self) -> [u8; 32] {
        self.secret.0
    }

    pub(crate) fn dalek(&self) -> Result<ed25519_dalek::Keypair> {
        let secret = SecretKey::from_bytes(&self.secret.0)?;
        let public = DalekPublic::from_bytes(&self.public.0)?;
        Ok(ed25519_dalek::Keypair { secret, public })
    }
}

/// Fresh 24-word phrase from 256 bits of OS entropy.
pub fn generate_mnemonic() -> Result<String> {
    let mut entropy = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut entropy);
    let mnemonic = Mnemonic::from_entropy(&entropy).map_err(|e| anyhow!("mnemonic: {e}"))?;
    Ok(mnemonic.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mnemonic_derivation_is_deterministic() {
        let phrase = generate_mnemonic().unwrap();
        assert_eq!(phrase.split_whitespace().count(), 24);

        let a = Keypair::from_mnemonic(&phrase).unwrap();
        let b = Keypair::from_mnemonic(&phrase).unwrap();
        assert_eq!(a.public(), b.public());
        assert_eq!(a.public().client_id().len(), 64);
    }

    #[test]
    fn rejects_garbage_phrase() {
        assert!(Keypair::from_mnemonic("not a real phrase").is_err());
    }
}
