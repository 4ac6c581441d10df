use std::convert::TryFrom;

use anyhow::{anyhow, Result};
use ed25519_dalek::{Signature as DalekSig, Signer as DalekSigner, Verifier as DalekVerifier};
use serde::{Deserialize, Serialize};

use crate::crypto::{Keypair, PublicKey};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature(pub Vec<u8>);

impl Signature {
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

/// Trait for signing
pub trait Signer {
    fn sign(&self, msg: &[u8]) -> Result<Signature>;

    /// Sign a hex digest over its decoded bytes, as the network expects.
    fn sign_hash(&self, hash_hex: &str) -> Result<Signature> {
        let raw = hex::decode(hash_hex).map_err(|e| anyhow!("hash is not hex: {e}"))?;
        self.sign(&raw)
    }
}

/// Trait for verifying
pub trait Verifier {
    fn verify(&self, msg: &[u8], sig: &Signature) -> Result<()>;
}

impl Signer for Keypair {
    fn sign(&self, msg: &[u8]) -> Result<Signature> {
        let sig = self.dalek()?.sign(msg);
        Ok(Signature(sig.to_bytes().to_vec()))
    }
}

impl Verifier for PublicKey {
    fn verify(&self, msg: &[u8], sig: &Signature) -> Result<()> {
        let pk = ed25519_dalek::PublicKey::from_bytes(&self.0)?;
        let ds = DalekSig::try_from(sig.0.as_slice())?;
        pk.verify(msg, &ds).map_err(|_| anyhow!("signature verification failed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::hash::sha3_256_hex;

    #[test]
    fn hash_signature_verifies_against_public_key() {
        let kp = Keypair::from_bytes(&[7u8; 32]).unwrap();
        let hash = sha3_256_hex("payload");
        let sig = kp.sign_hash(&hash).unwrap();
        assert_eq!(sig.0.len(), 64);

        let raw = hex::decode(&hash).unwrap();
        kp.public().verify(&raw, &sig).unwrap();
        assert!(kp.public().verify(b"other", &sig).is_err());
    }

    #[test]
    fn non_hex_hash_is_rejected() {
        let kp = Keypair::from_bytes(&[1u8; 32]).unwrap();
        assert!(kp.sign_hash("zz").is_err());
    }
}
