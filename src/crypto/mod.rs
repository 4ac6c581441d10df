//! Crypto module: wallet keys, hashing, signing.
//!
//! - Keys: BIP39 mnemonic derivation, client ids
//! - Hash: SHA3-256 ids and digests, file digests
//! - Sign: Ed25519 signatures over transaction hashes

pub mod hash;
pub mod keys;
pub mod sign;

pub use hash::{file_sha256_hex, sha3_256_hex};
pub use keys::{generate_mnemonic, Keypair, PrivateKey, PublicKey};
pub use sign::{Signature, Signer, Verifier};
