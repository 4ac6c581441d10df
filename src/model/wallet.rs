use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::crypto::Keypair;

/// Body of `/v1/client/put`, echoed back by miners on success.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WalletRegistration {
    pub id: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub creation_date: Option<i64>,
    pub public_key: String,
}

/// A registered client: keys plus the locally tracked nonce.
///
/// The nonce lives behind an async mutex. Transaction helpers hold the guard
/// across submit and confirmation so that callers sharing a wallet serialize.
#[derive(Debug)]
pub struct Wallet {
    pub id: String,
    pub version: String,
    pub creation_date: Option<i64>,
    pub public_key: String,
    pub mnemonic: String,
    keys: Keypair,
    nonce: Arc<Mutex<u64>>,
}

impl Wallet {
    pub fn new(keys: Keypair, mnemonic: impl Into<String>) -> Self {
        let public = keys.public();
        Self {
            id: public.client_id(),
            version: String::new(),
            creation_date: None,
            public_key: public.to_hex(),
            mnemonic: mnemonic.into(),
            keys,
            nonce: Arc::new(Mutex::new(0)),
        }
    }

    pub fn registration(&self) -> WalletRegistration {
        WalletRegistration {
            id: self.id.clone(),
            version: self.version.clone(),
            creation_date: self.creation_date,
            public_key: self.public_key.clone(),
        }
    }

    /// Fold in what the network returned on registration.
    pub fn apply_registration(&mut self, reg: WalletRegistration) {
        self.version = reg.version;
        self.creation_date = reg.creation_date;
    }

    /// Continue from the last nonce the chain has seen for this client.
    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = Arc::new(Mutex::new(nonce));
        self
    }

    pub fn keys(&self) -> &Keypair {
        &self.keys
    }

    pub async fn nonce(&self) -> u64 {
        *self.nonce.lock().await
    }

    /// Take exclusive use of the nonce until the guard drops.
    pub async fn lock_nonce(&self) -> NonceGuard {
        NonceGuard { guard: self.nonce.clone().lock_owned().await }
    }
}

pub struct NonceGuard {
    guard: OwnedMutexGuard<u64>,
}

impl NonceGuard {
    pub fn current(&self) -> u64 {
        *self.guard
    }

    /// Nonce the next transaction must carry.
    pub fn next(&self) -> u64 {
        *self.guard + 1
    }

    /// Called once a terminal confirmation has been observed.
    pub fn advance(&mut self) {
        *self.guard += 1;
    }
}
