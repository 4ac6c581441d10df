//! Transaction construction as a typestate chain: Built -> Hashed -> Signed.
//!
//! Fields are frozen once hashed; the only way to a submittable request is
//! through `hash()` then `sign()`.

use std::marker::PhantomData;

use crate::crypto::{sha3_256_hex, Signer};
use crate::model::{TransactionData, TransactionPutRequest, Wallet};
use crate::txn::TxError;
use crate::utils::tokenomics::TOKEN_UNIT;

pub const TX_TYPE_SMART_CONTRACT: i32 = 1000;
pub const TX_FEE: i64 = 0;
pub const TX_VERSION: &str = "1.0";
pub const TX_OUTPUT_HASH: &str = "";
/// One token, the value attached when the caller does not pick one.
pub const TX_DEFAULT_VALUE: i64 = TOKEN_UNIT;

pub struct Built;
pub struct Hashed;
pub struct Signed;

pub struct Transaction<S> {
    req: TransactionPutRequest,
    _state: PhantomData<S>,
}

/// `{creation_date}:{nonce}:{client_id}:{to_client_id}:{value}:{sha3(data)}`, SHA3-256 hex.
pub fn transaction_hash(req: &TransactionPutRequest) -> String {
    let preimage = format!(
        "{}:{}:{}:{}:{}:{}",
        req.creation_date,
        req.transaction_nonce,
        req.client_id,
        req.to_client_id,
        req.transaction_value,
        sha3_256_hex(&req.transaction_data)
    );
    sha3_256_hex(preimage)
}

fn now_unix() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

impl Transaction<Built> {
    /// Smart-contract call from `wallet` to `to_client_id`, carrying `nonce`.
    pub fn new(wallet: &Wallet, to_client_id: &str, data: &TransactionData, nonce: u64) -> Result<Self, TxError> {
        let transaction_data = serde_json::to_string(data)?;
        Ok(Self {
            req: TransactionPutRequest {
                hash: String::new(),
                signature: String::new(),
                public_key: wallet.public_key.clone(),
                version: TX_VERSION.to_string(),
                client_id: wallet.id.clone(),
                to_client_id: to_client_id.to_string(),
                transaction_data,
                transaction_value: TX_DEFAULT_VALUE,
                creation_date: now_unix(),
                transaction_fee: TX_FEE,
                transaction_type: TX_TYPE_SMART_CONTRACT,
                transaction_output: String::new(),
                txn_output_hash: TX_OUTPUT_HASH.to_string(),
                transaction_nonce: nonce,
            },
            _state: PhantomData,
        })
    }

    pub fn value(mut self, value: i64) -> Self {
        self.req.transaction_value = value;
        self
    }

    pub fn creation_date(mut self, unix_secs: i64) -> Self {
        self.req.creation_date = unix_secs;
        self
    }

    pub fn hash(mut self) -> Transaction<Hashed> {
        self.req.hash = transaction_hash(&self.req);
        Transaction { req: self.req, _state: PhantomData }
    }
}

impl Transaction<Hashed> {
    pub fn hash_hex(&self) -> &str {
        &self.req.hash
    }

    /// Sign the decoded hash bytes.
    pub fn sign(mut self, signer: &impl Signer) -> Result<Transaction<Signed>, TxError> {
        let sig = signer.sign_hash(&self.req.hash).map_err(|e| TxError::Signing(e.to_string()))?;
        self.req.signature = sig.to_hex();
        Ok(Transaction { req: self.req, _state: PhantomData })
    }
}

impl Transaction<Signed> {
    pub fn hash_hex(&self) -> &str {
        &self.req.hash
    }

    pub fn request(&self) -> &TransactionPutRequest {
        &self.req
    }

    pub fn into_request(self) -> TransactionPutRequest {
        self.req
    }
}
