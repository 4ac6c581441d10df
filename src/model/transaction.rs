use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Smart-contract call carried in `transaction_data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionData {
    pub name: String,
    pub input: Value,
}

impl TransactionData {
    pub fn new(name: impl Into<String>, input: Value) -> Self {
        Self { name: name.into(), input }
    }

    pub fn faucet() -> Self {
        Self::new("pour", Value::String("{}".into()))
    }

    pub fn collect_reward(provider_id: &str, provider_type: ProviderType) -> Self {
        Self::new(
            "collect_reward",
            serde_json::json!({ "provider_id": provider_id, "provider_type": provider_type as i32 }),
        )
    }

    pub fn stake_pool_lock(provider_id: &str, provider_type: ProviderType) -> Self {
        Self::new(
            "stake_pool_lock",
            serde_json::json!({ "provider_id": provider_id, "provider_type": provider_type as i32 }),
        )
    }

    pub fn new_allocation(input: Value) -> Self {
        Self::new("new_allocation_request", input)
    }

    pub fn update_allocation(input: Value) -> Self {
        Self::new("update_allocation_request", input)
    }

    pub fn update_blobber_settings(input: Value) -> Self {
        Self::new("update_blobber_settings", input)
    }
}

/// Provider kinds as numbered by the storage smart contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ProviderType {
    Miner = 1,
    Sharder = 2,
    Blobber = 3,
    Validator = 4,
    Authorizer = 5,
}

impl ProviderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderType::Miner => "miner",
            ProviderType::Sharder => "sharder",
            ProviderType::Blobber => "blobber",
            ProviderType::Validator => "validator",
            ProviderType::Authorizer => "authorizer",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionPutRequest {
    pub hash: String,
    pub signature: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub public_key: String,
    pub version: String,
    pub client_id: String,
    pub to_client_id: String,
    pub transaction_data: String,
    pub transaction_value: i64,
    pub creation_date: i64,
    pub transaction_fee: i64,
    pub transaction_type: i32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub transaction_output: String,
    pub txn_output_hash: String,
    pub transaction_nonce: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionEntity {
    pub hash: String,
    pub version: String,
    pub client_id: String,
    pub to_client_id: String,
    pub public_key: String,
    pub transaction_data: String,
    pub transaction_value: i64,
    pub creation_date: i64,
    pub transaction_fee: i64,
    pub transaction_type: i32,
    pub transaction_output: String,
    pub txn_output_hash: String,
    pub transaction_nonce: u64,
    pub chain_id: String,
    pub signature: String,
    pub transaction_status: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionPutResponse {
    #[serde(rename = "async", default)]
    pub is_async: bool,
    #[serde(default)]
    pub entity: TransactionEntity,
}

/// Terminal transaction states reported in confirmations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStatus {
    Success,
    Failure,
}

impl TxStatus {
    pub fn code(self) -> i32 {
        match self {
            TxStatus::Success => 1,
            TxStatus::Failure => 2,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(TxStatus::Success),
            2 => Some(TxStatus::Failure),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MerkleTreePath {
    #[serde(default)]
    pub nodes: Vec<String>,
    #[serde(default)]
    pub leaf_index: i64,
}

/// `/v1/transaction/get/confirmation` body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Confirmation {
    pub version: String,
    pub hash: String,
    pub block_hash: String,
    pub previous_block_hash: String,
    #[serde(rename = "txn")]
    pub transaction: Option<TransactionEntity>,
    pub creation_date: i64,
    pub miner_id: String,
    pub round: i64,
    #[serde(rename = "transaction_status")]
    pub status: i32,
    pub round_random_seed: i64,
    pub state_changes_count: i64,
    pub merkle_tree_root: String,
    pub merkle_tree_path: Option<MerkleTreePath>,
    pub receipt_merkle_tree_root: String,
    pub receipt_merkle_tree_path: Option<MerkleTreePath>,
}

impl Confirmation {
    pub fn tx_status(&self) -> Option<TxStatus> {
        TxStatus::from_code(self.status)
    }

    /// Output the smart contract produced, if the sharder embedded the transaction.
    pub fn output(&self) -> Option<&str> {
        self.transaction.as_ref().map(|t| t.transaction_output.as_str())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Balance {
    #[serde(default)]
    pub txn: String,
    #[serde(default)]
    pub round: i64,
    pub balance: i64,
    /// Nonce of the client's last confirmed transaction.
    #[serde(default)]
    pub nonce: u64,
}
