//! Storage smart-contract DTOs: allocations, blobbers, stake pools, file refs.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::utils::serde_helpers::{duration_as_nanos, duration_from_nanos, null_as_default};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: i64,
    pub max: i64,
}

impl PriceRange {
    pub fn unbounded() -> Self {
        Self { min: 0, max: i64::MAX }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlobberRequirements {
    pub data_shards: i64,
    pub parity_shards: i64,
    pub size: i64,
    pub owner_id: String,
    pub owner_public_key: String,
    pub expiration_date: i64,
    pub read_price_range: PriceRange,
    pub write_price_range: PriceRange,
}

impl BlobberRequirements {
    /// Small allocation used by most scenarios: 1 data + 1 parity shard, 10 KB.
    pub fn small(owner_id: &str, owner_public_key: &str, expiration_date: i64) -> Self {
        Self {
            data_shards: 1,
            parity_shards: 1,
            size: 10_000,
            owner_id: owner_id.to_string(),
            owner_public_key: owner_public_key.to_string(),
            expiration_date,
            read_price_range: PriceRange::unbounded(),
            write_price_range: PriceRange::unbounded(),
        }
    }
}

/// Requirements plus the blobber ids the sharders offered for them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllocationBlobbers {
    pub blobbers: Vec<String>,
    #[serde(flatten)]
    pub requirements: BlobberRequirements,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateAllocationRequest {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub owner_id: String,
    #[serde(default)]
    pub size: i64,
    #[serde(rename = "expiration_date", default)]
    pub expiration: i64,
    #[serde(default)]
    pub set_immutable: bool,
    #[serde(default)]
    pub update_terms: bool,
    #[serde(rename = "add_blobber_id", default)]
    pub add_blobber_id: String,
    #[serde(rename = "remove_blobber_id", default)]
    pub remove_blobber_id: String,
    #[serde(default)]
    pub third_party_extendable: bool,
    #[serde(default)]
    pub file_options_changed: bool,
    #[serde(default)]
    pub file_options: u16,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Terms {
    pub read_price: i64,
    pub write_price: i64,
    #[serde(default)]
    pub min_lock_demand: f64,
    #[serde(
        default,
        deserialize_with = "duration_from_nanos",
        serialize_with = "duration_as_nanos"
    )]
    pub max_offer_duration: Duration,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StakePoolSettings {
    pub delegate_wallet: String,
    pub min_stake: i64,
    pub max_stake: i64,
    pub num_delegates: i64,
    pub service_charge: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Geolocation {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageNode {
    pub id: String,
    #[serde(rename = "url")]
    pub base_url: String,
    pub geolocation: Geolocation,
    pub terms: Terms,
    pub capacity: i64,
    pub allocated: i64,
    pub last_health_check: i64,
    pub stake_pool_settings: StakePoolSettings,
    pub total_stake: i64,
}

/// One page of `getblobbers`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageNodes {
    #[serde(rename = "Nodes", default, deserialize_with = "null_as_default")]
    pub nodes: Vec<StorageNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AllocationStats {
    pub used_size: i64,
    #[serde(rename = "num_of_writes")]
    pub num_writes: i64,
    #[serde(rename = "num_of_reads")]
    pub num_reads: i64,
    pub total_challenges: i64,
    #[serde(rename = "num_open_challenges")]
    pub open_challenges: i64,
    #[serde(rename = "num_success_challenges")]
    pub success_challenges: i64,
    #[serde(rename = "num_failed_challenges")]
    pub failed_challenges: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Allocation {
    pub id: String,
    pub tx: String,
    pub name: String,
    pub data_shards: i64,
    pub parity_shards: i64,
    pub size: i64,
    #[serde(rename = "expiration_date")]
    pub expiration: i64,
    #[serde(rename = "owner_id")]
    pub owner: String,
    pub owner_public_key: String,
    #[serde(rename = "payer_id")]
    pub payer: String,
    #[serde(deserialize_with = "null_as_default")]
    pub blobbers: Vec<StorageNode>,
    pub stats: Option<AllocationStats>,
    pub is_immutable: bool,
    pub write_pool: i64,
    pub read_price_range: PriceRange,
    pub write_price_range: PriceRange,
    pub finalized: bool,
    pub canceled: bool,
}

impl Allocation {
    pub fn has_blobber(&self, id: &str) -> bool {
        self.blobbers.iter().any(|b| b.id == id)
    }

    /// First offered blobber that the allocation actually uses.
    pub fn first_used_of<'a>(&self, offered: &'a [String]) -> Option<&'a str> {
        offered.iter().map(String::as_str).find(|id| self.has_blobber(id))
    }

    /// First offered blobber the allocation does not use yet.
    pub fn first_unused_of<'a>(&self, offered: &'a [String]) -> Option<&'a str> {
        offered.iter().map(String::as_str).find(|id| !self.has_blobber(id))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DelegatePoolInfo {
    pub id: String,
    pub balance: i64,
    pub delegate_id: String,
    pub rewards: i64,
    #[serde(rename = "unstake")]
    pub un_stake: bool,
    pub total_reward: i64,
    pub total_penalty: i64,
    pub status: String,
    pub round_created: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StakePoolStat {
    #[serde(rename = "pool_id")]
    pub id: String,
    pub balance: i64,
    pub unstake: i64,
    pub free: i64,
    pub capacity: i64,
    pub write_price: i64,
    pub offers_total: i64,
    pub unstake_total: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub delegate: Vec<DelegatePoolInfo>,
    pub penalty: i64,
    pub rewards: i64,
    pub settings: StakePoolSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Challenge {
    #[serde(rename = "id")]
    pub challenge_id: String,
    #[serde(rename = "prev_id")]
    pub prev_challenge_id: String,
    #[serde(rename = "seed")]
    pub random_number: i64,
    pub allocation_id: String,
    pub allocation_root: String,
    pub responded_allocation_root: String,
    pub status: i64,
    pub result: i64,
    pub status_message: String,
    pub commit_txn_id: String,
    pub block_num: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenChallenges {
    #[serde(default)]
    pub blobber_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub challenges: Vec<Challenge>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RefsData {
    pub id: i64,
    #[serde(rename = "type")]
    pub ref_type: String,
    pub allocation_id: String,
    pub lookup_hash: String,
    pub name: String,
    pub path: String,
    pub hash: String,
    pub num_blocks: i64,
    pub path_hash: String,
    pub parent_path: String,
    pub level: i64,
    pub content_hash: String,
    pub size: i64,
    pub merkle_root: String,
    pub actual_file_size: i64,
    pub actual_file_hash: String,
    pub write_marker: String,
    pub chunk_size: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WriteMarker {
    pub allocation_root: String,
    pub prev_allocation_root: String,
    pub allocation_id: String,
    pub size: i64,
    pub blobber_id: String,
    pub timestamp: i64,
    pub client_id: String,
    pub signature: String,
    pub lookup_hash: String,
    pub name: String,
    pub content_hash: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileRefs {
    pub total_pages: i64,
    pub offset_path: String,
    #[serde(deserialize_with = "null_as_default")]
    pub refs: Vec<RefsData>,
    pub latest_write_marker: Option<WriteMarker>,
}

/// Reference path and object tree answers share this recursive shape.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileRefPath {
    #[serde(rename = "meta_data")]
    pub meta: BTreeMap<String, serde_json::Value>,
    #[serde(deserialize_with = "null_as_default")]
    pub list: Vec<FileRefPath>,
    pub latest_write_marker: Option<WriteMarker>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HashNode {
    pub allocation_id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub name: String,
    pub path: String,
    pub content_hash: String,
    pub merkle_root: String,
    pub actual_file_hash: String,
    pub chunk_size: i64,
    pub size: i64,
    pub actual_file_size: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub children: Vec<HashNode>,
}

/// Identity headers blobber file endpoints require.
#[derive(Debug, Clone, Default)]
pub struct BlobberAuth {
    pub client_id: String,
    pub client_key: String,
    pub client_signature: String,
}

impl BlobberAuth {
    pub fn headers(&self) -> Vec<(String, String)> {
        vec![
            ("X-App-Client-Id".into(), self.client_id.clone()),
            ("X-App-Client-Key".into(), self.client_key.clone()),
            ("X-App-Client-Signature".into(), self.client_signature.clone()),
        ]
    }
}
