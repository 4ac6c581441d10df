use std::fmt;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

use crate::utils::serde_helpers::null_as_default;

/// Reward kinds in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RewardType {
    MinLockDemandReward,
    BlockRewardMiner,
    BlockRewardSharder,
    BlockRewardBlobber,
    FeeRewardMiner,
    FeeRewardAuthorizer,
    FeeRewardSharder,
    ValidationReward,
    FileDownloadReward,
    ChallengePassReward,
    ChallengeSlashPenalty,
    CancellationChargeReward,
}

const ALL: [RewardType; 12] = [
    RewardType::MinLockDemandReward,
    RewardType::BlockRewardMiner,
    RewardType::BlockRewardSharder,
    RewardType::BlockRewardBlobber,
    RewardType::FeeRewardMiner,
    RewardType::FeeRewardAuthorizer,
    RewardType::FeeRewardSharder,
    RewardType::ValidationReward,
    RewardType::FileDownloadReward,
    RewardType::ChallengePassReward,
    RewardType::ChallengeSlashPenalty,
    RewardType::CancellationChargeReward,
];

impl RewardType {
    pub fn code(self) -> i64 {
        self as i64
    }

    pub fn from_code(code: i64) -> Option<Self> {
        usize::try_from(code).ok().and_then(|i| ALL.get(i).copied())
    }

    pub fn is_block_reward(self) -> bool {
        matches!(
            self,
            RewardType::BlockRewardMiner | RewardType::BlockRewardSharder | RewardType::BlockRewardBlobber
        )
    }
}

impl fmt::Display for RewardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl Serialize for RewardType {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i64(self.code())
    }
}

impl<'de> Deserialize<'de> for RewardType {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let code = i64::deserialize(d)?;
        RewardType::from_code(code).ok_or_else(|| de::Error::custom(format!("unknown reward type {code}")))
    }
}

/// Provider-level payment, one row of `/provider-rewards`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderReward {
    pub provider_id: String,
    pub reward_type: RewardType,
    pub amount: i64,
    #[serde(default, rename = "block_number")]
    pub round: i64,
}

/// Delegate-level payment, one row of `/delegate-rewards`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelegateReward {
    pub pool_id: String,
    pub provider_id: String,
    pub reward_type: RewardType,
    pub amount: i64,
    #[serde(default, rename = "block_number")]
    pub round: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockTransaction {
    pub hash: String,
    pub fee: i64,
}

/// Block header as served by `get_blocks`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockSummary {
    pub hash: String,
    pub round: i64,
    pub miner_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub sharder_ids: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub transactions: Vec<BlockTransaction>,
}

impl BlockSummary {
    pub fn fees(&self) -> i64 {
        self.transactions.iter().map(|t| t.fee).sum()
    }
}
