//! Reward reconciliation: replays the per-round reward tables of a debug
//! sharder and checks them against node snapshots.

pub mod history;
pub mod reconcile;
pub mod schedule;

use thiserror::Error;

use crate::client::ClientError;
use crate::model::RewardType;

pub use history::{ChainHistory, HistorySource, RoundHistory, SharderHistorySource};
pub use reconcile::{
    confirm_pool_payments, miner_window, sharder_window, AuditSummary, MinerRewardAudit, SharderRewardAudit,
    DEFAULT_TOLERANCE,
};
pub use schedule::MinerScConfig;

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("miner sc config is missing {0}")]
    MissingConfig(String),

    #[error("invalid miner sc config: {0}")]
    InvalidConfig(String),

    #[error("epoch changed during audit, start {start} finish {end}")]
    EpochChanged { start: i64, end: i64 },

    #[error("no block recorded for round {0}")]
    MissingRound(i64),

    #[error("bad snapshot: {0}")]
    Snapshot(String),

    #[error("{provider}: reward delta {delta} but payments sum to {paid}")]
    BalanceMismatch { provider: String, delta: i64, paid: i64 },

    #[error("{provider} round {round}: {reward_type} paid {actual}, expected {expected}")]
    AmountMismatch {
        provider: String,
        round: i64,
        reward_type: RewardType,
        expected: i64,
        actual: i64,
    },

    #[error("{provider} got a block reward on round {round} won by {winner}")]
    NotRoundWinner { provider: String, round: i64, winner: String },

    #[error("round {round}: {actual} {reward_type} payments, expected {expected}")]
    BlockRewardCount {
        round: i64,
        reward_type: RewardType,
        expected: usize,
        actual: usize,
    },

    #[error("{id} received more than one block reward on round {round}")]
    DuplicateBlockReward { id: String, round: i64 },

    #[error("{id} received more than one fee reward on round {round}")]
    DuplicateFeeReward { id: String, round: i64 },

    #[error("{provider} round {round}: {actual} pools block rewarded, expected {expected}")]
    PoolCount {
        provider: String,
        round: i64,
        expected: usize,
        actual: usize,
    },

    #[error("{provider} round {round}: reward to unknown pool {pool}")]
    UnknownPool { provider: String, pool: String, round: i64 },

    #[error("pool {pool} round {round}: paid {actual}, stake share is {expected:.2}")]
    PoolShare { pool: String, round: i64, expected: f64, actual: i64 },

    #[error("pool {pool}: reward delta {delta} but payments sum to {paid}")]
    PoolBalanceMismatch { pool: String, delta: i64, paid: i64 },

    #[error("{provider} round {round}: {reward_type} is not paid to this provider")]
    UnexpectedRewardType { provider: String, round: i64, reward_type: RewardType },

    #[error("{provider} round {round}: fee reward on a block without fees")]
    FeeWithoutFees { provider: String, round: i64 },
}
