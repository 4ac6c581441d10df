use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::utils::serde_helpers::null_as_default;

/// Delegate pool as reported by `nodeStat?include_delegates=true`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DelegatePool {
    pub balance: i64,
    pub reward: i64,
    pub status: i32,
    pub round_created: i64,
    pub delegate_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeSettings {
    pub delegate_wallet: String,
    pub min_stake: i64,
    pub max_stake: i64,
    pub num_delegates: i64,
    pub service_charge: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StakePool {
    #[serde(deserialize_with = "null_as_default")]
    pub pools: BTreeMap<String, DelegatePool>,
    pub rewards: i64,
    pub settings: NodeSettings,
}

impl StakePool {
    pub fn has_delegates(&self) -> bool {
        !self.pools.is_empty()
    }

    pub fn total_balance(&self) -> i64 {
        self.pools.values().map(|p| p.balance).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimpleNode {
    pub id: String,
    pub host: String,
    pub port: i32,
    pub n2n_host: String,
    pub short_name: String,
    pub total_stake: i64,
    pub round_service_charge_last_updated: i64,
}

/// Miner or sharder snapshot. `round` is the round the snapshot was read at.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Node {
    #[serde(rename = "simple_miner")]
    pub simple: SimpleNode,
    pub stake_pool: StakePool,
    pub round: i64,
    pub total_reward: i64,
}

impl Node {
    pub fn id(&self) -> &str {
        &self.simple.id
    }

    /// Cumulative reward as tracked by the stake pool.
    pub fn reward(&self) -> i64 {
        self.stake_pool.rewards
    }
}

/// `getMinerList` / `getSharderList`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeList {
    #[serde(rename = "Nodes", default, deserialize_with = "null_as_default")]
    pub nodes: Vec<Node>,
}

impl NodeList {
    pub fn ids(&self) -> Vec<String> {
        self.nodes.iter().map(|n| n.id().to_string()).collect()
    }

    pub fn find(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id() == id)
    }
}
