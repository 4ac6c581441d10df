use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::utils::serde_helpers::null_as_default;

/// Node roles the consensus client fans out to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeRole {
    Miner,
    Sharder,
    Blobber,
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NodeRole::Miner => "miner",
            NodeRole::Sharder => "sharder",
            NodeRole::Blobber => "blobber",
        })
    }
}

/// `GET {entrypoint}/network`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetworkDetails {
    #[serde(default, deserialize_with = "null_as_default")]
    pub miners: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sharders: Vec<String>,
}

/// Base URLs that answered their health probe, per role.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HealthyServiceProviders {
    pub miners: Vec<String>,
    pub sharders: Vec<String>,
    pub blobbers: Vec<String>,
}

impl HealthyServiceProviders {
    pub fn for_role(&self, role: NodeRole) -> &[String] {
        match role {
            NodeRole::Miner => &self.miners,
            NodeRole::Sharder => &self.sharders,
            NodeRole::Blobber => &self.blobbers,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MinerStats {
    pub block_finality: f64,
    pub last_finalized_round: i64,
    pub blocks_finalized: i64,
    pub state_health: i64,
    pub current_round: i64,
    pub round_timeout: i64,
    pub timeouts: i64,
    pub average_block_size: i64,
    #[serde(rename = "network_times", deserialize_with = "null_as_default")]
    pub network_times: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SharderStats {
    pub last_finalized_round: i64,
    pub state_health: i64,
    pub average_block_size: i64,
    #[serde(rename = "previous_invocation_count")]
    pub prev_invocation_count: u64,
    pub mean_scan_block_stats_time: f64,
}

/// `/v1/scstate/get` answer for a key; only the fields tests look at.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScState {
    #[serde(rename = "ID", default)]
    pub id: String,
    #[serde(rename = "Used", default)]
    pub used: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_tolerates_null_lists() {
        let n: NetworkDetails = serde_json::from_str(r#"{"miners":["http://m1"],"sharders":null}"#).unwrap();
        assert_eq!(n.miners, vec!["http://m1"]);
        assert!(n.sharders.is_empty());
    }
}
