//! Block reward schedule as configured in the miner smart contract.

use std::collections::BTreeMap;

use crate::rewards::ReconcileError;
use crate::utils::tokenomics::TOKEN_UNIT;

/// The subset of miner SC settings the reward audits depend on.
#[derive(Debug, Clone, PartialEq)]
pub struct MinerScConfig {
    pub epoch: i64,
    pub reward_decline_rate: f64,
    pub block_reward: f64,
    pub share_ratio: f64,
    pub num_miner_delegates_rewarded: usize,
    pub num_sharders_rewarded: usize,
    pub num_sharder_delegates_rewarded: usize,
}

fn required(map: &BTreeMap<String, f64>, key: &str) -> Result<f64, ReconcileError> {
    map.get(key).copied().ok_or_else(|| ReconcileError::MissingConfig(key.to_string()))
}

fn count(map: &BTreeMap<String, f64>, key: &str) -> Result<usize, ReconcileError> {
    let v = required(map, key)?;
    if v < 0.0 {
        return Err(ReconcileError::InvalidConfig(format!("{key} is negative: {v}")));
    }
    Ok(v as usize)
}

impl MinerScConfig {
    /// From the numeric map produced by parsing `zwallet mn-config` output.
    pub fn from_numeric(map: &BTreeMap<String, f64>) -> Result<Self, ReconcileError> {
        let epoch = required(map, "epoch")? as i64;
        if epoch <= 0 {
            return Err(ReconcileError::InvalidConfig(format!("epoch must be positive, got {epoch}")));
        }
        Ok(Self {
            epoch,
            reward_decline_rate: required(map, "reward_decline_rate")?,
            block_reward: required(map, "block_reward")?,
            share_ratio: required(map, "share_ratio")?,
            num_miner_delegates_rewarded: count(map, "num_miner_delegates_rewarded")?,
            num_sharders_rewarded: count(map, "num_sharders_rewarded")?,
            num_sharder_delegates_rewarded: count(map, "num_sharder_delegates_rewarded")?,
        })
    }

    /// From the string map served by the miner SC `configs` endpoint.
    /// Entries that are not numbers are ignored.
    pub fn from_fields(fields: &BTreeMap<String, String>) -> Result<Self, ReconcileError> {
        let numeric = fields
            .iter()
            .filter_map(|(k, v)| v.trim().parse::<f64>().ok().map(|f| (k.clone(), f)))
            .collect();
        Self::from_numeric(&numeric)
    }

    pub fn epoch_of(&self, round: i64) -> i64 {
        round / self.epoch
    }

    pub fn ensure_same_epoch(&self, start: i64, end: i64) -> Result<(), ReconcileError> {
        let (s, e) = (self.epoch_of(start), self.epoch_of(end));
        if s != e {
            return Err(ReconcileError::EpochChanged { start: s, end: e });
        }
        Ok(())
    }

    /// Miner and sharder shares of the block reward at `round`, in base units.
    pub fn block_rewards(&self, round: i64) -> (i64, i64) {
        let decline = (1.0 - self.reward_decline_rate).powi(self.epoch_of(round) as i32);
        let block_reward = self.block_reward * TOKEN_UNIT as f64 * decline;
        let miner = (block_reward * self.share_ratio) as i64;
        (miner, block_reward as i64 - miner)
    }

    /// Sharder fee payment for one rewarded sharder.
    pub fn sharder_fee_payment(&self, fees: i64, sharders_rewarded: usize, service_charge: Option<f64>) -> i64 {
        if sharders_rewarded == 0 {
            return 0;
        }
        let per_sharder = fees as f64 / sharders_rewarded as f64;
        let share = per_sharder * (1.0 - self.share_ratio);
        match service_charge {
            Some(sc) => (share * sc) as i64,
            None => share as i64,
        }
    }

    /// What the delegates of one rewarded sharder share out of the round fees.
    pub fn sharder_delegate_fees(&self, fees: i64, sharders_rewarded: usize, service_charge: f64) -> i64 {
        if sharders_rewarded == 0 {
            return 0;
        }
        (fees as f64 * (1.0 - service_charge) * (1.0 - self.share_ratio) / sharders_rewarded as f64) as i64
    }
}

/// Portion of `reward` kept by the provider itself.
pub fn provider_share(reward: i64, service_charge: f64, has_pools: bool, delegates_rewarded: usize) -> i64 {
    if !has_pools || delegates_rewarded == 0 {
        reward
    } else {
        (reward as f64 * service_charge) as i64
    }
}

/// Portion of `reward` left for the provider's delegates.
pub fn delegate_share(reward: i64, service_charge: f64) -> i64 {
    (reward as f64 * (1.0 - service_charge)) as i64
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn config() -> MinerScConfig {
        MinerScConfig {
            epoch: 1000,
            reward_decline_rate: 0.1,
            block_reward: 0.8,
            share_ratio: 0.5,
            num_miner_delegates_rewarded: 2,
            num_sharders_rewarded: 2,
            num_sharder_delegates_rewarded: 2,
        }
    }

    #[test]
    fn parses_mn_config_map() {
        let map: BTreeMap<String, f64> = [
            ("epoch", 15_000_000.0),
            ("reward_decline_rate", 0.1),
            ("block_reward", 0.8),
            ("share_ratio", 0.8),
            ("num_miner_delegates_rewarded", 10.0),
            ("num_sharders_rewarded", 1.0),
            ("num_sharder_delegates_rewarded", 5.0),
            ("max_n", 8.0),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        let cfg = MinerScConfig::from_numeric(&map).unwrap();
        assert_eq!(cfg.epoch, 15_000_000);
        assert_eq!(cfg.num_sharder_delegates_rewarded, 5);
    }

    #[test]
    fn missing_key_and_bad_epoch_are_rejected() {
        let mut fields = BTreeMap::new();
        fields.insert("epoch".to_string(), "0".to_string());
        fields.insert("owner_id".to_string(), "abc".to_string());
        assert!(matches!(MinerScConfig::from_fields(&fields), Err(ReconcileError::InvalidConfig(_))));

        fields.insert("epoch".to_string(), "100".to_string());
        assert!(matches!(
            MinerScConfig::from_fields(&fields),
            Err(ReconcileError::MissingConfig(k)) if k == "reward_decline_rate"
        ));
    }

    #[test]
    fn block_reward_declines_per_epoch() {
        let cfg = config();
        assert_eq!(cfg.block_rewards(10), (4_000_000_000, 4_000_000_000));
        // one epoch later: 0.8 * 0.9 tokens
        let (m, s) = cfg.block_rewards(1500);
        assert!((m + s - 7_200_000_000).abs() <= 1);
        assert!(cfg.ensure_same_epoch(10, 999).is_ok());
        assert!(matches!(cfg.ensure_same_epoch(999, 1000), Err(ReconcileError::EpochChanged { start: 0, end: 1 })));
    }

    #[test]
    fn provider_takes_everything_without_delegates() {
        assert_eq!(provider_share(1000, 0.1, false, 5), 1000);
        assert_eq!(provider_share(1000, 0.1, true, 0), 1000);
        assert_eq!(provider_share(1000, 0.1, true, 5), 100);
        assert_eq!(delegate_share(1000, 0.1), 900);
    }

    #[test]
    fn sharder_fee_split() {
        let cfg = config();
        assert_eq!(cfg.sharder_fee_payment(1000, 2, None), 250);
        assert_eq!(cfg.sharder_fee_payment(1000, 2, Some(0.2)), 50);
        assert_eq!(cfg.sharder_delegate_fees(1000, 2, 0.2), 200);
        assert_eq!(cfg.sharder_fee_payment(1000, 0, None), 0);
    }
}
