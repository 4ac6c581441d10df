//! Self-consistency checks between node snapshots and the per-round reward tables.
//!
//! Every check fails on the first violation it finds.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use crate::model::{DelegatePool, Node, RewardType};
use crate::rewards::history::{ChainHistory, HistorySource};
use crate::rewards::schedule::{delegate_share, provider_share, MinerScConfig};
use crate::rewards::ReconcileError;

/// Largest difference, in base units, tolerated between expected and paid amounts.
pub const DEFAULT_TOLERANCE: f64 = 1.0;

fn within(expected: f64, actual: f64, tolerance: f64) -> bool {
    (expected - actual).abs() <= tolerance
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuditSummary {
    pub start: i64,
    pub end: i64,
    pub providers: usize,
    pub payments: usize,
}

fn check_snapshots(ids: &[String], before: &[Node], after: &[Node]) -> Result<(), ReconcileError> {
    if ids.is_empty() {
        return Err(ReconcileError::Snapshot("no providers to audit".into()));
    }
    if before.len() != ids.len() || after.len() != ids.len() {
        return Err(ReconcileError::Snapshot(format!(
            "{} ids but {} before and {} after snapshots",
            ids.len(),
            before.len(),
            after.len()
        )));
    }
    for (i, id) in ids.iter().enumerate() {
        if before[i].id() != id || after[i].id() != id {
            return Err(ReconcileError::Snapshot(format!("snapshot {i} is not provider {id}")));
        }
    }
    Ok(())
}

fn clamp_window(before: &[Node], after: &[Node], round_of: impl Fn(&Node) -> i64) -> Result<(i64, i64), ReconcileError> {
    let (first_before, first_after) = match (before.first(), after.first()) {
        (Some(b), Some(a)) => (b, a),
        _ => return Err(ReconcileError::Snapshot("empty snapshot".into())),
    };
    // rewards are added at the end of a round and show up in the next one
    let mut start = round_of(first_before) + 1;
    let mut end = round_of(first_after) + 1;
    for b in before {
        start = start.max(round_of(b));
    }
    for a in after {
        end = end.min(round_of(a));
    }
    Ok((start, end))
}

/// History window for a miner audit, from the snapshot rounds.
pub fn miner_window(before: &[Node], after: &[Node]) -> Result<(i64, i64), ReconcileError> {
    clamp_window(before, after, |n| n.round)
}

/// History window for a sharder audit, from the service charge update rounds.
pub fn sharder_window(before: &[Node], after: &[Node]) -> Result<(i64, i64), ReconcileError> {
    clamp_window(before, after, |n| n.simple.round_service_charge_last_updated)
}

/// Block rewarded pools must number `min(num_rewards, pools)` and be paid in
/// proportion to their balance over the total of the pools chosen.
pub fn confirm_pool_payments(
    provider: &str,
    round: i64,
    block_reward: i64,
    rewarded: &BTreeMap<String, i64>,
    pools: &BTreeMap<String, DelegatePool>,
    num_rewards: usize,
    tolerance: f64,
) -> Result<(), ReconcileError> {
    if rewarded.is_empty() {
        return Ok(());
    }
    let expected = num_rewards.min(pools.len());
    if rewarded.len() != expected {
        return Err(ReconcileError::PoolCount {
            provider: provider.to_string(),
            round,
            expected,
            actual: rewarded.len(),
        });
    }

    let mut total = 0.0;
    for id in rewarded.keys() {
        let pool = pools.get(id).ok_or_else(|| ReconcileError::UnknownPool {
            provider: provider.to_string(),
            pool: id.clone(),
            round,
        })?;
        total += pool.balance as f64;
    }
    if total <= 0.0 {
        return Ok(());
    }
    for (id, paid) in rewarded {
        let balance = pools.get(id).map(|p| p.balance).unwrap_or_default();
        let share = balance as f64 / total * block_reward as f64;
        if !within(share, *paid as f64, tolerance) {
            return Err(ReconcileError::PoolShare {
                pool: id.clone(),
                round,
                expected: share,
                actual: *paid,
            });
        }
    }
    Ok(())
}

fn check_pool_deltas(
    before: &Node,
    after: &Node,
    rewards: &BTreeMap<String, i64>,
    tolerance: f64,
) -> Result<(), ReconcileError> {
    for (pool, now) in &after.stake_pool.pools {
        let was = before.stake_pool.pools.get(pool).map(|p| p.reward).unwrap_or_default();
        let paid = rewards.get(pool).copied().unwrap_or_default();
        if !within((now.reward - was) as f64, paid as f64, tolerance) {
            return Err(ReconcileError::PoolBalanceMismatch {
                pool: pool.clone(),
                delta: now.reward - was,
                paid,
            });
        }
    }
    Ok(())
}

fn check_provider_delta(id: &str, before: &Node, after: &Node, paid: i64, tolerance: f64) -> Result<(), ReconcileError> {
    let delta = after.reward() - before.reward();
    if !within(delta as f64, paid as f64, tolerance) {
        return Err(ReconcileError::BalanceMismatch { provider: id.to_string(), delta, paid });
    }
    Ok(())
}

/// Miner block and fee reward audit.
pub struct MinerRewardAudit<'a> {
    cfg: &'a MinerScConfig,
    tolerance: f64,
}

impl<'a> MinerRewardAudit<'a> {
    pub fn new(cfg: &'a MinerScConfig) -> Self {
        Self { cfg, tolerance: DEFAULT_TOLERANCE }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// `before` and `after` are index aligned with `ids`.
    pub async fn run<S: HistorySource>(
        &self,
        ids: &[String],
        before: &[Node],
        after: &[Node],
        history: &ChainHistory<S>,
    ) -> Result<AuditSummary, ReconcileError> {
        check_snapshots(ids, before, after)?;
        let (start, end) = (history.from(), history.to());
        self.cfg.ensure_same_epoch(start, end)?;
        let (block_reward, _) = self.cfg.block_rewards(start);
        debug!(start, end, block_reward, "auditing miner rewards");

        let mut payments = 0;
        for (i, id) in ids.iter().enumerate() {
            payments += self.provider_rewards(id, &before[i], &after[i], block_reward, history).await?;
        }
        self.block_reward_count(history).await?;
        for (i, id) in ids.iter().enumerate() {
            self.delegate_rewards(id, &before[i], &after[i], block_reward, history).await?;
        }

        let summary = AuditSummary { start, end, providers: ids.len(), payments };
        info!(?summary, "miner rewards reconcile");
        Ok(summary)
    }

    async fn provider_rewards<S: HistorySource>(
        &self,
        id: &str,
        before: &Node,
        after: &Node,
        block_reward: i64,
        history: &ChainHistory<S>,
    ) -> Result<usize, ReconcileError> {
        let settings = &before.stake_pool.settings;
        let expected = provider_share(
            block_reward,
            settings.service_charge,
            before.stake_pool.has_delegates(),
            self.cfg.num_miner_delegates_rewarded,
        );
        let mut paid = 0;
        let mut payments = 0;
        for round in before.round + 1..=after.round {
            let h = history.round(round).await?;
            for r in h.provider_rewards.iter().filter(|r| r.provider_id == id) {
                match r.reward_type {
                    RewardType::BlockRewardMiner => {
                        if h.block.miner_id != id {
                            return Err(ReconcileError::NotRoundWinner {
                                provider: id.to_string(),
                                round,
                                winner: h.block.miner_id.clone(),
                            });
                        }
                        if !within(expected as f64, r.amount as f64, self.tolerance) {
                            return Err(ReconcileError::AmountMismatch {
                                provider: id.to_string(),
                                round,
                                reward_type: r.reward_type,
                                expected,
                                actual: r.amount,
                            });
                        }
                    }
                    RewardType::FeeRewardMiner => {}
                    other => {
                        return Err(ReconcileError::UnexpectedRewardType {
                            provider: id.to_string(),
                            round,
                            reward_type: other,
                        })
                    }
                }
                paid += r.amount;
                payments += 1;
            }
        }
        check_provider_delta(id, before, after, paid, self.tolerance)?;
        Ok(payments)
    }

    async fn block_reward_count<S: HistorySource>(&self, history: &ChainHistory<S>) -> Result<(), ReconcileError> {
        for round in history.from()..=history.to() {
            let h = history.round(round).await?;
            let mut winners = h.provider_rewards.iter().filter(|r| r.reward_type == RewardType::BlockRewardMiner);
            let first = winners.next();
            let extra = winners.count();
            match first {
                Some(r) if extra == 0 => {
                    if r.provider_id != h.block.miner_id {
                        return Err(ReconcileError::NotRoundWinner {
                            provider: r.provider_id.clone(),
                            round,
                            winner: h.block.miner_id.clone(),
                        });
                    }
                }
                _ => {
                    return Err(ReconcileError::BlockRewardCount {
                        round,
                        reward_type: RewardType::BlockRewardMiner,
                        expected: 1,
                        actual: usize::from(first.is_some()) + extra,
                    })
                }
            }
        }
        Ok(())
    }

    async fn delegate_rewards<S: HistorySource>(
        &self,
        id: &str,
        before: &Node,
        after: &Node,
        block_reward: i64,
        history: &ChainHistory<S>,
    ) -> Result<(), ReconcileError> {
        let delegate_reward = delegate_share(block_reward, before.stake_pool.settings.service_charge);
        let pools = &after.stake_pool.pools;
        let mut rewards: BTreeMap<String, i64> = pools.keys().map(|p| (p.clone(), 0)).collect();

        for round in before.round + 1..=after.round {
            let h = history.round(round).await?;
            let mut block_rewarded = BTreeMap::new();
            for r in h.delegate_rewards.iter() {
                let Some(total) = rewards.get_mut(&r.pool_id) else {
                    continue;
                };
                match r.reward_type {
                    RewardType::BlockRewardMiner => {
                        if block_rewarded.insert(r.pool_id.clone(), r.amount).is_some() {
                            return Err(ReconcileError::DuplicateBlockReward { id: r.pool_id.clone(), round });
                        }
                    }
                    RewardType::FeeRewardMiner => {}
                    other => {
                        return Err(ReconcileError::UnexpectedRewardType {
                            provider: r.pool_id.clone(),
                            round,
                            reward_type: other,
                        })
                    }
                }
                *total += r.amount;
            }
            if h.block.miner_id != id && !block_rewarded.is_empty() {
                return Err(ReconcileError::PoolCount {
                    provider: id.to_string(),
                    round,
                    expected: 0,
                    actual: block_rewarded.len(),
                });
            }
            confirm_pool_payments(
                id,
                round,
                delegate_reward,
                &block_rewarded,
                pools,
                self.cfg.num_miner_delegates_rewarded,
                self.tolerance,
            )?;
        }
        check_pool_deltas(before, after, &rewards, self.tolerance)
    }
}

/// Sharder block and fee reward audit.
pub struct SharderRewardAudit<'a> {
    cfg: &'a MinerScConfig,
    tolerance: f64,
}

impl<'a> SharderRewardAudit<'a> {
    pub fn new(cfg: &'a MinerScConfig) -> Self {
        Self { cfg, tolerance: DEFAULT_TOLERANCE }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    fn sharders_rewarded(&self, candidates: usize) -> usize {
        self.cfg.num_sharders_rewarded.min(candidates)
    }

    pub async fn run<S: HistorySource>(
        &self,
        ids: &[String],
        before: &[Node],
        after: &[Node],
        history: &ChainHistory<S>,
    ) -> Result<AuditSummary, ReconcileError> {
        check_snapshots(ids, before, after)?;
        let (start, end) = (history.from(), history.to());
        let n = self.sharders_rewarded(ids.len());
        if n == 0 {
            return Ok(AuditSummary { start, end, providers: ids.len(), payments: 0 });
        }
        self.cfg.ensure_same_epoch(start, end)?;
        let (_, sharder_reward) = self.cfg.block_rewards(start);
        let per_sharder = (sharder_reward as f64 / n as f64) as i64;
        debug!(start, end, n, per_sharder, "auditing sharder rewards");

        let mut payments = 0;
        for (i, id) in ids.iter().enumerate() {
            payments += self.provider_rewards(id, &before[i], &after[i], per_sharder, n, history).await?;
        }
        self.rewarded_count(start + 1, end - 1, n, history).await?;
        self.delegates_rewarded(ids, before, history).await?;
        for (i, id) in ids.iter().enumerate() {
            self.delegate_rewards(id, &before[i], &after[i], per_sharder, n, history).await?;
        }

        let summary = AuditSummary { start, end, providers: ids.len(), payments };
        info!(?summary, "sharder rewards reconcile");
        Ok(summary)
    }

    fn rounds(before: &Node, after: &Node) -> std::ops::RangeInclusive<i64> {
        before.simple.round_service_charge_last_updated + 1..=after.simple.round_service_charge_last_updated
    }

    async fn provider_rewards<S: HistorySource>(
        &self,
        id: &str,
        before: &Node,
        after: &Node,
        per_sharder: i64,
        n: usize,
        history: &ChainHistory<S>,
    ) -> Result<usize, ReconcileError> {
        let sc = before.stake_pool.settings.service_charge;
        let shares_with_delegates = before.stake_pool.has_delegates() && self.cfg.num_sharder_delegates_rewarded > 0;
        let block_expected =
            provider_share(per_sharder, sc, before.stake_pool.has_delegates(), self.cfg.num_sharder_delegates_rewarded);

        let mut paid = 0;
        let mut payments = 0;
        for round in Self::rounds(before, after) {
            let h = history.round(round).await?;
            for r in h.provider_rewards.iter().filter(|r| r.provider_id == id) {
                let expected = match r.reward_type {
                    RewardType::BlockRewardSharder => block_expected,
                    RewardType::FeeRewardSharder => {
                        let fees = h.block.fees();
                        if fees == 0 {
                            return Err(ReconcileError::FeeWithoutFees { provider: id.to_string(), round });
                        }
                        self.cfg.sharder_fee_payment(fees, n, shares_with_delegates.then_some(sc))
                    }
                    other => {
                        return Err(ReconcileError::UnexpectedRewardType {
                            provider: id.to_string(),
                            round,
                            reward_type: other,
                        })
                    }
                };
                if !within(expected as f64, r.amount as f64, self.tolerance) {
                    return Err(ReconcileError::AmountMismatch {
                        provider: id.to_string(),
                        round,
                        reward_type: r.reward_type,
                        expected,
                        actual: r.amount,
                    });
                }
                paid += r.amount;
                payments += 1;
            }
        }
        check_provider_delta(id, before, after, paid, self.tolerance)?;
        Ok(payments)
    }

    /// Every round pays exactly `n` distinct sharders a block reward, and the
    /// same number a fee reward whenever the block carried fees.
    async fn rewarded_count<S: HistorySource>(
        &self,
        start: i64,
        end: i64,
        n: usize,
        history: &ChainHistory<S>,
    ) -> Result<(), ReconcileError> {
        for round in start..=end {
            let h = history.round(round).await?;
            let has_fees = h.block.fees() > 0;
            let mut kinds = vec![RewardType::BlockRewardSharder];
            if has_fees {
                kinds.push(RewardType::FeeRewardSharder);
            }
            for kind in kinds {
                let mut paid = BTreeSet::new();
                for r in h.provider_rewards.iter().filter(|r| r.reward_type == kind) {
                    if !paid.insert(r.provider_id.as_str()) {
                        return Err(ReconcileError::DuplicateBlockReward { id: r.provider_id.clone(), round });
                    }
                }
                if paid.len() != n {
                    return Err(ReconcileError::BlockRewardCount {
                        round,
                        reward_type: kind,
                        expected: n,
                        actual: paid.len(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Each sharder block rewarded in a round pays `min(num_sharder_delegates_rewarded, pools)`
    /// of its pools.
    async fn delegates_rewarded<S: HistorySource>(
        &self,
        ids: &[String],
        before: &[Node],
        history: &ChainHistory<S>,
    ) -> Result<(), ReconcileError> {
        for round in history.from()..=history.to() {
            let h = history.round(round).await?;
            for (i, id) in ids.iter().enumerate() {
                let won = h
                    .provider_rewards
                    .iter()
                    .any(|r| r.provider_id == *id && r.reward_type == RewardType::BlockRewardSharder);
                if !won {
                    continue;
                }
                let pools = &before[i].stake_pool.pools;
                let mut paid = BTreeSet::new();
                for r in h
                    .delegate_rewards
                    .iter()
                    .filter(|r| r.reward_type == RewardType::BlockRewardSharder && pools.contains_key(&r.pool_id))
                {
                    if !paid.insert(r.pool_id.as_str()) {
                        return Err(ReconcileError::DuplicateBlockReward { id: r.pool_id.clone(), round });
                    }
                }
                let expected = self.cfg.num_sharder_delegates_rewarded.min(pools.len());
                if paid.len() != expected {
                    return Err(ReconcileError::PoolCount {
                        provider: id.clone(),
                        round,
                        expected,
                        actual: paid.len(),
                    });
                }
            }
        }
        Ok(())
    }

    async fn delegate_rewards<S: HistorySource>(
        &self,
        id: &str,
        before: &Node,
        after: &Node,
        per_sharder: i64,
        n: usize,
        history: &ChainHistory<S>,
    ) -> Result<(), ReconcileError> {
        let sc = before.stake_pool.settings.service_charge;
        let delegate_reward = delegate_share(per_sharder, sc);
        let pools = &after.stake_pool.pools;
        let mut rewards: BTreeMap<String, i64> = pools.keys().map(|p| (p.clone(), 0)).collect();

        for round in Self::rounds(before, after) {
            let h = history.round(round).await?;
            let mut block_rewarded = BTreeMap::new();
            let mut fee_rewarded = BTreeMap::new();
            for r in h.delegate_rewards.iter().filter(|r| r.provider_id == id) {
                let Some(total) = rewards.get_mut(&r.pool_id) else {
                    return Err(ReconcileError::UnknownPool {
                        provider: id.to_string(),
                        pool: r.pool_id.clone(),
                        round,
                    });
                };
                match r.reward_type {
                    RewardType::BlockRewardSharder => {
                        if block_rewarded.insert(r.pool_id.clone(), r.amount).is_some() {
                            return Err(ReconcileError::DuplicateBlockReward { id: r.pool_id.clone(), round });
                        }
                    }
                    RewardType::FeeRewardSharder => {
                        if fee_rewarded.insert(r.pool_id.clone(), r.amount).is_some() {
                            return Err(ReconcileError::DuplicateFeeReward { id: r.pool_id.clone(), round });
                        }
                    }
                    other => {
                        return Err(ReconcileError::UnexpectedRewardType {
                            provider: r.pool_id.clone(),
                            round,
                            reward_type: other,
                        })
                    }
                }
                *total += r.amount;
            }
            let nd = self.cfg.num_sharder_delegates_rewarded;
            confirm_pool_payments(id, round, delegate_reward, &block_rewarded, pools, nd, self.tolerance)?;
            let fee_reward = self.cfg.sharder_delegate_fees(h.block.fees(), n, sc);
            confirm_pool_payments(id, round, fee_reward, &fee_rewarded, pools, nd, self.tolerance)?;
        }
        check_pool_deltas(before, after, &rewards, self.tolerance)
    }
}
