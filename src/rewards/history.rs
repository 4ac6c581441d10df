//! Per-round chain history read from a sharder's event-database endpoints.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::client::api::{GET_BLOCKS, GET_DELEGATE_REWARDS, GET_PROVIDER_REWARDS};
use crate::client::{ApiClient, UrlBuilder, STORAGE_SC_ADDRESS};
use crate::model::{BlockSummary, DelegateReward, ProviderReward};
use crate::rewards::ReconcileError;

const PAGE_LIMIT: usize = 20;

/// Everything that happened in one round, as far as rewards are concerned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoundHistory {
    pub block: BlockSummary,
    pub provider_rewards: Vec<ProviderReward>,
    pub delegate_rewards: Vec<DelegateReward>,
}

/// Where round data comes from. All ranges are inclusive.
#[async_trait::async_trait]
pub trait HistorySource: Send + Sync {
    async fn blocks(&self, start: i64, end: i64) -> Result<Vec<BlockSummary>, ReconcileError>;
    async fn provider_rewards(&self, start: i64, end: i64) -> Result<Vec<ProviderReward>, ReconcileError>;
    async fn delegate_rewards(&self, start: i64, end: i64) -> Result<Vec<DelegateReward>, ReconcileError>;
}

/// Reads one sharder directly; the debug tables are not replicated consistently
/// enough for a consensus read.
pub struct SharderHistorySource {
    api: ApiClient,
    sharder: String,
}

impl SharderHistorySource {
    pub fn new(api: ApiClient, sharder: impl Into<String>) -> Self {
        Self { api, sharder: sharder.into() }
    }

    async fn fetch_all<T: DeserializeOwned>(&self, path: &str, start: i64, end: i64) -> Result<Vec<T>, ReconcileError> {
        let mut all = Vec::new();
        let mut offset = 0;
        loop {
            let url = UrlBuilder::new(path)
                .path_var("sc_address", STORAGE_SC_ADDRESS)
                .param("start", start)
                .param("end", end)
                .param("offset", offset)
                .param("limit", PAGE_LIMIT);
            let page: Option<Vec<T>> = self.api.get_json_from(&self.sharder, url).await?;
            let page = page.unwrap_or_default();
            let n = page.len();
            all.extend(page);
            if n < PAGE_LIMIT {
                break;
            }
            offset += PAGE_LIMIT;
        }
        Ok(all)
    }
}

#[async_trait::async_trait]
impl HistorySource for SharderHistorySource {
    async fn blocks(&self, start: i64, end: i64) -> Result<Vec<BlockSummary>, ReconcileError> {
        self.fetch_all(GET_BLOCKS, start, end).await
    }

    async fn provider_rewards(&self, start: i64, end: i64) -> Result<Vec<ProviderReward>, ReconcileError> {
        self.fetch_all(GET_PROVIDER_REWARDS, start, end).await
    }

    async fn delegate_rewards(&self, start: i64, end: i64) -> Result<Vec<DelegateReward>, ReconcileError> {
        self.fetch_all(GET_DELEGATE_REWARDS, start, end).await
    }
}

/// History of rounds `from..=to`, fetched lazily and cached per round.
pub struct ChainHistory<S> {
    from: i64,
    to: i64,
    source: S,
    rounds: RwLock<BTreeMap<i64, Arc<RoundHistory>>>,
}

impl<S: HistorySource> ChainHistory<S> {
    pub fn new(from: i64, to: i64, source: S) -> Self {
        Self { from, to, source, rounds: RwLock::new(BTreeMap::new()) }
    }

    pub fn from(&self) -> i64 {
        self.from
    }

    pub fn to(&self) -> i64 {
        self.to
    }

    /// Prefetch the whole window in one pass.
    pub async fn read(&self) -> Result<(), ReconcileError> {
        self.load(self.from, self.to).await
    }

    async fn load(&self, start: i64, end: i64) -> Result<(), ReconcileError> {
        let (blocks, providers, delegates) = futures::try_join!(
            self.source.blocks(start, end),
            self.source.provider_rewards(start, end),
            self.source.delegate_rewards(start, end),
        )?;
        debug!(start, end, blocks = blocks.len(), providers = providers.len(), delegates = delegates.len(), "history loaded");

        let mut grouped: BTreeMap<i64, RoundHistory> = BTreeMap::new();
        for b in blocks {
            let round = b.round;
            grouped.entry(round).or_default().block = b;
        }
        for r in providers {
            grouped.entry(r.round).or_default().provider_rewards.push(r);
        }
        for r in delegates {
            grouped.entry(r.round).or_default().delegate_rewards.push(r);
        }

        let mut cache = self.rounds.write();
        for (round, mut h) in grouped {
            // A reward row without its block still names the round.
            h.block.round = round;
            if (start..=end).contains(&round) && !h.block.miner_id.is_empty() {
                cache.insert(round, Arc::new(h));
            }
        }
        Ok(())
    }

    pub async fn round(&self, round: i64) -> Result<Arc<RoundHistory>, ReconcileError> {
        if let Some(h) = self.rounds.read().get(&round) {
            return Ok(h.clone());
        }
        self.load(round, round).await?;
        self.rounds.read().get(&round).cloned().ok_or(ReconcileError::MissingRound(round))
    }

    /// Sum of fees of the round's block transactions.
    pub async fn fees_for_round(&self, round: i64) -> Result<i64, ReconcileError> {
        Ok(self.round(round).await?.block.fees())
    }
}
