//! Everything a suite needs, built once and passed to each scenario.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::cli::{key_value_pairs_to_map, CliProfile};
use crate::client::{ApiClient, HttpTransport, Transport};
use crate::config::SuiteConfig;
use crate::crypto::generate_mnemonic;
use crate::model::{HealthyServiceProviders, NodeRole, Wallet};
use crate::rewards::{
    miner_window, sharder_window, AuditSummary, ChainHistory, MinerRewardAudit, MinerScConfig, SharderHistorySource,
    SharderRewardAudit,
};
use crate::session::StorageSession;
use crate::txn::TransactionHelper;
use crate::utils::errors::{Result, SystestError};

pub struct SystemContext {
    pub config: SuiteConfig,
    pub api: ApiClient,
    pub cli: CliProfile,
    pub storage: StorageSession,
}

impl SystemContext {
    /// Resolve the entrypoint, probe the network and keep the healthy nodes.
    pub async fn connect(config: SuiteConfig) -> Result<Self> {
        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(config.http_timeout())?);
        let entrypoint = config.entrypoint()?;
        let api = ApiClient::connect(transport, &entrypoint, config.blobber_auth.clone()).await?;
        Self::from_parts(config, api)
    }

    /// Assemble from an already connected client.
    pub fn from_parts(config: SuiteConfig, api: ApiClient) -> Result<Self> {
        let api = api.with_allocation_poll(config.allocation_poll());
        let cli = config.cli.profile();
        let storage = StorageSession::new(cli.clone())?;
        let p = api.providers();
        info!(
            miners = p.for_role(NodeRole::Miner).len(),
            sharders = p.for_role(NodeRole::Sharder).len(),
            blobbers = p.for_role(NodeRole::Blobber).len(),
            "system context ready"
        );
        Ok(Self { config, api, cli, storage })
    }

    pub fn providers(&self) -> &HealthyServiceProviders {
        self.api.providers()
    }

    pub fn transactions(&self) -> TransactionHelper<'_> {
        TransactionHelper::new(&self.api, self.config.confirmation_poll())
    }

    /// Fresh keys from a new mnemonic, registered with the miners.
    pub async fn new_wallet(&self) -> Result<Wallet> {
        let mnemonic = generate_mnemonic().map_err(|e| SystestError::Crypto(e.to_string()))?;
        Ok(self.api.register_wallet(&mnemonic).await?)
    }

    /// Re-register a wallet from a known mnemonic, continuing its nonce.
    pub async fn recover_wallet(&self, mnemonic: &str) -> Result<Wallet> {
        Ok(self.api.recover_wallet(mnemonic).await?)
    }

    /// Reward history of `from..=to` read from the first healthy sharder.
    pub fn history(&self, from: i64, to: i64) -> Result<ChainHistory<SharderHistorySource>> {
        let sharder = self.api.first_sharder()?.to_string();
        Ok(ChainHistory::new(from, to, SharderHistorySource::new(self.api.clone(), sharder)))
    }

    pub async fn miner_sc_config(&self) -> Result<MinerScConfig> {
        let fields = self.api.get_miner_sc_configs().await?;
        Ok(MinerScConfig::from_fields(&fields)?)
    }

    /// Same settings as printed by `zwallet mn-config`.
    pub async fn miner_sc_config_from_cli(&self, wallet: &str) -> Result<MinerScConfig> {
        let lines = self.cli.mn_config(wallet).await?;
        let (_, numeric) = key_value_pairs_to_map(&lines);
        Ok(MinerScConfig::from_numeric(&numeric)?)
    }

    /// Snapshot all miners twice, `settle` apart, and reconcile the rewards paid in between.
    pub async fn audit_miner_rewards(&self, settle: Duration) -> Result<AuditSummary> {
        let mut ids = self.api.get_miner_list().await?.ids();
        ids.sort();
        let before = self.api.get_nodes(&ids).await?;
        tokio::time::sleep(settle).await;
        let after = self.api.get_nodes(&ids).await?;

        let (start, end) = miner_window(&before, &after)?;
        let history = self.history(start, end)?;
        history.read().await?;
        let cfg = self.miner_sc_config().await?;
        Ok(MinerRewardAudit::new(&cfg).run(&ids, &before, &after, &history).await?)
    }

    /// Sharder counterpart of [`Self::audit_miner_rewards`].
    pub async fn audit_sharder_rewards(&self, settle: Duration) -> Result<AuditSummary> {
        let mut ids = self.api.get_sharder_list().await?.ids();
        ids.sort();
        let before = self.api.get_nodes(&ids).await?;
        tokio::time::sleep(settle).await;
        let after = self.api.get_nodes(&ids).await?;

        let (start, end) = sharder_window(&before, &after)?;
        // the last round needs a moment to be written to the event db
        tokio::time::sleep(Duration::from_secs(1)).await;
        let history = self.history(start, end)?;
        history.read().await?;
        let cfg = self.miner_sc_config().await?;
        Ok(SharderRewardAudit::new(&cfg).run(&ids, &before, &after, &history).await?)
    }
}
