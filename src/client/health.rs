//! Startup discovery and health probing of miners, sharders and blobbers.

use std::sync::Arc;

use tracing::{info, warn};

use crate::client::api::{BLOBBER_GET_STATS, CHAIN_GET_STATS, GET_BLOBBERS, GET_NETWORK_DETAILS, STORAGE_SC_ADDRESS};
use crate::client::transport::{ExecutionRequest, Transport};
use crate::client::url::UrlBuilder;
use crate::client::ClientError;
use crate::model::{HealthyServiceProviders, NetworkDetails, NodeRole, StorageNodes};
use crate::utils::metrics::HEALTHY_NODES;
use crate::utils::METRICS;

const BLOBBER_PAGE_LIMIT: usize = 20;

/// Credentials for the blobber admin `/_stats` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BlobberAdminAuth {
    pub user: String,
    pub password: String,
}

impl Default for BlobberAdminAuth {
    fn default() -> Self {
        Self { user: "admin".into(), password: "password".into() }
    }
}

pub struct HealthSelector {
    transport: Arc<dyn Transport>,
    blobber_auth: BlobberAdminAuth,
}

impl HealthSelector {
    pub fn new(transport: Arc<dyn Transport>, blobber_auth: BlobberAdminAuth) -> Self {
        Self { transport, blobber_auth }
    }

    /// Discover the network from `entrypoint` and keep the nodes that answer.
    ///
    /// Fails if any role ends up empty.
    pub async fn select(&self, entrypoint: &str) -> Result<HealthyServiceProviders, ClientError> {
        let url = UrlBuilder::new(GET_NETWORK_DETAILS).build(entrypoint)?;
        let resp = self
            .transport
            .execute(url, &ExecutionRequest::get(200))
            .await
            .map_err(|e| ClientError::Discovery(format!("fetching network details from {entrypoint}: {e}")))?;
        let details: NetworkDetails = resp.json()?;

        let miners = self.healthy_nodes(&details.miners, NodeRole::Miner).await?;
        if miners.is_empty() {
            return Err(ClientError::NoHealthyNodes(NodeRole::Miner));
        }
        let sharders = self.healthy_nodes(&details.sharders, NodeRole::Sharder).await?;
        if sharders.is_empty() {
            return Err(ClientError::NoHealthyNodes(NodeRole::Sharder));
        }

        let candidates = self.list_blobbers(&sharders[0]).await?;
        let blobbers = self.healthy_nodes(&candidates, NodeRole::Blobber).await?;
        if blobbers.is_empty() {
            return Err(ClientError::NoHealthyNodes(NodeRole::Blobber));
        }

        let total = miners.len() + sharders.len() + blobbers.len();
        METRICS.set_gauge(HEALTHY_NODES, total as f64);
        info!(miners = miners.len(), sharders = sharders.len(), blobbers = blobbers.len(), "healthy nodes selected");
        Ok(HealthyServiceProviders { miners, sharders, blobbers })
    }

    /// Probe each node once; a 2xx within the transport timeout means healthy.
    pub async fn healthy_nodes(&self, nodes: &[String], role: NodeRole) -> Result<Vec<String>, ClientError> {
        let mut healthy = Vec::with_capacity(nodes.len());
        for node in nodes {
            let (path, req) = match role {
                NodeRole::Miner | NodeRole::Sharder => (CHAIN_GET_STATS, ExecutionRequest::get(200)),
                NodeRole::Blobber => (
                    BLOBBER_GET_STATS,
                    ExecutionRequest::get(200).basic_auth(&self.blobber_auth.user, &self.blobber_auth.password),
                ),
            };
            let url = UrlBuilder::new(path).build(node)?;
            match self.transport.execute(url, &req).await {
                Ok(resp) if resp.is_success() => {
                    info!(%role, %node, "node is up");
                    healthy.push(node.clone());
                }
                Ok(resp) => warn!(%role, %node, status = resp.status, body = %resp.text(), "node is down"),
                Err(e) => warn!(%role, %node, error = %e, "node unreachable"),
            }
        }
        Ok(healthy)
    }

    /// Page through the storage contract's blobber list until an empty page.
    pub async fn list_blobbers(&self, sharder: &str) -> Result<Vec<String>, ClientError> {
        let mut urls = Vec::new();
        let mut offset = 0;
        loop {
            let url = UrlBuilder::new(GET_BLOBBERS)
                .path_var("sc_address", STORAGE_SC_ADDRESS)
                .param("offset", offset)
                .param("limit", BLOBBER_PAGE_LIMIT)
                .build(sharder)?;
            let resp = self
                .transport
                .execute(url, &ExecutionRequest::get(200))
                .await
                .map_err(|e| ClientError::Discovery(format!("listing blobbers from {sharder}: {e}")))?;
            let page: StorageNodes = resp.json()?;
            if page.nodes.is_empty() {
                break;
            }
            urls.extend(page.nodes.into_iter().map(|n| n.base_url));
            offset += BLOBBER_PAGE_LIMIT;
        }
        Ok(urls)
    }
}
