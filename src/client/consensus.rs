//! Majority-vote fan-out over the healthy nodes of one role.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::client::transport::{ExecutionRequest, HttpResponse, Transport};
use crate::client::url::UrlBuilder;
use crate::client::ClientError;
use crate::model::{HealthyServiceProviders, NodeRole};
use crate::utils::metrics::{CONSENSUS_FAILURES, HTTP_REQUESTS, HTTP_TRANSPORT_ERRORS};
use crate::utils::METRICS;

/// Why one node's answer did not count towards the expected side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeFailure {
    Status { status: u16, body: String },
    Transport(String),
}

impl fmt::Display for NodeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeFailure::Status { status, body } => write!(f, "status {status}: {body}"),
            NodeFailure::Transport(msg) => write!(f, "transport: {msg}"),
        }
    }
}

/// Failure seen most often; on a tie the one that reached the top count first wins.
pub fn most_frequent(failures: &[NodeFailure]) -> Option<&NodeFailure> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut best: Option<&NodeFailure> = None;
    let mut max = 0;
    for f in failures {
        let n = counts.entry(f.to_string()).or_insert(0);
        *n += 1;
        if *n > max {
            max = *n;
            best = Some(f);
        }
    }
    best
}

#[derive(Clone)]
pub struct ConsensusClient {
    transport: Arc<dyn Transport>,
    providers: HealthyServiceProviders,
}

impl ConsensusClient {
    pub fn new(transport: Arc<dyn Transport>, providers: HealthyServiceProviders) -> Self {
        Self { transport, providers }
    }

    pub fn providers(&self) -> &HealthyServiceProviders {
        &self.providers
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Send `req` to every healthy node of `role` in turn.
    ///
    /// Succeeds with the last expected response iff more nodes answered with
    /// `req.required_status` than did not.
    pub async fn execute_for_all(
        &self,
        role: NodeRole,
        url: &UrlBuilder,
        req: &ExecutionRequest,
    ) -> Result<HttpResponse, ClientError> {
        let nodes = self.providers.for_role(role);
        if nodes.is_empty() {
            return Err(ClientError::NoHealthyNodes(role));
        }

        let mut expected = 0usize;
        let mut not_expected = 0usize;
        let mut last = None;
        let mut failures = Vec::new();

        for node in nodes {
            let target = url.build(node)?;
            METRICS.inc_counter(HTTP_REQUESTS);
            match self.transport.execute(target, req).await {
                Ok(resp) if resp.status == req.required_status => {
                    expected += 1;
                    last = Some(resp);
                }
                Ok(resp) => {
                    debug!(%node, status = resp.status, "unexpected status");
                    not_expected += 1;
                    failures.push(NodeFailure::Status { status: resp.status, body: resp.text() });
                }
                Err(e) => {
                    debug!(%node, error = %e, "request failed");
                    METRICS.inc_counter(HTTP_TRANSPORT_ERRORS);
                    not_expected += 1;
                    failures.push(NodeFailure::Transport(e.to_string()));
                }
            }
        }

        match last {
            Some(resp) if expected > not_expected => Ok(resp),
            _ => {
                METRICS.inc_counter(CONSENSUS_FAILURES);
                let cause = most_frequent(&failures).map(ToString::to_string).unwrap_or_default();
                warn!(%role, path = %url.path(), expected, not_expected, %cause, "no consensus");
                Err(ClientError::Consensus { role, expected, not_expected, cause })
            }
        }
    }

    /// Single-node request, used for blobber file endpoints.
    pub async fn execute_for_node(
        &self,
        node: &str,
        url: &UrlBuilder,
        req: &ExecutionRequest,
    ) -> Result<HttpResponse, ClientError> {
        METRICS.inc_counter(HTTP_REQUESTS);
        let resp = self.transport.execute(url.build(node)?, req).await?;
        if resp.status != req.required_status {
            return Err(ClientError::UnexpectedStatus { status: resp.status, body: resp.text() });
        }
        Ok(resp)
    }
}
