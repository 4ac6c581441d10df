//! Typed REST endpoints, one method per endpoint the suites consume.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::client::consensus::ConsensusClient;
use crate::client::health::{BlobberAdminAuth, HealthSelector};
use crate::client::transport::{ExecutionRequest, HttpResponse, Transport};
use crate::client::url::UrlBuilder;
use crate::client::ClientError;
use crate::crypto::Keypair;
use crate::model::{
    Allocation, AllocationBlobbers, Balance, BlobberAuth, BlobberRequirements, Confirmation, FileRefPath, FileRefs,
    HashNode, HealthyServiceProviders, MinerStats, Node, NodeList, NodeRole, OpenChallenges, ProviderType, ScState,
    SharderStats, StakePoolStat, StorageNode, TransactionPutRequest, TransactionPutResponse, Wallet,
    WalletRegistration,
};
use crate::utils::{poll_until, PollPolicy};

pub const HTTP_OK: u16 = 200;

pub const GET_NETWORK_DETAILS: &str = "/network";
pub const CHAIN_GET_STATS: &str = "/v1/chain/get/stats";
pub const BLOBBER_GET_STATS: &str = "/_stats";
pub const CLIENT_PUT: &str = "/v1/client/put";
pub const TRANSACTION_PUT: &str = "/v1/transaction/put";
pub const TRANSACTION_GET_CONFIRMATION: &str = "/v1/transaction/get/confirmation";
pub const CLIENT_GET_BALANCE: &str = "/v1/client/get/balance";
pub const MINER_GET_STATS: &str = "/v1/miner/get/stats";
pub const SHARDER_GET_STATS: &str = "/v1/sharder/get/stats";
pub const SC_STATE_GET: &str = "/v1/scstate/get";
pub const GET_LATEST_FINALIZED_MAGIC_BLOCK: &str = "/v1/block/get/latest_finalized_magic_block";
pub const GET_BLOBBERS: &str = "/v1/screst/:sc_address/getblobbers";
pub const GET_BLOBBER: &str = "/v1/screst/:sc_address/getBlobber";
pub const GET_ALLOCATION: &str = "/v1/screst/:sc_address/allocation";
pub const GET_ALLOCATION_BLOBBERS: &str = "/v1/screst/:sc_address/alloc_blobbers";
pub const GET_STAKE_POOL_STAT: &str = "/v1/screst/:sc_address/getStakePoolStat";
pub const GET_OPEN_CHALLENGES: &str = "/v1/screst/:sc_address/openchallenges";
pub const GET_MINER_LIST: &str = "/v1/screst/:sc_address/getMinerList";
pub const GET_SHARDER_LIST: &str = "/v1/screst/:sc_address/getSharderList";
pub const GET_NODE_STAT: &str = "/v1/screst/:sc_address/nodeStat";
pub const GET_MINER_SC_CONFIGS: &str = "/v1/screst/:sc_address/configs";
pub const GET_BLOCKS: &str = "/v1/screst/:sc_address/get_blocks";
pub const GET_PROVIDER_REWARDS: &str = "/v1/screst/:sc_address/provider-rewards";
pub const GET_DELEGATE_REWARDS: &str = "/v1/screst/:sc_address/delegate-rewards";
pub const GET_FILE_REFS: &str = "/v1/file/refs/:allocation_id";
pub const GET_FILE_REF_PATH: &str = "/v1/file/referencepath/:allocation_id";
pub const GET_OBJECT_TREE: &str = "/v1/file/objecttree/:allocation_id";
pub const GET_HASHNODE_ROOT: &str = "/v1/hashnode/root/:allocation";

pub const FAUCET_SC_ADDRESS: &str = "6dba10422e368813802877a85039d3985d96760ed844092319743fb3a76712d3";
pub const STORAGE_SC_ADDRESS: &str = "6dba10422e368813802877a85039d3985d96760ed844092319743fb3a76712d7";
pub const MINER_SC_ADDRESS: &str = "6dba10422e368813802877a85039d3985d96760ed844092319743fb3a76712d9";

fn storage(path: &str) -> UrlBuilder {
    UrlBuilder::new(path).path_var("sc_address", STORAGE_SC_ADDRESS)
}

fn miner_sc(path: &str) -> UrlBuilder {
    UrlBuilder::new(path).path_var("sc_address", MINER_SC_ADDRESS)
}

#[derive(Clone)]
pub struct ApiClient {
    consensus: ConsensusClient,
    allocation_poll: PollPolicy,
}

impl ApiClient {
    /// Probe the network behind `entrypoint` and keep its healthy nodes.
    pub async fn connect(
        transport: Arc<dyn Transport>,
        entrypoint: &str,
        blobber_auth: BlobberAdminAuth,
    ) -> Result<Self, ClientError> {
        let providers = HealthSelector::new(transport.clone(), blobber_auth).select(entrypoint).await?;
        Ok(Self::with_providers(transport, providers))
    }

    pub fn with_providers(transport: Arc<dyn Transport>, providers: HealthyServiceProviders) -> Self {
        Self {
            consensus: ConsensusClient::new(transport, providers),
            allocation_poll: PollPolicy::new(std::time::Duration::from_secs(1), std::time::Duration::from_secs(30)),
        }
    }

    pub fn with_allocation_poll(mut self, policy: PollPolicy) -> Self {
        self.allocation_poll = policy;
        self
    }

    pub fn providers(&self) -> &HealthyServiceProviders {
        self.consensus.providers()
    }

    pub fn consensus(&self) -> &ConsensusClient {
        &self.consensus
    }

    /// Raw consensus call for callers asserting on non-200 answers.
    pub async fn execute(
        &self,
        role: NodeRole,
        url: &UrlBuilder,
        req: &ExecutionRequest,
    ) -> Result<HttpResponse, ClientError> {
        self.consensus.execute_for_all(role, url, req).await
    }

    async fn get_json<T: DeserializeOwned>(&self, role: NodeRole, url: UrlBuilder) -> Result<T, ClientError> {
        self.consensus.execute_for_all(role, &url, &ExecutionRequest::get(HTTP_OK)).await?.json()
    }

    /// GET against one node, bypassing consensus.
    pub async fn get_json_from<T: DeserializeOwned>(&self, node: &str, url: UrlBuilder) -> Result<T, ClientError> {
        self.consensus.execute_for_node(node, &url, &ExecutionRequest::get(HTTP_OK)).await?.json()
    }

    pub fn first_sharder(&self) -> Result<&str, ClientError> {
        self.providers()
            .sharders
            .first()
            .map(String::as_str)
            .ok_or(ClientError::NoHealthyNodes(NodeRole::Sharder))
    }

    pub async fn v1_client_put(
        &self,
        registration: &WalletRegistration,
        required_status: u16,
    ) -> Result<WalletRegistration, ClientError> {
        let req = ExecutionRequest::post(required_status).json(registration)?;
        self.consensus.execute_for_all(NodeRole::Miner, &UrlBuilder::new(CLIENT_PUT), &req).await?.json()
    }

    pub async fn v1_transaction_put(
        &self,
        txn: &TransactionPutRequest,
        required_status: u16,
    ) -> Result<TransactionPutResponse, ClientError> {
        let req = ExecutionRequest::post(required_status).json(txn)?;
        self.consensus.execute_for_all(NodeRole::Miner, &UrlBuilder::new(TRANSACTION_PUT), &req).await?.json()
    }

    pub async fn v1_transaction_get_confirmation(&self, hash: &str) -> Result<Confirmation, ClientError> {
        self.get_json(NodeRole::Sharder, UrlBuilder::new(TRANSACTION_GET_CONFIRMATION).param("hash", hash))
            .await
    }

    pub async fn v1_client_get_balance(&self, client_id: &str) -> Result<Balance, ClientError> {
        self.get_json(NodeRole::Sharder, UrlBuilder::new(CLIENT_GET_BALANCE).param("client_id", client_id))
            .await
    }

    pub async fn v1_sc_rest_get_blobber(&self, blobber_id: &str) -> Result<StorageNode, ClientError> {
        self.get_json(NodeRole::Sharder, storage(GET_BLOBBER).param("blobber_id", blobber_id)).await
    }

    pub async fn v1_sc_rest_get_allocation(&self, allocation_id: &str) -> Result<Allocation, ClientError> {
        self.get_json(NodeRole::Sharder, storage(GET_ALLOCATION).param("allocation", allocation_id)).await
    }

    /// Blobber ids the storage contract offers for `requirements`.
    pub async fn v1_sc_rest_get_allocation_blobbers(
        &self,
        requirements: &BlobberRequirements,
    ) -> Result<AllocationBlobbers, ClientError> {
        let data = serde_json::to_string(requirements).map_err(|e| ClientError::Encode(e.to_string()))?;
        let blobbers: Vec<String> =
            self.get_json(NodeRole::Sharder, storage(GET_ALLOCATION_BLOBBERS).param("allocation_data", data)).await?;
        Ok(AllocationBlobbers { blobbers, requirements: requirements.clone() })
    }

    pub async fn v1_sc_rest_open_challenges(&self, blobber_id: &str) -> Result<OpenChallenges, ClientError> {
        self.get_json(NodeRole::Sharder, storage(GET_OPEN_CHALLENGES).param("blobber", blobber_id)).await
    }

    pub async fn v1_sc_rest_get_stake_pool_stat(
        &self,
        provider_id: &str,
        provider_type: ProviderType,
    ) -> Result<StakePoolStat, ClientError> {
        let url = storage(GET_STAKE_POOL_STAT)
            .param("provider_id", provider_id)
            .param("provider_type", provider_type as i32);
        self.get_json(NodeRole::Sharder, url).await
    }

    pub async fn v1_miner_get_stats(&self) -> Result<MinerStats, ClientError> {
        self.get_json(NodeRole::Miner, UrlBuilder::new(MINER_GET_STATS)).await
    }

    pub async fn v1_sharder_get_stats(&self) -> Result<SharderStats, ClientError> {
        self.get_json(NodeRole::Sharder, UrlBuilder::new(SHARDER_GET_STATS)).await
    }

    pub async fn v1_sharder_get_sc_state(&self, sc_address: &str, key: &str) -> Result<ScState, ClientError> {
        let req = ExecutionRequest::post(HTTP_OK).form_field("sc_address", sc_address).form_field("key", key);
        self.consensus.execute_for_all(NodeRole::Sharder, &UrlBuilder::new(SC_STATE_GET), &req).await?.json()
    }

    /// The magic block body is opaque to the suites; only the status matters.
    pub async fn v1_block_get_latest_finalized_magic_block(
        &self,
        node_lfmb_hash: Option<&str>,
        required_status: u16,
    ) -> Result<HttpResponse, ClientError> {
        let mut url = UrlBuilder::new(GET_LATEST_FINALIZED_MAGIC_BLOCK);
        if let Some(hash) = node_lfmb_hash {
            url = url.param("node-lfmb-hash", hash);
        }
        self.consensus.execute_for_all(NodeRole::Sharder, &url, &ExecutionRequest::post(required_status)).await
    }

    pub async fn get_miner_list(&self) -> Result<NodeList, ClientError> {
        self.get_json_from(self.first_sharder()?, miner_sc(GET_MINER_LIST)).await
    }

    pub async fn get_sharder_list(&self) -> Result<NodeList, ClientError> {
        self.get_json_from(self.first_sharder()?, miner_sc(GET_SHARDER_LIST)).await
    }

    /// Node snapshot including its delegate pools.
    pub async fn get_node_stat(&self, id: &str) -> Result<Node, ClientError> {
        let url = miner_sc(GET_NODE_STAT).param("id", id).param("include_delegates", "true");
        self.get_json_from(self.first_sharder()?, url).await
    }

    pub async fn get_nodes(&self, ids: &[String]) -> Result<Vec<Node>, ClientError> {
        let mut nodes = Vec::with_capacity(ids.len());
        for id in ids {
            nodes.push(self.get_node_stat(id).await?);
        }
        Ok(nodes)
    }

    /// Miner smart-contract settings as strings, keyed by setting name.
    pub async fn get_miner_sc_configs(&self) -> Result<BTreeMap<String, String>, ClientError> {
        #[derive(serde::Deserialize)]
        struct Fields {
            fields: BTreeMap<String, String>,
        }
        let f: Fields = self.get_json_from(self.first_sharder()?, miner_sc(GET_MINER_SC_CONFIGS)).await?;
        Ok(f.fields)
    }

    pub async fn v1_blobber_get_file_refs(
        &self,
        blobber_url: &str,
        allocation_id: &str,
        remote_path: &str,
        ref_type: &str,
        auth: &BlobberAuth,
    ) -> Result<FileRefs, ClientError> {
        let url = UrlBuilder::new(GET_FILE_REFS)
            .path_var("allocation_id", allocation_id)
            .param("path", remote_path)
            .param("refType", ref_type);
        let req = ExecutionRequest::get(HTTP_OK).headers(auth.headers());
        self.consensus.execute_for_node(blobber_url, &url, &req).await?.json()
    }

    pub async fn v1_blobber_get_file_ref_path(
        &self,
        blobber_url: &str,
        allocation_id: &str,
        path: &str,
        auth: &BlobberAuth,
    ) -> Result<FileRefPath, ClientError> {
        let url = UrlBuilder::new(GET_FILE_REF_PATH).path_var("allocation_id", allocation_id).param("path", path);
        let req = ExecutionRequest::get(HTTP_OK).headers(auth.headers());
        self.consensus.execute_for_node(blobber_url, &url, &req).await?.json()
    }

    pub async fn v1_blobber_object_tree(
        &self,
        blobber_url: &str,
        allocation_id: &str,
        path: &str,
        auth: &BlobberAuth,
    ) -> Result<FileRefPath, ClientError> {
        let url = UrlBuilder::new(GET_OBJECT_TREE).path_var("allocation_id", allocation_id).param("path", path);
        let req = ExecutionRequest::get(HTTP_OK).headers(auth.headers());
        self.consensus.execute_for_node(blobber_url, &url, &req).await?.json()
    }

    pub async fn v1_blobber_get_hashnode_root(
        &self,
        blobber_url: &str,
        allocation_id: &str,
        auth: &BlobberAuth,
    ) -> Result<HashNode, ClientError> {
        let url = UrlBuilder::new(GET_HASHNODE_ROOT).path_var("allocation", allocation_id);
        let mut headers = auth.headers();
        headers.push(("allocation".into(), allocation_id.to_string()));
        let req = ExecutionRequest::get(HTTP_OK).headers(headers);
        self.consensus.execute_for_node(blobber_url, &url, &req).await?.json()
    }

    /// Derive keys from `mnemonic` and register the wallet with the miners.
    pub async fn register_wallet(&self, mnemonic: &str) -> Result<Wallet, ClientError> {
        let keys = Keypair::from_mnemonic(mnemonic).map_err(|e| ClientError::Crypto(e.to_string()))?;
        let mut wallet = Wallet::new(keys, mnemonic);
        let registered = self.v1_client_put(&wallet.registration(), HTTP_OK).await?;
        if registered.creation_date.is_none() || registered.version.is_empty() {
            return Err(ClientError::Decode {
                message: "registration response lacks creation_date or version".into(),
                body: serde_json::to_string(&registered).unwrap_or_default(),
            });
        }
        if registered.id != wallet.id || registered.public_key != wallet.public_key {
            return Err(ClientError::Mismatch(format!(
                "registered wallet {} / {} differs from local {} / {}",
                registered.id, registered.public_key, wallet.id, wallet.public_key
            )));
        }
        wallet.apply_registration(registered);
        info!(client_id = %wallet.id, "wallet registered");
        Ok(wallet)
    }

    /// Register a known mnemonic and pick up its nonce from the sharders.
    ///
    /// Sharders answer 400 for clients with no state yet, which surfaces as a
    /// consensus failure; such a wallet starts from nonce 0.
    pub async fn recover_wallet(&self, mnemonic: &str) -> Result<Wallet, ClientError> {
        let wallet = self.register_wallet(mnemonic).await?;
        match self.v1_client_get_balance(&wallet.id).await {
            Ok(b) => {
                debug!(client_id = %wallet.id, nonce = b.nonce, "wallet nonce recovered");
                Ok(wallet.with_nonce(b.nonce))
            }
            Err(ClientError::Consensus { cause, .. }) => {
                debug!(client_id = %wallet.id, %cause, "no chain state for wallet yet");
                Ok(wallet)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn get_wallet_balance(&self, wallet: &Wallet) -> Result<Balance, ClientError> {
        self.v1_client_get_balance(&wallet.id).await
    }

    /// Allocation reads lag creation; poll until one sharder majority knows it.
    pub async fn get_allocation(&self, allocation_id: &str) -> Result<Allocation, ClientError> {
        let last_err = parking_lot::Mutex::new(None);
        let slot = &last_err;
        let found = poll_until(self.allocation_poll, move || async move {
            match self.v1_sc_rest_get_allocation(allocation_id).await {
                Ok(a) => Some(a),
                Err(e) => {
                    debug!(error = %e, "allocation not readable yet");
                    *slot.lock() = Some(e);
                    None
                }
            }
        })
        .await;
        match found {
            Ok(a) => Ok(a),
            Err(timeout) => Err(last_err.into_inner().unwrap_or(ClientError::Timeout(timeout))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::transport::HttpTransport;
    use std::time::Duration;
    use wiremock::matchers::{body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn api(sharders: Vec<String>) -> ApiClient {
        let transport = Arc::new(HttpTransport::new(Duration::from_secs(2)).unwrap());
        ApiClient::with_providers(transport, HealthyServiceProviders { sharders, ..Default::default() })
    }

    #[tokio::test]
    async fn allocation_blobbers_echo_requirements() {
        let sharder = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/v1/screst/{STORAGE_SC_ADDRESS}/alloc_blobbers")))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!(["b1", "b2"])))
            .mount(&sharder)
            .await;

        let reqs = BlobberRequirements::small("o", "k", 100);
        let got = api(vec![sharder.uri()]).v1_sc_rest_get_allocation_blobbers(&reqs).await.unwrap();
        assert_eq!(got.blobbers, vec!["b1", "b2"]);
        assert_eq!(got.requirements, reqs);
    }

    #[tokio::test]
    async fn node_stat_asks_for_delegates() {
        let sharder = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/v1/screst/{MINER_SC_ADDRESS}/nodeStat")))
            .and(query_param("id", "m1"))
            .and(query_param("include_delegates", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "simple_miner": { "id": "m1" }, "round": 5
            })))
            .mount(&sharder)
            .await;

        let nodes = api(vec![sharder.uri()]).get_nodes(&["m1".to_string()]).await.unwrap();
        assert_eq!(nodes[0].round, 5);
    }

    async fn serve(server: &MockServer, verb: &str, at: &str, body: serde_json::Value) {
        Mock::given(method(verb))
            .and(path(at))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn chain_stats_and_sc_state() {
        let miner = MockServer::start().await;
        let sharder = MockServer::start().await;
        serve(&miner, "GET", MINER_GET_STATS, serde_json::json!({ "current_round": 9, "network_times": null })).await;
        serve(&sharder, "GET", SHARDER_GET_STATS, serde_json::json!({ "last_finalized_round": 8 })).await;
        serve(&sharder, "POST", GET_LATEST_FINALIZED_MAGIC_BLOCK, serde_json::json!({})).await;
        Mock::given(method("POST"))
            .and(path(SC_STATE_GET))
            .and(body_string_contains(format!("sc_address={STORAGE_SC_ADDRESS}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ID": "k1", "Used": 1.5 })))
            .mount(&sharder)
            .await;

        let transport = Arc::new(HttpTransport::new(Duration::from_secs(2)).unwrap());
        let client = ApiClient::with_providers(
            transport,
            HealthyServiceProviders { miners: vec![miner.uri()], sharders: vec![sharder.uri()], blobbers: vec![] },
        );
        assert_eq!(client.v1_miner_get_stats().await.unwrap().current_round, 9);
        assert_eq!(client.v1_sharder_get_stats().await.unwrap().last_finalized_round, 8);
        let state = client.v1_sharder_get_sc_state(STORAGE_SC_ADDRESS, "k1").await.unwrap();
        assert_eq!((state.id.as_str(), state.used), ("k1", 1.5));
        let lfmb = client.v1_block_get_latest_finalized_magic_block(Some("abc"), HTTP_OK).await.unwrap();
        assert_eq!(lfmb.status, HTTP_OK);
    }

    #[tokio::test]
    async fn storage_sc_reads() {
        let sharder = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/v1/screst/{STORAGE_SC_ADDRESS}/openchallenges")))
            .and(query_param("blobber", "b1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "blobber_id": "b1", "challenges": null
            })))
            .mount(&sharder)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/v1/screst/{STORAGE_SC_ADDRESS}/getStakePoolStat")))
            .and(query_param("provider_id", "b1"))
            .and(query_param("provider_type", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "pool_id": "b1", "balance": 10, "delegate": null
            })))
            .mount(&sharder)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/v1/screst/{STORAGE_SC_ADDRESS}/getBlobber")))
            .and(query_param("blobber_id", "b1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": "b1", "url": "http://b1" })))
            .mount(&sharder)
            .await;

        let client = api(vec![sharder.uri()]);
        let open = client.v1_sc_rest_open_challenges("b1").await.unwrap();
        assert_eq!(open.blobber_id, "b1");
        assert!(open.challenges.is_empty());
        let stat = client.v1_sc_rest_get_stake_pool_stat("b1", ProviderType::Blobber).await.unwrap();
        assert_eq!((stat.id.as_str(), stat.balance), ("b1", 10));
        assert!(stat.delegate.is_empty());
        assert_eq!(client.v1_sc_rest_get_blobber("b1").await.unwrap().base_url, "http://b1");
    }

    #[tokio::test]
    async fn blobber_file_endpoints_send_identity() {
        let blobber = MockServer::start().await;
        let tree = serde_json::json!({ "meta_data": { "name": "/" }, "list": null });
        Mock::given(method("GET"))
            .and(path("/v1/file/refs/a1"))
            .and(query_param("path", "/"))
            .and(query_param("refType", "regular"))
            .and(header("X-App-Client-Id", "c1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "total_pages": 1, "refs": [] })))
            .mount(&blobber)
            .await;
        for at in ["/v1/file/referencepath/a1", "/v1/file/objecttree/a1"] {
            Mock::given(method("GET"))
                .and(path(at))
                .and(header("X-App-Client-Id", "c1"))
                .respond_with(ResponseTemplate::new(200).set_body_json(tree.clone()))
                .mount(&blobber)
                .await;
        }
        Mock::given(method("GET"))
            .and(path("/v1/hashnode/root/a1"))
            .and(header("allocation", "a1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "allocation_id": "a1", "type": "d", "children": null
            })))
            .mount(&blobber)
            .await;

        let client = api(vec![]);
        let auth = BlobberAuth { client_id: "c1".into(), client_key: "k".into(), client_signature: "s".into() };
        let url = blobber.uri();
        let refs = client.v1_blobber_get_file_refs(&url, "a1", "/", "regular", &auth).await.unwrap();
        assert_eq!(refs.total_pages, 1);
        let path_ref = client.v1_blobber_get_file_ref_path(&url, "a1", "/", &auth).await.unwrap();
        assert_eq!(path_ref.meta["name"], "/");
        assert!(client.v1_blobber_object_tree(&url, "a1", "/", &auth).await.unwrap().list.is_empty());
        let root = client.v1_blobber_get_hashnode_root(&url, "a1", &auth).await.unwrap();
        assert_eq!((root.allocation_id.as_str(), root.node_type.as_str()), ("a1", "d"));
    }

    #[tokio::test]
    async fn get_allocation_surfaces_last_error_on_timeout() {
        let client = api(vec!["http://127.0.0.1:1".into()])
            .with_allocation_poll(PollPolicy::new(Duration::from_millis(10), Duration::from_millis(30)));
        let err = client.get_allocation("a1").await.unwrap_err();
        assert!(matches!(err, ClientError::Consensus { .. }));
    }
}
