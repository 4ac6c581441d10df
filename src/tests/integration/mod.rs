//! Integration tests: a mock deployment (entrypoint, miner, sharder, blobber)
//! driven through `SystemContext`.

use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use crate::client::STORAGE_SC_ADDRESS;
use crate::config::SuiteConfig;
use crate::context::SystemContext;
use crate::crypto::generate_mnemonic;
use crate::model::{BlobberRequirements, TxStatus};
use crate::utils::init_test_logging;
use crate::utils::tokenomics::TOKEN_UNIT;

struct MockNetwork {
    entry: MockServer,
    miner: MockServer,
    sharder: MockServer,
    blobber: MockServer,
}

fn storage(p: &str) -> String {
    format!("/v1/screst/{STORAGE_SC_ADDRESS}/{p}")
}

impl MockNetwork {
    async fn start(confirmed_hash: &str) -> Self {
        let net = Self {
            entry: MockServer::start().await,
            miner: MockServer::start().await,
            sharder: MockServer::start().await,
            blobber: MockServer::start().await,
        };

        Mock::given(method("GET"))
            .and(path("/network"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "miners": [net.miner.uri()],
                "sharders": [net.sharder.uri()]
            })))
            .mount(&net.entry)
            .await;
        for node in [&net.miner, &net.sharder] {
            Mock::given(method("GET"))
                .and(path("/v1/chain/get/stats"))
                .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
                .mount(node)
                .await;
        }
        Mock::given(method("GET"))
            .and(path(storage("getblobbers")))
            .and(query_param("offset", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Nodes": [{ "id": "b1", "url": net.blobber.uri() }]
            })))
            .mount(&net.sharder)
            .await;
        Mock::given(method("GET"))
            .and(path(storage("getblobbers")))
            .and(query_param("offset", "20"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "Nodes": null })))
            .mount(&net.sharder)
            .await;
        Mock::given(method("GET"))
            .and(path("/_stats"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&net.blobber)
            .await;

        // miners echo the registration back, stamped
        Mock::given(method("POST"))
            .and(path("/v1/client/put"))
            .respond_with(|req: &Request| {
                let mut reg: serde_json::Value = serde_json::from_slice(&req.body).unwrap_or_default();
                reg["version"] = "1.0".into();
                reg["creation_date"] = 1_700_000_000.into();
                ResponseTemplate::new(200).set_body_json(reg)
            })
            .mount(&net.miner)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/transaction/put"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "async": true, "entity": {} })))
            .mount(&net.miner)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/transaction/get/confirmation"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "hash": confirmed_hash, "transaction_status": 1, "round": 42
            })))
            .mount(&net.sharder)
            .await;
        net
    }

    fn config(&self) -> SuiteConfig {
        SuiteConfig {
            network_entrypoint: Some(self.entry.uri()),
            http_timeout_secs: 2,
            poll_interval_ms: 20,
            confirmation_timeout_secs: 1,
            allocation_timeout_secs: 1,
            ..Default::default()
        }
    }
}

#[tokio::test]
async fn register_and_fund_wallet() {
    init_test_logging();
    let net = MockNetwork::start("faucet-tx").await;
    Mock::given(method("GET"))
        .and(path("/v1/client/get/balance"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "txn": "faucet-tx", "round": 42, "balance": TOKEN_UNIT
        })))
        .mount(&net.sharder)
        .await;

    let ctx = SystemContext::connect(net.config()).await.unwrap();
    assert_eq!(ctx.providers().miners, vec![net.miner.uri()]);
    assert_eq!(ctx.providers().blobbers, vec![net.blobber.uri()]);

    let wallet = ctx.new_wallet().await.unwrap();
    assert_eq!(wallet.id.len(), 64);

    let c = ctx.transactions().faucet(&wallet, 1.0, TxStatus::Success).await.unwrap();
    assert_eq!(c.hash, "faucet-tx");
    assert_eq!(wallet.nonce().await, 1);

    let balance = ctx.api.get_wallet_balance(&wallet).await.unwrap();
    assert_eq!(balance.balance, TOKEN_UNIT);
}

#[tokio::test]
async fn replace_allocation_blobber() {
    init_test_logging();
    let net = MockNetwork::start("alloc-1").await;
    Mock::given(method("GET"))
        .and(path(storage("alloc_blobbers")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!(["b1", "b2", "b3"])))
        .mount(&net.sharder)
        .await;
    Mock::given(method("GET"))
        .and(path(storage("allocation")))
        .and(query_param("allocation", "alloc-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "alloc-1", "data_shards": 1, "parity_shards": 1,
            "blobbers": [{ "id": "b1" }, { "id": "b2" }]
        })))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&net.sharder)
        .await;
    Mock::given(method("GET"))
        .and(path(storage("allocation")))
        .and(query_param("allocation", "alloc-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "alloc-1", "data_shards": 1, "parity_shards": 1,
            "blobbers": [{ "id": "b2" }, { "id": "b3" }]
        })))
        .with_priority(2)
        .mount(&net.sharder)
        .await;

    let ctx = SystemContext::connect(net.config()).await.unwrap();
    let wallet = ctx.new_wallet().await.unwrap();
    let tx = ctx.transactions();

    let reqs = BlobberRequirements::small(&wallet.id, &wallet.public_key, 1_900_000_000);
    let offered = ctx.api.v1_sc_rest_get_allocation_blobbers(&reqs).await.unwrap();
    let alloc_id = tx.create_allocation(&wallet, &offered, TxStatus::Success).await.unwrap();
    assert_eq!(alloc_id, "alloc-1");

    let before = ctx.api.get_allocation(&alloc_id).await.unwrap();
    let old = before.first_used_of(&offered.blobbers).unwrap();
    let new = before.first_unused_of(&offered.blobbers).unwrap();
    assert_eq!((old, new), ("b1", "b3"));

    tx.update_allocation_blobbers(&wallet, &alloc_id, new, old, TxStatus::Success).await.unwrap();
    assert_eq!(wallet.nonce().await, 2);

    let after = ctx.api.get_allocation(&alloc_id).await.unwrap();
    assert_eq!(after.blobbers.len(), before.blobbers.len());
    assert!(!after.has_blobber(old));
    assert!(after.has_blobber(new));
}

#[tokio::test]
async fn recovered_wallet_continues_chain_nonce() {
    init_test_logging();
    let net = MockNetwork::start("faucet-tx").await;
    Mock::given(method("GET"))
        .and(path("/v1/client/get/balance"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "txn": "older-tx", "round": 40, "balance": TOKEN_UNIT, "nonce": 7
        })))
        .mount(&net.sharder)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/transaction/put"))
        .and(body_partial_json(serde_json::json!({ "transaction_nonce": 8 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "async": true, "entity": {} })))
        .with_priority(1)
        .expect(1)
        .mount(&net.miner)
        .await;

    let ctx = SystemContext::connect(net.config()).await.unwrap();
    let mnemonic = generate_mnemonic().unwrap();
    let wallet = ctx.recover_wallet(&mnemonic).await.unwrap();
    assert_eq!(wallet.nonce().await, 7);

    ctx.transactions().faucet(&wallet, 1.0, TxStatus::Success).await.unwrap();
    assert_eq!(wallet.nonce().await, 8);
}

#[tokio::test]
async fn wallet_without_chain_state_starts_at_zero() {
    let net = MockNetwork::start("faucet-tx").await;
    Mock::given(method("GET"))
        .and(path("/v1/client/get/balance"))
        .respond_with(ResponseTemplate::new(400).set_body_string("value not present"))
        .mount(&net.sharder)
        .await;

    let ctx = SystemContext::connect(net.config()).await.unwrap();
    let wallet = ctx.recover_wallet(&generate_mnemonic().unwrap()).await.unwrap();
    assert_eq!(wallet.nonce().await, 0);
}

#[tokio::test]
async fn unstamped_registration_is_rejected() {
    let net = MockNetwork::start("faucet-tx").await;
    Mock::given(method("POST"))
        .and(path("/v1/client/put"))
        .respond_with(|req: &Request| ResponseTemplate::new(200).set_body_bytes(req.body.clone()))
        .with_priority(1)
        .mount(&net.miner)
        .await;

    let ctx = SystemContext::connect(net.config()).await.unwrap();
    let err = ctx.new_wallet().await.unwrap_err();
    assert!(err.to_string().contains("creation_date"), "{err}");
}

#[tokio::test]
async fn unreachable_entrypoint_fails_to_connect() {
    let mut cfg = SuiteConfig::default();
    cfg.network_entrypoint = Some("http://127.0.0.1:1".into());
    cfg.http_timeout_secs = 1;
    assert!(SystemContext::connect(cfg).await.is_err());
}
