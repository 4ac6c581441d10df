//! Live network scenarios. Point `NETWORK_ENTRYPOINT` (or `SYSTEST_CONFIG`)
//! at a deployment and run with `--ignored`.

use std::time::Duration;

use crate::cli::{allocation_id_from_output, Params};
use crate::client::FAUCET_SC_ADDRESS;
use crate::config::SuiteConfig;
use crate::context::SystemContext;
use crate::crypto::generate_mnemonic;
use crate::model::{BlobberRequirements, ProviderType, TxStatus, Wallet};
use crate::utils::init_test_logging;
use crate::utils::tokenomics::TOKEN_UNIT;

async fn context() -> SystemContext {
    init_test_logging();
    let cfg = SuiteConfig::from_env().expect("suite config");
    SystemContext::connect(cfg).await.expect("healthy network")
}

async fn funded_wallet(ctx: &SystemContext) -> Wallet {
    let wallet = ctx.new_wallet().await.unwrap();
    ctx.transactions().faucet(&wallet, 1.0, TxStatus::Success).await.unwrap();
    wallet
}

fn one_hour_from_now() -> i64 {
    let now = std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).unwrap();
    (now + Duration::from_secs(3600)).as_secs() as i64
}

async fn new_allocation(ctx: &SystemContext, wallet: &Wallet) -> (Vec<String>, String) {
    let reqs = BlobberRequirements::small(&wallet.id, &wallet.public_key, one_hour_from_now());
    let offered = ctx.api.v1_sc_rest_get_allocation_blobbers(&reqs).await.unwrap();
    let id = ctx.transactions().create_allocation(wallet, &offered, TxStatus::Success).await.unwrap();
    (offered.blobbers, id)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "needs a live network"]
async fn faucet_funds_new_wallet() {
    let ctx = context().await;
    let wallet = funded_wallet(&ctx).await;
    assert_eq!(wallet.nonce().await, 1);
    let balance = ctx.api.get_wallet_balance(&wallet).await.unwrap();
    assert!(balance.balance >= TOKEN_UNIT, "balance {}", balance.balance);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "needs a live network"]
async fn recovered_wallet_keeps_transacting() {
    let ctx = context().await;
    let wallet = funded_wallet(&ctx).await;

    let recovered = ctx.recover_wallet(&wallet.mnemonic).await.unwrap();
    assert_eq!(recovered.id, wallet.id);
    assert_eq!(recovered.nonce().await, 1);
    ctx.transactions().faucet(&recovered, 1.0, TxStatus::Success).await.unwrap();
    assert_eq!(recovered.nonce().await, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "needs a live network"]
async fn chain_endpoints_answer() {
    let ctx = context().await;
    let wallet = funded_wallet(&ctx).await;

    assert!(ctx.api.v1_miner_get_stats().await.unwrap().current_round > 0);
    assert!(ctx.api.v1_sharder_get_stats().await.unwrap().last_finalized_round > 0);
    ctx.api.v1_block_get_latest_finalized_magic_block(None, crate::client::HTTP_OK).await.unwrap();
    let state = ctx.api.v1_sharder_get_sc_state(FAUCET_SC_ADDRESS, &wallet.id).await.unwrap();
    assert!(state.used > 0.0, "faucet usage {}", state.used);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "needs a live network"]
async fn blobber_stake_and_provider_calls() {
    let ctx = context().await;
    let wallet = funded_wallet(&ctx).await;
    let tx = ctx.transactions();
    tx.faucet(&wallet, 1.0, TxStatus::Success).await.unwrap();

    let reqs = BlobberRequirements::small(&wallet.id, &wallet.public_key, one_hour_from_now());
    let offered = ctx.api.v1_sc_rest_get_allocation_blobbers(&reqs).await.unwrap();
    let blobber = offered.blobbers.first().expect("an offered blobber").clone();

    tx.create_stake_pool(&wallet, ProviderType::Blobber, &blobber, TxStatus::Success).await.unwrap();
    let stat = ctx.api.v1_sc_rest_get_stake_pool_stat(&blobber, ProviderType::Blobber).await.unwrap();
    assert!(stat.delegate.iter().any(|d| d.delegate_id == wallet.id), "{:?}", stat.delegate);
    ctx.api.v1_sc_rest_open_challenges(&blobber).await.unwrap();

    // neither call is allowed for a provider this wallet does not own
    tx.collect_rewards(&wallet, "0000", ProviderType::Blobber, TxStatus::Failure).await.unwrap();
    let mut settings = ctx.api.v1_sc_rest_get_blobber(&blobber).await.unwrap();
    settings.capacity += 1;
    tx.update_blobber(&wallet, &settings, TxStatus::Failure).await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "needs a live network"]
async fn replace_blobber_in_allocation() {
    let ctx = context().await;
    let wallet = funded_wallet(&ctx).await;
    let (offered, alloc_id) = new_allocation(&ctx, &wallet).await;

    let before = ctx.api.get_allocation(&alloc_id).await.unwrap();
    let old = before.first_used_of(&offered).expect("a used blobber");
    let new = before.first_unused_of(&offered).expect("a spare blobber");
    ctx.transactions()
        .update_allocation_blobbers(&wallet, &alloc_id, new, old, TxStatus::Success)
        .await
        .unwrap();

    let after = ctx.api.get_allocation(&alloc_id).await.unwrap();
    assert_eq!(after.blobbers.len(), before.blobbers.len());
    assert!(after.has_blobber(new));
    assert!(!after.has_blobber(old));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "needs a live network"]
async fn replace_blobber_with_itself_fails() {
    let ctx = context().await;
    let wallet = funded_wallet(&ctx).await;
    let (offered, alloc_id) = new_allocation(&ctx, &wallet).await;

    let before = ctx.api.get_allocation(&alloc_id).await.unwrap();
    let old = before.first_used_of(&offered).expect("a used blobber");
    ctx.transactions()
        .update_allocation_blobbers(&wallet, &alloc_id, old, old, TxStatus::Failure)
        .await
        .unwrap();

    let after = ctx.api.get_allocation(&alloc_id).await.unwrap();
    assert_eq!(after.blobbers.len(), before.blobbers.len());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "needs a live network"]
async fn replace_unknown_blobber_fails_and_costs_fees() {
    let ctx = context().await;
    let wallet = funded_wallet(&ctx).await;
    let (offered, alloc_id) = new_allocation(&ctx, &wallet).await;

    let before = ctx.api.get_allocation(&alloc_id).await.unwrap();
    let new = before.first_unused_of(&offered).expect("a spare blobber");
    let balance_before = ctx.api.get_wallet_balance(&wallet).await.unwrap().balance;
    let bogus = rand::random::<u8>() % 10;
    ctx.transactions()
        .update_allocation_blobbers(&wallet, &alloc_id, new, &bogus.to_string(), TxStatus::Failure)
        .await
        .unwrap();

    let after = ctx.api.get_allocation(&alloc_id).await.unwrap();
    assert_eq!(after.blobbers.len(), before.blobbers.len());
    let balance_after = ctx.api.get_wallet_balance(&wallet).await.unwrap().balance;
    assert!(balance_before > balance_after);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "needs a live network with a debug event database"]
async fn miner_block_rewards_reconcile() {
    let ctx = context().await;
    let summary = ctx.audit_miner_rewards(Duration::from_secs(2)).await.unwrap();
    assert!(summary.end >= summary.start);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "needs a live network with a debug event database"]
async fn sharder_block_rewards_reconcile() {
    let ctx = context().await;
    if ctx.providers().sharders.len() < 2 {
        return;
    }
    let summary = ctx.audit_sharder_rewards(Duration::from_secs(3)).await.unwrap();
    assert!(summary.end >= summary.start);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "needs a live network and the zbox/zwallet binaries"]
async fn cli_wallet_allocation_and_files() {
    let ctx = context().await;
    let wallet = format!("systest_{}", hex::encode(rand::random::<[u8; 4]>()));

    ctx.cli.register(&wallet).await.unwrap();
    ctx.cli.faucet(&wallet, 1.0).await.unwrap();
    let balance = ctx.cli.get_balance(&wallet).await.unwrap();
    assert!(balance.iter().any(|l| l.contains("Balance")), "{balance:?}");

    let out = ctx
        .cli
        .new_allocation(&wallet, &Params::new().set("lock", 0.5).set("size", 10_000).set("expire", "1h"))
        .await
        .unwrap();
    let alloc_id = out.iter().find_map(|l| allocation_id_from_output(l)).expect("allocation id").to_string();

    let file = ctx.storage.round_trip(&wallet, &alloc_id, "/systest").await.unwrap();
    assert!(file.remote_path.starts_with("/systest/"));

    let cfg = ctx.miner_sc_config_from_cli(&wallet).await.unwrap();
    assert!(cfg.epoch > 0);
}

async fn cli_wallet(ctx: &SystemContext) -> String {
    let wallet = format!("systest_{}", hex::encode(rand::random::<[u8; 4]>()));
    ctx.cli.register(&wallet).await.unwrap();
    ctx.cli.faucet(&wallet, 1.0).await.unwrap();
    wallet
}

async fn cli_allocation(ctx: &SystemContext, wallet: &str) -> String {
    let out = ctx
        .cli
        .new_allocation(wallet, &Params::new().set("lock", 0.5).set("size", 10_000).set("expire", "1h"))
        .await
        .unwrap();
    out.iter().find_map(|l| allocation_id_from_output(l)).expect("allocation id").to_string()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "needs a live network and the zbox/zwallet binaries"]
async fn cli_cancel_and_finalize_allocation() {
    let ctx = context().await;
    let wallet = cli_wallet(&ctx).await;

    let alloc_id = cli_allocation(&ctx, &wallet).await;
    let out = ctx.cli.cancel_allocation(&wallet, &alloc_id).await.unwrap();
    assert!(out[0].starts_with("Allocation canceled with txId : "), "{out:?}");

    let alloc_id = cli_allocation(&ctx, &wallet).await;
    let err = ctx.cli.without_retry().finalize_allocation(&wallet, &alloc_id).await.unwrap_err();
    assert!(err.output().iter().any(|l| l.contains("allocation is not expired yet")), "{err}");

    let listed = ctx.cli.list_allocations(&wallet).await.unwrap();
    assert!(listed.iter().any(|l| l.contains(&alloc_id)), "{listed:?}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "needs a live network and the zbox/zwallet binaries"]
async fn cli_copy_move_and_repair() {
    let ctx = context().await;
    let wallet = cli_wallet(&ctx).await;
    let alloc_id = cli_allocation(&ctx, &wallet).await;
    let file = ctx.storage.upload_random(&wallet, &alloc_id, "/src", 1024).await.unwrap();

    let copy = Params::new()
        .set("allocation", &alloc_id)
        .set("remotepath", &file.remote_path)
        .set("destpath", "/copied/");
    ctx.cli.copy(&wallet, &copy).await.unwrap();
    let moved = Params::new()
        .set("allocation", &alloc_id)
        .set("remotepath", &file.remote_path)
        .set("destpath", "/moved/");
    ctx.cli.move_file(&wallet, &moved).await.unwrap();

    let repair = Params::new()
        .set("allocation", &alloc_id)
        .set("repairpath", "/")
        .set("rootpath", ctx.storage.workdir().display());
    let out = ctx.cli.start_repair(&wallet, &repair).await.unwrap();
    assert!(out.last().is_some_and(|l| l.starts_with("Repair file completed")), "{out:?}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "needs a live network and the zbox/zwallet binaries"]
async fn cli_miner_stake_and_send() {
    let ctx = context().await;
    let wallet = cli_wallet(&ctx).await;
    let other = cli_wallet(&ctx).await;

    let miner = ctx.api.get_miner_list().await.unwrap().ids().into_iter().next().expect("a miner");
    ctx.cli.mn_lock(&wallet, &Params::new().set("miner_id", &miner).set("tokens", 0.2)).await.unwrap();
    ctx.cli.mn_unlock(&wallet, &Params::new().set("miner_id", &miner)).await.unwrap();

    let to = ctx.cli.get_wallet(&other).await.unwrap().client_id;
    let out = ctx
        .cli
        .send(&wallet, &Params::new().set("to_client_id", &to).set("tokens", 0.1).set("desc", "systest"))
        .await
        .unwrap();
    assert!(out.iter().any(|l| l.contains("Send tokens success")), "{out:?}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "needs the zwallet binary"]
async fn cli_recover_wallet_from_mnemonic() {
    let ctx = context().await;
    let wallet = format!("systest_{}", hex::encode(rand::random::<[u8; 4]>()));
    let out = ctx.cli.recover_wallet(&wallet, &generate_mnemonic().unwrap()).await.unwrap();
    assert_eq!(out.last().map(String::as_str), Some("Wallet recovered!!"));
}
