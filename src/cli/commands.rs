//! `zwallet` / `zbox` subcommands with the flags every suite invocation carries.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;
use tracing::info;

use crate::cli::output::json_after_banner;
use crate::cli::params::Params;
use crate::cli::runner::{run_command, RetryPolicy};
use crate::cli::CliError;

pub const ZWALLET: &str = "zwallet";
pub const ZBOX: &str = "zbox";

/// `zbox getwallet --json`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CliWallet {
    pub client_id: String,
    pub client_public_key: String,
    #[serde(default)]
    pub encryption_public_key: String,
}

/// Entry of `zwallet ls-miners --json` / `ls-sharders --json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CliNode {
    #[serde(default)]
    pub id: String,
    pub host: String,
    pub port: u16,
}

impl CliNode {
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Where the CLIs live and which config they read.
#[derive(Debug, Clone)]
pub struct CliProfile {
    pub bin_dir: PathBuf,
    pub config_dir: PathBuf,
    pub config_file: String,
    pub retry: RetryPolicy,
}

impl CliProfile {
    pub fn new(bin_dir: impl Into<PathBuf>, config_dir: impl Into<PathBuf>, config_file: impl Into<String>) -> Self {
        Self {
            bin_dir: bin_dir.into(),
            config_dir: config_dir.into(),
            config_file: config_file.into(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Same profile, single attempt. Negative tests want the first failure.
    pub fn without_retry(&self) -> Self {
        self.clone().with_retry(RetryPolicy::once())
    }

    pub fn wallet_file(wallet: &str) -> String {
        format!("{wallet}_wallet.json")
    }

    fn args(&self, subcommand: &str, wallet: &str, params: &Params) -> Vec<String> {
        let mut args = vec![subcommand.to_string()];
        args.extend(params.to_args());
        args.extend([
            "--silent".to_string(),
            "--wallet".to_string(),
            Self::wallet_file(wallet),
            "--configDir".to_string(),
            self.config_dir.display().to_string(),
            "--config".to_string(),
            self.config_file.clone(),
        ]);
        args
    }

    pub async fn run(&self, bin: &str, subcommand: &str, wallet: &str, params: &Params) -> Result<Vec<String>, CliError> {
        let program = self.bin_dir.join(bin);
        run_command(&program, &self.args(subcommand, wallet, params), self.retry).await
    }

    pub async fn zwallet(&self, subcommand: &str, wallet: &str, params: &Params) -> Result<Vec<String>, CliError> {
        self.run(ZWALLET, subcommand, wallet, params).await
    }

    pub async fn zbox(&self, subcommand: &str, wallet: &str, params: &Params) -> Result<Vec<String>, CliError> {
        self.run(ZBOX, subcommand, wallet, params).await
    }

    // zwallet

    pub async fn faucet(&self, wallet: &str, tokens: f64) -> Result<Vec<String>, CliError> {
        info!(%wallet, tokens, "executing faucet");
        let p = Params::new().set("methodName", "pour").set("tokens", format!("{tokens:.6}")).set("input", "{}");
        self.zwallet("faucet", wallet, &p).await
    }

    pub async fn get_balance(&self, wallet: &str) -> Result<Vec<String>, CliError> {
        self.zwallet("getbalance", wallet, &Params::new()).await
    }

    pub async fn verify(&self, wallet: &str, hash: &str) -> Result<Vec<String>, CliError> {
        self.zwallet("verify", wallet, &Params::new().set("hash", hash)).await
    }

    pub async fn ls_miners(&self, wallet: &str) -> Result<Vec<String>, CliError> {
        self.zwallet("ls-miners", wallet, &Params::new().flag("json")).await
    }

    pub async fn ls_sharders(&self, wallet: &str) -> Result<Vec<String>, CliError> {
        self.zwallet("ls-sharders", wallet, &Params::new().flag("json")).await
    }

    /// Base URLs of the magic-block sharders.
    pub async fn sharder_base_urls(&self, wallet: &str) -> Result<Vec<String>, CliError> {
        let out = self.ls_sharders(wallet).await?;
        let json = json_after_banner(&out, "MagicBlock Sharders");
        let nodes: BTreeMap<String, CliNode> =
            serde_json::from_str(&json).map_err(|e| CliError::Parse { what: "ls-sharders", message: e.to_string(), output: out })?;
        Ok(nodes.values().map(CliNode::base_url).collect())
    }

    pub async fn mn_info(&self, wallet: &str, node_id: &str) -> Result<Vec<String>, CliError> {
        self.zwallet("mn-info", wallet, &Params::new().set("id", node_id)).await
    }

    pub async fn mn_config(&self, wallet: &str) -> Result<Vec<String>, CliError> {
        self.zwallet("mn-config", wallet, &Params::new()).await
    }

    pub async fn global_config(&self, wallet: &str) -> Result<Vec<String>, CliError> {
        self.zwallet("global-config", wallet, &Params::new()).await
    }

    pub async fn mn_lock(&self, wallet: &str, params: &Params) -> Result<Vec<String>, CliError> {
        self.zwallet("mn-lock", wallet, params).await
    }

    pub async fn mn_unlock(&self, wallet: &str, params: &Params) -> Result<Vec<String>, CliError> {
        self.zwallet("mn-unlock", wallet, params).await
    }

    pub async fn send(&self, wallet: &str, params: &Params) -> Result<Vec<String>, CliError> {
        self.zwallet("send", wallet, params).await
    }

    pub async fn recover_wallet(&self, wallet: &str, mnemonic: &str) -> Result<Vec<String>, CliError> {
        self.zwallet("recoverwallet", wallet, &Params::new().set("mnemonic", mnemonic)).await
    }

    // zbox

    pub async fn register(&self, wallet: &str) -> Result<Vec<String>, CliError> {
        info!(%wallet, "registering wallet");
        self.zbox("register", wallet, &Params::new()).await
    }

    pub async fn get_wallet(&self, wallet: &str) -> Result<CliWallet, CliError> {
        let out = self.zbox("getwallet", wallet, &Params::new().flag("json")).await?;
        let first = out.first().cloned().unwrap_or_default();
        serde_json::from_str(&first).map_err(|e| CliError::Parse { what: "getwallet", message: e.to_string(), output: out })
    }

    pub async fn new_allocation(&self, wallet: &str, params: &Params) -> Result<Vec<String>, CliError> {
        self.zbox("newallocation", wallet, params).await
    }

    pub async fn update_allocation(&self, wallet: &str, params: &Params) -> Result<Vec<String>, CliError> {
        self.zbox("updateallocation", wallet, params).await
    }

    pub async fn cancel_allocation(&self, wallet: &str, allocation_id: &str) -> Result<Vec<String>, CliError> {
        self.zbox("alloc-cancel", wallet, &Params::new().set("allocation", allocation_id)).await
    }

    pub async fn finalize_allocation(&self, wallet: &str, allocation_id: &str) -> Result<Vec<String>, CliError> {
        self.zbox("alloc-fini", wallet, &Params::new().set("allocation", allocation_id)).await
    }

    pub async fn list_allocations(&self, wallet: &str) -> Result<Vec<String>, CliError> {
        self.zbox("listallocations", wallet, &Params::new().flag("json")).await
    }

    pub async fn get_allocation(&self, wallet: &str, allocation_id: &str) -> Result<Vec<String>, CliError> {
        self.zbox("getallocation", wallet, &Params::new().set("allocation", allocation_id).flag("json")).await
    }

    pub async fn collect_reward(&self, wallet: &str, params: &Params) -> Result<Vec<String>, CliError> {
        self.zbox("collect-reward", wallet, params).await
    }

    pub async fn start_repair(&self, wallet: &str, params: &Params) -> Result<Vec<String>, CliError> {
        self.zbox("start-repair", wallet, params).await
    }

    pub async fn upload(&self, wallet: &str, params: &Params) -> Result<Vec<String>, CliError> {
        self.zbox("upload", wallet, params).await
    }

    pub async fn download(&self, wallet: &str, params: &Params) -> Result<Vec<String>, CliError> {
        self.zbox("download", wallet, params).await
    }

    pub async fn copy(&self, wallet: &str, params: &Params) -> Result<Vec<String>, CliError> {
        self.zbox("copy", wallet, params).await
    }

    pub async fn move_file(&self, wallet: &str, params: &Params) -> Result<Vec<String>, CliError> {
        self.zbox("move", wallet, params).await
    }

    pub async fn read_pool_lock(&self, wallet: &str, tokens: f64) -> Result<Vec<String>, CliError> {
        self.zbox("rp-lock", wallet, &Params::new().set("tokens", tokens)).await
    }
}

/// Id from `Allocation created: <id>`.
pub fn allocation_id_from_output(line: &str) -> Option<&str> {
    line.trim().strip_prefix("Allocation created:").map(str::trim).filter(|id| !id.is_empty())
}
