use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use crate::config::SuiteConfig;
use crate::context::SystemContext;
use crate::model::{NodeRole, TxStatus};
use crate::utils::init_logging;
use crate::utils::tokenomics::units_to_tokens;
use crate::utils::METRICS;

/// System test harness for a 0chain style storage network.
#[derive(Parser)]
#[clap(name = "systest", version)]
pub struct Cli {
    /// Suite TOML config; defaults to $SYSTEST_CONFIG, then built-in defaults
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Network entrypoint, overriding config and environment
    #[clap(long)]
    pub entrypoint: Option<String>,

    #[clap(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand)]
pub enum Cmd {
    /// Probe every node and print the healthy ones
    Probe,
    /// Create and register a fresh wallet
    Register {
        /// pour this many tokens into the new wallet
        #[clap(long)]
        faucet: Option<f64>,
    },
    /// Pour tokens into a wallet recovered from its mnemonic
    Faucet {
        #[clap(long)]
        mnemonic: String,

        #[clap(long, default_value_t = 1.0)]
        tokens: f64,
    },
    /// Print a client's balance
    Balance {
        #[clap(long)]
        client_id: String,
    },
    /// Reconcile miner block and fee rewards over a short window
    AuditMiners {
        #[clap(long, default_value_t = 2)]
        settle_secs: u64,
    },
    /// Reconcile sharder block and fee rewards over a short window
    AuditSharders {
        #[clap(long, default_value_t = 3)]
        settle_secs: u64,
    },
}

fn load_config(cli: &Cli) -> Result<SuiteConfig> {
    let mut cfg = match &cli.config {
        Some(path) => {
            let mut cfg = SuiteConfig::load(path).with_context(|| format!("loading {}", path.display()))?;
            cfg.apply_env(|k| std::env::var(k).ok());
            cfg
        }
        None => SuiteConfig::from_env().context("loading suite config")?,
    };
    if let Some(e) = &cli.entrypoint {
        cfg.network_entrypoint = Some(e.clone());
    }
    Ok(cfg)
}

pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    let cfg = load_config(&cli)?;
    init_logging(&cfg.log_level);

    let ctx = SystemContext::connect(cfg).await.context("connecting to network")?;

    match cli.cmd {
        Cmd::Probe => {
            for role in [NodeRole::Miner, NodeRole::Sharder, NodeRole::Blobber] {
                for url in ctx.providers().for_role(role) {
                    println!("{role}\t{url}");
                }
            }
        }
        Cmd::Register { faucet } => {
            let wallet = ctx.new_wallet().await?;
            println!("client_id: {}", wallet.id);
            println!("public_key: {}", wallet.public_key);
            println!("mnemonic: {}", wallet.mnemonic);
            if let Some(tokens) = faucet {
                let c = ctx.transactions().faucet(&wallet, tokens, TxStatus::Success).await?;
                println!("faucet: {}", c.hash);
            }
        }
        Cmd::Faucet { mnemonic, tokens } => {
            let wallet = ctx.recover_wallet(&mnemonic).await?;
            let c = ctx.transactions().faucet(&wallet, tokens, TxStatus::Success).await?;
            info!(client_id = %wallet.id, tokens, "faucet confirmed");
            println!("{}", c.hash);
        }
        Cmd::Balance { client_id } => {
            let b = ctx.api.v1_client_get_balance(&client_id).await?;
            println!("{:.10} ZCN (round {})", units_to_tokens(b.balance), b.round);
        }
        Cmd::AuditMiners { settle_secs } => {
            let s = ctx.audit_miner_rewards(Duration::from_secs(settle_secs)).await?;
            println!("miner rewards consistent: rounds {}..={}, {} miners, {} payments", s.start, s.end, s.providers, s.payments);
        }
        Cmd::AuditSharders { settle_secs } => {
            let s = ctx.audit_sharder_rewards(Duration::from_secs(settle_secs)).await?;
            println!("sharder rewards consistent: rounds {}..={}, {} sharders, {} payments", s.start, s.end, s.providers, s.payments);
        }
    }

    let (counters, _) = METRICS.snapshot();
    debug!(?counters, "metrics");
    Ok(())
}
