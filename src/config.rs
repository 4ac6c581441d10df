//! Suite configuration: a TOML file plus a few environment overrides.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cli::{CliProfile, RetryPolicy};
use crate::client::BlobberAdminAuth;
use crate::utils::wait::PollPolicy;

pub const ENV_SUITE_CONFIG: &str = "SYSTEST_CONFIG";
pub const ENV_CLI_CONFIG: &str = "CONFIG_PATH";
pub const ENV_ENTRYPOINT: &str = "NETWORK_ENTRYPOINT";

pub const DEFAULT_CLI_CONFIG: &str = "./zbox_config.yaml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing suite config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("parsing cli config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("no network entrypoint: set NETWORK_ENTRYPOINT or block_worker in {}", .0.display())]
    MissingEntrypoint(PathBuf),
}

/// zbox/zwallet invocation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliSettings {
    /// Directory holding the `zbox` and `zwallet` binaries.
    pub bin_dir: PathBuf,
    pub config_dir: PathBuf,
    /// CLI YAML config, relative to `config_dir` unless absolute.
    pub config_file: String,
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
}

impl Default for CliSettings {
    fn default() -> Self {
        Self {
            bin_dir: PathBuf::from("."),
            config_dir: PathBuf::from("./config"),
            config_file: DEFAULT_CLI_CONFIG.to_string(),
            retry_attempts: 3,
            retry_delay_ms: 2_000,
        }
    }
}

impl CliSettings {
    pub fn retry(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_attempts, Duration::from_millis(self.retry_delay_ms))
    }

    pub fn profile(&self) -> CliProfile {
        CliProfile::new(&self.bin_dir, &self.config_dir, &self.config_file).with_retry(self.retry())
    }

    /// Where the YAML config actually lives on disk.
    pub fn config_path(&self) -> PathBuf {
        let file = Path::new(&self.config_file);
        if file.is_absolute() || file.exists() {
            file.to_path_buf()
        } else {
            self.config_dir.join(file)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// 0dns / block worker base url; falls back to the CLI config.
    pub network_entrypoint: Option<String>,
    pub log_level: String,
    pub http_timeout_secs: u64,
    pub poll_interval_ms: u64,
    pub confirmation_timeout_secs: u64,
    pub allocation_timeout_secs: u64,
    pub blobber_auth: BlobberAdminAuth,
    pub cli: CliSettings,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            network_entrypoint: None,
            log_level: "info".to_string(),
            http_timeout_secs: 10,
            poll_interval_ms: 1_000,
            confirmation_timeout_secs: 120,
            allocation_timeout_secs: 30,
            blobber_auth: BlobberAdminAuth::default(),
            cli: CliSettings::default(),
        }
    }
}

#[derive(Deserialize)]
struct CliYaml {
    #[serde(default)]
    block_worker: Option<String>,
}

impl SuiteConfig {
    /// Load from a TOML file. Missing keys take their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        let cfg: SuiteConfig = toml::from_str(&data)?;
        Ok(cfg)
    }

    /// Defaults, or the file named by `SYSTEST_CONFIG`, with environment overrides applied.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::resolve(|key| std::env::var(key).ok())
    }

    pub fn resolve(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut cfg = match lookup(ENV_SUITE_CONFIG) {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        cfg.apply_env(lookup);
        Ok(cfg)
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup(ENV_CLI_CONFIG).filter(|p| !p.is_empty()) {
            self.cli.config_file = path;
        }
        if let Some(entry) = lookup(ENV_ENTRYPOINT).filter(|e| !e.is_empty()) {
            self.network_entrypoint = Some(entry);
        }
    }

    /// Network entrypoint, reading `block_worker` from the CLI config when unset.
    pub fn entrypoint(&self) -> Result<String, ConfigError> {
        if let Some(e) = &self.network_entrypoint {
            return Ok(e.trim_end_matches('/').to_string());
        }
        let path = self.cli.config_path();
        let data = fs::read_to_string(&path).map_err(|source| ConfigError::Io { path: path.clone(), source })?;
        let yaml: CliYaml = serde_yaml::from_str(&data)?;
        yaml.block_worker
            .filter(|b| !b.is_empty())
            .map(|b| b.trim_end_matches('/').to_string())
            .ok_or(ConfigError::MissingEntrypoint(path))
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn confirmation_poll(&self) -> PollPolicy {
        PollPolicy::new(Duration::from_millis(self.poll_interval_ms), Duration::from_secs(self.confirmation_timeout_secs))
    }

    pub fn allocation_poll(&self) -> PollPolicy {
        PollPolicy::new(Duration::from_millis(self.poll_interval_ms), Duration::from_secs(self.allocation_timeout_secs))
    }
}
