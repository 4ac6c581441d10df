//! Storage session: serializes multi-step zbox upload/download sequences.
//!
//! zbox keeps per-allocation state on disk next to its config, so two
//! uploads against the same allocation must not interleave.

use std::path::{Path, PathBuf};

use rand::RngCore;
use tempfile::TempDir;
use tokio::sync::{Mutex, MutexGuard};
use tracing::info;

use crate::cli::{CliProfile, Params};
use crate::crypto::file_sha256_hex;
use crate::utils::errors::{Result, SystestError};

pub const DEFAULT_FILE_SIZE: usize = 1024;

/// A local file that was uploaded, with the digest to check downloads against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub local: PathBuf,
    pub remote_path: String,
    pub sha256: String,
}

impl UploadedFile {
    pub fn file_name(&self) -> &str {
        self.remote_path.rsplit('/').next().unwrap_or_default()
    }
}

pub struct StorageSession {
    profile: CliProfile,
    workdir: TempDir,
    lock: Mutex<()>,
}

impl StorageSession {
    pub fn new(profile: CliProfile) -> Result<Self> {
        Ok(Self { profile, workdir: tempfile::tempdir()?, lock: Mutex::new(()) })
    }

    pub fn workdir(&self) -> &Path {
        self.workdir.path()
    }

    /// Hold the session for a sequence of zbox calls.
    pub async fn lock(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().await
    }

    /// Write `size` random bytes to a fresh file in the session directory.
    pub async fn random_file(&self, size: usize) -> Result<(PathBuf, String)> {
        let mut data = vec![0u8; size];
        rand::thread_rng().fill_bytes(&mut data);
        let name = format!("{}.txt", hex::encode(&data[..size.min(8)]));
        let path = self.workdir.path().join(name);
        tokio::fs::write(&path, &data).await?;
        let digest = file_sha256_hex(&path).await?;
        Ok((path, digest))
    }

    async fn upload_locked(&self, wallet: &str, allocation_id: &str, remote_dir: &str, size: usize) -> Result<UploadedFile> {
        let (local, sha256) = self.random_file(size).await?;
        let file_name = local.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
        let remote_path = format!("{}/{}", remote_dir.trim_end_matches('/'), file_name);
        let params = Params::new()
            .set("allocation", allocation_id)
            .set("localpath", local.display())
            .set("remotepath", &remote_path);
        self.profile.upload(wallet, &params).await?;
        info!(allocation_id, remote_path = %remote_path, "uploaded");
        Ok(UploadedFile { local, remote_path, sha256 })
    }

    async fn download_locked(&self, wallet: &str, allocation_id: &str, file: &UploadedFile) -> Result<PathBuf> {
        let target = self.workdir.path().join("downloads");
        tokio::fs::create_dir_all(&target).await?;
        let params = Params::new()
            .set("allocation", allocation_id)
            .set("remotepath", &file.remote_path)
            .set("localpath", format!("{}/", target.display()));
        self.profile.download(wallet, &params).await?;

        let local = target.join(file.file_name());
        let digest = file_sha256_hex(&local).await?;
        if digest != file.sha256 {
            return Err(SystestError::Integrity(format!(
                "{} downloaded with sha256 {digest}, uploaded {}",
                file.remote_path, file.sha256
            )));
        }
        Ok(local)
    }

    /// Upload a random file of `size` bytes under `remote_dir`.
    pub async fn upload_random(&self, wallet: &str, allocation_id: &str, remote_dir: &str, size: usize) -> Result<UploadedFile> {
        let _guard = self.lock().await;
        self.upload_locked(wallet, allocation_id, remote_dir, size).await
    }

    /// Download `file` and check it matches what was uploaded.
    pub async fn download_verified(&self, wallet: &str, allocation_id: &str, file: &UploadedFile) -> Result<PathBuf> {
        let _guard = self.lock().await;
        self.download_locked(wallet, allocation_id, file).await
    }

    /// Upload then download under a single hold of the session.
    pub async fn round_trip(&self, wallet: &str, allocation_id: &str, remote_dir: &str) -> Result<UploadedFile> {
        let _guard = self.lock().await;
        let file = self.upload_locked(wallet, allocation_id, remote_dir, DEFAULT_FILE_SIZE).await?;
        self.download_locked(wallet, allocation_id, &file).await?;
        Ok(file)
    }
}
