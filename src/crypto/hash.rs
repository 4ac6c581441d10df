use std::path::Path;

use sha2::Sha256;
use sha3::{Digest, Sha3_256};
use tokio::io::AsyncReadExt;

/// Hex SHA3-256, the digest the network uses for ids and transaction hashes.
pub fn sha3_256_hex(data: impl AsRef<[u8]>) -> String {
    hex::encode(Sha3_256::digest(data.as_ref()))
}

/// Hex SHA-256 of a local file, streamed.
pub async fn file_sha256_hex(path: impl AsRef<Path>) -> std::io::Result<String> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; 64 * 1024];
    loop {
        let n = file.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}
