//! Content addressing for blob uploads.

use crate::error::Result;
use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeekExt};

const READ_CHUNK: usize = 64 * 1024;

/// `sha256:<hex>` digest of `bytes`.
pub fn digest_bytes(bytes: &[u8]) -> String {
    format_digest(Sha256::digest(bytes).as_slice())
}

/// `sha256:<hex>` digest of a file, read in chunks.
pub async fn file_digest(path: impl AsRef<Path>) -> Result<String> {
    let mut file = File::open(path).await?;
    reader_digest(&mut file).await
}

/// Open `path`, hash it, and rewind the handle so the bytes uploaded are
/// the bytes that were hashed.
pub(crate) async fn open_hashed(path: &Path) -> Result<(File, String)> {
    let mut file = File::open(path).await?;
    let digest = reader_digest(&mut file).await?;
    file.rewind().await?;
    Ok((file, digest))
}

async fn reader_digest<R: AsyncRead + Unpin>(reader: &mut R) -> Result<String> {
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; READ_CHUNK];
    loop {
        let read = reader.read(&mut buf).await?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }
    Ok(format_digest(hasher.finalize().as_slice()))
}

fn format_digest(hash: &[u8]) -> String {
    format!("sha256:{}", hex::encode(hash))
}
