//! Checksum verification for downloaded archives.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

use crate::errors::InstallError;

/// Size of the blocks fed to the hasher.
const HASH_BLOCK_SIZE: usize = 8192;

/// Verifies that a file matches the expected SHA256 checksum.
///
/// The comparison ignores the case of `expected`.
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be opened or read
/// - The computed checksum does not match ([`InstallError::ChecksumMismatch`])
pub fn verify_checksum(file_path: &Path, expected: &str) -> Result<()> {
    let actual = compute_sha256(file_path)?;

    if actual != expected.to_lowercase() {
        return Err(InstallError::checksum_mismatch(expected, actual).into());
    }

    tracing::debug!(path = %file_path.display(), digest = %actual, "checksum verified");
    Ok(())
}

/// Computes the SHA256 hash of a file as a lowercase hex string.
///
/// The file is read in fixed-size blocks, so memory use does not grow with
/// the file size.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn compute_sha256(file_path: &Path) -> Result<String> {
    let mut file = std::fs::File::open(file_path)
        .with_context(|| format!("Failed to open file for checksum: {}", file_path.display()))?;

    let mut hasher = Sha256::new();
    let mut buffer = [0u8; HASH_BLOCK_SIZE];

    loop {
        let bytes_read = file.read(&mut buffer).with_context(|| {
            format!("Failed to read file for checksum: {}", file_path.display())
        })?;

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}
