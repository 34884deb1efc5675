//! Checksum manifest for release archives.
//!
//! The manifest maps a release version to the expected SHA256 digest of every
//! archive published for it:
//!
//! ```json
//! {
//!   "v0.2.7": {
//!     "test-server_Darwin_arm64.tar.gz": "<64 hex chars>",
//!     "test-server_Linux_x86_64.tar.gz": "<64 hex chars>"
//!   }
//! }
//! ```
//!
//! Releases also publish a `checksums.txt` asset (`<digest>  <filename>` per
//! line); [`parse_checksums_txt`] reads that format so the manifest can be
//! refreshed for a new version.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::errors::InstallError;

/// Archive file name to hex digest.
pub type ArchiveChecksums = BTreeMap<String, String>;

/// Expected digests keyed by version, then archive file name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChecksumTable {
    versions: BTreeMap<String, ArchiveChecksums>,
}

impl ChecksumTable {
    /// Loads the manifest at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::ManifestLoad`] if the file is missing,
    /// unreadable, not valid JSON, not shaped like a manifest, or holds a
    /// digest that is not 64 hex characters.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| InstallError::manifest_load(path, e.to_string()))?;

        let table = Self::from_json(&text)
            .map_err(|e| InstallError::manifest_load(path, format!("{e:#}")))?;

        tracing::debug!(
            path = %path.display(),
            versions = table.versions.len(),
            "loaded checksum manifest"
        );
        Ok(table)
    }

    /// Loads the manifest for rewriting.
    ///
    /// A missing or empty file yields an empty table. An unparsable file is
    /// reported as a warning and replaced by an empty table.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if text.trim().is_empty() {
            return Ok(Self::default());
        }

        match Self::from_json(&text) {
            Ok(table) => Ok(table),
            Err(e) => {
                let error = format!("{e:#}");
                tracing::warn!(
                    path = %path.display(),
                    error = %error,
                    "could not parse existing manifest, it will be overwritten"
                );
                Ok(Self::default())
            }
        }
    }

    /// Parses and validates manifest JSON.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid JSON, a wrong shape, or a malformed digest.
    pub fn from_json(text: &str) -> Result<Self> {
        let table: Self = serde_json::from_str(text).context("invalid manifest JSON")?;

        for (version, archives) in &table.versions {
            for (archive_name, digest) in archives {
                if !is_sha256_hex(digest) {
                    bail!(
                        "digest for {archive_name} (version {version}) is not a 64-character hex string: {digest:?}"
                    );
                }
            }
        }

        Ok(table)
    }

    /// Returns the expected digest, if recorded.
    #[must_use]
    pub fn get(&self, version: &str, archive_name: &str) -> Option<&str> {
        self.versions
            .get(version)
            .and_then(|archives| archives.get(archive_name))
            .map(String::as_str)
    }

    /// Returns the expected digest or fails.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::ChecksumNotFound`] if the manifest has no entry
    /// for `version` and `archive_name`.
    pub fn expected(&self, version: &str, archive_name: &str) -> Result<&str> {
        self.get(version, archive_name)
            .ok_or_else(|| InstallError::checksum_not_found(version, archive_name).into())
    }

    /// Replaces all entries recorded for `version`.
    pub fn insert_version(&mut self, version: impl Into<String>, archives: ArchiveChecksums) {
        self.versions.insert(version.into(), archives);
    }

    /// Number of versions in the manifest.
    #[must_use]
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Writes the manifest as indented JSON with a trailing newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut json =
            serde_json::to_string_pretty(self).context("Failed to serialize checksum manifest")?;
        json.push('\n');

        std::fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}

/// Parses a release `checksums.txt` asset.
///
/// Each line holds a digest and a file name separated by whitespace. Blank
/// lines and lines that do not match are skipped.
///
/// # Errors
///
/// Returns an error if no checksum could be parsed.
pub fn parse_checksums_txt(text: &str) -> Result<ArchiveChecksums> {
    let mut checksums = ArchiveChecksums::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts.as_slice() {
            [digest, name] if is_sha256_hex(digest) => {
                checksums.insert((*name).to_string(), digest.to_ascii_lowercase());
            }
            _ => tracing::debug!(line, "skipping unrecognized checksums line"),
        }
    }

    if checksums.is_empty() {
        bail!("no checksums could be parsed; the checksums file is empty or in an unexpected format");
    }

    Ok(checksums)
}

fn is_sha256_hex(digest: &str) -> bool {
    digest.len() == 64 && digest.bytes().all(|b| b.is_ascii_hexdigit())
}
