//! Installation of the pinned `test-server` release.
//!
//! ## Module Structure
//!
//! - [`platform`] - OS and architecture resolution
//! - [`checksums`] - Checksum manifest loading and `checksums.txt` parsing
//! - [`download`] - Blocking HTTP download with timeout
//! - [`verify`] - SHA256 checksum verification
//! - [`archive`] - ZIP and tar.gz extraction, executable permissions
//!
//! [`Installer`] composes these into the install flow: resolve the platform,
//! prepare the bin directory, download and verify the archive, extract it,
//! and mark the binary executable.

pub mod archive;
pub mod checksums;
pub mod download;
pub mod platform;
pub mod verify;

#[cfg(test)]
pub(crate) mod test_server;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub use archive::{ensure_executable, extract_archive};
pub use checksums::{ChecksumTable, parse_checksums_txt};
pub use download::download_file;
pub use platform::PlatformInfo;
pub use verify::verify_checksum;

use crate::config::InstallConfig;
use crate::errors::InstallError;

/// Everything one install run needs to know about its target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    pub version: String,
    /// Release asset name, e.g. `test-server_Linux_x86_64.tar.gz`.
    pub archive_name: String,
    pub download_url: String,
    /// Where the archive is downloaded to, inside the bin directory.
    pub archive_path: PathBuf,
    /// Where the extracted binary is expected.
    pub binary_path: PathBuf,
}

impl InstallRequest {
    #[must_use]
    pub fn new(config: &InstallConfig, platform: &PlatformInfo) -> Self {
        let archive_name = platform.archive_name(&config.project);
        Self {
            version: config.version.clone(),
            download_url: config.asset_url(&archive_name),
            archive_path: config.bin_dir.join(&archive_name),
            binary_path: config.bin_dir.join(&platform.binary_name),
            archive_name,
        }
    }
}

/// Runs the install flow against a loaded checksum manifest.
pub struct Installer {
    config: InstallConfig,
    checksums: ChecksumTable,
}

impl Installer {
    #[must_use]
    pub fn new(config: InstallConfig, checksums: ChecksumTable) -> Self {
        Self { config, checksums }
    }

    /// Installs the binary for the current platform.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::UnsupportedPlatform`] if the host has no
    /// release archive, or any error from [`Installer::install_for`].
    pub fn install(&self) -> Result<PathBuf> {
        let platform = PlatformInfo::detect(&self.config.project)?;
        tracing::debug!(%platform, "detected platform");
        self.install_for(&platform)
    }

    /// Installs the binary for `platform` and returns its path.
    ///
    /// Any existing binary is removed first. On failure the binary is absent
    /// and no archive is left in the bin directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the bin directory cannot be prepared, the download
    /// fails or times out, the manifest has no digest for the archive, the
    /// digest does not match, extraction fails, or the binary is missing from
    /// the archive.
    pub fn install_for(&self, platform: &PlatformInfo) -> Result<PathBuf> {
        let request = InstallRequest::new(&self.config, platform);
        println!(
            "Installing {} {} for {platform}...",
            self.config.project, request.version
        );

        self.prepare(&request)?;
        self.download_and_verify(&request)?;

        println!("Extracting {}...", request.archive_name);
        extract_archive(
            &request.archive_path,
            platform.archive_format,
            &self.config.bin_dir,
        )?;

        finalize(&request, platform)?;

        println!(
            "{} binary is ready at {}",
            self.config.project,
            request.binary_path.display()
        );
        Ok(request.binary_path)
    }

    fn prepare(&self, request: &InstallRequest) -> Result<()> {
        if request.binary_path.exists() {
            println!(
                "Removing existing binary at {}...",
                request.binary_path.display()
            );
            std::fs::remove_file(&request.binary_path).map_err(|e| {
                InstallError::io_error(
                    format!("failed to remove {}", request.binary_path.display()),
                    e,
                )
            })?;
        }

        std::fs::create_dir_all(&self.config.bin_dir).with_context(|| {
            format!(
                "Failed to create bin directory: {}",
                self.config.bin_dir.display()
            )
        })
    }

    fn download_and_verify(&self, request: &InstallRequest) -> Result<()> {
        let result = self.fetch_verified(request);
        if result.is_err() {
            remove_archive(&request.archive_path);
            println!("Failed during download or verification");
        }
        result
    }

    fn fetch_verified(&self, request: &InstallRequest) -> Result<()> {
        println!(
            "Downloading {} from {}...",
            request.archive_name, request.download_url
        );
        download_file(
            &request.download_url,
            &request.archive_path,
            self.config.timeout,
        )?;
        println!("Download complete.");

        let expected = self
            .checksums
            .expected(&request.version, &request.archive_name)?;

        println!("Verifying checksum...");
        verify_checksum(&request.archive_path, expected)?;
        println!("Checksum verified successfully.");
        Ok(())
    }
}

fn finalize(request: &InstallRequest, platform: &PlatformInfo) -> Result<()> {
    if !request.binary_path.is_file() {
        return Err(InstallError::extraction(
            &request.archive_path,
            format!(
                "{} not found in archive after extraction",
                platform.binary_name
            ),
        )
        .into());
    }

    ensure_executable(&request.binary_path, platform)?;
    Ok(())
}

fn remove_archive(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => tracing::debug!(path = %path.display(), "removed archive"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(
            path = %path.display(),
            error = %e,
            "failed to remove archive"
        ),
    }
}
