//! Release constants and per-run install settings.
//!
//! The release being installed is pinned at compile time. Only the local
//! paths (from the command line) and the download host (from
//! [`DOWNLOAD_BASE_ENV`], for mirrors and tests) vary between runs.

use std::path::PathBuf;
use std::time::Duration;

use crate::installer::download::DEFAULT_TIMEOUT;

/// Release tag of the `test-server` binary this installer provisions.
pub const TEST_SERVER_VERSION: &str = "v0.2.7";

/// GitHub account that publishes the releases.
pub const GITHUB_OWNER: &str = "google";

/// GitHub repository that publishes the releases.
pub const GITHUB_REPO: &str = "test-server";

/// Project name used in asset and binary file names.
pub const PROJECT_NAME: &str = "test-server";

/// Environment variable to override the release download host.
pub const DOWNLOAD_BASE_ENV: &str = "TSINSTALL_DOWNLOAD_BASE";

/// Default release download host.
const DEFAULT_DOWNLOAD_BASE: &str = "https://github.com";

/// Default bin directory, relative to the working directory.
pub const DEFAULT_BIN_DIR: &str = "bin";

/// Default checksum manifest path, relative to the working directory.
pub const DEFAULT_CHECKSUMS_PATH: &str = "checksums.json";

/// Settings for one install run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallConfig {
    pub version: String,
    pub owner: String,
    pub repo: String,
    pub project: String,
    /// Scheme and host of the release server, without a trailing slash.
    pub download_base: String,
    /// Directory the binary is installed into.
    pub bin_dir: PathBuf,
    /// Location of the checksum manifest.
    pub checksums_path: PathBuf,
    pub timeout: Duration,
}

impl InstallConfig {
    /// Creates a config for the pinned release.
    ///
    /// The download host comes from [`DOWNLOAD_BASE_ENV`] when set.
    #[must_use]
    pub fn new(bin_dir: impl Into<PathBuf>, checksums_path: impl Into<PathBuf>) -> Self {
        Self {
            version: TEST_SERVER_VERSION.to_string(),
            owner: GITHUB_OWNER.to_string(),
            repo: GITHUB_REPO.to_string(),
            project: PROJECT_NAME.to_string(),
            download_base: String::new(),
            bin_dir: bin_dir.into(),
            checksums_path: checksums_path.into(),
            timeout: DEFAULT_TIMEOUT,
        }
        .with_download_base(&download_base_from_env())
    }

    /// Replaces the download host.
    #[must_use]
    pub fn with_download_base(mut self, base: &str) -> Self {
        self.download_base = base.trim().trim_end_matches('/').to_string();
        self
    }

    /// URL of a release asset for the pinned version.
    #[must_use]
    pub fn asset_url(&self, asset: &str) -> String {
        self.asset_url_for(&self.version, asset)
    }

    /// URL of a release asset for any version tag.
    ///
    /// Format: `{base}/{owner}/{repo}/releases/download/{version}/{asset}`.
    #[must_use]
    pub fn asset_url_for(&self, version: &str, asset: &str) -> String {
        format!(
            "{}/{}/{}/releases/download/{version}/{asset}",
            self.download_base, self.owner, self.repo
        )
    }
}

fn download_base_from_env() -> String {
    std::env::var(DOWNLOAD_BASE_ENV)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DOWNLOAD_BASE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pinned_release_constants() {
        assert_eq!(TEST_SERVER_VERSION, "v0.2.7");
        assert_eq!(GITHUB_OWNER, "google");
        assert_eq!(GITHUB_REPO, "test-server");
        assert_eq!(PROJECT_NAME, "test-server");
    }

    #[test]
    #[serial_test::serial]
    fn asset_url_uses_github_by_default() {
        unsafe { std::env::remove_var(DOWNLOAD_BASE_ENV) };
        let config = InstallConfig::new("bin", "checksums.json");

        assert_eq!(
            config.asset_url("test-server_Linux_x86_64.tar.gz"),
            "https://github.com/google/test-server/releases/download/v0.2.7/test-server_Linux_x86_64.tar.gz"
        );
        assert_eq!(config.timeout, Duration::from_secs(60));
    }

    #[test]
    #[serial_test::serial]
    fn download_base_env_overrides_host() {
        unsafe { std::env::set_var(DOWNLOAD_BASE_ENV, "http://localhost:8080/") };
        let config = InstallConfig::new("bin", "checksums.json");
        unsafe { std::env::remove_var(DOWNLOAD_BASE_ENV) };

        assert_eq!(config.download_base, "http://localhost:8080");
        assert_eq!(
            config.asset_url_for("v0.3.0", "checksums.txt"),
            "http://localhost:8080/google/test-server/releases/download/v0.3.0/checksums.txt"
        );
    }

    #[test]
    #[serial_test::serial]
    fn blank_download_base_env_is_ignored() {
        unsafe { std::env::set_var(DOWNLOAD_BASE_ENV, "   ") };
        let config = InstallConfig::new("bin", "checksums.json");
        unsafe { std::env::remove_var(DOWNLOAD_BASE_ENV) };

        assert_eq!(config.download_base, "https://github.com");
    }

    #[test]
    #[serial_test::serial]
    fn env_download_base_is_trimmed() {
        unsafe { std::env::set_var(DOWNLOAD_BASE_ENV, "  https://mirror.example.org/releases/  ") };
        let config = InstallConfig::new("bin", "checksums.json");
        unsafe { std::env::remove_var(DOWNLOAD_BASE_ENV) };

        assert_eq!(config.download_base, "https://mirror.example.org/releases");
    }

    #[test]
    fn with_download_base_trims_trailing_slash() {
        let config =
            InstallConfig::new("bin", "checksums.json").with_download_base("http://127.0.0.1:1/");
        assert_eq!(config.download_base, "http://127.0.0.1:1");
    }
}
