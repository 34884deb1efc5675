//! Error types for the tsinstall CLI.
//!
//! Stage code propagates `anyhow::Result` with context attached; the variants
//! of [`InstallError`] mark the conditions that callers (and tests) need to
//! tell apart. Use `anyhow::Error::downcast_ref::<InstallError>()` to recover
//! them.

use std::path::PathBuf;
use thiserror::Error;

/// Consolidated error type for install operations.
#[derive(Debug, Error)]
pub enum InstallError {
    /// The host OS or CPU architecture has no prebuilt release archive.
    #[error("unsupported platform: {os} on {arch} (supported: Darwin, Linux, Windows on x86_64, arm64)")]
    UnsupportedPlatform {
        /// OS identifier as reported by the environment.
        os: String,
        /// Architecture identifier as reported by the environment.
        arch: String,
    },

    /// The checksum manifest is missing or malformed.
    #[error("failed to load checksum manifest {path}: {message}")]
    ManifestLoad {
        /// Manifest location.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },

    /// The manifest has no digest for this release artifact.
    #[error("checksum for {archive_name} (version {version}) not found")]
    ChecksumNotFound {
        /// Release version tag.
        version: String,
        /// Archive file name.
        archive_name: String,
    },

    /// Non-success HTTP status or transport failure.
    #[error("download of {url} failed: {message}")]
    Http {
        /// Requested URL.
        url: String,
        /// Status line or transport error description.
        message: String,
    },

    /// The download did not finish within the configured timeout.
    #[error("download of {url} timed out after {seconds}s")]
    Timeout {
        /// Requested URL.
        url: String,
        /// Configured timeout.
        seconds: u64,
    },

    /// The downloaded archive does not hash to the expected digest.
    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// Digest recorded in the manifest.
        expected: String,
        /// Digest of the downloaded file.
        actual: String,
    },

    /// The archive could not be unpacked.
    #[error("failed to extract {archive}: {message}")]
    Extraction {
        /// Archive that was being extracted.
        archive: PathBuf,
        /// What went wrong.
        message: String,
    },

    /// Error reading or writing files.
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O operation that failed.
        message: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl InstallError {
    /// Creates a new `UnsupportedPlatform` error.
    #[must_use]
    pub fn unsupported_platform(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self::UnsupportedPlatform {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// Creates a new `ManifestLoad` error.
    #[must_use]
    pub fn manifest_load(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ManifestLoad {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new `ChecksumNotFound` error.
    #[must_use]
    pub fn checksum_not_found(version: impl Into<String>, archive_name: impl Into<String>) -> Self {
        Self::ChecksumNotFound {
            version: version.into(),
            archive_name: archive_name.into(),
        }
    }

    /// Creates a new `Http` error.
    #[must_use]
    pub fn http(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Http {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Creates a new `Timeout` error.
    #[must_use]
    pub fn timeout(url: impl Into<String>, seconds: u64) -> Self {
        Self::Timeout {
            url: url.into(),
            seconds,
        }
    }

    /// Creates a new `ChecksumMismatch` error.
    #[must_use]
    pub fn checksum_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::ChecksumMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Creates a new `Extraction` error.
    #[must_use]
    pub fn extraction(archive: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Extraction {
            archive: archive.into(),
            message: message.into(),
        }
    }

    /// Creates a new `Io` error from an I/O error with context.
    #[must_use]
    pub fn io_error(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_platform_names_os_and_arch() {
        let err = InstallError::unsupported_platform("freebsd", "riscv64");
        let msg = err.to_string();
        assert!(msg.starts_with("unsupported platform: freebsd on riscv64"));
    }

    #[test]
    fn manifest_load_displays_path_and_message() {
        let err = InstallError::manifest_load("/tmp/checksums.json", "file not found");
        assert_eq!(
            err.to_string(),
            "failed to load checksum manifest /tmp/checksums.json: file not found"
        );
    }

    #[test]
    fn checksum_not_found_displays_version_and_archive() {
        let err = InstallError::checksum_not_found("v0.2.7", "test-server_Linux_x86_64.tar.gz");
        assert_eq!(
            err.to_string(),
            "checksum for test-server_Linux_x86_64.tar.gz (version v0.2.7) not found"
        );
    }

    #[test]
    fn checksum_mismatch_displays_both_values() {
        let err = InstallError::checksum_mismatch("abc123", "def456");
        assert_eq!(
            err.to_string(),
            "checksum mismatch: expected abc123, got def456"
        );
    }

    #[test]
    fn timeout_displays_seconds() {
        let err = InstallError::timeout("http://localhost/a.tar.gz", 60);
        assert_eq!(
            err.to_string(),
            "download of http://localhost/a.tar.gz timed out after 60s"
        );
    }

    #[test]
    fn io_error_keeps_source() {
        let source = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = InstallError::io_error("failed to remove bin/test-server", source);
        assert_eq!(err.to_string(), "I/O error: failed to remove bin/test-server");
        assert!(std::error::Error::source(&err).is_some());
    }
}
