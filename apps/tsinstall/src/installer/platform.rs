//! Platform detection for release archives.
//!
//! Maps the running OS and CPU architecture onto the naming used by the
//! `test-server` release assets.
//!
//! ## Supported Platforms
//!
//! | OS      | Architectures     | Archive   |
//! |---------|-------------------|-----------|
//! | Darwin  | `x86_64`, `arm64` | `.tar.gz` |
//! | Linux   | `x86_64`, `arm64` | `.tar.gz` |
//! | Windows | `x86_64`, `arm64` | `.zip`    |

use anyhow::Result;
use std::fmt;

use super::archive::ArchiveFormat;
use crate::errors::InstallError;

/// Operating system component of a release asset name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OsName {
    Darwin,
    Linux,
    Windows,
}

impl OsName {
    /// Parses an OS identifier such as `std::env::consts::OS`.
    ///
    /// Accepts both Rust target names (`macos`) and the release naming
    /// (`Darwin`), case-insensitively.
    #[must_use]
    pub fn parse(os: &str) -> Option<Self> {
        match os.to_ascii_lowercase().as_str() {
            "darwin" | "macos" => Some(Self::Darwin),
            "linux" => Some(Self::Linux),
            "windows" | "win32" => Some(Self::Windows),
            _ => None,
        }
    }

    /// Returns the name used in release asset file names.
    #[must_use = "returns the OS string without side effects"]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Darwin => "Darwin",
            Self::Linux => "Linux",
            Self::Windows => "Windows",
        }
    }
}

impl fmt::Display for OsName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CPU architecture component of a release asset name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchName {
    X86_64,
    Arm64,
}

impl ArchName {
    /// Parses an architecture identifier such as `std::env::consts::ARCH`.
    #[must_use]
    pub fn parse(arch: &str) -> Option<Self> {
        match arch.to_ascii_lowercase().as_str() {
            "x86_64" | "amd64" => Some(Self::X86_64),
            "aarch64" | "arm64" => Some(Self::Arm64),
            _ => None,
        }
    }

    #[must_use = "returns the architecture string without side effects"]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::X86_64 => "x86_64",
            Self::Arm64 => "arm64",
        }
    }
}

impl fmt::Display for ArchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved release target for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformInfo {
    pub os: OsName,
    pub arch: ArchName,
    pub archive_format: ArchiveFormat,
    /// File name of the installed executable (`{project}` or `{project}.exe`).
    pub binary_name: String,
}

impl PlatformInfo {
    /// Detects the current platform from the compile-time target.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::UnsupportedPlatform`] if the OS/architecture
    /// combination has no release archive.
    pub fn detect(project: &str) -> Result<Self> {
        Self::resolve(std::env::consts::OS, std::env::consts::ARCH, project)
    }

    /// Resolves explicit OS and architecture identifiers.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::UnsupportedPlatform`] if either identifier is
    /// unknown.
    pub fn resolve(os: &str, arch: &str, project: &str) -> Result<Self> {
        let (Some(os_name), Some(arch_name)) = (OsName::parse(os), ArchName::parse(arch)) else {
            return Err(InstallError::unsupported_platform(os, arch).into());
        };

        let (archive_format, binary_name) = match os_name {
            OsName::Windows => (ArchiveFormat::Zip, format!("{project}.exe")),
            OsName::Darwin | OsName::Linux => (ArchiveFormat::TarGz, project.to_string()),
        };

        Ok(Self {
            os: os_name,
            arch: arch_name,
            archive_format,
            binary_name,
        })
    }

    /// Returns the release asset name, e.g. `test-server_Linux_x86_64.tar.gz`.
    #[must_use]
    pub fn archive_name(&self, project: &str) -> String {
        format!(
            "{project}_{}_{}{}",
            self.os,
            self.arch,
            self.archive_format.extension()
        )
    }

    #[must_use = "returns platform check result without side effects"]
    pub fn is_windows(&self) -> bool {
        self.os == OsName::Windows
    }
}

impl fmt::Display for PlatformInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.os, self.arch)
    }
}
