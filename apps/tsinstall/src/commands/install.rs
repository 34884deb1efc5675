//! Install command for the tsinstall CLI.
//!
//! ## Usage
//!
//! ```bash
//! tsinstall                           # Install into ./bin
//! tsinstall install --bin-dir tools   # Install into ./tools
//! ```

use anyhow::Result;

use crate::config::InstallConfig;
use crate::installer::{ChecksumTable, Installer};

/// Executes the install command.
///
/// # Process
///
/// 1. Load the checksum manifest
/// 2. Detect the current platform
/// 3. Remove any existing binary and create the bin directory
/// 4. Download the archive and verify its SHA256 checksum
/// 5. Extract the archive into the bin directory
/// 6. Set the executable permission (non-Windows)
///
/// # Errors
///
/// Returns an error if the manifest cannot be loaded or any install stage
/// fails.
pub fn execute(config: InstallConfig) -> Result<()> {
    let checksums = ChecksumTable::load(&config.checksums_path)?;
    if checksums.is_empty() {
        tracing::warn!(
            path = %config.checksums_path.display(),
            "checksum manifest is empty, run `tsinstall update-checksums {}` to populate it",
            config.version
        );
    }
    tracing::debug!(
        versions = checksums.len(),
        download_base = %config.download_base,
        "starting install"
    );

    Installer::new(config, checksums).install()?;
    Ok(())
}
