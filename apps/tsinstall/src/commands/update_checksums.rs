//! Update-checksums command for the tsinstall CLI.
//!
//! Downloads the `checksums.txt` asset of a release and records its digests
//! in the checksum manifest under the release tag. Other versions already in
//! the manifest are kept.
//!
//! ## Usage
//!
//! ```bash
//! tsinstall update-checksums v0.2.7
//! tsinstall --checksums sdk/checksums.json update-checksums v0.3.0
//! ```

use anyhow::{Context, Result, bail};
use clap::Args;

use crate::config::InstallConfig;
use crate::installer::download::fetch_text;
use crate::installer::{ChecksumTable, parse_checksums_txt};

/// Arguments for the update-checksums command.
#[derive(Args)]
pub struct UpdateChecksumsArgs {
    /// Release tag to record, e.g. "v0.2.7".
    pub version: String,
}

/// Executes the update-checksums command.
///
/// # Errors
///
/// Returns an error if the tag does not start with `v`, the checksums asset
/// cannot be downloaded or holds no digests, or the manifest cannot be
/// written.
pub fn execute(args: &UpdateChecksumsArgs, config: &InstallConfig) -> Result<()> {
    let version = args.version.trim();
    if !version.starts_with('v') {
        bail!("version tag must start with 'v' (e.g., v0.1.0), got '{version}'");
    }

    let asset = checksums_asset_name(&config.project, version);
    let url = config.asset_url_for(version, &asset);

    println!("Downloading checksums file from {url}...");
    let text = fetch_text(&url, config.timeout)?;
    let archives = parse_checksums_txt(&text)
        .with_context(|| format!("Failed to parse {asset}"))?;
    let count = archives.len();

    let mut table = ChecksumTable::load_or_default(&config.checksums_path)?;
    table.insert_version(version, archives);
    table.save(&config.checksums_path)?;

    println!(
        "Updated {} with {count} checksums for version {version}.",
        config.checksums_path.display()
    );
    Ok(())
}

/// Release asset holding the digests, e.g. `test-server_0.2.7_checksums.txt`.
fn checksums_asset_name(project: &str, version: &str) -> String {
    let bare = version.strip_prefix('v').unwrap_or(version);
    format!("{project}_{bare}_checksums.txt")
}
