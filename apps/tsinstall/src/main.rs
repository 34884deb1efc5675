#![warn(clippy::pedantic)]

//! # tsinstall
//!
//! Installs the pinned release of the `test-server` binary into a local bin
//! directory. The release archive for the current platform is downloaded
//! from GitHub, checked against the SHA256 digest recorded in a checksum
//! manifest, unpacked, and made executable.
//!
//! ## Subcommands
//!
//! - `install` - Install the binary (the default when no subcommand is given)
//! - `update-checksums` - Record the digests of a release in the manifest
//!
//! ## Examples
//!
//! Install into `./bin` using `./checksums.json`:
//! ```bash
//! tsinstall
//! ```
//!
//! Refresh the manifest for a release:
//! ```bash
//! tsinstall update-checksums v0.2.7
//! ```

mod commands;
mod config;
mod errors;
mod installer;
mod logging;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{install, update_checksums};
use config::{DEFAULT_BIN_DIR, DEFAULT_CHECKSUMS_PATH, InstallConfig};

/// Installer for the test-server binary.
#[derive(Parser)]
#[command(
    name = "tsinstall",
    author,
    version,
    about = "Installs the pinned test-server release binary",
    after_help = "\
ENVIRONMENT VARIABLES:
    TSINSTALL_DOWNLOAD_BASE   Release download host (default: https://github.com)
    RUST_LOG                  Log filter for diagnostics on stderr"
)]
pub struct Cli {
    /// Directory the binary is installed into.
    #[clap(long = "bin-dir", global = true, default_value = DEFAULT_BIN_DIR)]
    pub bin_dir: PathBuf,

    /// Path to the checksum manifest.
    #[clap(long = "checksums", global = true, default_value = DEFAULT_CHECKSUMS_PATH)]
    pub checksums: PathBuf,

    /// Print diagnostic logs to stderr.
    #[clap(short = 'v', long = "verbose", global = true, action = clap::ArgAction::SetTrue)]
    pub verbose: bool,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands for the tsinstall CLI.
#[derive(Subcommand)]
pub enum Commands {
    /// Install the test-server binary.
    ///
    /// Removes any existing binary, then downloads, verifies, and extracts
    /// the release archive for the current platform.
    Install,

    /// Record the checksums of a release in the manifest.
    ///
    /// Downloads the release's checksums file and writes its digests under
    /// the given version tag, keeping other versions.
    UpdateChecksums(update_checksums::UpdateChecksumsArgs),
}

fn main() {
    if let Err(e) = run() {
        let exit_code = handle_error(&e);
        std::process::exit(exit_code);
    }
}

/// Reports an error and returns the process exit code.
fn handle_error(e: &anyhow::Error) -> i32 {
    let error = format!("{e:#}");
    tracing::debug!(error = %error, "tsinstall failed");
    eprintln!("Error: {e:?}");
    1
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let config = InstallConfig::new(cli.bin_dir, cli.checksums);

    match cli.command {
        None | Some(Commands::Install) => install::execute(config),
        Some(Commands::UpdateChecksums(args)) => update_checksums::execute(&args, &config),
    }
}
