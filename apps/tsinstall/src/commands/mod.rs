//! Subcommand implementations for the tsinstall CLI.
//!
//! - [`install`] - Install the pinned `test-server` binary
//! - [`update_checksums`] - Refresh the checksum manifest from a release

pub mod install;
pub mod update_checksums;
