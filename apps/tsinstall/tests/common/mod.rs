//! Shared helpers for tsinstall integration tests.

#[allow(dead_code)]
#[path = "../../src/installer/test_server.rs"]
pub mod test_server;
