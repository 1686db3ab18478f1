//! Common test utilities for taskboard integration tests.
//!
//! Provides `TestEnv` for isolated test environments that don't pollute
//! the user's `~/.local/share/taskboard/` directory.

#![allow(dead_code)]

use assert_cmd::Command;
pub use tempfile::TempDir;

/// An unroutable backend so a test that unexpectedly reaches the network
/// fails fast with a connection error instead of talking to a real server.
pub const UNREACHABLE_API: &str = "http://127.0.0.1:1/api";

/// A test environment with an isolated data directory.
///
/// The `tb()` method returns a `Command` that sets `TB_DATA_DIR` and
/// `TB_API_URL` per-invocation, making tests parallel-safe.
pub struct TestEnv {
    pub data_dir: TempDir,
}

impl TestEnv {
    /// Create a new test environment with an isolated data directory.
    pub fn new() -> Self {
        Self {
            data_dir: TempDir::new().unwrap(),
        }
    }

    /// Get a Command for the tb binary with isolated data directory.
    pub fn tb(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_tb"));
        cmd.env("TB_DATA_DIR", self.data_dir.path());
        cmd.env("TB_API_URL", UNREACHABLE_API);
        cmd.env("TB_TIMEOUT_SECS", "2");
        cmd
    }

    /// Plant a session file directly, bypassing login.
    ///
    /// Lets tests exercise role gates without a live backend.
    pub fn write_session(&self, admin: bool) {
        let session = format!(
            r#"{{"token":"test-token","user":{{"id":1,"name":"Test","email":"test@example.com","is_admin":{}}}}}"#,
            admin
        );
        std::fs::write(self.data_dir.path().join("session.json"), session).unwrap();
    }
}
