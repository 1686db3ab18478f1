//! Taskboard - a CLI client for a task-assignment tracking API.
//!
//! This library provides the core functionality for the `tb` CLI tool:
//! session and role resolution, task visibility filtering, calendar
//! date-membership, and validated task/user mutations against a
//! conventional JSON/REST backend.

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod filter;
pub mod gateway;
pub mod models;
pub mod session;


/// Library-level error type for Taskboard operations.
///
/// Validation failures are detected before any network dispatch; an
/// authorization failure clears the session globally; a busy rejection
/// means a mutation for the same task is already in flight.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Not logged in: run `tb login` first")]
    NotLoggedIn,

    #[error("Not authorized: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Server rejected the request: {0}")]
    Conflict(String),

    #[error("Task {0} already has a request in flight")]
    Busy(i64),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for Taskboard operations.
pub type Result<T> = std::result::Result<T, Error>;
