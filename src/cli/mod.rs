//! CLI argument definitions for Taskboard.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Taskboard - a CLI client for a task-assignment tracking API.
///
/// Log in with `tb login`, then `tb task list` or `tb calendar` to see work.
#[derive(Parser, Debug)]
#[command(name = "tb")]
#[command(author, version, about = "A CLI client for a task-assignment tracking API", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Authenticate against the backend and persist the session
    Login {
        /// Account email
        #[arg(long)]
        email: String,

        /// Account password
        #[arg(long)]
        password: String,
    },

    /// Clear the persisted session
    Logout,

    /// Show the current session and role
    Whoami,

    /// Task management commands
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },

    /// Show tasks active per day of a month
    Calendar {
        /// Month to render (YYYY-MM, defaults to the current month)
        #[arg(long)]
        month: Option<String>,

        /// Only show tasks assigned to this user id (admin filter)
        #[arg(long)]
        assignee: Option<i64>,
    },

    /// User account management commands (admin only)
    User {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Show build information
    Version,
}

/// Task subcommands
#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Create a new task (admin only; status starts as pending)
    Create {
        /// Task title
        title: String,

        /// Task description
        #[arg(short, long)]
        description: Option<String>,

        /// First active day (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Last active day (YYYY-MM-DD, inclusive)
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Priority (low, medium, high; defaults to medium)
        #[arg(short, long)]
        priority: Option<String>,

        /// Assignee user id
        #[arg(short, long)]
        assignee: Option<String>,
    },

    /// List tasks
    List {
        /// Filter by status (pending, in_progress, completed, overdue)
        #[arg(long)]
        status: Option<String>,

        /// Filter by assignee user id
        #[arg(long)]
        assignee: Option<i64>,

        /// Case-insensitive search in title and description
        #[arg(long)]
        search: Option<String>,

        /// Keep tasks overlapping a range starting here (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Keep tasks overlapping a range ending here (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Sort key (due_date, priority, status, title)
        #[arg(long)]
        sort: Option<String>,
    },

    /// Show one task
    Show {
        /// Task id
        id: i64,
    },

    /// Update a task (full edit; omitted fields keep their current value)
    Update {
        /// Task id
        id: i64,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New description
        #[arg(long)]
        description: Option<String>,

        /// New first active day (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// New last active day (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,

        /// New priority (low, medium, high)
        #[arg(long)]
        priority: Option<String>,

        /// New status (pending, in_progress, completed, overdue)
        #[arg(long)]
        status: Option<String>,

        /// Reassign to this user id (admin only; ignored otherwise)
        #[arg(long)]
        assignee: Option<String>,
    },

    /// Mark a task completed (status-only update)
    Done {
        /// Task id
        id: i64,
    },

    /// Delete a task (admin only; already-deleted counts as success)
    Delete {
        /// Task id
        id: i64,
    },
}

/// User account subcommands (admin only)
#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// List user accounts
    List,

    /// Create a user account
    Add {
        /// Display name
        name: String,

        /// Login email
        #[arg(long)]
        email: String,

        /// Initial password
        #[arg(long)]
        password: String,

        /// Grant admin capability
        #[arg(long)]
        admin: bool,
    },

    /// Update a user account
    Update {
        /// User id
        id: i64,

        /// New display name
        #[arg(long)]
        name: Option<String>,

        /// New login email
        #[arg(long)]
        email: Option<String>,

        /// New password
        #[arg(long)]
        password: Option<String>,

        /// Set the admin capability
        #[arg(long)]
        admin: Option<bool>,
    },

    /// Delete a user account
    Rm {
        /// User id
        id: i64,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Get a config value (api-url, timeout-secs)
    Get {
        /// Config key
        key: String,
    },

    /// Set a config value
    Set {
        /// Config key
        key: String,

        /// New value
        value: String,
    },

    /// List resolved config values
    List,
}

/// Crate version from Cargo metadata.
pub fn package_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Short git commit hash recorded at build time.
pub fn git_commit() -> &'static str {
    env!("TB_GIT_COMMIT")
}

/// Build timestamp recorded at build time.
pub fn build_timestamp() -> &'static str {
    env!("TB_BUILD_TIMESTAMP")
}
