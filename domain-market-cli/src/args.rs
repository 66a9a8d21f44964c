//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use domain_market_core::traits::StorageKind;

/// Domain Market storage administration
#[derive(Parser, Debug)]
#[command(name = "domain-market")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub storage: StorageArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Overrides for the `DOMAIN_MARKET_*` environment
#[derive(Args, Debug, Default)]
pub struct StorageArgs {
    /// Data directory (default: $DOMAIN_MARKET_DATA_DIR or ./data)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Storage backend: json or sqlite
    #[arg(long, global = true, value_parser = parse_storage)]
    pub storage: Option<StorageKind>,
}

fn parse_storage(value: &str) -> Result<StorageKind, String> {
    value.parse()
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the storage structures and seed defaults
    Init,

    /// Show backend, readiness and record counts
    Status,

    /// Write a backup envelope to a file (or stdout)
    Export {
        /// Output path; prints to stdout when omitted
        #[arg(long, short)]
        output: Option<PathBuf>,

        #[command(flatten)]
        sections: SectionArgs,
    },

    /// Persist a snapshot under the data directory
    Backup {
        #[command(flatten)]
        sections: SectionArgs,
    },

    /// Restore a backup envelope from a file or a persisted snapshot
    Restore {
        /// Envelope file to read
        #[arg(long, conflicts_with = "snapshot", required_unless_present = "snapshot")]
        file: Option<PathBuf>,

        /// Name of a persisted snapshot
        #[arg(long)]
        snapshot: Option<String>,
    },

    /// List persisted snapshots, newest first
    Snapshots,

    /// Raw database file operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },

    /// Admin credential operations
    Password {
        #[command(subcommand)]
        action: PasswordAction,
    },

    /// Named JSON documents in the data directory
    Documents {
        #[command(subcommand)]
        action: DocumentAction,
    },

    /// Run the auto-backup schedule
    AutoBackup {
        /// Check once and exit instead of running until interrupted
        #[arg(long)]
        once: bool,
    },
}

/// Optional envelope sections
#[derive(Args, Debug, Clone, Copy)]
pub struct SectionArgs {
    /// Leave site settings out
    #[arg(long)]
    pub no_settings: bool,

    /// Leave the admin credential out
    #[arg(long)]
    pub no_auth: bool,
}

#[derive(Subcommand, Debug)]
pub enum DbAction {
    /// Copy the live database to a file
    Download {
        #[arg(long, short)]
        output: PathBuf,
    },
    /// Create app-data-backup-<ts>.db
    Backup,
    /// List database backups
    List,
    /// Replace the live database with a backup
    Restore { name: String },
    /// Replace the live database with an uploaded .db file
    Upload { file: PathBuf },
    /// Delete a database backup
    Delete { name: String },
}

/// Where a password is taken from. Read from stdin when neither is set.
#[derive(Args, Debug, Default)]
pub struct PasswordInput {
    /// Password value (prefer $DOMAIN_MARKET_PASSWORD or stdin)
    #[arg(long = "password", env = "DOMAIN_MARKET_PASSWORD", hide_env_values = true)]
    pub value: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum PasswordAction {
    /// Check a password against the stored credential
    Verify {
        #[command(flatten)]
        input: PasswordInput,
    },
    /// Set a new admin password
    Set {
        #[command(flatten)]
        input: PasswordInput,
    },
    /// Restore the default admin password
    Reset,
}

#[derive(Subcommand, Debug)]
pub enum DocumentAction {
    /// List document names
    List,
    /// Print a document
    Read { name: String },
    /// Delete a document
    Delete { name: String },
}
