use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use uuid::Uuid;

/// Kompanion: a companion server for KOReader
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Configuration file (.json, .yaml or .toml)
    #[arg(long, global = true, env = "KOMPANION_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print "pong" and exit
    #[arg(long)]
    pub ping: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Session key issued by `user login`
#[derive(Args, Debug, Clone)]
pub struct SessionArgs {
    #[arg(long, env = "KOMPANION_SESSION")]
    pub session: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inspect the effective configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Manage user accounts and sessions
    User {
        #[command(subcommand)]
        command: UserCommand,
    },
    /// Manage KOReader sync devices
    Device {
        #[command(subcommand)]
        command: DeviceCommand,
    },
    /// Manage the book library
    Book {
        #[command(subcommand)]
        command: BookCommand,
    },
    /// Push and read reading progress
    Progress {
        #[command(subcommand)]
        command: ProgressCommand,
    },
    /// Reading statistics
    Stats {
        #[command(subcommand)]
        command: StatsCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the settings after defaults, file and environment are applied
    Show {
        /// Output format: json, yaml or toml
        #[arg(long, default_value = "json")]
        format: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Create an account
    Register {
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Start a session and print its key
    Login {
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        user_agent: Option<String>,
        #[arg(long)]
        client_ip: Option<String>,
    },
    /// End a session
    Logout {
        #[command(flatten)]
        session: SessionArgs,
    },
    /// Show the user behind a session
    Whoami {
        #[command(flatten)]
        session: SessionArgs,
    },
}

#[derive(Subcommand, Debug)]
pub enum DeviceCommand {
    /// Register a device for the session's user
    Add {
        name: String,
        #[arg(long)]
        password: String,
        #[command(flatten)]
        session: SessionArgs,
    },
    /// List the session user's devices
    List {
        #[command(flatten)]
        session: SessionArgs,
    },
    /// Remove one of the session user's devices
    Remove {
        name: String,
        #[command(flatten)]
        session: SessionArgs,
    },
    /// Check a device credential
    Verify {
        name: String,
        #[arg(long)]
        password: String,
        /// The password is already the MD5 sync key
        #[arg(long)]
        hashed: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum BookCommand {
    /// Upload a book file
    Add {
        file: PathBuf,
        #[command(flatten)]
        session: SessionArgs,
    },
    /// List books, one page at a time
    List {
        #[arg(long, default_value_t = 1)]
        page: i64,
        #[arg(long, default_value_t = 20)]
        page_size: i64,
    },
    /// Show one book as JSON
    Show { id: Uuid },
    /// Write a book file to disk
    Download {
        id: Uuid,
        /// Target file or directory (default: current directory)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Delete a book and its file
    Remove {
        id: Uuid,
        #[command(flatten)]
        session: SessionArgs,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProgressCommand {
    /// Report a reading position
    Push {
        /// Book id
        document: Uuid,
        /// Fraction read, 0 to 1
        percentage: f64,
        /// Device name as reported by KOReader
        #[arg(long)]
        device: String,
        /// Position string (xpointer or page)
        #[arg(long)]
        detail: Option<String>,
        /// Unix timestamp (default: now)
        #[arg(long)]
        timestamp: Option<i64>,
        #[command(flatten)]
        session: SessionArgs,
    },
    /// Latest progress for a book, or all progress when no book is given
    Get {
        document: Option<Uuid>,
        #[command(flatten)]
        session: SessionArgs,
    },
}

#[derive(Subcommand, Debug)]
pub enum StatsCommand {
    /// Started, finished, reading time and average progress
    Summary {
        #[command(flatten)]
        session: SessionArgs,
    },
    /// Most-read books
    Top {
        #[arg(long, default_value_t = 5)]
        limit: usize,
        #[command(flatten)]
        session: SessionArgs,
    },
    /// Finished books per day, month or year
    Activity {
        #[arg(long, default_value = "month")]
        period: String,
        #[command(flatten)]
        session: SessionArgs,
    },
}
