use std::path::PathBuf;

use alerta_core::models::{IncidentKind, IncidentStatus, Role, Urgency};
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "alerta")]
#[command(about = "Report and follow campus incidents from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory holding the local session record
    #[arg(long, global = true, value_name = "PATH")]
    pub data_dir: Option<PathBuf>,

    /// Incident feed address (must be wss:// to connect)
    #[arg(long, global = true, value_name = "URL")]
    pub feed_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in on this device
    Login {
        #[arg(long, value_name = "EMAIL")]
        email: String,
        /// Not verified by the client
        #[arg(long, value_name = "PASSWORD")]
        password: String,
        #[arg(long, value_enum, default_value_t = RoleArg::Student)]
        role: RoleArg,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Report a new incident
    #[command(alias = "notify")]
    Report {
        /// Incident category
        #[arg(long = "type", value_enum, value_name = "TYPE")]
        kind: KindArg,
        #[arg(long)]
        location: String,
        #[arg(long)]
        description: String,
        #[arg(long, value_enum, default_value_t = UrgencyArg::Medium)]
        urgency: UrgencyArg,
        /// Seconds to wait for the feed connection
        #[arg(long, default_value = "10", value_name = "SECS")]
        timeout: u64,
    },
    /// Follow the live incident list
    Watch {
        /// Only show incidents with this status
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
        /// Output one JSON object per change
        #[arg(long)]
        json: bool,
        /// Stop after this many seconds (runs until Ctrl-C when omitted)
        #[arg(long, value_name = "SECS")]
        duration: Option<u64>,
    },
    /// Administrative overview: counts, urgent incidents, full list
    Admin {
        /// Stop after this many seconds (runs until Ctrl-C when omitted)
        #[arg(long, value_name = "SECS")]
        duration: Option<u64>,
    },
    /// Inspect or change the saved CLI configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Update saved settings
    Set {
        /// Saved feed address; pass an empty string to clear it
        #[arg(long, value_name = "URL")]
        url: Option<String>,
        /// Reconnect attempts after a dropped connection (0 disables)
        #[arg(long, value_name = "N")]
        reconnect_attempts: Option<u32>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum RoleArg {
    Student,
    Admin,
    Authority,
}

impl From<RoleArg> for Role {
    fn from(value: RoleArg) -> Self {
        match value {
            RoleArg::Student => Self::Student,
            RoleArg::Admin => Self::Admin,
            RoleArg::Authority => Self::Authority,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum KindArg {
    Infrastructure,
    Emergency,
    Services,
    Security,
    Other,
}

impl From<KindArg> for IncidentKind {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::Infrastructure => Self::Infrastructure,
            KindArg::Emergency => Self::Emergency,
            KindArg::Services => Self::Services,
            KindArg::Security => Self::Security,
            KindArg::Other => Self::Other,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum UrgencyArg {
    Low,
    Medium,
    High,
}

impl From<UrgencyArg> for Urgency {
    fn from(value: UrgencyArg) -> Self {
        match value {
            UrgencyArg::Low => Self::Low,
            UrgencyArg::Medium => Self::Medium,
            UrgencyArg::High => Self::High,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum StatusArg {
    Pending,
    InProgress,
    Resolved,
}

impl From<StatusArg> for IncidentStatus {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::Pending => Self::Pending,
            StatusArg::InProgress => Self::InProgress,
            StatusArg::Resolved => Self::Resolved,
        }
    }
}
