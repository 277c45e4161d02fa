//! CLI command and subcommand definitions

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

/// NETIO power socket CLI
#[derive(Parser, Debug)]
#[command(name = "netioctl")]
#[command(version, about = "Control and monitor NETIO power sockets", long_about = None)]
pub struct Cli {
    /// Device URL or config-file alias
    #[arg(value_name = "DEVICE")]
    pub device: String,

    /// M2M API username
    #[arg(short, long, value_name = "USER")]
    pub user: Option<String>,

    /// M2M API password
    #[arg(short, long, value_name = "PASSWORD")]
    pub password: Option<String>,

    /// CA bundle (PEM) used to verify the device certificate
    #[arg(long, value_name = "PEM")]
    pub cert: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long, conflicts_with = "cert")]
    pub insecure: bool,

    /// Configuration file path (default: $NETIO_CONFIG)
    #[arg(short, long, value_name = "CFG")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress the warning printed when certificate verification is disabled
    #[arg(long)]
    pub no_cert_warning: bool,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read output state
    #[command(aliases = ["GET", "G", "g"])]
    Get {
        /// Output ID, or ALL for every output
        #[arg(value_name = "ID", default_value = "ALL")]
        id: String,

        /// Field delimiter
        #[arg(short, long, value_name = "DELIM", default_value = "\t")]
        delimiter: String,

        /// Don't print the column header line
        #[arg(long)]
        no_header: bool,

        /// Print actions as their wire integers
        #[arg(long)]
        action_int: bool,
    },

    /// Change output state
    #[command(aliases = ["SET", "S", "s"])]
    Set {
        /// One or more ID ACTION pairs; ID may be ALL
        #[arg(value_name = "ID ACTION", required = true, num_args = 1..)]
        pairs: Vec<String>,
    },

    /// Show device identity and aggregate measurements
    #[command(aliases = ["INFO", "I", "i"])]
    Info,
}
