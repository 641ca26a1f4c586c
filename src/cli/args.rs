//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Terminal supervisor for a systemd-managed OpenVPN connection
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Override config directory (default: platform config dir, honors `XDG_CONFIG_HOME`)
    #[arg(
        short = 'C',
        long,
        value_name = "DIR",
        env = "VPNWARDEN_CONFIG_DIR",
        global = true
    )]
    pub config_dir: Option<PathBuf>,

    /// Subcommand to execute (starts the dashboard when omitted)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Query whether the VPN unit is active
    Status {
        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,
    },
    /// Start the VPN unit
    Start,
    /// Stop the VPN unit
    Stop,
    /// Print the unit's journal for the current boot
    Logs {
        /// Run journalctl through the configured privilege command
        #[arg(long)]
        privileged: bool,
    },
    /// List OpenVPN profiles in the detected config directory
    Profiles,
    /// Show config directory, detected OpenVPN layout, and service identity
    Info,
}
