//! Application-wide constants and configuration values.
//!
//! This module defines the static values used throughout vpnwarden,
//! including timing intervals, service-manager commands, OpenVPN layout
//! paths, and user-facing messages.

use std::time::Duration;

// === Application Metadata ===

/// Application name (from Cargo.toml).
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
/// Current application version (from Cargo.toml).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
/// Title used for notifications and dialogs.
pub const APP_TITLE: &str = "vpnwarden";

// === Timing Configuration ===

/// UI refresh rate in milliseconds.
pub const DEFAULT_TICK_RATE: u64 = 250;
/// Interval between service status queries, in seconds.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
/// How long toast notifications stay on screen.
pub const TOAST_DURATION: Duration = Duration::from_secs(4);

// === Logging ===

/// Default number of entries kept by the in-memory logger.
pub const DEFAULT_MAX_LOG_ENTRIES: usize = 500;
/// Default minimum log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";
/// Column width of the category in the activity panel.
pub const LOG_CATEGORY_WIDTH: usize = 8;
/// Width of `[HH:MM:SS] LEVEL CATEGORY ` ahead of each activity message.
pub const LOG_PREFIX_WIDTH: usize = 11 + 6 + LOG_CATEGORY_WIDTH + 1 + 2;

// === Service Manager ===

/// Service manager binary used to control the VPN unit.
pub const DEFAULT_SERVICE_MANAGER: &str = "systemctl";
/// Journal reader used by the log viewer.
pub const JOURNAL_COMMAND: &str = "journalctl";
/// Privilege command used when privilege escalation is on but none is configured.
pub const DEFAULT_PRIVILEGE_COMMAND: &str = "sudo";
/// Privilege commands offered by the settings editor, in cycle order.
pub const PRIVILEGE_COMMANDS: [&str; 5] = ["sudo", "pkexec", "kdesu", "kdesudo", "gksu"];

// === OpenVPN Layout ===

/// OpenVPN binary run during capability detection.
pub const OPENVPN_BINARY: &str = "openvpn";
/// First OpenVPN release that ships the `openvpn-client@` unit.
pub const OPENVPN_MODERN_VERSION: (u32, u32) = (2, 4);
/// Unit template for OpenVPN >= 2.4.
pub const TEMPLATE_MODERN: &str = "openvpn-client";
/// Unit template for older OpenVPN releases.
pub const TEMPLATE_LEGACY: &str = "openvpn";
/// Profile directory for OpenVPN >= 2.4.
pub const CONFIG_DIR_MODERN: &str = "/etc/openvpn/client";
/// Profile directory for older OpenVPN releases.
pub const CONFIG_DIR_LEGACY: &str = "/etc/openvpn";
/// Extension of OpenVPN profile files.
pub const PROFILE_EXTENSION: &str = "conf";

// === Public IP Lookup ===

/// Endpoints returning the caller's public IP as plain text (tried in order).
pub const PUBLIC_IP_APIS: [&str; 3] = [
    "https://api.ipify.org",
    "https://icanhazip.com",
    "https://ifconfig.me/ip",
];
/// Timeout for a single public IP request in seconds.
pub const API_TIMEOUT_SECS: u8 = 5;

// === User Messages ===

pub const MSG_CONNECTING: &str = "Connecting to ";
pub const MSG_DISCONNECTING: &str = "Disconnecting from ";
pub const MSG_WARNING_TITLE: &str = "vpnwarden - Warning";
pub const MSG_WARNING_DISCONNECTED: &str = "You have been disconnected from VPN!";
pub const MSG_QUIT_CONFIRM: &str =
    "You are still connected to VPN! Quit anyway? The VPN service keeps running in the background.";
pub const MSG_NO_PROFILE: &str = "No VPN profile selected. Open settings with [e].";
pub const MSG_NO_DATA: &str = "---";
pub const MSG_FETCHING: &str = "Fetching...";

// === CLI Output ===

pub const CLI_MSG_NO_PROFILES: &str = "No OpenVPN profiles found in ";
pub const CLI_MSG_ERROR: &str = "Error: ";
pub const CLI_MSG_NO_VPN_NAME: &str = "No VPN profile configured. Set `vpn_name` in config.toml.";
