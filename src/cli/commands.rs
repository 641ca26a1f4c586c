//! CLI command handlers.
//!
//! Each command runs the same service commands the dashboard uses, but
//! blocking on the calling thread, and exits.

use std::path::Path;

use color_eyre::Result;
use serde::Serialize;

use crate::cli::args::Commands;
use crate::config::{AppSettings, SettingsStore, TomlSettingsStore};
use crate::constants;
use crate::core::detect::{self, Capabilities};
use crate::core::{journal, CommandResult, CommandRunner, ServiceAction, ServiceController};

/// Exit status of `status` when the unit is not active (as `systemctl is-active`).
const EXIT_INACTIVE: i32 = 3;

/// Handles CLI commands that don't require the TUI.
///
/// Returns `true` if the command was handled and the program should exit,
/// or `false` if the TUI should be started.
pub fn handle_command(
    command: &Commands,
    settings: &AppSettings,
    config_dir: &Path,
    config_source: &str,
) -> Result<bool> {
    match command {
        Commands::Status { json } => handle_status(settings, *json)?,
        Commands::Start => handle_service(settings, ServiceAction::Start),
        Commands::Stop => handle_service(settings, ServiceAction::Stop),
        Commands::Logs { privileged } => handle_logs(settings, *privileged),
        Commands::Profiles => handle_profiles(settings),
        Commands::Info => handle_info(settings, config_dir, config_source),
    }
    Ok(true)
}

/// Detects capabilities and builds a controller on real processes.
fn session(settings: &AppSettings) -> (ServiceController, Capabilities) {
    let runner = CommandRunner::system();
    let caps = detect::detect(&runner);
    let identity = detect::build_identity(settings, &caps);
    (
        ServiceController::new(identity, settings.service_manager.clone(), runner),
        caps,
    )
}

/// Exits with an error when no profile is configured.
fn require_profile(controller: &ServiceController) {
    if !controller.identity().is_configured() {
        eprintln!("{}{}", constants::CLI_MSG_ERROR, constants::CLI_MSG_NO_VPN_NAME);
        std::process::exit(1);
    }
}

/// `status --json` payload.
#[derive(Debug, Serialize, PartialEq, Eq)]
struct StatusReport {
    vpn_name: String,
    unit: String,
    connected: bool,
    state: String,
    exit_code: Option<i32>,
    openvpn_version: String,
}

impl StatusReport {
    fn new(controller: &ServiceController, caps: &Capabilities, result: &CommandResult) -> Self {
        let identity = controller.identity();
        Self {
            vpn_name: identity.vpn_name.clone(),
            unit: identity.unit_name(),
            connected: result.success(),
            state: if result.completed_normally {
                result.output.trim().to_string()
            } else {
                "unknown".to_string()
            },
            exit_code: result.exit_code,
            openvpn_version: caps.version_label(),
        }
    }

    fn label(&self) -> &'static str {
        if self.connected {
            "CONNECTED"
        } else {
            "DISCONNECTED"
        }
    }
}

fn handle_status(settings: &AppSettings, json: bool) -> Result<()> {
    let (controller, caps) = session(settings);
    require_profile(&controller);

    let result = controller.run_blocking(ServiceAction::Status);
    let report = StatusReport::new(&controller, &caps, &result);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{} ({})", report.label(), report.unit);
    }

    if !report.connected {
        std::process::exit(EXIT_INACTIVE);
    }
    Ok(())
}

fn handle_service(settings: &AppSettings, action: ServiceAction) {
    let (controller, _) = session(settings);
    require_profile(&controller);

    let unit = controller.identity().unit_name();
    let prefix = match action {
        ServiceAction::Start => constants::MSG_CONNECTING,
        _ => constants::MSG_DISCONNECTING,
    };
    println!("{prefix}{}", controller.identity().vpn_name);

    let result = controller.run_blocking(action);
    if result.success() {
        crate::log_info!("SERVICE", "{action} {unit}: ok");
        return;
    }

    let output = result.output.trim();
    if !output.is_empty() {
        eprintln!("{output}");
    }
    eprintln!(
        "{}Failed to {action} {unit} ({})",
        constants::CLI_MSG_ERROR,
        result.describe()
    );
    std::process::exit(1);
}

fn handle_logs(settings: &AppSettings, privileged: bool) {
    let (controller, _) = session(settings);
    require_profile(&controller);

    let argv = journal::journal_argv(controller.identity(), privileged);
    let result = CommandRunner::system().run_blocking(&argv);
    println!("{}", journal::journal_text(&result));
    if !result.completed_normally {
        std::process::exit(1);
    }
}

/// One line per profile; the configured one is marked with `*`.
fn format_profiles(profiles: &[String], current: &str) -> Vec<String> {
    profiles
        .iter()
        .map(|name| {
            let marker = if name == current { '*' } else { ' ' };
            format!("{marker} {name}")
        })
        .collect()
}

fn handle_profiles(settings: &AppSettings) {
    let caps = detect::detect(&CommandRunner::system());
    let profiles = detect::list_profiles(&caps.config_dir);

    if profiles.is_empty() {
        eprintln!("{}{}", constants::CLI_MSG_NO_PROFILES, caps.config_dir.display());
        std::process::exit(1);
    }
    for line in format_profiles(&profiles, settings.vpn_name.trim()) {
        println!("{line}");
    }
}

fn handle_info(settings: &AppSettings, config_dir: &Path, config_source: &str) {
    let (controller, caps) = session(settings);
    let identity = controller.identity();
    let store = TomlSettingsStore::new(config_dir);
    let profile_count = detect::list_profiles(&caps.config_dir).len();

    println!("{} v{}", constants::APP_NAME, constants::APP_VERSION);
    println!();
    println!("  Config dir:     {} ({config_source})", config_dir.display());
    println!(
        "  Config file:    {}{}",
        store.location(),
        if store.path().exists() { "" } else { " (defaults)" }
    );
    println!("  OpenVPN:        {}", caps.version_label());
    println!(
        "  Profiles:       {} ({profile_count} found)",
        caps.config_dir.display()
    );
    println!(
        "  Unit:           {}",
        if identity.is_configured() {
            identity.unit_name()
        } else {
            format!("{}@<unset>", identity.service_template)
        }
    );
    println!(
        "  Privilege:      {}",
        identity.privilege_prefix().unwrap_or("none")
    );
    println!("  Poll interval:  {}s", settings.poll_duration().as_secs());
}
