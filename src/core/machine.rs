//! Connection state machine.
//!
//! Converts command results into [`ConnectionStatus`] transitions and decides
//! which user-facing side effects follow. The machine never runs commands
//! itself: it returns [`Effect`]s for the shell to carry out, which keeps
//! every rule testable without processes.
//!
//! Rules:
//! - a status poll with exit 0 means connected; anything else (non-zero
//!   exit, launch failure) means disconnected
//! - a routine poll never resets `since` or re-announces a connection
//! - only a poll-detected Connected -> Disconnected transition can warn; a
//!   successful user stop suppresses the warning for its own transition
//! - the first completed poll consumes the auto-connect chance, whatever
//!   its outcome

use std::time::SystemTime;

use crate::constants;
use crate::core::runner::CommandResult;
use crate::state::ConnectionStatus;

/// Icon hint for desktop-style notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyIcon {
    Active,
    Disabled,
}

/// Side effect requested by the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Fire-and-forget notification.
    Notify {
        title: String,
        message: String,
        icon: NotifyIcon,
    },
    /// Modal warning the user must acknowledge.
    ShowWarning { title: String, message: String },
    /// Open the service log viewer.
    OpenLogViewer,
    /// Issue a start command as if the user had asked for it.
    StartService,
}

/// User preferences the machine consults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Policy {
    pub show_warning: bool,
    pub show_log: bool,
    pub auto_connect: bool,
}

impl From<&crate::config::AppSettings> for Policy {
    fn from(settings: &crate::config::AppSettings) -> Self {
        Self {
            show_warning: settings.show_warning,
            show_log: settings.show_log,
            auto_connect: settings.auto_connect,
        }
    }
}

/// Owner of the connection status; mutated only from the event loop.
#[derive(Debug, Clone)]
pub struct ConnectionStateMachine {
    status: ConnectionStatus,
    first_run_pending: bool,
    was_ever_connected: bool,
    /// Issue time of the start command whose result is outstanding.
    pending_start: Option<SystemTime>,
    /// Start again once the outstanding stop succeeds.
    restart_pending: bool,
    vpn_name: String,
    policy: Policy,
}

impl ConnectionStateMachine {
    pub fn new(vpn_name: impl Into<String>, policy: Policy) -> Self {
        Self {
            status: ConnectionStatus::Disconnected,
            first_run_pending: true,
            was_ever_connected: false,
            pending_start: None,
            restart_pending: false,
            vpn_name: vpn_name.into(),
            policy,
        }
    }

    pub const fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub const fn is_connected(&self) -> bool {
        self.status.is_connected()
    }

    /// True until the first status poll completes.
    pub const fn first_run_pending(&self) -> bool {
        self.first_run_pending
    }

    pub const fn was_ever_connected(&self) -> bool {
        self.was_ever_connected
    }

    pub const fn policy(&self) -> Policy {
        self.policy
    }

    pub fn vpn_name(&self) -> &str {
        &self.vpn_name
    }

    pub fn set_policy(&mut self, policy: Policy) {
        self.policy = policy;
    }

    pub fn set_vpn_name(&mut self, vpn_name: impl Into<String>) {
        self.vpn_name = vpn_name.into();
    }

    /// Ask for a start to follow the next successful stop.
    pub fn request_restart(&mut self) {
        self.restart_pending = true;
    }

    /// Tray-style tooltip: `CONNECTED to office` (plus clock) or `DISCONNECTED`.
    #[must_use]
    pub fn tooltip(&self) -> String {
        match self.status {
            ConnectionStatus::Connected { since: Some(since) } => format!(
                "CONNECTED to {}\nsince {}",
                self.vpn_name,
                crate::utils::format_clock(since)
            ),
            ConnectionStatus::Connected { since: None } => format!("CONNECTED to {}", self.vpn_name),
            ConnectionStatus::Disconnected => "DISCONNECTED".to_string(),
        }
    }

    /// A start command was accepted by the runner at `now`.
    ///
    /// The notification is optimistic: it is not retracted if the start fails.
    pub fn on_start_issued(&mut self, now: SystemTime) -> Vec<Effect> {
        self.pending_start = Some(now);
        vec![Effect::Notify {
            title: constants::APP_TITLE.to_string(),
            message: format!("{}{}", constants::MSG_CONNECTING, self.vpn_name),
            icon: NotifyIcon::Active,
        }]
    }

    /// A stop command was accepted by the runner.
    pub fn on_stop_issued(&mut self) -> Vec<Effect> {
        vec![Effect::Notify {
            title: constants::APP_TITLE.to_string(),
            message: format!("{}{}", constants::MSG_DISCONNECTING, self.vpn_name),
            icon: NotifyIcon::Disabled,
        }]
    }

    /// Result of a start command.
    pub fn on_start_result(&mut self, result: &CommandResult, now: SystemTime) -> Vec<Effect> {
        let issued_at = self.pending_start.take();
        if !result.success() {
            crate::log_warning!("STATE", "Start of {} failed ({})", self.vpn_name, result.describe());
            return Vec::new();
        }

        self.status = ConnectionStatus::Connected {
            since: Some(issued_at.unwrap_or(now)),
        };
        self.was_ever_connected = true;
        crate::log_info!("STATE", "Connected to {}", self.vpn_name);

        if self.policy.show_log {
            vec![Effect::OpenLogViewer]
        } else {
            Vec::new()
        }
    }

    /// Result of a stop command.
    pub fn on_stop_result(&mut self, result: &CommandResult) -> Vec<Effect> {
        let restart = std::mem::take(&mut self.restart_pending);
        if !result.success() {
            crate::log_warning!("STATE", "Stop of {} failed ({})", self.vpn_name, result.describe());
            return Vec::new();
        }

        let mut effects = self.apply_status(false, true);
        crate::log_info!("STATE", "Disconnected from {}", self.vpn_name);
        if restart {
            effects.push(Effect::StartService);
        }
        effects
    }

    /// Result of a periodic (or manual) status query.
    pub fn on_status_result(&mut self, result: &CommandResult) -> Vec<Effect> {
        let first_run = std::mem::replace(&mut self.first_run_pending, false);
        let active = result.success();

        let mut effects = self.apply_status(active, false);

        if first_run && !active && self.policy.auto_connect {
            crate::log_info!("STATE", "Auto-connecting to {}", self.vpn_name);
            effects.push(Effect::StartService);
        }
        effects
    }

    fn apply_status(&mut self, active: bool, suppress_warning: bool) -> Vec<Effect> {
        let previously_connected = self.status.is_connected();

        if active {
            if !previously_connected {
                crate::log_info!("STATE", "{} is active", self.vpn_name);
                self.status = ConnectionStatus::Connected { since: None };
            }
            self.was_ever_connected = true;
            return Vec::new();
        }

        self.status = ConnectionStatus::Disconnected;
        if previously_connected && !suppress_warning {
            crate::log_warning!("STATE", "Lost connection to {}", self.vpn_name);
            if self.policy.show_warning {
                return vec![Effect::ShowWarning {
                    title: constants::MSG_WARNING_TITLE.to_string(),
                    message: constants::MSG_WARNING_DISCONNECTED.to_string(),
                }];
            }
        }
        Vec::new()
    }
}
