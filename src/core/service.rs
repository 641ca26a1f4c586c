//! Service-manager command lines for one VPN unit instance.
//!
//! Every action targets `<template>@<vpn_name>` through the service manager
//! (`systemctl` by default). Start and stop may be prefixed with a privilege
//! command; status queries never are.

use crate::constants;
use crate::core::runner::{CommandResult, CommandRunner};

/// Per-session description of the supervised unit.
///
/// Built once at startup and rebuilt whenever settings are saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceIdentity {
    pub vpn_name: String,
    pub service_template: String,
    pub privilege_command: Option<String>,
    pub use_privilege: bool,
}

impl ServiceIdentity {
    /// `openvpn-client@office`
    #[must_use]
    pub fn unit_name(&self) -> String {
        format!("{}@{}", self.service_template, self.vpn_name)
    }

    /// Whether a profile has been chosen.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.vpn_name.trim().is_empty()
    }

    /// Privilege prefix for elevated commands, if escalation is enabled.
    ///
    /// An empty or missing configured command falls back to `sudo`.
    #[must_use]
    pub fn privilege_prefix(&self) -> Option<&str> {
        if !self.use_privilege {
            return None;
        }
        let configured = self
            .privilege_command
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty());
        Some(configured.unwrap_or(constants::DEFAULT_PRIVILEGE_COMMAND))
    }
}

/// Action against the unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceAction {
    Start,
    Stop,
    Status,
}

impl ServiceAction {
    /// Service-manager verb.
    #[must_use]
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Status => "is-active",
        }
    }

    /// Whether the action may carry the privilege prefix.
    #[must_use]
    pub const fn elevated(self) -> bool {
        matches!(self, Self::Start | Self::Stop)
    }
}

impl std::fmt::Display for ServiceAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.verb())
    }
}

/// Issues start/stop/status commands for a [`ServiceIdentity`] through a
/// shared single-flight [`CommandRunner`].
pub struct ServiceController {
    identity: ServiceIdentity,
    manager: String,
    runner: CommandRunner,
}

impl ServiceController {
    pub fn new(identity: ServiceIdentity, manager: impl Into<String>, runner: CommandRunner) -> Self {
        Self {
            identity,
            manager: manager.into(),
            runner,
        }
    }

    pub fn identity(&self) -> &ServiceIdentity {
        &self.identity
    }

    pub fn set_identity(&mut self, identity: ServiceIdentity) {
        self.identity = identity;
    }

    pub fn set_manager(&mut self, manager: impl Into<String>) {
        self.manager = manager.into();
    }

    /// Whether a command is currently occupying the runner.
    pub fn is_busy(&self) -> bool {
        self.runner.is_busy()
    }

    /// Frees the runner after a dispatched result has been handled.
    pub fn release(&self) {
        self.runner.release();
    }

    /// `[<privilege>] <manager> <verb> <template>@<vpn_name>`
    #[must_use]
    pub fn argv(&self, action: ServiceAction) -> Vec<String> {
        let mut argv = Vec::with_capacity(4);
        if action.elevated() {
            if let Some(prefix) = self.identity.privilege_prefix() {
                argv.push(prefix.to_string());
            }
        }
        argv.push(self.manager.clone());
        argv.push(action.verb().to_string());
        argv.push(self.identity.unit_name());
        argv
    }

    /// Runs `action` in the background; `false` when dropped by single-flight.
    ///
    /// The slot stays taken after the command exits. The caller frees it
    /// with [`release`](Self::release) once the result has been applied.
    pub fn dispatch<F>(&self, action: ServiceAction, on_complete: F) -> bool
    where
        F: FnOnce(CommandResult) + Send + 'static,
    {
        let accepted = self
            .runner
            .run_until_released(self.argv(action), move |_, result| on_complete(result));
        if accepted {
            crate::log_debug!("SERVICE", "Issued {action} for {}", self.identity.unit_name());
        }
        accepted
    }

    pub fn start<F>(&self, on_complete: F) -> bool
    where
        F: FnOnce(CommandResult) + Send + 'static,
    {
        self.dispatch(ServiceAction::Start, on_complete)
    }

    pub fn stop<F>(&self, on_complete: F) -> bool
    where
        F: FnOnce(CommandResult) + Send + 'static,
    {
        self.dispatch(ServiceAction::Stop, on_complete)
    }

    pub fn query_status<F>(&self, on_complete: F) -> bool
    where
        F: FnOnce(CommandResult) + Send + 'static,
    {
        self.dispatch(ServiceAction::Status, on_complete)
    }

    /// Runs `action` on the calling thread (CLI use).
    pub fn run_blocking(&self, action: ServiceAction) -> CommandResult {
        self.runner.run_blocking(&self.argv(action))
    }
}
