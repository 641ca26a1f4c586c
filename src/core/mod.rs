//! Service supervision core.
//!
//! - `runner`: single-flight external command execution
//! - `service`: start/stop/status command lines for the VPN unit
//! - `machine`: connection state machine and its side-effect rules
//! - `poller`: fixed-interval status polling
//! - `detect`: OpenVPN version sniffing and profile discovery
//! - `journal`: journal retrieval for the log viewer
//! - `public_ip`: public address lookup for the log viewer

pub mod detect;
pub mod journal;
pub mod machine;
pub mod poller;
pub mod public_ip;
pub mod runner;
pub mod service;

pub use machine::{ConnectionStateMachine, Effect, NotifyIcon, Policy};
pub use runner::{CommandResult, CommandRunner};
pub use service::{ServiceAction, ServiceController, ServiceIdentity};
