//! Message system for the application.
//!
//! Every state mutation in [`crate::app::App`] goes through a [`Message`],
//! whether it comes from a key press, the tray menu, or a background worker
//! reporting back through the event channel.

use crate::core::{CommandResult, ServiceAction};

/// Direction for scrolling movement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollMove {
    Up,
    Down,
    PageUp,
    PageDown,
    Top,
    Bottom,
}

/// All messages that can modify application state.
#[derive(Debug, Clone)]
pub enum Message {
    // === Connection ===
    /// Start the VPN service
    Start,
    /// Stop the VPN service
    Stop,
    /// Start when disconnected, stop when connected
    Toggle,
    /// Query the service status now
    Refresh,

    // === UI Overlays ===
    /// Open the tray-style action menu
    OpenMenu,
    /// Open the settings editor
    OpenSettings,
    /// Save the settings editor draft
    SaveSettings,
    /// Open the service log viewer
    OpenLogs,
    /// Re-fetch the journal shown in the log viewer
    RefreshLogs,
    /// Close current overlay (menu, settings, logs, warning)
    CloseOverlay,
    /// Scroll current context
    Scroll(ScrollMove),

    // === System ===
    /// Quit, asking first while connected
    RequestQuit,
    /// Quit the application
    Quit,
    /// Periodic heartbeat tick
    Tick,
    /// Terminal resize event
    Resize(u16, u16),

    // === Background results ===
    /// Polling interval elapsed
    Poll,
    /// A service command finished
    ServiceFinished {
        action: ServiceAction,
        result: CommandResult,
    },
    /// Journal fetch finished
    JournalLoaded(CommandResult),
    /// Public IP lookup finished
    PublicIp(Option<String>),
}

/// An item in the action menu, mapping a key to a message.
#[derive(Debug, Clone)]
pub struct ActionMenuItem {
    /// The key that triggers this action
    pub key: &'static str,
    /// Human-readable label for the action
    pub label: &'static str,
    /// The message to dispatch
    pub message: Message,
}

/// Tray menu entries. The first entry follows the connection status.
pub fn tray_actions(connected: bool) -> Vec<ActionMenuItem> {
    let toggle = if connected {
        ActionMenuItem {
            key: "d",
            label: "Stop VPN",
            message: Message::Stop,
        }
    } else {
        ActionMenuItem {
            key: "s",
            label: "Start VPN",
            message: Message::Start,
        }
    };

    vec![
        toggle,
        ActionMenuItem {
            key: "e",
            label: "Settings",
            message: Message::OpenSettings,
        },
        ActionMenuItem {
            key: "l",
            label: "View Logs",
            message: Message::OpenLogs,
        },
        ActionMenuItem {
            key: "r",
            label: "Refresh Status",
            message: Message::Refresh,
        },
        ActionMenuItem {
            key: "q",
            label: "Quit",
            message: Message::RequestQuit,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tray_toggle_entry_follows_status() {
        let disconnected = tray_actions(false);
        assert_eq!(disconnected[0].label, "Start VPN");
        assert!(matches!(disconnected[0].message, Message::Start));

        let connected = tray_actions(true);
        assert_eq!(connected[0].label, "Stop VPN");
        assert!(matches!(connected[0].message, Message::Stop));
    }

    #[test]
    fn test_tray_keys_are_unique() {
        let actions = tray_actions(false);
        let mut keys: Vec<_> = actions.iter().map(|a| a.key).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), actions.len());
    }
}
