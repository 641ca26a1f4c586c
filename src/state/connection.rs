//! VPN connection status types.

use std::time::SystemTime;

/// Connection status of the supervised unit.
///
/// `since` is the moment the user-initiated start was issued. A connection
/// discovered by polling (not started from here) has no `since`; no connect
/// time is guessed for it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    /// Unit inactive, failed, or status unknown.
    #[default]
    Disconnected,
    /// Unit active.
    Connected {
        /// When the start command that produced this connection was issued.
        since: Option<SystemTime>,
    },
}

impl ConnectionStatus {
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        matches!(self, Self::Connected { .. })
    }

    #[must_use]
    pub const fn since(&self) -> Option<SystemTime> {
        match self {
            Self::Connected { since } => *since,
            Self::Disconnected => None,
        }
    }

    /// Upper-case label shown in the status card.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Connected { .. } => "CONNECTED",
            Self::Disconnected => "DISCONNECTED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_disconnected() {
        assert_eq!(ConnectionStatus::default(), ConnectionStatus::Disconnected);
        assert!(!ConnectionStatus::default().is_connected());
    }

    #[test]
    fn test_since_only_when_connected() {
        let now = SystemTime::now();
        assert_eq!(ConnectionStatus::Connected { since: Some(now) }.since(), Some(now));
        assert_eq!(ConnectionStatus::Connected { since: None }.since(), None);
        assert_eq!(ConnectionStatus::Disconnected.since(), None);
    }

    #[test]
    fn test_labels() {
        assert_eq!(ConnectionStatus::Connected { since: None }.label(), "CONNECTED");
        assert_eq!(ConnectionStatus::Disconnected.label(), "DISCONNECTED");
    }
}
