//! UI state types.

use std::time::Instant;

use super::SettingsForm;
use crate::constants;

/// Types of toast notifications for color coding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ToastType {
    /// Informational message (Blue)
    #[default]
    Info,
    /// Success message (Green)
    Success,
    /// Warning message (Yellow)
    Warning,
    /// Error message (Red)
    Error,
}

/// Toast notification for temporary messages.
#[derive(Clone, Debug)]
pub struct Toast {
    /// Message to display.
    pub message: String,
    /// Type of toast for styling.
    #[allow(clippy::struct_field_names)]
    pub toast_type: ToastType,
    /// When the toast should disappear.
    pub expires: Instant,
}

impl Toast {
    pub fn new(message: impl Into<String>, toast_type: ToastType) -> Self {
        Self {
            message: message.into(),
            toast_type,
            expires: Instant::now() + constants::TOAST_DURATION,
        }
    }

    /// Check if the toast notification has expired
    pub fn is_expired(&self) -> bool {
        Instant::now() > self.expires
    }
}

/// Journal viewer contents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogViewerState {
    /// Unit the journal belongs to.
    pub unit: String,
    /// Journal text, or `None` while a fetch is outstanding.
    pub content: Option<String>,
    pub scroll: u16,
    pub public_ip: String,
}

impl LogViewerState {
    pub fn new(unit: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            content: None,
            scroll: 0,
            public_ip: constants::MSG_FETCHING.to_string(),
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn line_count(&self) -> u16 {
        self.content
            .as_deref()
            .map_or(0, |c| c.lines().count().min(u16::MAX as usize) as u16)
    }

    /// Scrolls to the last page of a view `height` lines tall.
    pub fn scroll_to_end(&mut self, height: u16) {
        self.scroll = self.line_count().saturating_sub(height);
    }
}

/// Modal layer on top of the dashboard. One is shown at a time; a settings
/// editor or log viewer can wait underneath a raised one.
#[derive(Clone, Debug, Default)]
pub enum Overlay {
    #[default]
    None,
    /// Tray-style action menu.
    Menu,
    /// Settings editor.
    Settings(SettingsForm),
    /// Journal viewer.
    LogViewer(LogViewerState),
    /// Disconnect warning; must be acknowledged.
    Warning { title: String, message: String },
    /// Quit while connected.
    ConfirmQuit {
        /// Is "Yes" selected?
        confirm_selected: bool,
    },
}

impl Overlay {
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}
