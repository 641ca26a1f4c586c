//! Domain state types.
//!
//! - `connection`: connection status of the supervised unit
//! - `settings_form`: settings editor draft
//! - `ui`: overlays and toasts

mod connection;
mod settings_form;
mod ui;

pub use connection::ConnectionStatus;
pub use settings_form::{SettingsField, SettingsForm};
pub use ui::{LogViewerState, Overlay, Toast, ToastType};
