//! UI rendering module

mod dashboard;
mod overlays;
mod widgets;

use crate::app::App;
use crate::state::Overlay;
use ratatui::Frame;

/// Main render function - dispatches to appropriate view
pub fn render(frame: &mut Frame, app: &mut App) {
    // Base view
    dashboard::render(frame, app);

    // The menu keeps its selection in `app`, so it needs the mutable borrow
    if matches!(app.overlay, Overlay::Menu) {
        overlays::action_menu::render(frame, app);
    } else {
        render_overlay(frame, app);
    }

    // Notifications stay on top of everything
    if app.toast.is_some() {
        overlays::toast::render(frame, app);
    }
}

fn render_overlay(frame: &mut Frame, app: &App) {
    match &app.overlay {
        Overlay::None | Overlay::Menu => {}
        Overlay::Settings(form) => overlays::settings::render(frame, form),
        Overlay::LogViewer(viewer) => overlays::log_viewer::render(frame, viewer),
        Overlay::Warning { title, message } => overlays::warning::render(frame, title, message),
        Overlay::ConfirmQuit { confirm_selected } => {
            overlays::confirm_quit::render(frame, app.machine.vpn_name(), *confirm_selected);
        }
    }
}
