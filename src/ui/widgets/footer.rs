//! Footer widget with context-aware keybinding hints

use crate::app::App;
use crate::state::Overlay;
use crate::theme;
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Render dashboard footer with the shortcuts of whatever has focus
pub fn render_dashboard(frame: &mut Frame, app: &App, area: Rect) {
    render_hints(frame, area, &hints_for(app));
}

fn hints_for(app: &App) -> Vec<(&'static str, &'static str)> {
    match &app.overlay {
        Overlay::Menu => vec![("↑↓", "Move"), ("Enter", "Select"), ("Esc", "Close")],
        Overlay::Settings(_) => vec![
            ("↑↓", "Field"),
            ("←→", "Pick"),
            ("Space", "Toggle"),
            ("Enter", "Save"),
            ("Esc", "Cancel"),
        ],
        Overlay::LogViewer(_) => vec![
            ("↑↓", "Scroll"),
            ("g", "Top"),
            ("G", "End"),
            ("r", "Reload"),
            ("Esc", "Close"),
        ],
        Overlay::Warning { .. } => vec![("Enter", "OK")],
        Overlay::ConfirmQuit { .. } => vec![("y", "Quit"), ("n", "Stay")],
        Overlay::None => {
            let toggle = if app.machine.is_connected() {
                ("d", "Disconnect")
            } else {
                ("s", "Connect")
            };
            vec![
                toggle,
                ("x", "Menu"),
                ("e", "Settings"),
                ("l", "Logs"),
                ("r", "Refresh"),
                ("q", "Quit"),
            ]
        }
    }
}

fn render_hints(frame: &mut Frame, area: Rect, hints: &[(&str, &str)]) {
    let chunks = Layout::horizontal([
        Constraint::Min(0),     // Hints (left)
        Constraint::Length(18), // Branding (right)
    ])
    .split(area);

    let mut hint_spans = vec![Span::raw(" ")];
    let mut current_width = 1;
    let max_width = chunks[0].width as usize;

    for (i, (key, action)) in hints.iter().enumerate() {
        // " │ " separator after the first item
        let sep_width = if i > 0 { 3 } else { 0 };
        let item_width = key.chars().count() + 1 + action.len() + sep_width;

        if current_width + item_width > max_width {
            break;
        }

        if i > 0 {
            hint_spans.push(Span::styled(" │ ", Style::default().fg(theme::BORDER_DEFAULT)));
        }
        hint_spans.push(Span::styled(
            *key,
            Style::default()
                .fg(theme::ACCENT_PRIMARY)
                .add_modifier(Modifier::BOLD),
        ));
        hint_spans.push(Span::raw(" "));
        hint_spans.push(Span::styled(*action, Style::default().fg(Color::DarkGray)));

        current_width += item_width;
    }
    frame.render_widget(Paragraph::new(Line::from(hint_spans)), chunks[0]);

    let branding = Line::from(Span::styled(
        format!(
            "{} v{} ",
            crate::constants::APP_NAME,
            crate::constants::APP_VERSION
        ),
        Style::default().fg(theme::NORD_POLAR_NIGHT_4),
    ));
    frame.render_widget(
        Paragraph::new(branding).alignment(Alignment::Right),
        chunks[1],
    );
}
