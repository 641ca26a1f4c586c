//! Desktop-style notification popup.
//!
//! Toasts stand in for the tray balloon: they sit in the top-right corner
//! under an application title and expire on their own.

use crate::app::App;
use crate::constants;
use crate::state::ToastType;
use crate::theme;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Render toast notification
pub fn render(frame: &mut Frame, app: &App) {
    let Some(ref toast) = app.toast else {
        return;
    };

    let area = frame.area();
    let width = (area.width / 3).clamp(30, 50).min(area.width);
    let inner_width = usize::from(width.saturating_sub(4)).max(1);
    let text_lines = wrapped_height(&toast.message, inner_width);
    let height = (text_lines + 2).min(area.height);

    let toast_area = Rect {
        x: area.right().saturating_sub(width + 1),
        y: area.y + 1,
        width,
        height,
    };

    frame.render_widget(Clear, toast_area);

    let (label, color) = style_for(toast.toast_type);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(Line::from(vec![
            Span::styled(
                format!(" {label} "),
                Style::default()
                    .fg(Color::Black)
                    .bg(color)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" {} ", constants::APP_TITLE),
                Style::default().fg(theme::TEXT_SECONDARY),
            ),
        ]))
        .title_bottom(Line::from(Span::styled(" Esc ", Style::default().fg(Color::DarkGray))).right_aligned());

    let paragraph = Paragraph::new(toast.message.clone())
        .block(block)
        .style(Style::default().fg(theme::TEXT_PRIMARY))
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, toast_area);
}

const fn style_for(toast_type: ToastType) -> (&'static str, Color) {
    match toast_type {
        ToastType::Info => ("INFO", theme::ACCENT_PRIMARY),
        ToastType::Success => ("SUCCESS", theme::SUCCESS),
        ToastType::Warning => ("WARNING", theme::WARNING),
        ToastType::Error => ("ERROR", theme::ERROR),
    }
}

/// Rows needed for `message` at `width` columns, at least one.
#[allow(clippy::cast_possible_truncation)]
fn wrapped_height(message: &str, width: usize) -> u16 {
    let rows = message.chars().count().div_ceil(width).max(1);
    rows.min(usize::from(u16::MAX)) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapped_height() {
        assert_eq!(wrapped_height("", 10), 1);
        assert_eq!(wrapped_height("0123456789", 10), 1);
        assert_eq!(wrapped_height("0123456789a", 10), 2);
    }

    #[test]
    fn test_style_for_warning() {
        assert_eq!(style_for(ToastType::Warning), ("WARNING", theme::WARNING));
    }
}
