//! Tray menu overlay.
//!
//! Popup opened with `x`: the tray tooltip on top, then the tray actions.
//! The first action follows the connection (Start VPN / Stop VPN).

use super::centered_rect;
use crate::app::App;
use crate::constants;
use crate::message::tray_actions;
use crate::theme;
use ratatui::{
    layout::{Constraint, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Frame,
};

/// Render the tray menu overlay
#[allow(clippy::cast_possible_truncation)]
pub fn render(frame: &mut Frame, app: &mut App) {
    let connected = app.machine.is_connected();
    let items = tray_actions(connected);
    let tooltip = app.machine.tooltip();
    let tooltip_lines: Vec<&str> = tooltip.lines().collect();

    let max_label_len = items.iter().map(|i| i.label.len()).max().unwrap_or(20);
    let max_tooltip_len = tooltip_lines
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0);
    let menu_width = (max_label_len + 10).max(max_tooltip_len + 4).min(60) as u16;
    // tooltip + separator + items + borders
    let menu_height = (tooltip_lines.len() + 1 + items.len() + 2) as u16;

    let area = centered_rect(menu_width, menu_height, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::BORDER_FOCUSED))
        .title(format!(" {} ", constants::APP_TITLE));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [header, separator, body] = Layout::vertical([
        Constraint::Length(tooltip_lines.len() as u16),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .areas(inner);

    let status_color = if connected {
        theme::SUCCESS
    } else {
        theme::ERROR
    };
    let header_lines: Vec<Line> = tooltip_lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let style = if i == 0 {
                Style::default().fg(status_color).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme::TEXT_SECONDARY)
            };
            Line::from(Span::styled(format!(" {line}"), style))
        })
        .collect();
    frame.render_widget(Paragraph::new(header_lines), header);
    frame.render_widget(
        Paragraph::new("─".repeat(separator.width as usize))
            .style(Style::default().fg(theme::BORDER_DEFAULT)),
        separator,
    );

    let list_items: Vec<ListItem> = items
        .iter()
        .map(|item| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!(" {} ", item.key),
                    Style::default()
                        .fg(theme::ACCENT_PRIMARY)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(" "),
                Span::styled(item.label, Style::default().fg(theme::TEXT_PRIMARY)),
            ]))
        })
        .collect();

    let list = List::new(list_items)
        .highlight_style(
            Style::default()
                .bg(theme::ROW_SELECTED_BG)
                .fg(theme::ROW_SELECTED_FG)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");
    frame.render_stateful_widget(list, body, &mut app.action_menu_state);
}
