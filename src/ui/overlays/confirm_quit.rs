//! Quit confirmation while the tunnel is up.

use super::centered_rect;
use crate::constants;
use crate::theme;
use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Render the yes/no dialog; `confirm_selected` highlights "Quit".
pub fn render(frame: &mut Frame, vpn_name: &str, confirm_selected: bool) {
    let popup_area = centered_rect(60, 9, frame.area());
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::WARNING))
        .title(format!(" {} ", constants::APP_TITLE));

    let yes_style = if confirm_selected {
        Style::default()
            .bg(theme::ROW_SELECTED_BG)
            .fg(theme::ROW_SELECTED_FG)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme::ROW_SELECTED_FG)
    };

    let no_style = if confirm_selected {
        Style::default().fg(theme::NORD_POLAR_NIGHT_4)
    } else {
        Style::default()
            .bg(theme::NORD_POLAR_NIGHT_4)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    };

    let text = vec![
        Line::from(vec![
            Span::raw("Tunnel "),
            Span::styled(
                vpn_name.to_string(),
                Style::default()
                    .fg(theme::ACCENT_PRIMARY)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" is up."),
        ]),
        Line::from(""),
        Line::from(constants::MSG_QUIT_CONFIRM),
        Line::from(""),
        Line::from(vec![
            Span::styled(" [Y] Quit ", yes_style),
            Span::raw("    "),
            Span::styled(" [N] Stay ", no_style),
        ]),
    ];

    frame.render_widget(
        Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        popup_area,
    );
}
