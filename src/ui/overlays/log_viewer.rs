//! Journal viewer overlay

use crate::constants;
use crate::state::LogViewerState;
use crate::theme;
use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};

/// Render the journal of the VPN unit
pub fn render(frame: &mut Frame, viewer: &LogViewerState) {
    let area = centered_percent_rect(85, 85, frame.area());

    // Clear the background
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::BORDER_FOCUSED))
        .title(format!(" {} - Journal ", viewer.unit))
        .title_bottom(Line::from(" [Esc] Close  [r] Reload  [↑/↓] Scroll  [g/G] Top/End ").centered());

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let content_area = Layout::vertical([
        Constraint::Length(1), // Public IP + position
        Constraint::Min(1),    // Journal
    ])
    .split(inner);

    let total_lines = viewer.line_count();
    let position = if viewer.content.is_some() {
        format!(" (line {}/{})", viewer.scroll + 1, total_lines.max(1))
    } else {
        String::new()
    };
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("Public IP: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                viewer.public_ip.clone(),
                Style::default()
                    .fg(theme::ACCENT_PRIMARY)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(position, Style::default().fg(Color::DarkGray)),
        ])),
        content_area[0],
    );

    let Some(content) = viewer.content.as_deref() else {
        frame.render_widget(
            Paragraph::new(constants::MSG_FETCHING).style(Style::default().fg(theme::TEXT_SECONDARY)),
            content_area[1],
        );
        return;
    };

    let lines: Vec<Line> = content.lines().map(highlight_journal_line).collect();
    frame.render_widget(
        Paragraph::new(lines)
            .style(Style::default().fg(theme::TEXT_PRIMARY))
            .scroll((viewer.scroll, 0)),
        content_area[1],
    );

    let scrollbar = Scrollbar::default()
        .orientation(ScrollbarOrientation::VerticalRight)
        .begin_symbol(Some("↑"))
        .end_symbol(Some("↓"))
        .style(Style::default().fg(theme::NORD_POLAR_NIGHT_4))
        .thumb_style(Style::default().fg(theme::ACCENT_PRIMARY));

    let mut scrollbar_state =
        ScrollbarState::new(usize::from(total_lines.saturating_sub(content_area[1].height)))
            .position(usize::from(viewer.scroll));

    // Scrollbar on the right border
    let scroll_area = Rect {
        x: area.right().saturating_sub(1),
        y: content_area[1].y,
        width: 1,
        height: content_area[1].height,
    };

    frame.render_stateful_widget(scrollbar, scroll_area, &mut scrollbar_state);
}

/// Colour a journal line by what OpenVPN reports in it.
fn highlight_journal_line(line: &str) -> Line<'static> {
    let lower = line.to_lowercase();

    let message_style = if line.starts_with("-- ") {
        Style::default().fg(Color::DarkGray)
    } else if lower.contains("initialization sequence completed") {
        Style::default()
            .fg(theme::SUCCESS)
            .add_modifier(Modifier::BOLD)
    } else if lower.contains("error") || lower.contains("fatal") || lower.contains("failed") {
        Style::default().fg(theme::ERROR)
    } else if lower.contains("warning") || lower.contains("restart") {
        Style::default().fg(theme::WARNING)
    } else {
        Style::default().fg(theme::TEXT_PRIMARY)
    };

    // `Mon DD HH:MM:SS host unit[pid]: message`
    match split_journal_prefix(line) {
        Some((prefix, message)) => Line::from(vec![
            Span::styled(prefix.to_string(), Style::default().fg(theme::TEXT_SECONDARY)),
            Span::styled(message.to_string(), message_style),
        ]),
        None => Line::from(Span::styled(line.to_string(), message_style)),
    }
}

/// Splits a short-format journal line after the `unit[pid]: ` tag.
fn split_journal_prefix(line: &str) -> Option<(&str, &str)> {
    let tag_end = line.find("]: ")? + 3;
    Some(line.split_at(tag_end))
}

/// Create a centered rectangle
fn centered_percent_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::vertical([Constraint::Percentage(percent_y)]).flex(Flex::Center);
    let horizontal = Layout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center);

    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_journal_prefix() {
        let line = "Oct 17 09:12:01 host openvpn[811]: Initialization Sequence Completed";
        let (prefix, message) = split_journal_prefix(line).unwrap();
        assert_eq!(prefix, "Oct 17 09:12:01 host openvpn[811]: ");
        assert_eq!(message, "Initialization Sequence Completed");
    }

    #[test]
    fn test_split_journal_prefix_plain_line() {
        assert!(split_journal_prefix("-- No entries --").is_none());
    }

    #[test]
    fn test_highlight_marks_completed_tunnel() {
        let line = highlight_journal_line("Oct 17 09:12:01 host openvpn[811]: Initialization Sequence Completed");
        assert_eq!(line.spans.len(), 2);
        assert_eq!(line.spans[1].style.fg, Some(theme::SUCCESS));
    }

    #[test]
    fn test_highlight_marks_errors() {
        let line = highlight_journal_line("Oct 17 09:12:01 host openvpn[811]: TLS Error: handshake failed");
        assert_eq!(line.spans[1].style.fg, Some(theme::ERROR));
    }
}
