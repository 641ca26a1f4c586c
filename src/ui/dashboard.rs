//! Dashboard: status header, connection card and activity log.

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::widgets;
use crate::app::App;
use crate::constants;
use crate::logger;
use crate::state::ConnectionStatus;
use crate::theme;
use crate::utils;

/// Render the dashboard view
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // 1. Status header (1 row)
    // 2. Main content (flexible)
    // 3. Command footer (1 row)
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .split(area);

    render_header(frame, app, chunks[0]);
    widgets::footer::render_dashboard(frame, app, chunks[2]);

    let main = Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[1]);

    render_connection_card(frame, app, main[0]);
    render_activity_log(frame, main[1]);
}

fn status_style(status: ConnectionStatus) -> (&'static str, Color) {
    if status.is_connected() {
        ("●", theme::SUCCESS)
    } else {
        ("○", theme::ERROR)
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let status = app.machine.status();
    let (dot, color) = status_style(status);
    let separator = || Span::styled(" │ ", Style::default().fg(theme::NORD_POLAR_NIGHT_4));

    let mut spans = vec![
        Span::styled(
            format!(" {dot} {}", status.label()),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" ({})", display_name(app.machine.vpn_name())),
            Style::default().fg(theme::TEXT_SECONDARY),
        ),
    ];

    if let Some(since) = status.since() {
        spans.push(separator());
        spans.push(Span::styled(
            format!("▲{}", utils::format_elapsed(since)),
            Style::default().fg(theme::ACCENT_SECONDARY),
        ));
    }

    if app.is_busy() {
        spans.push(separator());
        spans.push(Span::styled("working…", Style::default().fg(theme::WARNING)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn display_name(vpn_name: &str) -> &str {
    if vpn_name.is_empty() {
        "no profile"
    } else {
        vpn_name
    }
}

fn render_connection_card(frame: &mut Frame, app: &App, area: Rect) {
    let status = app.machine.status();
    let (dot, color) = status_style(status);
    let identity = app.identity();
    let policy = app.machine.policy();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if status.is_connected() {
            theme::BORDER_FOCUSED
        } else {
            theme::BORDER_DEFAULT
        }))
        .title(" Connection ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let label = |text: &str| Span::styled(format!(" {text:<14}"), Style::default().fg(theme::TEXT_SECONDARY));
    let value = |text: String| Span::styled(text, Style::default().fg(theme::TEXT_PRIMARY));
    let flag = |on: bool| {
        if on {
            Span::styled("on", Style::default().fg(theme::SUCCESS))
        } else {
            Span::styled("off", Style::default().fg(theme::INACTIVE))
        }
    };

    let since = match status {
        ConnectionStatus::Connected { since: Some(since) } => utils::format_clock(since),
        ConnectionStatus::Connected { since: None } => "before launch".to_string(),
        ConnectionStatus::Disconnected if !app.machine.was_ever_connected() => "never".to_string(),
        ConnectionStatus::Disconnected => constants::MSG_NO_DATA.to_string(),
    };
    let last_poll = match app.last_poll {
        Some(time) => utils::format_system_time_local(time),
        None if app.machine.first_run_pending() => constants::MSG_FETCHING.to_string(),
        None => constants::MSG_NO_DATA.to_string(),
    };

    let lines = vec![
        Line::from(""),
        Line::from(vec![
            label("Status"),
            Span::styled(
                format!("{dot} {}", status.label()),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![label("Profile"), value(display_name(&identity.vpn_name).to_string())]),
        Line::from(vec![
            label("Unit"),
            value(utils::truncate(&identity.unit_name(), inner.width.saturating_sub(16) as usize)),
        ]),
        Line::from(vec![label("Since"), value(since)]),
        Line::from(vec![label("Last check"), value(last_poll)]),
        Line::from(""),
        Line::from(vec![
            label("OpenVPN"),
            value(format!(
                "{} ({})",
                app.capabilities.version_label(),
                app.capabilities.config_dir.display()
            )),
        ]),
        Line::from(vec![
            label("Privilege"),
            value(identity.privilege_prefix().unwrap_or("none").to_string()),
        ]),
        Line::from(""),
        Line::from(vec![label("Auto-connect"), flag(policy.auto_connect)]),
        Line::from(vec![label("Drop warning"), flag(policy.show_warning)]),
        Line::from(vec![label("Log on start"), flag(policy.show_log)]),
    ];

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_activity_log(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::BORDER_DEFAULT))
        .title(" Activity ");

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let entries = logger::tail(inner.height as usize);

    if entries.is_empty() {
        frame.render_widget(
            Paragraph::new("No activity yet").alignment(Alignment::Center),
            inner,
        );
        return;
    }

    let max_msg_len = (inner.width as usize).saturating_sub(constants::LOG_PREFIX_WIDTH);

    let lines: Vec<Line> = entries
        .iter()
        .map(|entry| {
            let msg_style = match entry.level {
                logger::LogLevel::Error => Style::default().fg(theme::ERROR),
                logger::LogLevel::Warning => Style::default().fg(theme::WARNING),
                logger::LogLevel::Info => Style::default().fg(theme::TEXT_PRIMARY),
                logger::LogLevel::Debug => Style::default().fg(Color::DarkGray),
            };

            Line::from(vec![
                Span::styled(
                    format!("[{}] ", utils::format_system_time_local(entry.timestamp)),
                    Style::default().fg(theme::TEXT_SECONDARY),
                ),
                Span::styled(
                    format!("{} ", entry.level.prefix()),
                    Style::default().fg(entry.level.color()),
                ),
                Span::styled(
                    format!("{:<width$} ", entry.category, width = constants::LOG_CATEGORY_WIDTH),
                    Style::default().fg(theme::NORD_POLAR_NIGHT_4),
                ),
                Span::styled(utils::truncate(&entry.message, max_msg_len), msg_style),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}
