//! Settings editor overlay

use super::centered_rect;
use crate::constants;
use crate::state::{SettingsField, SettingsForm};
use crate::theme;
use ratatui::{
    layout::{Constraint, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

const LABEL_WIDTH: usize = 24;

/// Render the settings draft
#[allow(clippy::cast_possible_truncation)]
pub fn render(frame: &mut Frame, form: &SettingsForm) {
    // rows + blank + hint + borders
    let height = (SettingsField::ALL.len() + 4) as u16;
    let area = centered_rect(64, height, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::BORDER_FOCUSED))
        .title(format!(" {} - Settings ", constants::APP_TITLE))
        .title_bottom(Line::from(" [Enter] Save  [Esc] Cancel ").centered());

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [rows_area, _, hint_area] = Layout::vertical([
        Constraint::Length(SettingsField::ALL.len() as u16),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(inner);

    let selected = form.field();
    let rows: Vec<Line> = SettingsField::ALL
        .iter()
        .map(|&field| {
            let is_selected = field == selected;
            let marker = if is_selected { "▶ " } else { "  " };
            let label_style = if is_selected {
                Style::default()
                    .fg(theme::ROW_SELECTED_FG)
                    .bg(theme::ROW_SELECTED_BG)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme::TEXT_SECONDARY)
            };

            let mut value = form.value(field);
            if is_selected && !field.is_toggle() {
                value.push('▏');
            }
            let value_style = if field.is_toggle() {
                Style::default().fg(theme::ACCENT_SECONDARY)
            } else {
                Style::default().fg(theme::TEXT_PRIMARY)
            };

            Line::from(vec![
                Span::styled(marker, Style::default().fg(theme::ACCENT_PRIMARY)),
                Span::styled(format!("{:<LABEL_WIDTH$}", field.label()), label_style),
                Span::raw(" "),
                Span::styled(value, value_style),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(rows), rows_area);

    frame.render_widget(
        Paragraph::new(Span::styled(
            format!(" {}", hint_for(form)),
            Style::default().fg(theme::NORD_POLAR_NIGHT_4),
        )),
        hint_area,
    );
}

/// One-line help for the selected row.
fn hint_for(form: &SettingsForm) -> String {
    match form.field() {
        SettingsField::VpnName if form.profiles.is_empty() => "Type a profile name".to_string(),
        SettingsField::VpnName => format!("←/→ pick one of {} profiles, or type", form.profiles.len()),
        SettingsField::SudoCommand => "←/→ pick a command, or type".to_string(),
        _ => "Space toggles".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppSettings;

    #[test]
    fn test_hint_for_profile_row() {
        let form = SettingsForm::new(&AppSettings::default(), vec!["home".to_string()]);
        assert_eq!(hint_for(&form), "←/→ pick one of 1 profiles, or type");

        let empty = SettingsForm::new(&AppSettings::default(), Vec::new());
        assert_eq!(hint_for(&empty), "Type a profile name");
    }

    #[test]
    fn test_hint_for_toggle_row() {
        let mut form = SettingsForm::new(&AppSettings::default(), Vec::new());
        form.next_field();
        assert_eq!(hint_for(&form), "Space toggles");
    }
}
