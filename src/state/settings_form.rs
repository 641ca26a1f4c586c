//! Settings editor draft.
//!
//! The editor works on a copy of [`AppSettings`]; nothing reaches the
//! running session until the draft is saved.

use crate::config::AppSettings;
use crate::constants;

/// Editable settings rows, in display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingsField {
    VpnName,
    UseSudo,
    SudoCommand,
    ShowWarning,
    ShowLog,
    AutoConnect,
}

impl SettingsField {
    pub const ALL: [Self; 6] = [
        Self::VpnName,
        Self::UseSudo,
        Self::SudoCommand,
        Self::ShowWarning,
        Self::ShowLog,
        Self::AutoConnect,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::VpnName => "VPN profile",
            Self::UseSudo => "Use privilege command",
            Self::SudoCommand => "Privilege command",
            Self::ShowWarning => "Warn on disconnect",
            Self::ShowLog => "Show log after connect",
            Self::AutoConnect => "Connect on startup",
        }
    }

    /// Checkbox rows; the rest are text with a pick list.
    pub const fn is_toggle(self) -> bool {
        !matches!(self, Self::VpnName | Self::SudoCommand)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SettingsForm {
    pub draft: AppSettings,
    pub selected: usize,
    /// Profiles found in the OpenVPN config directory.
    pub profiles: Vec<String>,
}

impl SettingsForm {
    pub fn new(settings: &AppSettings, profiles: Vec<String>) -> Self {
        Self {
            draft: settings.clone(),
            selected: 0,
            profiles,
        }
    }

    pub fn field(&self) -> SettingsField {
        SettingsField::ALL[self.selected % SettingsField::ALL.len()]
    }

    pub fn next_field(&mut self) {
        self.selected = (self.selected + 1) % SettingsField::ALL.len();
    }

    pub fn prev_field(&mut self) {
        self.selected = self
            .selected
            .checked_sub(1)
            .unwrap_or(SettingsField::ALL.len() - 1);
    }

    /// Flips a checkbox row; no-op on text rows.
    pub fn toggle(&mut self) {
        let field = self.field();
        let draft = &mut self.draft;
        match field {
            SettingsField::UseSudo => draft.use_sudo = !draft.use_sudo,
            SettingsField::ShowWarning => draft.show_warning = !draft.show_warning,
            SettingsField::ShowLog => draft.show_log = !draft.show_log,
            SettingsField::AutoConnect => draft.auto_connect = !draft.auto_connect,
            SettingsField::VpnName | SettingsField::SudoCommand => {}
        }
    }

    /// Steps through the pick list of the selected row.
    pub fn cycle(&mut self, forward: bool) {
        match self.field() {
            SettingsField::VpnName => {
                if let Some(next) = cycle_in(&self.profiles, &self.draft.vpn_name, forward) {
                    self.draft.vpn_name = next;
                }
            }
            SettingsField::SudoCommand => {
                if let Some(next) =
                    cycle_in(&constants::PRIVILEGE_COMMANDS, &self.draft.sudo_command, forward)
                {
                    self.draft.sudo_command = next;
                }
            }
            _ => self.toggle(),
        }
    }

    pub fn insert_char(&mut self, c: char) {
        if c.is_whitespace() || c.is_control() {
            return;
        }
        if let Some(text) = self.text_mut() {
            text.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(text) = self.text_mut() {
            text.pop();
        }
    }

    /// Display value of a row.
    pub fn value(&self, field: SettingsField) -> String {
        let check = |on: bool| if on { "[x]" } else { "[ ]" }.to_string();
        match field {
            SettingsField::VpnName => self.draft.vpn_name.clone(),
            SettingsField::SudoCommand => self.draft.sudo_command.clone(),
            SettingsField::UseSudo => check(self.draft.use_sudo),
            SettingsField::ShowWarning => check(self.draft.show_warning),
            SettingsField::ShowLog => check(self.draft.show_log),
            SettingsField::AutoConnect => check(self.draft.auto_connect),
        }
    }

    fn text_mut(&mut self) -> Option<&mut String> {
        match self.field() {
            SettingsField::VpnName => Some(&mut self.draft.vpn_name),
            SettingsField::SudoCommand => Some(&mut self.draft.sudo_command),
            _ => None,
        }
    }
}

/// Next (or previous) entry after `current`, wrapping. A value not in the
/// list jumps to the first (or last) entry.
fn cycle_in<S: AsRef<str>>(options: &[S], current: &str, forward: bool) -> Option<String> {
    if options.is_empty() {
        return None;
    }
    let len = options.len();
    let next = match options.iter().position(|o| o.as_ref() == current) {
        Some(i) if forward => (i + 1) % len,
        Some(i) => (i + len - 1) % len,
        None if forward => 0,
        None => len - 1,
    };
    Some(options[next].as_ref().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> SettingsForm {
        let settings = AppSettings {
            vpn_name: "office".to_string(),
            ..AppSettings::default()
        };
        SettingsForm::new(&settings, vec!["home".to_string(), "office".to_string()])
    }

    #[test]
    fn test_field_navigation_wraps() {
        let mut form = form();
        assert_eq!(form.field(), SettingsField::VpnName);
        form.prev_field();
        assert_eq!(form.field(), SettingsField::AutoConnect);
        form.next_field();
        form.next_field();
        assert_eq!(form.field(), SettingsField::UseSudo);
    }

    #[test]
    fn test_cycle_profiles() {
        let mut form = form();
        form.cycle(true);
        assert_eq!(form.draft.vpn_name, "home");
        form.cycle(false);
        assert_eq!(form.draft.vpn_name, "office");
    }

    #[test]
    fn test_cycle_without_profiles_keeps_text() {
        let mut form = SettingsForm::new(&AppSettings::default(), Vec::new());
        form.insert_char('w');
        form.insert_char(' ');
        form.insert_char('g');
        form.cycle(true);
        assert_eq!(form.draft.vpn_name, "wg");
        form.backspace();
        assert_eq!(form.draft.vpn_name, "w");
    }

    #[test]
    fn test_cycle_privilege_commands() {
        let mut form = form();
        form.selected = 2;
        form.draft.sudo_command = "custom-helper".to_string();
        form.cycle(true);
        assert_eq!(form.draft.sudo_command, "sudo");
        form.cycle(false);
        assert_eq!(form.draft.sudo_command, "gksu");
    }

    #[test]
    fn test_toggles_only_touch_checkbox_rows() {
        let mut form = form();
        let before = form.draft.clone();
        form.toggle();
        assert_eq!(form.draft, before);

        form.selected = 5;
        form.cycle(true);
        assert!(form.draft.auto_connect);
        assert_eq!(form.value(SettingsField::AutoConnect), "[x]");
        form.insert_char('x');
        assert_eq!(form.draft.vpn_name, "office");
    }

    #[test]
    fn test_toggle_flips_each_checkbox_row() {
        let mut form = form();
        let before = form.draft.clone();

        for field in SettingsField::ALL {
            form.selected = SettingsField::ALL.iter().position(|f| *f == field).unwrap();
            form.toggle();
        }

        assert_eq!(form.draft.use_sudo, !before.use_sudo);
        assert_eq!(form.draft.show_warning, !before.show_warning);
        assert_eq!(form.draft.show_log, !before.show_log);
        assert_eq!(form.draft.auto_connect, !before.auto_connect);
        assert_eq!(form.draft.vpn_name, before.vpn_name);
        assert_eq!(form.draft.sudo_command, before.sudo_command);
    }
}
