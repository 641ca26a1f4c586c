//! Core application state and logic.
//!
//! [`App`] is the shell around the supervision core: it owns the settings,
//! the [`ServiceController`] and the [`ConnectionStateMachine`], turns key
//! presses and background results into [`Message`]s, and carries out the
//! [`Effect`]s the machine asks for. It only ever runs on the event-loop
//! thread; workers report back through the event channel.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::widgets::ListState;
use std::sync::mpsc::Sender;
use std::time::SystemTime;

use crate::config::{AppSettings, SettingsStore};
use crate::constants;
use crate::core::detect::{self, Capabilities};
use crate::core::{
    journal, public_ip, CommandResult, CommandRunner, ConnectionStateMachine, Effect, NotifyIcon,
    Policy, ServiceAction, ServiceController, ServiceIdentity,
};
use crate::event::Event;
use crate::message::{self, Message, ScrollMove};
use crate::state::{LogViewerState, Overlay, SettingsForm, Toast, ToastType};

/// Profile change that waits on the old unit.
#[derive(Debug, Clone)]
enum PendingSwitch {
    /// The runner was busy; the stop is issued after the next result.
    Queued(ServiceIdentity),
    /// Stop of the old unit is in flight.
    Stopping(ServiceIdentity),
    /// The stop failed. The old unit stays supervised until it goes down.
    Blocked(ServiceIdentity),
}

/// Main application state container.
pub struct App {
    /// Flag indicating the application should exit.
    pub should_quit: bool,

    // === Session ===
    pub settings: AppSettings,
    pub capabilities: Capabilities,
    pub machine: ConnectionStateMachine,
    /// Profiles found in the detected OpenVPN config directory.
    pub profiles: Vec<String>,
    /// When the last status query completed.
    pub last_poll: Option<SystemTime>,

    // === UI State ===
    pub overlay: Overlay,
    pub action_menu_state: ListState,
    pub toast: Option<Toast>,
    pub terminal_size: (u16, u16),

    /// Settings editor or log viewer pushed aside by a raised overlay.
    suspended: Vec<Overlay>,

    store: Box<dyn SettingsStore>,
    controller: ServiceController,
    /// Separate slot for journal fetches and capability detection.
    aux_runner: CommandRunner,
    pending_switch: Option<PendingSwitch>,
    events: Sender<Event>,
    lookup_public_ip: bool,
}

impl App {
    /// Detects capabilities and builds the session from `settings`.
    ///
    /// `runner` becomes the single-flight slot for service commands;
    /// completions are delivered through `events`.
    pub fn new(
        settings: AppSettings,
        store: Box<dyn SettingsStore>,
        runner: CommandRunner,
        events: Sender<Event>,
    ) -> Self {
        let aux_runner = runner.sibling();
        let capabilities = detect::detect(&aux_runner);
        let identity = detect::build_identity(&settings, &capabilities);
        let profiles = detect::list_profiles(&capabilities.config_dir);

        crate::log_info!(
            "UI",
            "{} v{} starting, supervising {}",
            constants::APP_NAME,
            constants::APP_VERSION,
            identity.unit_name()
        );
        if !identity.is_configured() {
            crate::log_warning!("CONFIG", "{}", constants::MSG_NO_PROFILE);
        }

        let machine = ConnectionStateMachine::new(identity.vpn_name.clone(), Policy::from(&settings));
        let controller = ServiceController::new(identity, settings.service_manager.clone(), runner);

        Self {
            should_quit: false,
            settings,
            capabilities,
            machine,
            profiles,
            last_poll: None,
            overlay: Overlay::None,
            action_menu_state: ListState::default(),
            toast: None,
            terminal_size: (0, 0),
            store,
            controller,
            aux_runner,
            suspended: Vec::new(),
            pending_switch: None,
            events,
            lookup_public_ip: true,
        }
    }

    pub fn identity(&self) -> &ServiceIdentity {
        self.controller.identity()
    }

    /// Whether a service command is in flight.
    pub fn is_busy(&self) -> bool {
        self.controller.is_busy()
    }

    /// Dispatch one event from the loop.
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Resize(w, h) => self.handle_message(Message::Resize(w, h)),
            Event::Tick => self.handle_message(Message::Tick),
            Event::Message(msg) => self.handle_message(msg),
        }
    }

    /// Handle keyboard input
    pub fn handle_key(&mut self, key: KeyEvent) {
        // 1. Global: Ctrl+C quits without asking
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.handle_message(Message::Quit);
            return;
        }

        // 2. Dismiss toast on Esc
        if key.code == KeyCode::Esc && self.toast.is_some() && self.overlay.is_none() {
            self.toast = None;
            return;
        }

        match self.overlay {
            Overlay::None => self.handle_normal_keys(key),
            Overlay::Menu => self.handle_action_menu_keys(key),
            Overlay::Settings(_) => self.handle_settings_keys(key),
            Overlay::LogViewer(_) => self.handle_log_viewer_keys(key),
            Overlay::Warning { .. } => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char(' ')) {
                    self.handle_message(Message::CloseOverlay);
                }
            }
            Overlay::ConfirmQuit { .. } => self.handle_confirm_quit_keys(key),
        }
    }

    fn handle_normal_keys(&mut self, key: KeyEvent) {
        let msg = match key.code {
            KeyCode::Char('q') => Message::RequestQuit,
            KeyCode::Char('s') => Message::Start,
            KeyCode::Char('d') => Message::Stop,
            KeyCode::Enter | KeyCode::Char(' ') => Message::Toggle,
            KeyCode::Char('x') => Message::OpenMenu,
            KeyCode::Char('e') => Message::OpenSettings,
            KeyCode::Char('l') => Message::OpenLogs,
            KeyCode::Char('r') => Message::Refresh,
            _ => return,
        };
        self.handle_message(msg);
    }

    /// Handle keys when the action menu is open
    fn handle_action_menu_keys(&mut self, key: KeyEvent) {
        let actions = message::tray_actions(self.machine.is_connected());
        let action_count = actions.len();

        match key.code {
            KeyCode::Esc | KeyCode::Char('x') => {
                self.handle_message(Message::CloseOverlay);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                let current = self.action_menu_state.selected().unwrap_or(0);
                let prev = current.checked_sub(1).unwrap_or(action_count - 1);
                self.action_menu_state.select(Some(prev));
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let current = self.action_menu_state.selected().unwrap_or(0);
                self.action_menu_state.select(Some((current + 1) % action_count));
            }
            KeyCode::Enter => {
                if let Some(item) = self
                    .action_menu_state
                    .selected()
                    .and_then(|i| actions.get(i))
                {
                    let msg = item.message.clone();
                    self.overlay = Overlay::None;
                    self.handle_message(msg);
                }
            }
            KeyCode::Char(c) => {
                if let Some(item) = actions.iter().find(|a| a.key.starts_with(c)) {
                    let msg = item.message.clone();
                    self.overlay = Overlay::None;
                    self.handle_message(msg);
                }
            }
            _ => {}
        }
    }

    fn handle_settings_keys(&mut self, key: KeyEvent) {
        let Overlay::Settings(form) = &mut self.overlay else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.handle_message(Message::CloseOverlay),
            KeyCode::Enter => self.handle_message(Message::SaveSettings),
            KeyCode::Up | KeyCode::BackTab => form.prev_field(),
            KeyCode::Down | KeyCode::Tab => form.next_field(),
            KeyCode::Left => form.cycle(false),
            KeyCode::Right => form.cycle(true),
            KeyCode::Char(' ') => form.toggle(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(c) => form.insert_char(c),
            _ => {}
        }
    }

    fn handle_log_viewer_keys(&mut self, key: KeyEvent) {
        let msg = match key.code {
            KeyCode::Esc | KeyCode::Char('q' | 'l') => Message::CloseOverlay,
            KeyCode::Char('r') => Message::RefreshLogs,
            KeyCode::Up | KeyCode::Char('k') => Message::Scroll(ScrollMove::Up),
            KeyCode::Down | KeyCode::Char('j') => Message::Scroll(ScrollMove::Down),
            KeyCode::PageUp => Message::Scroll(ScrollMove::PageUp),
            KeyCode::PageDown => Message::Scroll(ScrollMove::PageDown),
            KeyCode::Home | KeyCode::Char('g') => Message::Scroll(ScrollMove::Top),
            KeyCode::End | KeyCode::Char('G') => Message::Scroll(ScrollMove::Bottom),
            _ => return,
        };
        self.handle_message(msg);
    }

    fn handle_confirm_quit_keys(&mut self, key: KeyEvent) {
        let Overlay::ConfirmQuit { confirm_selected } = &mut self.overlay else {
            return;
        };
        match key.code {
            KeyCode::Char('y' | 'Y') => self.handle_message(Message::Quit),
            KeyCode::Char('n' | 'N') | KeyCode::Esc => self.handle_message(Message::CloseOverlay),
            KeyCode::Left | KeyCode::Right | KeyCode::Tab => {
                *confirm_selected = !*confirm_selected;
            }
            KeyCode::Enter => {
                if *confirm_selected {
                    self.handle_message(Message::Quit);
                } else {
                    self.handle_message(Message::CloseOverlay);
                }
            }
            _ => {}
        }
    }

    /// Handle a message from a key, the action menu, or a background worker
    pub fn handle_message(&mut self, msg: Message) {
        match msg {
            // Connection
            Message::Start => self.start_vpn(),
            Message::Stop => self.stop_vpn(),
            Message::Toggle => {
                if self.machine.is_connected() {
                    self.stop_vpn();
                } else {
                    self.start_vpn();
                }
            }
            Message::Refresh => self.poll_status(true),
            Message::Poll => self.poll_status(false),

            // Overlays
            Message::OpenMenu => {
                self.action_menu_state.select(Some(0));
                self.overlay = Overlay::Menu;
            }
            Message::OpenSettings => {
                self.profiles = detect::list_profiles(&self.capabilities.config_dir);
                self.overlay = Overlay::Settings(SettingsForm::new(&self.settings, self.profiles.clone()));
            }
            Message::SaveSettings => self.save_settings(),
            Message::OpenLogs => self.open_log_viewer(),
            Message::RefreshLogs => self.fetch_journal(),
            Message::CloseOverlay => self.close_overlay(),
            Message::Scroll(movement) => self.scroll_log_viewer(movement),

            // System
            Message::RequestQuit => {
                if self.machine.is_connected() {
                    self.overlay = Overlay::ConfirmQuit {
                        confirm_selected: false,
                    };
                } else {
                    self.should_quit = true;
                }
            }
            Message::Quit => {
                if self.machine.is_connected() {
                    crate::log_info!(
                        "UI",
                        "Leaving {} running in the background",
                        self.identity().unit_name()
                    );
                }
                self.should_quit = true;
            }
            Message::Tick => {
                if self.toast.as_ref().is_some_and(Toast::is_expired) {
                    self.toast = None;
                }
            }
            Message::Resize(w, h) => self.terminal_size = (w, h),

            // Background results
            Message::ServiceFinished { action, result } => self.on_service_finished(action, &result),
            Message::JournalLoaded(result) => {
                let height = self.log_view_height();
                if let Some(viewer) = self.log_viewer_mut() {
                    viewer.content = Some(journal::journal_text(&result));
                    viewer.scroll_to_end(height);
                }
            }
            Message::PublicIp(ip) => {
                if let Some(viewer) = self.log_viewer_mut() {
                    viewer.public_ip = ip.unwrap_or_else(|| constants::MSG_NO_DATA.to_string());
                }
            }
        }
    }

    /// Completion handler that reports `action` back through the event channel.
    fn completion(&self, action: ServiceAction) -> impl FnOnce(CommandResult) + Send + 'static {
        let tx = self.events.clone();
        move |result| {
            let _ = tx.send(Event::Message(Message::ServiceFinished { action, result }));
        }
    }

    fn start_vpn(&mut self) {
        if !self.identity().is_configured() {
            self.show_toast(constants::MSG_NO_PROFILE, ToastType::Warning);
            return;
        }
        // A request while a command is in flight is dropped without feedback.
        if self.controller.start(self.completion(ServiceAction::Start)) {
            let effects = self.machine.on_start_issued(SystemTime::now());
            self.apply_effects(effects);
        }
    }

    fn stop_vpn(&mut self) {
        if !self.identity().is_configured() {
            self.show_toast(constants::MSG_NO_PROFILE, ToastType::Warning);
            return;
        }
        if self.controller.stop(self.completion(ServiceAction::Stop)) {
            let effects = self.machine.on_stop_issued();
            self.apply_effects(effects);
        }
    }

    fn poll_status(&mut self, manual: bool) {
        if !self.identity().is_configured() {
            if manual {
                self.show_toast(constants::MSG_NO_PROFILE, ToastType::Warning);
            }
            return;
        }
        if !self.controller.query_status(self.completion(ServiceAction::Status)) {
            crate::log_debug!("POLL", "Status query skipped, command in flight");
        }
    }

    /// Applies a service result. The runner slot stays taken until here, so
    /// nothing queued behind the completion can run before its effects.
    ///
    /// Failures get no toast of their own; the optimistic notification
    /// stands and the machine logs the failure.
    fn on_service_finished(&mut self, action: ServiceAction, result: &CommandResult) {
        self.controller.release();

        let effects = match action {
            ServiceAction::Start => self.machine.on_start_result(result, SystemTime::now()),
            ServiceAction::Stop => {
                let effects = self.machine.on_stop_result(result);
                match self.pending_switch.take() {
                    Some(PendingSwitch::Stopping(identity)) if result.success() => {
                        self.switch_identity(identity);
                    }
                    Some(PendingSwitch::Stopping(identity)) => {
                        crate::log_warning!(
                            "STATE",
                            "Still supervising {}; {} is applied once it stops",
                            self.identity().unit_name(),
                            identity.unit_name()
                        );
                        self.pending_switch = Some(PendingSwitch::Blocked(identity));
                    }
                    other => self.pending_switch = other,
                }
                effects
            }
            ServiceAction::Status => {
                self.last_poll = Some(SystemTime::now());
                self.machine.on_status_result(result)
            }
        };

        self.advance_switch();
        self.apply_effects(effects);
    }

    /// Carries out what the state machine asked for, in order.
    fn apply_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Notify {
                    title,
                    message,
                    icon,
                } => {
                    crate::log_info!("UI", "{title}: {message}");
                    let toast_type = match icon {
                        NotifyIcon::Active => ToastType::Info,
                        NotifyIcon::Disabled => ToastType::Warning,
                    };
                    self.toast = Some(Toast::new(message, toast_type));
                }
                Effect::ShowWarning { title, message } => {
                    self.raise(Overlay::Warning { title, message });
                }
                Effect::OpenLogViewer => self.open_log_viewer(),
                Effect::StartService => self.start_vpn(),
            }
        }
    }

    fn open_log_viewer(&mut self) {
        if !self.identity().is_configured() {
            self.show_toast(constants::MSG_NO_PROFILE, ToastType::Warning);
            return;
        }
        self.raise(Overlay::LogViewer(LogViewerState::new(self.identity().unit_name())));
        self.fetch_journal();
        if self.lookup_public_ip {
            public_ip::spawn_lookup(self.events.clone(), |ip| Event::Message(Message::PublicIp(ip)));
        }
    }

    /// Shows `overlay` on top. An open settings editor or log viewer is
    /// kept underneath and comes back when the new overlay closes.
    fn raise(&mut self, overlay: Overlay) {
        let same_kind = std::mem::discriminant(&self.overlay) == std::mem::discriminant(&overlay);
        let previous = std::mem::replace(&mut self.overlay, overlay);
        if !same_kind && matches!(previous, Overlay::Settings(_) | Overlay::LogViewer(_)) {
            self.suspended.push(previous);
        }
    }

    fn close_overlay(&mut self) {
        self.overlay = self.suspended.pop().unwrap_or_default();
    }

    /// The log viewer, whether on top or suspended under another overlay.
    fn log_viewer_mut(&mut self) -> Option<&mut LogViewerState> {
        std::iter::once(&mut self.overlay)
            .chain(self.suspended.iter_mut())
            .find_map(|overlay| match overlay {
                Overlay::LogViewer(viewer) => Some(viewer),
                _ => None,
            })
    }

    fn fetch_journal(&mut self) {
        if self.log_viewer_mut().is_none() {
            return;
        }
        let tx = self.events.clone();
        let accepted = journal::fetch(&self.aux_runner, self.controller.identity(), move |result| {
            let _ = tx.send(Event::Message(Message::JournalLoaded(result)));
        });
        if accepted {
            if let Some(viewer) = self.log_viewer_mut() {
                viewer.content = None;
            }
        }
    }

    /// Rows available for journal text inside the viewer overlay.
    fn log_view_height(&self) -> u16 {
        // 85% popup, minus borders and the header row.
        (self.terminal_size.1.saturating_mul(85) / 100).saturating_sub(3)
    }

    fn scroll_log_viewer(&mut self, movement: ScrollMove) {
        let height = self.log_view_height().max(1);
        let Overlay::LogViewer(viewer) = &mut self.overlay else {
            return;
        };
        let max = viewer.line_count().saturating_sub(height);
        viewer.scroll = match movement {
            ScrollMove::Up => viewer.scroll.saturating_sub(1),
            ScrollMove::Down => viewer.scroll.saturating_add(1).min(max),
            ScrollMove::PageUp => viewer.scroll.saturating_sub(height),
            ScrollMove::PageDown => viewer.scroll.saturating_add(height).min(max),
            ScrollMove::Top => 0,
            ScrollMove::Bottom => max,
        };
    }

    fn save_settings(&mut self) {
        let Overlay::Settings(form) = &self.overlay else {
            return;
        };
        let mut settings = form.draft.clone();
        settings.vpn_name = settings.vpn_name.trim().to_string();
        settings.sudo_command = settings.sudo_command.trim().to_string();

        if let Err(e) = self.store.save(&settings) {
            crate::log_error!("CONFIG", "{e}");
            self.show_toast(format!("Failed to save settings: {e}"), ToastType::Error);
            return;
        }
        crate::log_info!("CONFIG", "Settings saved to {}", self.store.location());
        self.close_overlay();
        self.apply_settings(settings);
        self.show_toast("Settings saved", ToastType::Success);
    }

    /// Re-detects capabilities and rebuilds the service identity.
    ///
    /// A profile change while connected stops the old unit first; the new
    /// identity is adopted and started once that stop succeeds.
    fn apply_settings(&mut self, settings: AppSettings) {
        crate::logger::configure(&settings.log_level, settings.max_log_entries);
        self.capabilities = detect::detect(&self.aux_runner);
        self.profiles = detect::list_profiles(&self.capabilities.config_dir);
        self.machine.set_policy(Policy::from(&settings));
        self.controller.set_manager(settings.service_manager.clone());

        let identity = detect::build_identity(&settings, &self.capabilities);
        let unit_changed = identity.unit_name() != self.identity().unit_name();
        self.settings = settings;

        match self.pending_switch.take() {
            // The old unit is already stopping; only the target changes.
            Some(PendingSwitch::Stopping(_)) => {
                self.pending_switch = Some(PendingSwitch::Stopping(identity));
            }
            _ if unit_changed && self.machine.is_connected() => {
                self.pending_switch = Some(PendingSwitch::Queued(identity));
                self.advance_switch();
            }
            _ => self.switch_identity(identity),
        }
    }

    /// Moves a pending profile change forward after the status changed or
    /// the runner freed up.
    fn advance_switch(&mut self) {
        match self.pending_switch.take() {
            Some(PendingSwitch::Queued(identity) | PendingSwitch::Blocked(identity))
                if !self.machine.is_connected() =>
            {
                self.switch_identity(identity);
            }
            Some(PendingSwitch::Queued(identity)) => {
                if self.controller.stop(self.completion(ServiceAction::Stop)) {
                    crate::log_info!(
                        "STATE",
                        "Profile changed, reconnecting as {}",
                        identity.unit_name()
                    );
                    self.machine.request_restart();
                    self.pending_switch = Some(PendingSwitch::Stopping(identity));
                    let effects = self.machine.on_stop_issued();
                    self.apply_effects(effects);
                } else {
                    crate::log_debug!("STATE", "Profile change waits for the runner");
                    self.pending_switch = Some(PendingSwitch::Queued(identity));
                }
            }
            other => self.pending_switch = other,
        }
    }

    fn switch_identity(&mut self, identity: ServiceIdentity) {
        self.machine.set_vpn_name(identity.vpn_name.clone());
        self.controller.set_identity(identity);
    }

    /// Show a toast notification
    fn show_toast(&mut self, message: impl Into<String>, toast_type: ToastType) {
        self.toast = Some(Toast::new(message, toast_type));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::MemoryStore;
    use crate::core::runner::tests::{GatedLauncher, ScriptedLauncher};
    use crate::state::ConnectionStatus;
    use std::sync::mpsc;
    use std::sync::Arc;
    use std::time::Duration;

    fn settings(vpn_name: &str) -> AppSettings {
        AppSettings {
            vpn_name: vpn_name.to_string(),
            ..AppSettings::default()
        }
    }

    /// App on a scripted launcher; detection sees OpenVPN 2.6.
    fn test_app(settings: AppSettings) -> (App, Arc<ScriptedLauncher>, mpsc::Receiver<Event>) {
        let launcher = Arc::new(ScriptedLauncher::default());
        launcher.push(CommandResult::exited(1, "OpenVPN 2.6.3 x86_64-pc-linux-gnu"));
        let (tx, rx) = mpsc::channel();
        let mut app = App::new(
            settings,
            Box::new(MemoryStore::default()),
            CommandRunner::new(launcher.clone()),
            tx,
        );
        app.lookup_public_ip = false;
        (app, launcher, rx)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    /// Wait for the next background message and feed it back into the app.
    fn pump(app: &mut App, rx: &mpsc::Receiver<Event>) -> Message {
        match rx.recv_timeout(Duration::from_secs(2)) {
            Ok(Event::Message(msg)) => {
                app.handle_message(msg.clone());
                msg
            }
            other => panic!("expected a background message, got {other:?}"),
        }
    }

    fn assert_quiet(rx: &mpsc::Receiver<Event>) {
        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
    }

    #[test]
    fn test_detection_picks_modern_unit() {
        let (app, launcher, _rx) = test_app(settings("office"));
        assert_eq!(app.identity().unit_name(), "openvpn-client@office");
        assert_eq!(launcher.calls()[0], vec!["openvpn", "--version"]);
    }

    #[test]
    fn test_start_connects_and_notifies() {
        let (mut app, launcher, rx) = test_app(settings("office"));

        app.handle_key(key(KeyCode::Char('s')));
        let toast = app.toast.clone().unwrap();
        assert_eq!(toast.message, "Connecting to office");
        assert_eq!(toast.toast_type, ToastType::Info);

        pump(&mut app, &rx);
        assert!(app.machine.is_connected());
        assert!(app.machine.status().since().is_some());
        assert_eq!(
            launcher.calls()[1],
            vec!["systemctl", "start", "openvpn-client@office"]
        );
        assert!(app.overlay.is_none());
    }

    #[test]
    fn test_start_failure_keeps_disconnected() {
        let (mut app, launcher, rx) = test_app(settings("office"));
        launcher.push(CommandResult::exited(1, "Job failed"));

        app.handle_message(Message::Start);
        pump(&mut app, &rx);

        assert_eq!(app.machine.status(), ConnectionStatus::Disconnected);
        // The optimistic notification stands; the failure only reaches the log.
        let toast = app.toast.unwrap();
        assert_eq!(toast.message, "Connecting to office");
        assert_eq!(toast.toast_type, ToastType::Info);
    }

    #[test]
    fn test_start_success_adds_no_toast() {
        let (mut app, _launcher, rx) = test_app(settings("office"));
        app.handle_message(Message::Start);
        pump(&mut app, &rx);

        assert!(app.machine.is_connected());
        assert_eq!(app.toast.unwrap().message, "Connecting to office");
    }

    #[test]
    fn test_show_log_opens_viewer_after_start() {
        let mut s = settings("office");
        s.show_log = true;
        let (mut app, launcher, rx) = test_app(s);
        launcher.push(CommandResult::exited(0, ""));
        launcher.push(CommandResult::exited(0, "Initialization Sequence Completed"));

        app.handle_message(Message::Start);
        pump(&mut app, &rx);
        assert!(matches!(app.overlay, Overlay::LogViewer(_)));

        assert!(matches!(pump(&mut app, &rx), Message::JournalLoaded(_)));
        let Overlay::LogViewer(viewer) = &app.overlay else {
            panic!("log viewer closed");
        };
        assert_eq!(viewer.unit, "openvpn-client@office");
        assert_eq!(viewer.content.as_deref(), Some("Initialization Sequence Completed"));
        // The viewer reads the journal without the privilege prefix.
        assert_eq!(
            launcher.calls().last().unwrap(),
            &vec!["journalctl", "-b", "-u", "openvpn-client@office"]
        );
    }

    #[test]
    fn test_unexpected_drop_shows_warning() {
        let mut s = settings("office");
        s.show_warning = true;
        let (mut app, launcher, rx) = test_app(s);

        launcher.push(CommandResult::exited(0, "active"));
        app.handle_message(Message::Poll);
        pump(&mut app, &rx);
        assert!(app.machine.is_connected());

        launcher.push(CommandResult::exited(3, "inactive"));
        app.handle_message(Message::Poll);
        pump(&mut app, &rx);

        let Overlay::Warning { message, .. } = &app.overlay else {
            panic!("expected warning overlay");
        };
        assert_eq!(message, constants::MSG_WARNING_DISCONNECTED);

        app.handle_key(key(KeyCode::Enter));
        assert!(app.overlay.is_none());
    }

    #[test]
    fn test_user_stop_does_not_warn() {
        let mut s = settings("office");
        s.show_warning = true;
        let (mut app, _launcher, rx) = test_app(s);

        app.handle_message(Message::Start);
        pump(&mut app, &rx);
        app.handle_message(Message::Stop);
        assert_eq!(app.toast.clone().unwrap().message, "Disconnecting from office");
        pump(&mut app, &rx);

        assert!(!app.machine.is_connected());
        assert!(app.overlay.is_none());
    }

    #[test]
    fn test_auto_connect_on_first_poll() {
        let mut s = settings("office");
        s.auto_connect = true;
        let (mut app, launcher, rx) = test_app(s);

        launcher.push(CommandResult::exited(3, "inactive"));
        app.handle_message(Message::Poll);
        pump(&mut app, &rx);
        // The start was issued from the completion of the poll.
        assert!(matches!(
            pump(&mut app, &rx),
            Message::ServiceFinished {
                action: ServiceAction::Start,
                ..
            }
        ));
        assert!(app.machine.is_connected());
        assert!(!app.machine.first_run_pending());
    }

    #[test]
    fn test_toggle_follows_status() {
        let (mut app, launcher, rx) = test_app(settings("office"));

        app.handle_key(key(KeyCode::Enter));
        pump(&mut app, &rx);
        assert!(app.machine.is_connected());

        app.handle_key(key(KeyCode::Char(' ')));
        pump(&mut app, &rx);
        assert!(!app.machine.is_connected());

        let verbs: Vec<String> = launcher.calls()[1..].iter().map(|c| c[1].clone()).collect();
        assert_eq!(verbs, vec!["start", "stop"]);
    }

    #[test]
    fn test_unconfigured_profile_runs_nothing() {
        let (mut app, launcher, rx) = test_app(AppSettings::default());

        app.handle_message(Message::Start);
        app.handle_message(Message::Poll);
        assert_eq!(app.toast.clone().unwrap().message, constants::MSG_NO_PROFILE);
        assert_quiet(&rx);
        assert_eq!(launcher.calls().len(), 1);
    }

    #[test]
    fn test_quit_confirmation_only_when_connected() {
        let (mut app, _launcher, _rx) = test_app(settings("office"));
        app.handle_key(key(KeyCode::Char('q')));
        assert!(app.should_quit);

        let (mut app, _launcher, rx) = test_app(settings("office"));
        app.handle_message(Message::Start);
        pump(&mut app, &rx);

        app.handle_key(key(KeyCode::Char('q')));
        assert!(!app.should_quit);
        assert!(matches!(app.overlay, Overlay::ConfirmQuit { .. }));

        app.handle_key(key(KeyCode::Esc));
        assert!(app.overlay.is_none());
        assert!(!app.should_quit);

        app.handle_key(key(KeyCode::Char('q')));
        app.handle_key(key(KeyCode::Char('y')));
        assert!(app.should_quit);
    }

    #[test]
    fn test_menu_shows_applicable_action_and_dispatches() {
        let (mut app, launcher, rx) = test_app(settings("office"));

        app.handle_key(key(KeyCode::Char('x')));
        assert!(matches!(app.overlay, Overlay::Menu));
        assert_eq!(app.action_menu_state.selected(), Some(0));

        // First entry is "Start VPN" while disconnected.
        app.handle_key(key(KeyCode::Enter));
        assert!(app.overlay.is_none());
        pump(&mut app, &rx);
        assert_eq!(launcher.calls()[1][1], "start");
    }

    #[test]
    fn test_settings_save_persists_and_rebuilds_identity() {
        let _lock = crate::logger::tests::lock();
        let (mut app, launcher, _rx) = test_app(settings("office"));

        app.handle_key(key(KeyCode::Char('e')));
        let Overlay::Settings(form) = &mut app.overlay else {
            panic!("settings not open");
        };
        form.draft.vpn_name = "home".to_string();
        form.draft.use_sudo = true;
        form.draft.sudo_command = "pkexec".to_string();

        // Re-detection on save sees a legacy OpenVPN.
        launcher.push(CommandResult::exited(1, "OpenVPN 2.3.10 x86_64"));
        app.handle_key(key(KeyCode::Enter));

        assert!(app.overlay.is_none());
        assert_eq!(app.settings.vpn_name, "home");
        assert_eq!(app.identity().unit_name(), "openvpn@home");
        assert_eq!(app.identity().privilege_prefix(), Some("pkexec"));
        assert_eq!(app.machine.vpn_name(), "home");
    }

    #[test]
    fn test_profile_change_while_connected_reconnects() {
        let _lock = crate::logger::tests::lock();
        let (mut app, launcher, rx) = test_app(settings("office"));

        app.handle_message(Message::Start);
        pump(&mut app, &rx);
        assert!(app.machine.is_connected());

        app.handle_message(Message::OpenSettings);
        if let Overlay::Settings(form) = &mut app.overlay {
            form.draft.vpn_name = "home".to_string();
        }
        launcher.push(CommandResult::exited(1, "OpenVPN 2.6.3 x86_64"));
        app.handle_message(Message::SaveSettings);

        // Old unit is stopped first, under the old identity.
        assert_eq!(app.identity().unit_name(), "openvpn-client@office");
        assert!(matches!(
            pump(&mut app, &rx),
            Message::ServiceFinished {
                action: ServiceAction::Stop,
                ..
            }
        ));
        assert_eq!(app.identity().unit_name(), "openvpn-client@home");
        assert!(matches!(
            pump(&mut app, &rx),
            Message::ServiceFinished {
                action: ServiceAction::Start,
                ..
            }
        ));
        assert!(app.machine.is_connected());

        let units: Vec<String> = launcher
            .calls()
            .iter()
            .filter(|c| c[0] == "systemctl")
            .map(|c| format!("{} {}", c[1], c[2]))
            .collect();
        assert_eq!(
            units,
            vec![
                "start openvpn-client@office",
                "stop openvpn-client@office",
                "start openvpn-client@home",
            ]
        );
    }

    #[test]
    fn test_settings_cancel_discards_draft() {
        let (mut app, _launcher, _rx) = test_app(settings("office"));
        app.handle_message(Message::OpenSettings);
        app.handle_key(key(KeyCode::Char('x')));
        app.handle_key(key(KeyCode::Esc));

        assert!(app.overlay.is_none());
        assert_eq!(app.settings.vpn_name, "office");
        assert_eq!(app.identity().unit_name(), "openvpn-client@office");
    }

    #[test]
    fn test_log_viewer_scroll_and_public_ip() {
        let (mut app, launcher, rx) = test_app(settings("office"));
        app.terminal_size = (100, 24);
        let journal: Vec<String> = (0..100).map(|i| format!("line {i}")).collect();
        launcher.push(CommandResult::exited(0, journal.join("\n")));

        app.handle_key(key(KeyCode::Char('l')));
        pump(&mut app, &rx);
        let bottom = match &app.overlay {
            Overlay::LogViewer(viewer) => viewer.scroll,
            _ => panic!("log viewer closed"),
        };
        assert!(bottom > 0);

        app.handle_key(key(KeyCode::Char('g')));
        app.handle_key(key(KeyCode::Down));
        app.handle_message(Message::PublicIp(Some("203.0.113.9".to_string())));
        let Overlay::LogViewer(viewer) = &app.overlay else {
            panic!("log viewer closed");
        };
        assert_eq!(viewer.scroll, 1);
        assert_eq!(viewer.public_ip, "203.0.113.9");

        app.handle_key(key(KeyCode::Char('G')));
        app.handle_message(Message::PublicIp(None));
        let Overlay::LogViewer(viewer) = &app.overlay else {
            panic!("log viewer closed");
        };
        assert_eq!(viewer.scroll, bottom);
        assert_eq!(viewer.public_ip, constants::MSG_NO_DATA);

        app.handle_key(key(KeyCode::Esc));
        assert!(app.overlay.is_none());
    }

    #[test]
    fn test_poll_dropped_while_command_in_flight() {
        let (launcher, gate) = GatedLauncher::new();
        let launcher = Arc::new(launcher);
        let (tx, rx) = mpsc::channel();
        // Let detection through; "released" is no version banner, so the
        // legacy layout is used.
        gate.send(()).unwrap();
        let mut app = App::new(
            settings("office"),
            Box::new(MemoryStore::default()),
            CommandRunner::new(launcher.clone()),
            tx,
        );
        app.lookup_public_ip = false;

        app.handle_message(Message::Start);
        app.handle_message(Message::Poll);

        assert_quiet(&rx);
        assert!(app.is_busy());
        assert_eq!(app.machine.status(), ConnectionStatus::Disconnected);
        assert_eq!(app.toast.clone().unwrap().message, "Connecting to office");

        gate.send(()).unwrap();
        assert!(matches!(
            pump(&mut app, &rx),
            Message::ServiceFinished {
                action: ServiceAction::Start,
                ..
            }
        ));
        assert!(app.machine.is_connected());
        assert_quiet(&rx);
        assert_eq!(
            launcher.calls(),
            vec![
                vec!["openvpn", "--version"],
                vec!["systemctl", "start", "openvpn@office"],
            ]
        );
    }

    #[test]
    fn test_queued_poll_cannot_preempt_auto_connect() {
        let mut s = settings("office");
        s.auto_connect = true;
        let (mut app, launcher, rx) = test_app(s);
        launcher.push(CommandResult::exited(3, "inactive"));

        app.handle_message(Message::Poll);
        let finished = match rx.recv_timeout(Duration::from_secs(2)) {
            Ok(Event::Message(msg)) => msg,
            other => panic!("expected the poll result, got {other:?}"),
        };
        // A tick-driven poll lands between the completion and its handling.
        app.handle_message(Message::Poll);
        app.handle_message(finished);

        assert!(matches!(
            pump(&mut app, &rx),
            Message::ServiceFinished {
                action: ServiceAction::Start,
                ..
            }
        ));
        assert!(app.machine.is_connected());
        assert_quiet(&rx);

        let verbs: Vec<String> = launcher.calls()[1..].iter().map(|c| c[1].clone()).collect();
        assert_eq!(verbs, vec!["is-active", "start"]);
    }

    #[test]
    fn test_failed_stop_keeps_old_profile_supervised() {
        let _lock = crate::logger::tests::lock();
        let mut s = settings("office");
        s.show_warning = true;
        let (mut app, launcher, rx) = test_app(s);

        app.handle_message(Message::Start);
        pump(&mut app, &rx);

        app.handle_message(Message::OpenSettings);
        if let Overlay::Settings(form) = &mut app.overlay {
            form.draft.vpn_name = "home".to_string();
        }
        launcher.push(CommandResult::exited(1, "OpenVPN 2.6.3 x86_64"));
        launcher.push(CommandResult::exited(1, "Access denied"));
        app.handle_message(Message::SaveSettings);
        pump(&mut app, &rx);

        assert!(app.machine.is_connected());
        assert_eq!(app.identity().unit_name(), "openvpn-client@office");

        // The old unit is still up; polling it raises no warning.
        launcher.push(CommandResult::exited(0, "active"));
        app.handle_message(Message::Poll);
        pump(&mut app, &rx);
        assert!(app.machine.is_connected());
        assert!(app.overlay.is_none());
        assert_eq!(
            launcher.calls().last().unwrap(),
            &vec!["systemctl", "is-active", "openvpn-client@office"]
        );

        // Once it goes down the saved profile takes over, without a restart.
        launcher.push(CommandResult::exited(3, "inactive"));
        app.handle_message(Message::Poll);
        pump(&mut app, &rx);
        assert_eq!(app.identity().unit_name(), "openvpn-client@home");
        assert_eq!(app.machine.vpn_name(), "home");
        assert_quiet(&rx);
    }

    #[test]
    fn test_profile_change_waits_for_busy_runner() {
        let _lock = crate::logger::tests::lock();
        let (mut app, launcher, rx) = test_app(settings("office"));

        app.handle_message(Message::Start);
        pump(&mut app, &rx);

        app.handle_message(Message::Poll);
        let poll_finished = match rx.recv_timeout(Duration::from_secs(2)) {
            Ok(Event::Message(msg)) => msg,
            other => panic!("expected the poll result, got {other:?}"),
        };

        app.handle_message(Message::OpenSettings);
        if let Overlay::Settings(form) = &mut app.overlay {
            form.draft.vpn_name = "home".to_string();
        }
        launcher.push(CommandResult::exited(1, "OpenVPN 2.6.3 x86_64"));
        app.handle_message(Message::SaveSettings);

        // The poll still holds the runner, so nothing is stopped yet.
        assert_quiet(&rx);
        assert_eq!(app.identity().unit_name(), "openvpn-client@office");

        app.handle_message(poll_finished);
        assert!(matches!(
            pump(&mut app, &rx),
            Message::ServiceFinished {
                action: ServiceAction::Stop,
                ..
            }
        ));
        assert!(matches!(
            pump(&mut app, &rx),
            Message::ServiceFinished {
                action: ServiceAction::Start,
                ..
            }
        ));
        assert!(app.machine.is_connected());
        assert_eq!(app.identity().unit_name(), "openvpn-client@home");

        let units: Vec<String> = launcher
            .calls()
            .iter()
            .filter(|c| c[0] == "systemctl")
            .map(|c| format!("{} {}", c[1], c[2]))
            .collect();
        assert_eq!(
            units,
            vec![
                "start openvpn-client@office",
                "is-active openvpn-client@office",
                "stop openvpn-client@office",
                "start openvpn-client@home",
            ]
        );
    }

    #[test]
    fn test_warning_over_settings_keeps_draft() {
        let mut s = settings("office");
        s.show_warning = true;
        let (mut app, launcher, rx) = test_app(s);

        launcher.push(CommandResult::exited(0, "active"));
        app.handle_message(Message::Poll);
        pump(&mut app, &rx);

        app.handle_key(key(KeyCode::Char('e')));
        if let Overlay::Settings(form) = &mut app.overlay {
            form.draft.vpn_name = "home".to_string();
        }

        launcher.push(CommandResult::exited(3, "inactive"));
        app.handle_message(Message::Poll);
        pump(&mut app, &rx);
        assert!(matches!(app.overlay, Overlay::Warning { .. }));

        app.handle_key(key(KeyCode::Enter));
        let Overlay::Settings(form) = &app.overlay else {
            panic!("settings editor not restored");
        };
        assert_eq!(form.draft.vpn_name, "home");
        assert_eq!(app.settings.vpn_name, "office");

        app.handle_key(key(KeyCode::Esc));
        assert!(app.overlay.is_none());
    }

    #[test]
    fn test_log_viewer_over_settings_still_loads() {
        let mut s = settings("office");
        s.show_log = true;
        let (mut app, launcher, rx) = test_app(s);
        launcher.push(CommandResult::exited(0, ""));
        launcher.push(CommandResult::exited(0, "Peer Connection Initiated"));

        app.handle_message(Message::Start);
        app.handle_message(Message::OpenSettings);
        pump(&mut app, &rx);
        assert!(matches!(app.overlay, Overlay::LogViewer(_)));

        // Closing the viewer before the journal arrives uncovers settings.
        app.handle_key(key(KeyCode::Esc));
        assert!(matches!(app.overlay, Overlay::Settings(_)));
        assert!(matches!(pump(&mut app, &rx), Message::JournalLoaded(_)));
        assert!(matches!(app.overlay, Overlay::Settings(_)));
    }
}
