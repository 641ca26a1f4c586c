//! Service journal retrieval for the log viewer.
//!
//! The viewer fetches through its own runner, so a slow `journalctl` never
//! occupies the slot used for start/stop/status.

use crate::constants;
use crate::core::runner::{CommandResult, CommandRunner};
use crate::core::service::ServiceIdentity;

/// `[<privilege>] journalctl -b -u <unit>`
///
/// `with_privilege` adds the prefix only if the identity enables escalation.
#[must_use]
pub fn journal_argv(identity: &ServiceIdentity, with_privilege: bool) -> Vec<String> {
    let mut argv = Vec::with_capacity(5);
    if with_privilege {
        if let Some(prefix) = identity.privilege_prefix() {
            argv.push(prefix.to_string());
        }
    }
    argv.extend([
        constants::JOURNAL_COMMAND.to_string(),
        "-b".to_string(),
        "-u".to_string(),
        identity.unit_name(),
    ]);
    argv
}

/// Text to display for a finished journal fetch.
#[must_use]
pub fn journal_text(result: &CommandResult) -> String {
    let text = result.output.trim_end();
    if result.completed_normally {
        if text.is_empty() {
            "-- No entries --".to_string()
        } else {
            text.to_string()
        }
    } else {
        format!("Could not read the journal: {text}")
    }
}

/// Fetches the journal in the background; `false` if a fetch is in flight.
pub fn fetch<F>(runner: &CommandRunner, identity: &ServiceIdentity, on_complete: F) -> bool
where
    F: FnOnce(CommandResult) + Send + 'static,
{
    runner.run(journal_argv(identity, false), move |_, result| on_complete(result))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(use_privilege: bool) -> ServiceIdentity {
        ServiceIdentity {
            vpn_name: "office".to_string(),
            service_template: "openvpn".to_string(),
            privilege_command: Some("kdesu".to_string()),
            use_privilege,
        }
    }

    #[test]
    fn test_argv_without_privilege() {
        assert_eq!(
            journal_argv(&identity(true), false),
            vec!["journalctl", "-b", "-u", "openvpn@office"]
        );
    }

    #[test]
    fn test_argv_with_privilege() {
        assert_eq!(
            journal_argv(&identity(true), true),
            vec!["kdesu", "journalctl", "-b", "-u", "openvpn@office"]
        );
        assert_eq!(journal_argv(&identity(false), true)[0], "journalctl");
    }

    #[test]
    fn test_journal_text() {
        assert_eq!(journal_text(&CommandResult::exited(0, "line\n")), "line");
        assert_eq!(journal_text(&CommandResult::exited(0, "")), "-- No entries --");
        // Non-zero exits still show what journalctl printed.
        assert_eq!(journal_text(&CommandResult::exited(1, "No journal files")), "No journal files");
        assert!(journal_text(&CommandResult::failed("journalctl: not found")).starts_with("Could not read"));
    }
}
