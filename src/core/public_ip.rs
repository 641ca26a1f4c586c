//! Public IP lookup for the log viewer.
//!
//! Queries plain-text echo services over `curl`, trying each endpoint in turn
//! on a background thread, then asks the system resolver for the host name.

use std::sync::mpsc::Sender;
use std::thread;

use crate::constants;
use crate::core::runner::{ProcessLauncher, SystemLauncher};

/// Whether `text` looks like an IPv4 or IPv6 address.
#[must_use]
pub fn looks_like_ip(text: &str) -> bool {
    text.parse::<std::net::IpAddr>().is_ok()
}

/// Tries each endpoint with `launcher` until one returns an address.
pub fn lookup(launcher: &dyn ProcessLauncher, endpoints: &[&str]) -> Option<String> {
    let timeout = constants::API_TIMEOUT_SECS.to_string();
    endpoints.iter().find_map(|endpoint| {
        let argv = vec![
            "curl".to_string(),
            "-s".to_string(),
            "--max-time".to_string(),
            timeout.clone(),
            (*endpoint).to_string(),
        ];
        let result = launcher.launch(&argv);
        let ip = result.output.trim();
        (result.success() && looks_like_ip(ip)).then(|| ip.to_string())
    })
}

/// Host name for `ip` from `getent hosts`, if the resolver knows one.
pub fn reverse_lookup(launcher: &dyn ProcessLauncher, ip: &str) -> Option<String> {
    let argv = vec!["getent".to_string(), "hosts".to_string(), ip.to_string()];
    let result = launcher.launch(&argv);
    if !result.success() {
        return None;
    }
    // "<address> <canonical name> [aliases...]"
    result
        .output
        .lines()
        .next()?
        .split_whitespace()
        .nth(1)
        .filter(|name| *name != ip)
        .map(str::to_string)
}

/// `ip (hostname)` when the address resolves, the bare address otherwise.
pub fn describe(launcher: &dyn ProcessLauncher, endpoints: &[&str]) -> Option<String> {
    let ip = lookup(launcher, endpoints)?;
    Some(match reverse_lookup(launcher, &ip) {
        Some(host) => format!("{ip} ({host})"),
        None => ip,
    })
}

/// Spawns a lookup; the mapped result is sent once through `tx`.
pub fn spawn_lookup<T, F>(tx: Sender<T>, wrap: F)
where
    T: Send + 'static,
    F: FnOnce(Option<String>) -> T + Send + 'static,
{
    let spawned = thread::Builder::new()
        .name("public-ip".to_string())
        .spawn(move || {
            let ip = describe(&SystemLauncher, &constants::PUBLIC_IP_APIS);
            if ip.is_none() {
                crate::log_warning!("UI", "Failed to fetch public IP (check network/curl)");
            }
            let _ = tx.send(wrap(ip));
        });
    if let Err(e) = spawned {
        crate::log_error!("UI", "Could not start public IP lookup: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::runner::tests::ScriptedLauncher;
    use crate::core::runner::CommandResult;

    #[test]
    fn test_looks_like_ip() {
        assert!(looks_like_ip("203.0.113.7"));
        assert!(looks_like_ip("2001:db8::1"));
        assert!(!looks_like_ip("<html>"));
        assert!(!looks_like_ip(""));
    }

    #[test]
    fn test_lookup_falls_through_to_next_endpoint() {
        let launcher = ScriptedLauncher::default();
        launcher.push(CommandResult::failed("curl: not found"));
        launcher.push(CommandResult::exited(0, "<html>error</html>"));
        launcher.push(CommandResult::exited(0, "198.51.100.4\n"));

        let ip = lookup(&launcher, &["https://a", "https://b", "https://c"]);
        assert_eq!(ip.as_deref(), Some("198.51.100.4"));

        let calls = launcher.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[2].last().map(String::as_str), Some("https://c"));
    }

    #[test]
    fn test_lookup_all_fail() {
        let launcher = ScriptedLauncher::default();
        launcher.push(CommandResult::exited(7, ""));
        launcher.push(CommandResult::exited(0, "not an ip"));
        assert_eq!(lookup(&launcher, &["https://a", "https://b"]), None);
    }

    #[test]
    fn test_describe_adds_host_name() {
        let launcher = ScriptedLauncher::default();
        launcher.push(CommandResult::exited(0, "198.51.100.4\n"));
        launcher.push(CommandResult::exited(
            0,
            "198.51.100.4    gw-4.example.net gw4\n",
        ));

        let shown = describe(&launcher, &["https://a"]);
        assert_eq!(shown.as_deref(), Some("198.51.100.4 (gw-4.example.net)"));
        assert_eq!(
            launcher.calls()[1],
            vec!["getent", "hosts", "198.51.100.4"]
        );
    }

    #[test]
    fn test_describe_without_reverse_record() {
        let launcher = ScriptedLauncher::default();
        launcher.push(CommandResult::exited(0, "2001:db8::1"));
        // getent exits 2 when the key is not found.
        launcher.push(CommandResult::exited(2, ""));
        assert_eq!(describe(&launcher, &["https://a"]).as_deref(), Some("2001:db8::1"));

        launcher.push(CommandResult::exited(0, "203.0.113.7  203.0.113.7\n"));
        assert_eq!(reverse_lookup(&launcher, "203.0.113.7"), None);
    }
}
