//! Small formatting helpers shared by the UI, logger and CLI.

use std::time::SystemTime;

/// Formats a `SystemTime` as local `HH:MM:SS`.
#[must_use]
pub fn format_system_time_local(time: SystemTime) -> String {
    local_hms(time).map_or_else(
        || "00:00:00".to_string(),
        |(h, m, s)| format!("{h:02}:{m:02}:{s:02}"),
    )
}

/// Formats a `SystemTime` as local `HH:MM` (the "connected since" clock).
#[must_use]
pub fn format_clock(time: SystemTime) -> String {
    local_hms(time).map_or_else(|| "--:--".to_string(), |(h, m, _)| format!("{h:02}:{m:02}"))
}

#[cfg(unix)]
#[allow(unsafe_code)]
fn local_hms(time: SystemTime) -> Option<(i32, i32, i32)> {
    let secs = time.duration_since(SystemTime::UNIX_EPOCH).ok()?.as_secs();

    // SAFETY: localtime_r only writes into our stack-allocated `tm`.
    let mut tm: libc::tm = unsafe { std::mem::zeroed() };
    #[allow(clippy::cast_possible_wrap)]
    let time_t = secs as libc::time_t;
    let result = unsafe { libc::localtime_r(&time_t, &mut tm) };
    if result.is_null() {
        return None;
    }
    Some((tm.tm_hour, tm.tm_min, tm.tm_sec))
}

#[cfg(not(unix))]
fn local_hms(time: SystemTime) -> Option<(i32, i32, i32)> {
    // UTC is the best we can do without a timezone database.
    let secs = time.duration_since(SystemTime::UNIX_EPOCH).ok()?.as_secs();
    let day = secs % 86_400;
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    Some(((day / 3600) as i32, ((day % 3600) / 60) as i32, (day % 60) as i32))
}

/// Formats an elapsed duration compactly (e.g. `42s`, `5m 03s`, `2h 10m`).
#[must_use]
pub fn format_elapsed(since: SystemTime) -> String {
    let Ok(elapsed) = SystemTime::now().duration_since(since) else {
        return "0s".to_string();
    };
    let secs = elapsed.as_secs();
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m {:02}s", secs / 60, secs % 60)
    } else {
        format!("{}h {:02}m", secs / 3600, (secs % 3600) / 60)
    }
}

/// Truncates a string to `max_chars`, ending with `...` when shortened.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let mut t: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        t.push_str("...");
        t
    } else {
        s.to_string()
    }
}
