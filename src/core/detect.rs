//! One-time capability detection.
//!
//! OpenVPN 2.4 moved client profiles to `/etc/openvpn/client` and ships the
//! `openvpn-client@` unit; older releases use `/etc/openvpn` with
//! `openvpn@`. The installed version is sniffed once at startup (and again
//! on settings save) and turned into a [`Capabilities`] value, from which the
//! [`ServiceIdentity`] is built.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::AppSettings;
use crate::constants;
use crate::core::runner::CommandRunner;
use crate::core::service::ServiceIdentity;

/// Unit/profile layout of the installed OpenVPN.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceLayout {
    /// OpenVPN >= 2.4.
    Modern,
    /// Older, missing, or unrecognised OpenVPN.
    Legacy,
}

impl ServiceLayout {
    #[must_use]
    pub const fn template(self) -> &'static str {
        match self {
            Self::Modern => constants::TEMPLATE_MODERN,
            Self::Legacy => constants::TEMPLATE_LEGACY,
        }
    }

    #[must_use]
    pub const fn config_dir(self) -> &'static str {
        match self {
            Self::Modern => constants::CONFIG_DIR_MODERN,
            Self::Legacy => constants::CONFIG_DIR_LEGACY,
        }
    }
}

/// Result of capability detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    /// `(major, minor)` of the installed OpenVPN, if it could be determined.
    pub version: Option<(u32, u32)>,
    pub layout: ServiceLayout,
    pub config_dir: PathBuf,
}

impl Capabilities {
    #[must_use]
    pub fn from_version(version: Option<(u32, u32)>) -> Self {
        let layout = layout_for(version);
        Self {
            version,
            layout,
            config_dir: PathBuf::from(layout.config_dir()),
        }
    }

    /// `2.4` or `unknown`.
    #[must_use]
    pub fn version_label(&self) -> String {
        self.version
            .map_or_else(|| "unknown".to_string(), |(major, minor)| format!("{major}.{minor}"))
    }
}

/// Picks the layout for a detected version.
#[must_use]
pub fn layout_for(version: Option<(u32, u32)>) -> ServiceLayout {
    match version {
        Some(v) if v >= constants::OPENVPN_MODERN_VERSION => ServiceLayout::Modern,
        _ => ServiceLayout::Legacy,
    }
}

/// Extracts `(major, minor)` from `openvpn --version` output.
///
/// The version is the second whitespace-separated token of the first line,
/// e.g. `OpenVPN 2.5.1 x86_64-pc-linux-gnu [SSL (OpenSSL)] ...`.
#[must_use]
pub fn parse_version(output: &str) -> Option<(u32, u32)> {
    let token = output.split_whitespace().nth(1)?;
    let mut parts = token.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor_raw = parts.next()?;
    // Tolerate suffixes such as `4_rc1`.
    let digits: String = minor_raw.chars().take_while(char::is_ascii_digit).collect();
    let minor = digits.parse().ok()?;
    Some((major, minor))
}

/// Runs `openvpn --version` and derives the layout.
///
/// A missing binary or unparseable output is reported as a warning and
/// falls back to the legacy layout.
pub fn detect(runner: &CommandRunner) -> Capabilities {
    let argv = vec![constants::OPENVPN_BINARY.to_string(), "--version".to_string()];
    let result = runner.run_blocking(&argv);

    if !result.completed_normally {
        crate::log_warning!(
            "DETECT",
            "An installation of OpenVPN could not be found on your machine ({})",
            result.output.trim()
        );
        return Capabilities::from_version(None);
    }

    // `openvpn --version` exits non-zero on most builds; only the text matters.
    let version = parse_version(&result.output);
    if version.is_none() {
        crate::log_warning!(
            "DETECT",
            "Couldn't determine the installed OpenVPN version, assuming v0.0"
        );
    }

    let caps = Capabilities::from_version(version);
    crate::log_info!(
        "DETECT",
        "OpenVPN {} -> {}@ units, profiles in {}",
        caps.version_label(),
        caps.layout.template(),
        caps.config_dir.display()
    );
    caps
}

/// Names of the `*.conf` profiles in `dir`, sorted. Unreadable dirs give none.
pub fn list_profiles(dir: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut names: Vec<String> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path.extension().and_then(|e| e.to_str()) == Some(constants::PROFILE_EXTENSION)
        })
        .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(str::to_string))
        .collect();
    names.sort();
    names
}

/// Builds the session identity from settings and detected capabilities.
///
/// An explicit `service_template` in settings wins over detection.
#[must_use]
pub fn build_identity(settings: &AppSettings, caps: &Capabilities) -> ServiceIdentity {
    let template = settings
        .service_template
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(caps.layout.template());

    let privilege = settings.sudo_command.trim();
    ServiceIdentity {
        vpn_name: settings.vpn_name.trim().to_string(),
        service_template: template.to_string(),
        privilege_command: (!privilege.is_empty()).then(|| privilege.to_string()),
        use_privilege: settings.use_sudo,
    }
}
