// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;
use std::path::{Path, PathBuf};

use agendum_ical::{FormatOptions, ParseOptions};

use crate::uid::{DEFAULT_UID_DOMAIN, TimestampUidGenerator, UidGenerator, UuidUidGenerator};

/// The name of the application.
pub const APP_NAME: &str = "agendum";

/// Configuration shared by the calendar engine and its front ends.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    /// Domain appended to generated UIDs, e.g. `@example.com`.
    pub uid_domain: String,

    /// How new UIDs are generated.
    pub uid_policy: UidPolicy,

    /// Fold lines longer than this many octets; `0` disables folding.
    pub fold_width: usize,

    /// Fail on properties that are neither standard nor `X-` prefixed.
    pub reject_unknown_properties: bool,

    /// Upper bound on occurrences listed for one series.
    pub occurrence_limit: usize,

    /// Width of the occurrence window when no end is given.
    pub default_window_days: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            uid_domain: DEFAULT_UID_DOMAIN.to_string(),
            uid_policy: UidPolicy::default(),
            fold_width: 75,
            reject_unknown_properties: true,
            occurrence_limit: 1000,
            default_window_days: 365,
        }
    }
}

/// UID generation policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UidPolicy {
    /// `<timestamp>-<counter><domain>`
    #[default]
    Timestamp,
    /// Random UUID v4.
    Uuid,
}

impl Config {
    /// Normalize the configuration.
    ///
    /// # Errors
    ///
    /// If a value is out of range.
    pub fn normalize(&mut self) -> Result<(), Box<dyn Error>> {
        let domain = self.uid_domain.trim();
        self.uid_domain = match domain {
            "" => DEFAULT_UID_DOMAIN.to_string(),
            d if d.starts_with('@') => d.to_string(),
            d => format!("@{d}"),
        };

        if self.fold_width == 1 {
            return Err("fold_width must be 0 (no folding) or at least 2".into());
        }
        if self.occurrence_limit == 0 {
            return Err("occurrence_limit must be positive".into());
        }
        Ok(())
    }

    /// A UID generator following [`uid_policy`](Self::uid_policy).
    #[must_use]
    pub fn uid_generator(&self) -> Box<dyn UidGenerator> {
        match self.uid_policy {
            UidPolicy::Timestamp => Box::new(TimestampUidGenerator::new(self.uid_domain.clone())),
            UidPolicy::Uuid => Box::new(UuidUidGenerator),
        }
    }

    /// Formatter options from this configuration.
    #[must_use]
    pub fn format_options(&self) -> FormatOptions {
        let folding = (self.fold_width > 0).then_some(self.fold_width);
        FormatOptions::default().folding(folding)
    }

    /// Parser options from this configuration.
    #[must_use]
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions::default().reject_unknown_properties(self.reject_unknown_properties)
    }

    /// Where the configuration file lives when none is given explicitly.
    ///
    /// # Errors
    ///
    /// If no user configuration directory can be determined.
    pub fn default_path() -> Result<PathBuf, Box<dyn Error>> {
        Ok(get_config_dir()?.join(APP_NAME).join("config.toml"))
    }
}

/// Handle tilde (~) and environment variables in the path
///
/// # Errors
///
/// If the path is not valid UTF-8 or the home directory is unknown.
pub fn expand_path(path: &Path) -> Result<PathBuf, Box<dyn Error>> {
    if path.is_absolute() {
        return Ok(path.to_owned());
    }

    let path = path.to_str().ok_or("Invalid path")?;

    // Handle tilde and home directory
    let home_prefixes: &[&str] = if cfg!(unix) {
        &["~/", "$HOME/", "${HOME}/"]
    } else {
        &[r"~\", "~/", r"%UserProfile%\", r"%UserProfile%/"]
    };
    for prefix in home_prefixes {
        if let Some(stripped) = path.strip_prefix(prefix) {
            return Ok(get_home_dir()?.join(stripped));
        }
    }

    // Handle config directories
    let config_prefixes: &[&str] = if cfg!(unix) {
        &["$XDG_CONFIG_HOME/", "${XDG_CONFIG_HOME}/"]
    } else {
        &[r"%LOCALAPPDATA%\", "%LOCALAPPDATA%/"]
    };
    for prefix in config_prefixes {
        if let Some(stripped) = path.strip_prefix(prefix) {
            return Ok(get_config_dir()?.join(stripped));
        }
    }

    Ok(path.into())
}

fn get_home_dir() -> Result<PathBuf, Box<dyn Error>> {
    dirs::home_dir().ok_or_else(|| "User-specific home directory not found".into())
}

fn get_config_dir() -> Result<PathBuf, Box<dyn Error>> {
    #[cfg(unix)]
    let config_dir = xdg::BaseDirectories::new().get_config_home();
    #[cfg(not(unix))]
    let config_dir = dirs::config_dir();
    config_dir.ok_or_else(|| "User-specific config directory not found".into())
}
