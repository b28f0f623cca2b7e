// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Configuration for gridnav-station.
//!
//! The `[gridnav-station]` section of `gridnav.toml` is read from, in order:
//! 1. Path specified via `--config` CLI argument
//! 2. `./gridnav.toml` (current directory)
//! 3. `~/.config/gridnav/gridnav.toml` (XDG config)
//! 4. `/etc/gridnav/gridnav.toml` (system-wide)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use gridnav_app::{ConfigError, ConfigFile};
use gridnav_core::SessionPolicy;

/// Top-level station configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StationConfig {
    pub general: GeneralConfig,
    pub link: LinkConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    #[default]
    Serial,
    Tcp,
}

/// Robot link settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    pub kind: LinkKind,
    /// Device path for serial, `host:port` for tcp
    pub target: Option<String>,
    /// Serial baud rate
    pub baud: u32,
    pub connect_timeout_ms: u64,
    pub write_timeout_ms: u64,
    /// Connect to `target` on startup
    pub auto_connect: bool,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            kind: LinkKind::Serial,
            target: None,
            baud: 9600,
            connect_timeout_ms: 5000,
            write_timeout_ms: 2000,
            auto_connect: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Forget obstacles and walls when a new session connects
    pub clear_history_on_reconnect: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            clear_history_on_reconnect: true,
        }
    }
}

impl SessionConfig {
    pub fn policy(&self) -> SessionPolicy {
        SessionPolicy {
            clear_history_on_reconnect: self.clear_history_on_reconnect,
        }
    }
}

impl StationConfig {
    pub fn validate(&self) -> Result<(), String> {
        validate_log_level(self.general.log_level.as_deref())?;

        if let Some(target) = &self.link.target {
            if target.trim().is_empty() {
                return Err("[link].target must not be empty when set".to_string());
            }
        }
        if self.link.auto_connect && self.link.target.is_none() {
            return Err("[link].auto_connect requires [link].target".to_string());
        }
        if self.link.kind == LinkKind::Serial && self.link.baud == 0 {
            return Err("[link].baud must be > 0".to_string());
        }
        if self.link.connect_timeout_ms == 0 {
            return Err("[link].connect_timeout_ms must be > 0".to_string());
        }
        if self.link.write_timeout_ms == 0 {
            return Err("[link].write_timeout_ms must be > 0".to_string());
        }
        Ok(())
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        <Self as ConfigFile>::load_from_file(path)
    }

    /// Returns default config if no config file is found.
    pub fn load_from_default_paths() -> Result<(Self, Option<PathBuf>), ConfigError> {
        <Self as ConfigFile>::load_from_default_paths()
    }

    /// Example `gridnav.toml` with the station section filled in.
    pub fn example_toml() -> String {
        let example = StationConfig {
            general: GeneralConfig {
                log_level: Some("info".to_string()),
            },
            link: LinkConfig {
                target: Some("/dev/rfcomm0".to_string()),
                ..LinkConfig::default()
            },
            session: SessionConfig::default(),
        };

        let mut doc = toml::Table::new();
        match toml::Value::try_from(&example) {
            Ok(section) => {
                doc.insert(Self::section_key().to_string(), section);
            }
            Err(_) => return String::new(),
        }
        toml::to_string_pretty(&doc).unwrap_or_default()
    }
}

fn validate_log_level(level: Option<&str>) -> Result<(), String> {
    if let Some(level) = level {
        match level {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(format!(
                    "[general].log_level '{}' is invalid (expected one of: trace, debug, info, warn, error)",
                    level
                ))
            }
        }
    }
    Ok(())
}

impl ConfigFile for StationConfig {
    fn section_key() -> &'static str {
        "gridnav-station"
    }
}
