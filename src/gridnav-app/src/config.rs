// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = "gridnav.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    ReadError(PathBuf, String),

    #[error("Failed to parse config file {0}: {1}")]
    ParseError(PathBuf, String),

    #[error("Config file {0} has no [{1}] section")]
    MissingSection(PathBuf, &'static str),
}

/// Default locations of `gridnav.toml`, in lookup order
/// (current directory → XDG config → /etc).
pub fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("gridnav").join(CONFIG_FILE_NAME));
    }
    paths.push(PathBuf::from("/etc/gridnav").join(CONFIG_FILE_NAME));
    paths
}

fn parse_section<T: DeserializeOwned>(
    path: &Path,
    content: &str,
    key: &str,
) -> Result<Option<T>, ConfigError> {
    let parse_err = |reason: String| ConfigError::ParseError(path.to_path_buf(), reason);

    let mut table: toml::Table = toml::from_str(content).map_err(|e| parse_err(e.to_string()))?;
    let Some(section) = table.remove(key) else {
        return Ok(None);
    };
    section
        .try_into::<T>()
        .map(Some)
        .map_err(|e| parse_err(e.to_string()))
}

fn load_section_from_file<T: DeserializeOwned>(
    path: &Path,
    key: &str,
) -> Result<Option<T>, ConfigError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::ReadError(path.to_path_buf(), e.to_string()))?;
    parse_section(path, &content, key)
}

/// Loading of one named section of `gridnav.toml`.
///
/// Implementors derive `Deserialize` with `#[serde(default)]` so that a
/// partial section fills the rest from `Default`.
pub trait ConfigFile: Sized + Default + DeserializeOwned {
    /// Section key, e.g. `"gridnav-station"`.
    fn section_key() -> &'static str;

    /// Load the section from a specific file. A file without the section
    /// is an error here, since the operator named it explicitly.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        load_section_from_file::<Self>(path, Self::section_key())?
            .ok_or_else(|| ConfigError::MissingSection(path.to_path_buf(), Self::section_key()))
    }

    /// Parse the section out of an in-memory document.
    fn load_from_str(content: &str) -> Result<Self, ConfigError> {
        let origin = Path::new("<inline>");
        Ok(parse_section::<Self>(origin, content, Self::section_key())?.unwrap_or_default())
    }

    /// Load the first default-path file that carries the section.
    ///
    /// Returns `(Default::default(), None)` when none does.
    fn load_from_default_paths() -> Result<(Self, Option<PathBuf>), ConfigError> {
        for path in config_search_paths() {
            if path.exists() {
                if let Some(cfg) = load_section_from_file::<Self>(&path, Self::section_key())? {
                    return Ok((cfg, Some(path)));
                }
            }
        }
        Ok((Self::default(), None))
    }
}
