// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

pub mod config;
pub mod logging;

pub use config::{config_search_paths, ConfigError, ConfigFile, CONFIG_FILE_NAME};
pub use logging::{init_logging, parse_level};
