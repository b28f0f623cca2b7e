// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Map a configured level name onto a tracing level.
/// Unknown or missing names fall back to INFO.
pub fn parse_level(log_level: Option<&str>) -> Level {
    log_level
        .map(str::trim)
        .and_then(|s| s.parse::<Level>().ok())
        .unwrap_or(Level::INFO)
}

/// Install the global subscriber. Later calls are ignored.
pub fn init_logging(log_level: Option<&str>) {
    let level = parse_level(log_level);

    let _ = FmtSubscriber::builder()
        .with_target(false)
        .with_max_level(level)
        .try_init();
}
