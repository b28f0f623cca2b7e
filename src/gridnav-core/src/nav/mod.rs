// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Navigation model: what the robot has reported about itself and its
//! surroundings.

pub mod state;
pub mod types;
