// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

use serde::{Deserialize, Serialize};

use crate::message::WallCategory;

/// Last pose reported by the robot.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub x: f32,
    pub y: f32,
    pub heading: f32,
}

/// Point where the robot reported a crash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Obstacle {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WallSegment {
    pub x: i32,
    pub y: i32,
    pub category: WallCategory,
}

/// Standard deviation of the robot's position estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UncertaintyEstimate {
    pub x: i32,
    pub y: i32,
    pub sdev_x: i32,
    pub sdev_y: i32,
}

/// Round a reported coordinate onto the integer grid.
pub(crate) fn grid(value: f32) -> i32 {
    value.round() as i32
}
