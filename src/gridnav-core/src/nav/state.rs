// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

use serde::Serialize;

use crate::link::machine::ConnectionState;
use crate::nav::types::{Obstacle, Pose, UncertaintyEstimate, WallSegment};

/// Live navigation model held by the dispatcher.
///
/// Readers get shared references or a [`NavSnapshot`]; every mutator is
/// crate-private so that only the dispatcher changes it.
#[derive(Debug, Clone, Default)]
pub struct NavigationState {
    pose: Pose,
    obstacles: Vec<Obstacle>,
    walls: Vec<WallSegment>,
    uncertainty: Option<UncertaintyEstimate>,
    bomb_captured: bool,
    connection: ConnectionState,
}

/// Immutable copy of the current-value part of [`NavigationState`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavSnapshot {
    pub pose: Pose,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uncertainty: Option<UncertaintyEstimate>,
    pub connection: ConnectionState,
    pub bomb_captured: bool,
    pub obstacle_count: usize,
    pub wall_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl NavigationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn walls(&self) -> &[WallSegment] {
        &self.walls
    }

    pub fn uncertainty(&self) -> Option<UncertaintyEstimate> {
        self.uncertainty
    }

    pub fn bomb_captured(&self) -> bool {
        self.bomb_captured
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    pub fn snapshot(&self, target: Option<&str>) -> NavSnapshot {
        NavSnapshot {
            pose: self.pose,
            uncertainty: self.uncertainty,
            connection: self.connection,
            bomb_captured: self.bomb_captured,
            obstacle_count: self.obstacles.len(),
            wall_count: self.walls.len(),
            target: target.map(str::to_string),
        }
    }

    pub(crate) fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
    }

    pub(crate) fn push_obstacle(&mut self, obstacle: Obstacle) {
        self.obstacles.push(obstacle);
    }

    pub(crate) fn push_wall(&mut self, wall: WallSegment) {
        self.walls.push(wall);
    }

    pub(crate) fn set_uncertainty(&mut self, estimate: UncertaintyEstimate) {
        self.uncertainty = Some(estimate);
    }

    pub(crate) fn mark_bomb_captured(&mut self) {
        self.bomb_captured = true;
    }

    pub(crate) fn set_connection(&mut self, connection: ConnectionState) {
        self.connection = connection;
    }

    /// Drop per-session history. The pose stays as last known.
    pub(crate) fn clear_history(&mut self) {
        self.obstacles.clear();
        self.walls.clear();
        self.uncertainty = None;
        self.bomb_captured = false;
    }
}
