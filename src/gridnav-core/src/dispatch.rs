// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Inbound message dispatcher.
//!
//! The dispatcher is the single writer of [`NavigationState`]. Each call to
//! [`Dispatcher::dispatch`] applies one message completely, state change and
//! listener notification together, before it returns. Link lifecycle events
//! go through the same object so that connection state and telemetry share
//! one exclusion domain.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::link::machine::{ConnectionMachine, ConnectionState, LinkEvent};
use crate::listener::{ListenerId, NavEventEmitter, NavListener};
use crate::message::{Message, MessageType};
use crate::nav::state::{NavSnapshot, NavigationState};
use crate::nav::types::{grid, Obstacle, Pose, UncertaintyEstimate, WallSegment};

/// Session-level policy knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    /// Clear obstacles, walls, uncertainty and the capture flag whenever a
    /// new session becomes connected.
    pub clear_history_on_reconnect: bool,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            clear_history_on_reconnect: true,
        }
    }
}

/// What happened to one inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Telemetry applied to the navigation state.
    Applied(MessageType),
    /// Acknowledgement with no state effect.
    Acknowledged(MessageType),
    /// Robot closed the session.
    SessionEnded,
    /// Outbound-only type echoed back by the robot.
    Unexpected(MessageType),
    /// Arrived while no session was connected.
    Stale(MessageType),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub applied: u64,
    pub ignored: u64,
    pub rejected: u64,
}

pub struct Dispatcher {
    state: NavigationState,
    machine: ConnectionMachine,
    emitter: NavEventEmitter,
    policy: SessionPolicy,
    stats: DispatchStats,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(SessionPolicy::default())
    }
}

impl Dispatcher {
    pub fn new(policy: SessionPolicy) -> Self {
        Self {
            state: NavigationState::new(),
            machine: ConnectionMachine::new(),
            emitter: NavEventEmitter::new(),
            policy,
            stats: DispatchStats::default(),
        }
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn connection(&self) -> ConnectionState {
        self.machine.state()
    }

    pub fn machine(&self) -> &ConnectionMachine {
        &self.machine
    }

    pub fn snapshot(&self) -> NavSnapshot {
        self.state.snapshot(self.machine.target())
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    pub fn policy(&self) -> SessionPolicy {
        self.policy
    }

    pub fn register(&mut self, listener: Arc<dyn NavListener>) -> ListenerId {
        self.emitter.register(listener)
    }

    pub fn unregister(&mut self, id: ListenerId) {
        self.emitter.unregister(id);
    }

    /// Apply one decoded inbound message.
    pub fn dispatch(&mut self, msg: Message) -> DispatchOutcome {
        let kind = msg.kind();
        if !self.connection().can_send() {
            debug!("Dropping {} received while {}", kind, self.connection());
            self.stats.ignored += 1;
            return DispatchOutcome::Stale(kind);
        }

        debug!("Dispatching {}", msg);
        let outcome = match msg {
            Message::PosUpdate { x, y, heading } => {
                self.state.set_pose(Pose { x, y, heading });
                self.emitter.notify_pose(x, y, heading);
                DispatchOutcome::Applied(kind)
            }
            Message::Crash { x, y } => {
                let obstacle = Obstacle {
                    x: grid(x),
                    y: grid(y),
                };
                self.state.push_obstacle(obstacle);
                self.emitter.notify_obstacle(obstacle.x, obstacle.y);
                DispatchOutcome::Applied(kind)
            }
            Message::Wall { x, y, category } => {
                let wall = WallSegment {
                    x: grid(x),
                    y: grid(y),
                    category,
                };
                self.state.push_wall(wall);
                self.emitter.notify_wall(wall.x, wall.y, wall.category);
                DispatchOutcome::Applied(kind)
            }
            Message::StdDev {
                x,
                y,
                sdev_x,
                sdev_y,
            } => {
                let estimate = UncertaintyEstimate {
                    x: grid(x),
                    y: grid(y),
                    sdev_x: grid(sdev_x),
                    sdev_y: grid(sdev_y),
                };
                self.state.set_uncertainty(estimate);
                self.emitter.notify_uncertainty(
                    estimate.x,
                    estimate.y,
                    estimate.sdev_x,
                    estimate.sdev_y,
                );
                DispatchOutcome::Applied(kind)
            }
            Message::ExploreReceived => {
                self.emitter.notify_status("explore complete");
                DispatchOutcome::Acknowledged(kind)
            }
            Message::GrabBomb => {
                self.state.mark_bomb_captured();
                let pose = self.state.pose();
                self.emitter.notify_bomb_captured(grid(pose.x), grid(pose.y));
                DispatchOutcome::Applied(kind)
            }
            Message::Disconnect => {
                info!("Robot closed the session");
                self.transition(LinkEvent::RemoteDisconnect);
                DispatchOutcome::SessionEnded
            }
            Message::Goto { .. }
            | Message::Stop
            | Message::SetPose { .. }
            | Message::FixPos
            | Message::Echo { .. }
            | Message::Rotate { .. }
            | Message::Travel { .. }
            | Message::RotateTo { .. }
            | Message::ScannerRotate { .. }
            | Message::SendMap { .. }
            | Message::Explore { .. } => {
                warn!("Ignoring unexpected inbound {}", msg);
                DispatchOutcome::Unexpected(kind)
            }
        };

        match outcome {
            DispatchOutcome::Unexpected(_) | DispatchOutcome::Stale(_) => self.stats.ignored += 1,
            _ => self.stats.applied += 1,
        }
        outcome
    }

    /// Count a record the decoder had to throw away.
    pub fn record_rejected(&mut self) {
        self.stats.rejected += 1;
    }

    /// Operator asked to connect. Returns false when a link is already
    /// active or being set up.
    pub fn request_connect(&mut self, target: &str) -> bool {
        self.transition(LinkEvent::ConnectRequested {
            target: target.to_string(),
        })
    }

    /// Transport confirmed the link. Applies the reset policy before the
    /// first telemetry of the new session can arrive.
    pub fn confirm_connected(&mut self) -> bool {
        if self.machine.state() != ConnectionState::Connecting {
            return false;
        }
        if self.policy.clear_history_on_reconnect {
            self.state.clear_history();
        }
        self.stats = DispatchStats::default();
        self.transition(LinkEvent::Confirmed)
    }

    pub fn connect_failed(&mut self, reason: &str) -> bool {
        let changed = self.transition(LinkEvent::Failed(reason.to_string()));
        if changed {
            self.emitter
                .notify_status(&format!("Connection failed: {reason}"));
        }
        changed
    }

    pub fn link_lost(&mut self, reason: &str) -> bool {
        let changed = self.transition(LinkEvent::LinkLost(reason.to_string()));
        if changed {
            self.emitter.notify_status(&format!("Link lost: {reason}"));
        }
        changed
    }

    pub fn request_disconnect(&mut self) -> bool {
        self.transition(LinkEvent::DisconnectRequested)
    }

    fn transition(&mut self, event: LinkEvent) -> bool {
        let old = self.machine.state();
        if !self.machine.process_event(event) {
            return false;
        }
        let new = self.machine.state();
        info!("Link state {} -> {}", old, new);
        self.state.set_connection(new);
        self.emitter.notify_connection(new);
        true
    }
}
