// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Navigation event notification system.
//!
//! The dispatcher reports every observable change through [`NavListener`].
//! Consumers such as a map view implement the trait and register with the
//! [`NavEventEmitter`]. Listeners are called synchronously while the
//! dispatcher holds the state, so they must return quickly; anything slow
//! belongs behind a [`ChannelListener`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc;

use crate::link::machine::ConnectionState;
use crate::message::WallCategory;

/// Unique identifier for a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Trait for components that want to receive navigation events.
///
/// All methods have default no-op implementations, so listeners can
/// selectively override only the events they care about.
///
/// Callbacks run while the station holds its state lock. They must return
/// quickly and must not call back into the station (`snapshot`,
/// `with_state` and the like), or they deadlock.
pub trait NavListener: Send + Sync {
    /// Free-form status line for the operator.
    fn on_status_message(&self, _text: &str) {}

    fn on_pose_changed(&self, _x: f32, _y: f32, _heading: f32) {}

    fn on_obstacle_detected(&self, _x: i32, _y: i32) {}

    fn on_wall_detected(&self, _x: i32, _y: i32, _category: WallCategory) {}

    fn on_uncertainty_changed(&self, _x: i32, _y: i32, _sdev_x: i32, _sdev_y: i32) {}

    fn on_bomb_captured(&self, _x: i32, _y: i32) {}

    fn on_connection_state_changed(&self, _state: ConnectionState) {}
}

/// Owned form of a listener notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum NavEvent {
    Status { text: String },
    Pose { x: f32, y: f32, heading: f32 },
    Obstacle { x: i32, y: i32 },
    Wall { x: i32, y: i32, category: WallCategory },
    Uncertainty { x: i32, y: i32, sdev_x: i32, sdev_y: i32 },
    BombCaptured { x: i32, y: i32 },
    Connection { state: ConnectionState },
}

/// Listener that forwards every event into an unbounded channel.
///
/// Sending never blocks, so a slow consumer on the other end cannot stall
/// message draining.
pub struct ChannelListener {
    tx: mpsc::UnboundedSender<NavEvent>,
}

impl ChannelListener {
    pub fn new(tx: mpsc::UnboundedSender<NavEvent>) -> Self {
        Self { tx }
    }

    /// Build a listener together with the receiving end.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<NavEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    fn forward(&self, event: NavEvent) {
        // Receiver gone means nobody renders; dropping is fine.
        let _ = self.tx.send(event);
    }
}

impl NavListener for ChannelListener {
    fn on_status_message(&self, text: &str) {
        self.forward(NavEvent::Status {
            text: text.to_string(),
        });
    }

    fn on_pose_changed(&self, x: f32, y: f32, heading: f32) {
        self.forward(NavEvent::Pose { x, y, heading });
    }

    fn on_obstacle_detected(&self, x: i32, y: i32) {
        self.forward(NavEvent::Obstacle { x, y });
    }

    fn on_wall_detected(&self, x: i32, y: i32, category: WallCategory) {
        self.forward(NavEvent::Wall { x, y, category });
    }

    fn on_uncertainty_changed(&self, x: i32, y: i32, sdev_x: i32, sdev_y: i32) {
        self.forward(NavEvent::Uncertainty {
            x,
            y,
            sdev_x,
            sdev_y,
        });
    }

    fn on_bomb_captured(&self, x: i32, y: i32) {
        self.forward(NavEvent::BombCaptured { x, y });
    }

    fn on_connection_state_changed(&self, state: ConnectionState) {
        self.forward(NavEvent::Connection { state });
    }
}

/// Manages registered listeners and dispatches events.
pub struct NavEventEmitter {
    listeners: Vec<(ListenerId, Arc<dyn NavListener>)>,
}

impl Default for NavEventEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl NavEventEmitter {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Register a listener to receive events.
    /// Returns an ID that can be used to unregister the listener.
    pub fn register(&mut self, listener: Arc<dyn NavListener>) -> ListenerId {
        let id = ListenerId::new();
        self.listeners.push((id, listener));
        id
    }

    pub fn unregister(&mut self, id: ListenerId) {
        self.listeners.retain(|(lid, _)| *lid != id);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn notify_status(&self, text: &str) {
        for (_, listener) in &self.listeners {
            listener.on_status_message(text);
        }
    }

    pub fn notify_pose(&self, x: f32, y: f32, heading: f32) {
        for (_, listener) in &self.listeners {
            listener.on_pose_changed(x, y, heading);
        }
    }

    pub fn notify_obstacle(&self, x: i32, y: i32) {
        for (_, listener) in &self.listeners {
            listener.on_obstacle_detected(x, y);
        }
    }

    pub fn notify_wall(&self, x: i32, y: i32, category: WallCategory) {
        for (_, listener) in &self.listeners {
            listener.on_wall_detected(x, y, category);
        }
    }

    pub fn notify_uncertainty(&self, x: i32, y: i32, sdev_x: i32, sdev_y: i32) {
        for (_, listener) in &self.listeners {
            listener.on_uncertainty_changed(x, y, sdev_x, sdev_y);
        }
    }

    pub fn notify_bomb_captured(&self, x: i32, y: i32) {
        for (_, listener) in &self.listeners {
            listener.on_bomb_captured(x, y);
        }
    }

    pub fn notify_connection(&self, state: ConnectionState) {
        for (_, listener) in &self.listeners {
            listener.on_connection_state_changed(state);
        }
    }
}
