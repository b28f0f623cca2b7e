// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Connection state machine for the robot link.
//!
//! Transitions are explicit: every change of [`ConnectionState`] goes through
//! [`ConnectionMachine::process_event`], which refuses events that make no
//! sense in the current state.

use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Coarse state of the robot link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionState {
    /// Commands can only be sent in this state.
    pub fn can_send(self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "Disconnected"),
            Self::Connecting => write!(f, "Connecting"),
            Self::Connected => write!(f, "Connected"),
        }
    }
}

/// Events that can move the link between states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// Operator asked to connect to `target`.
    ConnectRequested { target: String },
    /// Transport confirmed the link is up.
    Confirmed,
    /// Transport could not establish the link.
    Failed(String),
    /// Operator asked to disconnect.
    DisconnectRequested,
    /// Robot sent DISCONNECT.
    RemoteDisconnect,
    /// Transport reported the link dropped.
    LinkLost(String),
}

/// Point-in-time view of the link for status displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkStatus {
    pub state: ConnectionState,
    pub target: Option<String>,
    pub last_error: Option<String>,
    pub transitions: u64,
    /// Milliseconds since the last transition, if there was one.
    pub in_state_ms: Option<u64>,
}

/// Tracks the connection state together with the current target.
#[derive(Debug, Clone, Default)]
pub struct ConnectionMachine {
    state: ConnectionState,
    target: Option<String>,
    last_error: Option<String>,
    transition_count: u64,
    last_transition: Option<Instant>,
}

impl ConnectionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Identifier of the link being set up or in use.
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// Reason for the last failed connect or lost link.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn transition_count(&self) -> u64 {
        self.transition_count
    }

    pub fn time_in_state(&self) -> Option<Duration> {
        self.last_transition.map(|t| t.elapsed())
    }

    pub fn status(&self) -> LinkStatus {
        LinkStatus {
            state: self.state,
            target: self.target.clone(),
            last_error: self.last_error.clone(),
            transitions: self.transition_count,
            in_state_ms: self
                .time_in_state()
                .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX)),
        }
    }

    /// Apply an event. Returns true if the state changed.
    pub fn process_event(&mut self, event: LinkEvent) -> bool {
        let next = match (self.state, event) {
            (ConnectionState::Disconnected, LinkEvent::ConnectRequested { target }) => {
                self.target = Some(target);
                self.last_error = None;
                ConnectionState::Connecting
            }
            (ConnectionState::Connecting, LinkEvent::Confirmed) => ConnectionState::Connected,
            (ConnectionState::Connecting, LinkEvent::Failed(reason)) => {
                self.last_error = Some(reason);
                self.target = None;
                ConnectionState::Disconnected
            }
            (ConnectionState::Disconnected, _) => return false,
            (_, LinkEvent::LinkLost(reason)) => {
                self.last_error = Some(reason);
                self.target = None;
                ConnectionState::Disconnected
            }
            (_, LinkEvent::DisconnectRequested | LinkEvent::RemoteDisconnect) => {
                self.target = None;
                ConnectionState::Disconnected
            }
            _ => return false,
        };

        self.state = next;
        self.transition_count += 1;
        self.last_transition = Some(Instant::now());
        true
    }
}
