// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

pub mod dispatch;
pub mod error;
pub mod issuer;
pub mod link;
pub mod listener;
pub mod message;
pub mod nav;

pub type DynResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

pub use dispatch::{DispatchOutcome, DispatchStats, Dispatcher, SessionPolicy};
pub use error::{ArityError, Field, ValidationError};
pub use issuer::{AmountInput, OperatorCommand, PointInput, PoseInput};
pub use link::machine::{ConnectionMachine, ConnectionState, LinkEvent, LinkStatus};
pub use listener::{ChannelListener, ListenerId, NavEvent, NavEventEmitter, NavListener};
pub use message::{Direction, Message, MessageType, ParamKind, WallCategory};
pub use nav::state::{NavSnapshot, NavigationState};
pub use nav::types::{Obstacle, Pose, UncertaintyEstimate, WallSegment};
