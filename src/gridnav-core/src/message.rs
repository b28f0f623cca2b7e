// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Message vocabulary shared by the station and the robot.
//!
//! [`MessageType`] is the closed set of tags that appear on the wire, with
//! the declared parameter layout of each. [`Message`] is the typed form the
//! rest of the station works with: every variant carries exactly the fields
//! its tag declares, so a constructed message can never have the wrong arity.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of a single wire parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Float,
    /// Integral value carried in a float field.
    Integer,
}

/// Which side of the link is expected to originate a message type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Station to robot.
    Outbound,
    /// Robot to station.
    Inbound,
    Both,
}

impl Direction {
    pub fn is_outbound(self) -> bool {
        matches!(self, Self::Outbound | Self::Both)
    }

    pub fn is_inbound(self) -> bool {
        matches!(self, Self::Inbound | Self::Both)
    }
}

/// Wire tag of a message. Declaration order is the tag value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    Goto,
    Stop,
    SetPose,
    FixPos,
    PosUpdate,
    Crash,
    Echo,
    Rotate,
    Travel,
    RotateTo,
    ScannerRotate,
    SendMap,
    Wall,
    Explore,
    StdDev,
    Disconnect,
    ExploreReceived,
    GrabBomb,
}

const F: ParamKind = ParamKind::Float;
const I: ParamKind = ParamKind::Integer;

impl MessageType {
    pub const ALL: [MessageType; 18] = [
        Self::Goto,
        Self::Stop,
        Self::SetPose,
        Self::FixPos,
        Self::PosUpdate,
        Self::Crash,
        Self::Echo,
        Self::Rotate,
        Self::Travel,
        Self::RotateTo,
        Self::ScannerRotate,
        Self::SendMap,
        Self::Wall,
        Self::Explore,
        Self::StdDev,
        Self::Disconnect,
        Self::ExploreReceived,
        Self::GrabBomb,
    ];

    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.get(tag as usize).copied()
    }

    /// Declared parameter layout, in wire order.
    pub fn params(self) -> &'static [ParamKind] {
        match self {
            Self::Stop
            | Self::FixPos
            | Self::Disconnect
            | Self::ExploreReceived
            | Self::GrabBomb => &[],
            Self::Echo
            | Self::Rotate
            | Self::Travel
            | Self::RotateTo
            | Self::ScannerRotate
            | Self::Explore => &[F],
            Self::Goto | Self::Crash => &[F, F],
            Self::SetPose | Self::PosUpdate | Self::SendMap => &[F, F, F],
            Self::Wall => &[F, F, I],
            Self::StdDev => &[F, F, F, F],
        }
    }

    pub fn arity(self) -> usize {
        self.params().len()
    }

    pub fn direction(self) -> Direction {
        match self {
            Self::PosUpdate
            | Self::Crash
            | Self::Wall
            | Self::StdDev
            | Self::ExploreReceived => Direction::Inbound,
            Self::Disconnect | Self::GrabBomb => Direction::Both,
            _ => Direction::Outbound,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Goto => "GOTO",
            Self::Stop => "STOP",
            Self::SetPose => "SET_POSE",
            Self::FixPos => "FIX_POS",
            Self::PosUpdate => "POS_UPDATE",
            Self::Crash => "CRASH",
            Self::Echo => "ECHO",
            Self::Rotate => "ROTATE",
            Self::Travel => "TRAVEL",
            Self::RotateTo => "ROTATE_TO",
            Self::ScannerRotate => "SCANNER_ROTATE",
            Self::SendMap => "SEND_MAP",
            Self::Wall => "WALL",
            Self::Explore => "EXPLORE",
            Self::StdDev => "STD_DEV",
            Self::Disconnect => "DISCONNECT",
            Self::ExploreReceived => "EXPLORE_RECEIVED",
            Self::GrabBomb => "GRAB_BOMB",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which scan produced a wall point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WallCategory {
    Left,
    Right,
    Explore,
}

impl WallCategory {
    pub fn code(self) -> u8 {
        match self {
            Self::Left => 0,
            Self::Right => 1,
            Self::Explore => 2,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Left),
            1 => Some(Self::Right),
            2 => Some(Self::Explore),
            _ => None,
        }
    }
}

impl fmt::Display for WallCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
            Self::Explore => write!(f, "explore"),
        }
    }
}

/// A typed message. Field order matches the wire order of its tag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Message {
    Goto { x: f32, y: f32 },
    Stop,
    SetPose { x: f32, y: f32, heading: f32 },
    FixPos,
    PosUpdate { x: f32, y: f32, heading: f32 },
    Crash { x: f32, y: f32 },
    Echo { angle: f32 },
    Rotate { angle: f32 },
    Travel { distance: f32 },
    RotateTo { angle: f32 },
    ScannerRotate { angle: f32 },
    /// Drive to `(x, y)` and scan with the scanner turned to `angle`.
    SendMap { x: f32, y: f32, angle: f32 },
    Wall { x: f32, y: f32, category: WallCategory },
    Explore { distance: f32 },
    StdDev { x: f32, y: f32, sdev_x: f32, sdev_y: f32 },
    Disconnect,
    ExploreReceived,
    GrabBomb,
}

impl Message {
    pub fn kind(&self) -> MessageType {
        match self {
            Self::Goto { .. } => MessageType::Goto,
            Self::Stop => MessageType::Stop,
            Self::SetPose { .. } => MessageType::SetPose,
            Self::FixPos => MessageType::FixPos,
            Self::PosUpdate { .. } => MessageType::PosUpdate,
            Self::Crash { .. } => MessageType::Crash,
            Self::Echo { .. } => MessageType::Echo,
            Self::Rotate { .. } => MessageType::Rotate,
            Self::Travel { .. } => MessageType::Travel,
            Self::RotateTo { .. } => MessageType::RotateTo,
            Self::ScannerRotate { .. } => MessageType::ScannerRotate,
            Self::SendMap { .. } => MessageType::SendMap,
            Self::Wall { .. } => MessageType::Wall,
            Self::Explore { .. } => MessageType::Explore,
            Self::StdDev { .. } => MessageType::StdDev,
            Self::Disconnect => MessageType::Disconnect,
            Self::ExploreReceived => MessageType::ExploreReceived,
            Self::GrabBomb => MessageType::GrabBomb,
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Goto { x, y } | Self::Crash { x, y } => {
                write!(f, "{}({x}, {y})", self.kind())
            }
            Self::SetPose { x, y, heading } | Self::PosUpdate { x, y, heading } => {
                write!(f, "{}({x}, {y}, {heading})", self.kind())
            }
            Self::Echo { angle }
            | Self::Rotate { angle }
            | Self::RotateTo { angle }
            | Self::ScannerRotate { angle } => write!(f, "{}({angle})", self.kind()),
            Self::Travel { distance } | Self::Explore { distance } => {
                write!(f, "{}({distance})", self.kind())
            }
            Self::SendMap { x, y, angle } => write!(f, "SEND_MAP({x}, {y}, {angle})"),
            Self::Wall { x, y, category } => write!(f, "WALL({x}, {y}, {category})"),
            Self::StdDev {
                x,
                y,
                sdev_x,
                sdev_y,
            } => write!(f, "STD_DEV({x}, {y}, {sdev_x}, {sdev_y})"),
            Self::Stop
            | Self::FixPos
            | Self::Disconnect
            | Self::ExploreReceived
            | Self::GrabBomb => write!(f, "{}()", self.kind()),
        }
    }
}
