// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Mapping between typed messages and flat parameter lists.

use gridnav_core::message::{Message, MessageType, ParamKind, WallCategory};

use crate::codec::DecodeError;

/// Flatten a message into its wire parameters, in declared order.
pub fn message_params(msg: &Message) -> Vec<f32> {
    match *msg {
        Message::Stop
        | Message::FixPos
        | Message::Disconnect
        | Message::ExploreReceived
        | Message::GrabBomb => Vec::new(),
        Message::Echo { angle }
        | Message::Rotate { angle }
        | Message::RotateTo { angle }
        | Message::ScannerRotate { angle } => vec![angle],
        Message::Travel { distance } | Message::Explore { distance } => vec![distance],
        Message::Goto { x, y } | Message::Crash { x, y } => vec![x, y],
        Message::SetPose { x, y, heading } | Message::PosUpdate { x, y, heading } => {
            vec![x, y, heading]
        }
        Message::SendMap { x, y, angle } => vec![x, y, angle],
        Message::Wall { x, y, category } => vec![x, y, f32::from(category.code())],
        Message::StdDev {
            x,
            y,
            sdev_x,
            sdev_y,
        } => vec![x, y, sdev_x, sdev_y],
    }
}

/// Build a typed message from a tag and its decoded parameters.
///
/// Fails with [`DecodeError::ArityMismatch`] when the count is wrong and
/// with [`DecodeError::InvalidField`] when a value is not finite or an
/// integer field holds something other than a known code.
pub fn message_from_params(kind: MessageType, params: &[f32]) -> Result<Message, DecodeError> {
    if params.len() != kind.arity() {
        return Err(DecodeError::ArityMismatch {
            kind,
            expected: kind.arity(),
            found: params.len(),
        });
    }

    for (index, (value, param)) in params.iter().zip(kind.params()).enumerate() {
        let usable = match param {
            ParamKind::Float => value.is_finite(),
            ParamKind::Integer => value.is_finite() && value.fract() == 0.0,
        };
        if !usable {
            return Err(DecodeError::InvalidField { kind, index });
        }
    }

    let p = |index: usize| params[index];
    let msg = match kind {
        MessageType::Goto => Message::Goto { x: p(0), y: p(1) },
        MessageType::Stop => Message::Stop,
        MessageType::SetPose => Message::SetPose {
            x: p(0),
            y: p(1),
            heading: p(2),
        },
        MessageType::FixPos => Message::FixPos,
        MessageType::PosUpdate => Message::PosUpdate {
            x: p(0),
            y: p(1),
            heading: p(2),
        },
        MessageType::Crash => Message::Crash { x: p(0), y: p(1) },
        MessageType::Echo => Message::Echo { angle: p(0) },
        MessageType::Rotate => Message::Rotate { angle: p(0) },
        MessageType::Travel => Message::Travel { distance: p(0) },
        MessageType::RotateTo => Message::RotateTo { angle: p(0) },
        MessageType::ScannerRotate => Message::ScannerRotate { angle: p(0) },
        MessageType::SendMap => Message::SendMap {
            x: p(0),
            y: p(1),
            angle: p(2),
        },
        MessageType::Wall => {
            let category = WallCategory::from_code(p(2) as i64)
                .ok_or(DecodeError::InvalidField { kind, index: 2 })?;
            Message::Wall {
                x: p(0),
                y: p(1),
                category,
            }
        }
        MessageType::Explore => Message::Explore { distance: p(0) },
        MessageType::StdDev => Message::StdDev {
            x: p(0),
            y: p(1),
            sdev_x: p(2),
            sdev_y: p(3),
        },
        MessageType::Disconnect => Message::Disconnect,
        MessageType::ExploreReceived => Message::ExploreReceived,
        MessageType::GrabBomb => Message::GrabBomb,
    };
    Ok(msg)
}
