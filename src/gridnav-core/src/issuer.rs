// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Operator command validation.
//!
//! Operator input arrives as raw text fields. [`OperatorCommand::validate`]
//! parses them into a typed [`Message`] or names the first field that is
//! not a finite number. Nothing is sent until validation succeeds.

use crate::error::{Field, ValidationError};
use crate::message::Message;

/// Turn angle applied by the map-left / map-right commands.
const MAP_TURN_DEGREES: f32 = 90.0;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointInput {
    pub x: String,
    pub y: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoseInput {
    pub x: String,
    pub y: String,
    pub heading: String,
}

/// Single numeric input: a distance or an angle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AmountInput {
    pub value: String,
}

impl PointInput {
    pub fn new(x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
        }
    }

    fn parse(&self) -> Result<(f32, f32), ValidationError> {
        Ok((parse_field(Field::X, &self.x)?, parse_field(Field::Y, &self.y)?))
    }
}

impl PoseInput {
    pub fn new(x: impl Into<String>, y: impl Into<String>, heading: impl Into<String>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
            heading: heading.into(),
        }
    }
}

impl AmountInput {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    fn parse(&self) -> Result<f32, ValidationError> {
        parse_field(Field::Amount, &self.value)
    }
}

/// Command as entered by the operator, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorCommand {
    Goto(PointInput),
    SetPose(PoseInput),
    MapLeft(PointInput),
    MapRight(PointInput),
    Travel(AmountInput),
    Rotate(AmountInput),
    RotateTo(AmountInput),
    Echo(AmountInput),
    Explore(AmountInput),
    ScannerRotate(AmountInput),
    Stop,
    FixPos,
    GrabBomb,
}

impl OperatorCommand {
    /// Validate the inputs and build the message to send.
    pub fn validate(&self) -> Result<Message, ValidationError> {
        let msg = match self {
            Self::Goto(point) => {
                let (x, y) = point.parse()?;
                Message::Goto { x, y }
            }
            Self::SetPose(pose) => Message::SetPose {
                x: parse_field(Field::X, &pose.x)?,
                y: parse_field(Field::Y, &pose.y)?,
                heading: parse_field(Field::Heading, &pose.heading)?,
            },
            Self::MapLeft(point) => {
                let (x, y) = point.parse()?;
                Message::SendMap {
                    x,
                    y,
                    angle: MAP_TURN_DEGREES,
                }
            }
            Self::MapRight(point) => {
                let (x, y) = point.parse()?;
                Message::SendMap {
                    x,
                    y,
                    angle: -MAP_TURN_DEGREES,
                }
            }
            Self::Travel(amount) => Message::Travel {
                distance: amount.parse()?,
            },
            Self::Rotate(amount) => Message::Rotate {
                angle: amount.parse()?,
            },
            Self::RotateTo(amount) => Message::RotateTo {
                angle: amount.parse()?,
            },
            Self::Echo(amount) => Message::Echo {
                angle: amount.parse()?,
            },
            Self::Explore(amount) => Message::Explore {
                distance: amount.parse()?,
            },
            Self::ScannerRotate(amount) => Message::ScannerRotate {
                angle: amount.parse()?,
            },
            Self::Stop => Message::Stop,
            Self::FixPos => Message::FixPos,
            Self::GrabBomb => Message::GrabBomb,
        };
        Ok(msg)
    }
}

fn parse_field(field: Field, input: &str) -> Result<f32, ValidationError> {
    match input.trim().parse::<f32>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ValidationError {
            field,
            input: input.to_string(),
        }),
    }
}
