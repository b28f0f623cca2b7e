// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

use std::fmt;

use thiserror::Error;

use crate::message::MessageType;

/// Parameter count does not match the declared arity of a message type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} takes {expected} parameter(s), got {found}")]
pub struct ArityError {
    pub kind: MessageType,
    pub expected: usize,
    pub found: usize,
}

/// Operator input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    X,
    Y,
    Heading,
    Amount,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => write!(f, "X"),
            Self::Y => write!(f, "Y"),
            Self::Heading => write!(f, "Heading"),
            Self::Amount => write!(f, "Amount"),
        }
    }
}

/// Operator input that is not a usable number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Problem with {field} field: {input:?} is not a number")]
pub struct ValidationError {
    pub field: Field,
    pub input: String,
}
