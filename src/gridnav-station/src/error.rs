// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

use std::io;

use thiserror::Error;

use gridnav_core::{ConnectionState, MessageType, ValidationError};

#[derive(Debug, Error)]
pub enum StationError {
    #[error("not connected")]
    NotConnected,
    #[error("link is already {0}")]
    AlreadyActive(ConnectionState),
    #[error("connect to {0} was cancelled")]
    Cancelled(String),
    #[error("{0} is not sent by the station")]
    WrongDirection(MessageType),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("transport error: {0}")]
    Transport(#[from] io::Error),
}

pub type StationResult<T> = Result<T, StationError>;
