// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Wire protocol for the robot link.
//!
//! This crate turns typed messages into framed records and back. Framing
//! lives in [`codec`]; the mapping between typed messages and flat
//! parameter lists lives in [`mapping`].

pub mod codec;
pub mod mapping;

// Re-export commonly used items
pub use codec::{encode, encode_raw, DecodeError, FrameDecoder, HEADER_LEN};
pub use mapping::{message_from_params, message_params};
