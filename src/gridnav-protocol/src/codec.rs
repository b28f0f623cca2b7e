// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Record framing.
//!
//! Every record is a one-byte tag, a one-byte parameter count and that many
//! big-endian IEEE-754 binary32 values. The count makes records
//! self-delimiting, so a bad record can be skipped without losing sync.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use thiserror::Error;
use tracing::trace;

use gridnav_core::error::ArityError;
use gridnav_core::message::{Message, MessageType};

use crate::mapping::{message_from_params, message_params};

/// Tag byte plus count byte.
pub const HEADER_LEN: usize = 2;

const PARAM_LEN: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unknown message tag {tag}")]
    UnknownType { tag: u8 },
    #[error("{kind} takes {expected} parameter(s), record has {found}")]
    ArityMismatch {
        kind: MessageType,
        expected: usize,
        found: usize,
    },
    #[error("{kind} parameter {index} is not a usable value")]
    InvalidField { kind: MessageType, index: usize },
    /// Not enough bytes for a full record yet.
    #[error("stream ended inside a record")]
    StreamEnded,
}

impl DecodeError {
    /// True when the decoder has given up on the current buffer contents
    /// and more input is needed.
    pub fn is_incomplete(&self) -> bool {
        matches!(self, Self::StreamEnded)
    }
}

/// Encode a tag with an untyped parameter list.
///
/// No bytes are produced unless the count matches the declared arity.
pub fn encode_raw(kind: MessageType, params: &[f32]) -> Result<Bytes, ArityError> {
    if params.len() != kind.arity() {
        return Err(ArityError {
            kind,
            expected: kind.arity(),
            found: params.len(),
        });
    }
    Ok(write_record(kind.tag(), params))
}

pub fn encode(msg: &Message) -> Bytes {
    write_record(msg.kind().tag(), &message_params(msg))
}

fn write_record(tag: u8, params: &[f32]) -> Bytes {
    let mut buf = BytesMut::with_capacity(HEADER_LEN + params.len() * PARAM_LEN);
    buf.put_u8(tag);
    buf.put_u8(params.len() as u8);
    for value in params {
        buf.put_f32(*value);
    }
    buf.freeze()
}

/// Incremental decoder over an ordered byte stream.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: BytesMut,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append freshly read bytes.
    pub fn extend(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Bytes held that do not yet form a full record.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Drop any partial record.
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Take the next record off the buffer.
    ///
    /// A full record is always consumed, even when it fails to decode.
    /// [`DecodeError::StreamEnded`] consumes nothing.
    pub fn decode(&mut self) -> Result<Message, DecodeError> {
        if self.buf.len() < HEADER_LEN {
            return Err(DecodeError::StreamEnded);
        }
        let tag = self.buf[0];
        let count = usize::from(self.buf[1]);
        let len = HEADER_LEN + count * PARAM_LEN;
        if self.buf.len() < len {
            return Err(DecodeError::StreamEnded);
        }

        let mut record = self.buf.split_to(len);
        record.advance(HEADER_LEN);
        let params: Vec<f32> = (0..count).map(|_| record.get_f32()).collect();

        let Some(kind) = MessageType::from_tag(tag) else {
            trace!("Skipping {} byte record with tag {}", len, tag);
            return Err(DecodeError::UnknownType { tag });
        };
        message_from_params(kind, &params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridnav_core::message::WallCategory;

    fn sample(kind: MessageType) -> Message {
        match kind {
            MessageType::Goto => Message::Goto { x: 10.5, y: -2.0 },
            MessageType::Stop => Message::Stop,
            MessageType::SetPose => Message::SetPose {
                x: 1.0,
                y: 2.0,
                heading: 180.0,
            },
            MessageType::FixPos => Message::FixPos,
            MessageType::PosUpdate => Message::PosUpdate {
                x: 12.25,
                y: 40.0,
                heading: 359.5,
            },
            MessageType::Crash => Message::Crash { x: 3.0, y: 4.0 },
            MessageType::Echo => Message::Echo { angle: 45.0 },
            MessageType::Rotate => Message::Rotate { angle: -30.0 },
            MessageType::Travel => Message::Travel { distance: 25.0 },
            MessageType::RotateTo => Message::RotateTo { angle: 90.0 },
            MessageType::ScannerRotate => Message::ScannerRotate { angle: 15.0 },
            MessageType::SendMap => Message::SendMap {
                x: 5.0,
                y: 6.0,
                angle: 90.0,
            },
            MessageType::Wall => Message::Wall {
                x: 7.0,
                y: 8.0,
                category: WallCategory::Explore,
            },
            MessageType::Explore => Message::Explore { distance: 100.0 },
            MessageType::StdDev => Message::StdDev {
                x: 1.0,
                y: 2.0,
                sdev_x: 0.5,
                sdev_y: 0.25,
            },
            MessageType::Disconnect => Message::Disconnect,
            MessageType::ExploreReceived => Message::ExploreReceived,
            MessageType::GrabBomb => Message::GrabBomb,
        }
    }

    #[test]
    fn every_type_survives_the_wire() {
        let mut decoder = FrameDecoder::new();
        for kind in MessageType::ALL {
            decoder.extend(&encode(&sample(kind)));
        }
        for kind in MessageType::ALL {
            assert_eq!(decoder.decode(), Ok(sample(kind)));
        }
        assert_eq!(decoder.decode(), Err(DecodeError::StreamEnded));
        assert_eq!(decoder.buffered(), 0);
    }

    #[test]
    fn record_layout() {
        let frame = encode(&Message::Goto { x: 1.0, y: -2.0 });
        assert_eq!(
            &frame[..],
            &[0, 2, 0x3f, 0x80, 0x00, 0x00, 0xc0, 0x00, 0x00, 0x00]
        );
        assert_eq!(&encode(&Message::Stop)[..], &[1, 0]);
    }

    #[test]
    fn encode_raw_checks_arity() {
        let err = encode_raw(MessageType::Goto, &[1.0]).unwrap_err();
        assert_eq!(err.expected, 2);
        assert_eq!(err.found, 1);

        assert!(encode_raw(MessageType::Stop, &[0.0]).is_err());
        let frame = encode_raw(MessageType::Travel, &[25.0]).unwrap();
        assert_eq!(frame, encode(&Message::Travel { distance: 25.0 }));
    }

    #[test]
    fn unknown_tag_is_skipped_whole() {
        let mut decoder = FrameDecoder::new();
        decoder.extend(&[200, 2, 0, 0, 0, 0, 0, 0, 0, 0]);
        decoder.extend(&encode(&Message::Crash { x: 1.0, y: 1.0 }));

        let err = decoder.decode().unwrap_err();
        assert_eq!(err, DecodeError::UnknownType { tag: 200 });
        assert!(!err.is_incomplete());
        assert_eq!(decoder.decode(), Ok(Message::Crash { x: 1.0, y: 1.0 }));
    }

    #[test]
    fn wrong_count_is_skipped_whole() {
        let mut decoder = FrameDecoder::new();
        let bad = encode_raw(MessageType::Travel, &[1.0]).unwrap();
        // Same tag as CRASH but only one parameter.
        let mut record = bad.to_vec();
        record[0] = MessageType::Crash.tag();
        decoder.extend(&record);
        decoder.extend(&encode(&Message::ExploreReceived));

        assert_eq!(
            decoder.decode(),
            Err(DecodeError::ArityMismatch {
                kind: MessageType::Crash,
                expected: 2,
                found: 1
            })
        );
        assert_eq!(decoder.decode(), Ok(Message::ExploreReceived));
    }

    #[test]
    fn split_record_waits_for_remaining_bytes() {
        let frame = encode(&Message::PosUpdate {
            x: 1.0,
            y: 2.0,
            heading: 3.0,
        });
        let mut decoder = FrameDecoder::new();

        decoder.extend(&frame[..1]);
        assert_eq!(decoder.decode(), Err(DecodeError::StreamEnded));
        decoder.extend(&frame[1..7]);
        assert_eq!(decoder.decode(), Err(DecodeError::StreamEnded));
        assert_eq!(decoder.buffered(), 7);
        assert!(decoder.decode().unwrap_err().is_incomplete());

        decoder.extend(&frame[7..]);
        assert_eq!(
            decoder.decode(),
            Ok(Message::PosUpdate {
                x: 1.0,
                y: 2.0,
                heading: 3.0
            })
        );
    }

    #[test]
    fn clear_drops_partial_record() {
        let frame = encode(&Message::Crash { x: 1.0, y: 1.0 });
        let mut decoder = FrameDecoder::new();
        decoder.extend(&frame[..5]);
        decoder.clear();
        decoder.extend(&encode(&Message::Disconnect));
        assert_eq!(decoder.decode(), Ok(Message::Disconnect));
    }
}
