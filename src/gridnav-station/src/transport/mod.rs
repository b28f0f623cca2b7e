// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Byte transports to the robot.
//!
//! A transport only knows how to open an ordered, reliable byte stream to a
//! named target. Dropping both halves closes the link.

pub mod serial;
pub mod tcp;

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};

use crate::config::{LinkConfig, LinkKind};

pub use serial::SerialTransport;
pub use tcp::TcpTransport;

pub type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;
pub type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Both directions of an open link.
pub struct LinkHalves {
    pub reader: BoxedReader,
    pub writer: BoxedWriter,
}

pub type ConnectFuture<'a> = Pin<Box<dyn Future<Output = io::Result<LinkHalves>> + Send + 'a>>;

pub trait Transport: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    fn connect<'a>(&'a self, target: &'a str) -> ConnectFuture<'a>;
}

/// Build the transport selected in the config.
pub fn from_config(link: &LinkConfig) -> Arc<dyn Transport> {
    let connect_timeout = Duration::from_millis(link.connect_timeout_ms);
    match link.kind {
        LinkKind::Serial => Arc::new(SerialTransport::new(link.baud, connect_timeout)),
        LinkKind::Tcp => Arc::new(TcpTransport::new(connect_timeout)),
    }
}
