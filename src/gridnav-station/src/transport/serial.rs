// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

use std::io;
use std::time::Duration;

use tokio_serial::SerialPortBuilderExt;
use tracing::debug;

use super::{ConnectFuture, LinkHalves, Transport};

/// Serial device link, e.g. a Bluetooth RFCOMM node bound to the robot.
pub struct SerialTransport {
    baud: u32,
    timeout: Duration,
}

impl SerialTransport {
    pub fn new(baud: u32, timeout: Duration) -> Self {
        Self { baud, timeout }
    }
}

impl Transport for SerialTransport {
    fn name(&self) -> &'static str {
        "serial"
    }

    fn connect<'a>(&'a self, target: &'a str) -> ConnectFuture<'a> {
        Box::pin(async move {
            debug!("Opening {} at {} baud", target, self.baud);
            let port = tokio_serial::new(target, self.baud)
                .timeout(self.timeout)
                .open_native_async()
                .map_err(io::Error::from)?;
            let (reader, writer) = tokio::io::split(port);
            Ok(LinkHalves {
                reader: Box::new(reader),
                writer: Box::new(writer),
            })
        })
    }
}
