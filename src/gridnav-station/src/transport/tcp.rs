// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

use std::io;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time;

use super::{ConnectFuture, LinkHalves, Transport};

/// TCP link (`host:port`) for radio bridges and simulators.
pub struct TcpTransport {
    connect_timeout: Duration,
}

impl TcpTransport {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl Transport for TcpTransport {
    fn name(&self) -> &'static str {
        "tcp"
    }

    fn connect<'a>(&'a self, target: &'a str) -> ConnectFuture<'a> {
        Box::pin(async move {
            let stream = time::timeout(self.connect_timeout, TcpStream::connect(target))
                .await
                .map_err(|_| {
                    io::Error::new(
                        io::ErrorKind::TimedOut,
                        format!("connect timed out after {:?}", self.connect_timeout),
                    )
                })??;
            stream.set_nodelay(true)?;
            let (reader, writer) = stream.into_split();
            Ok(LinkHalves {
                reader: Box::new(reader),
                writer: Box::new(writer),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn connects_to_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let transport = TcpTransport::new(Duration::from_secs(2));

        let (halves, accepted) = tokio::join!(transport.connect(&addr), listener.accept());
        let mut halves = halves.unwrap();
        let (mut peer, _) = accepted.unwrap();

        peer.write_all(&[1, 0]).await.unwrap();
        let mut buf = [0u8; 2];
        halves.reader.read_exact(&mut buf).await.unwrap();
        assert_eq!(buf, [1, 0]);
    }

    #[tokio::test]
    async fn refused_connect_is_an_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let transport = TcpTransport::new(Duration::from_secs(2));
        assert!(transport.connect(&addr).await.is_err());
    }
}
