//! UDP datagram source.
//!
//! # Example
//!
//! ```ignore
//! use scoreboard_receiver::transport::UdpSource;
//!
//! let mut source = UdpSource::bind("0.0.0.0:21000".parse()?, None).await?;
//! source.readable().await?;
//! while let Some(datagram) = source.try_recv()? {
//!     // process datagram
//! }
//! ```

use std::io;
use std::net::SocketAddr;

use bytes::Bytes;
use tokio::net::UdpSocket;

use crate::error::{Result, ScoreboardError};

/// Largest datagram the source reads; longer datagrams are truncated.
pub const MAX_DATAGRAM_SIZE: usize = 64 * 1024;

/// Bound UDP socket delivering datagrams as `Bytes`.
#[derive(Debug)]
pub struct UdpSource {
    socket: UdpSocket,
    buf: Vec<u8>,
}

impl UdpSource {
    /// Bind to `listen`, optionally connecting to an upstream peer.
    ///
    /// A connected socket only receives datagrams from that peer.
    pub async fn bind(listen: SocketAddr, upstream: Option<SocketAddr>) -> Result<Self> {
        let socket = UdpSocket::bind(listen)
            .await
            .map_err(|source| ScoreboardError::Bind {
                addr: listen,
                source,
            })?;

        if let Some(peer) = upstream {
            socket.connect(peer).await?;
        }

        Ok(Self::from_socket(socket))
    }

    /// Wrap an already bound socket.
    pub fn from_socket(socket: UdpSocket) -> Self {
        Self {
            socket,
            buf: vec![0u8; MAX_DATAGRAM_SIZE],
        }
    }

    /// Wait until at least one datagram may be pending.
    ///
    /// Readiness can be spurious; [`try_recv`](Self::try_recv) then yields `None`.
    pub async fn readable(&self) -> io::Result<()> {
        self.socket.readable().await
    }

    /// Take one pending datagram without waiting.
    ///
    /// Returns `Ok(None)` when nothing is pending.
    pub fn try_recv(&mut self) -> io::Result<Option<Bytes>> {
        match self.socket.try_recv_from(&mut self.buf) {
            Ok((n, _peer)) => Ok(Some(Bytes::copy_from_slice(&self.buf[..n]))),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Wait for and take one datagram.
    pub async fn recv(&mut self) -> io::Result<Bytes> {
        let (n, _peer) = self.socket.recv_from(&mut self.buf).await?;
        Ok(Bytes::copy_from_slice(&self.buf[..n]))
    }

    /// Local address the socket is bound to.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn loopback() -> (UdpSource, UdpSocket) {
        let source = UdpSource::bind("127.0.0.1:0".parse().unwrap(), None)
            .await
            .unwrap();
        let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        sender
            .connect(source.local_addr().unwrap())
            .await
            .unwrap();
        (source, sender)
    }

    #[tokio::test]
    async fn test_try_recv_empty() {
        let (mut source, _sender) = loopback().await;
        assert!(source.try_recv().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_recv_datagram() {
        let (mut source, sender) = loopback().await;
        sender.send(b"hello").await.unwrap();

        let datagram = source.recv().await.unwrap();
        assert_eq!(&datagram[..], b"hello");
    }

    #[tokio::test]
    async fn test_drain_pending_datagrams() {
        let (mut source, sender) = loopback().await;
        sender.send(b"one").await.unwrap();
        sender.send(b"two").await.unwrap();

        // first datagram via the async path guarantees both have arrived in order
        let first = source.recv().await.unwrap();
        source.readable().await.unwrap();
        let second = source.try_recv().unwrap();

        assert_eq!(&first[..], b"one");
        assert_eq!(second.as_deref(), Some(&b"two"[..]));
        assert!(source.try_recv().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_bind_failure() {
        let taken = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = taken.local_addr().unwrap();

        let err = UdpSource::bind(addr, None).await.unwrap_err();
        assert!(matches!(err, ScoreboardError::Bind { addr: a, .. } if a == addr));
    }

    #[tokio::test]
    async fn test_connected_source_filters_peers() {
        let upstream = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let stranger = UdpSocket::bind("127.0.0.1:0").await.unwrap();

        let mut source = UdpSource::bind(
            "127.0.0.1:0".parse().unwrap(),
            Some(upstream.local_addr().unwrap()),
        )
        .await
        .unwrap();
        let target = source.local_addr().unwrap();

        stranger.send_to(b"ignored", target).await.unwrap();
        upstream.send_to(b"accepted", target).await.unwrap();

        let datagram = source.recv().await.unwrap();
        assert_eq!(&datagram[..], b"accepted");
    }
}
