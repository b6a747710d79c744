//! Byte-stream transports for the MQTT client

use core::fmt::Debug;

use embassy_net::tcp::{self, TcpSocket};
use embassy_time::{Duration, with_timeout};
use embedded_io_async::Write;

/// Marker for transport error types.
pub trait TransportError: Debug {}

impl TransportError for () {}

/// A reliable, ordered, stream-based channel to the broker.
#[allow(async_fn_in_trait)]
pub trait MqttTransport {
    type Error: TransportError;

    /// Writes the whole buffer.
    async fn send(&mut self, buf: &[u8]) -> Result<(), Self::Error>;

    /// Reads at least one byte into `buf` and returns how many were read.
    ///
    /// Must be cancel-safe: a dropped call may not lose data.
    async fn recv(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

/// Errors raised by [`TcpTransport`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TcpError {
    Tcp(tcp::Error),
    Timeout,
    /// The peer closed the connection
    Closed,
}

impl TransportError for TcpError {}

/// [`MqttTransport`] over an `embassy-net` TCP socket.
///
/// Every send and receive is bounded by `timeout`.
pub struct TcpTransport<'a> {
    socket: TcpSocket<'a>,
    timeout: Duration,
}

impl<'a> TcpTransport<'a> {
    /// Wraps an already connected socket
    pub fn new(socket: TcpSocket<'a>, timeout: Duration) -> Self {
        Self { socket, timeout }
    }
}

impl MqttTransport for TcpTransport<'_> {
    type Error = TcpError;

    async fn send(&mut self, buf: &[u8]) -> Result<(), Self::Error> {
        with_timeout(self.timeout, async {
            self.socket.write_all(buf).await?;
            self.socket.flush().await
        })
        .await
        .map_err(|_| TcpError::Timeout)?
        .map_err(TcpError::Tcp)
    }

    async fn recv(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let read = with_timeout(self.timeout, self.socket.read(buf))
            .await
            .map_err(|_| TcpError::Timeout)?
            .map_err(TcpError::Tcp)?;
        if read == 0 {
            return Err(TcpError::Closed);
        }
        Ok(read)
    }
}
