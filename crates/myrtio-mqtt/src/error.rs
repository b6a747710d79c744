//! Error types for the MQTT client

use core::fmt;

/// Wire-level decoding and encoding failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    /// The output buffer cannot hold the encoded packet
    BufferTooSmall,
    /// A packet ended before all of its fields were read
    UnexpectedEnd,
    /// Variable byte integer longer than four bytes or out of range
    MalformedLength,
    /// The announced packet does not fit into the receive buffer
    PacketTooLarge,
    /// Reserved or unknown control packet type
    InvalidPacketType(u8),
    /// QoS bits set to the reserved value 3
    InvalidQoS(u8),
    /// QoS 1/2 PUBLISH without a packet identifier
    MissingPacketId,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::BufferTooSmall => write!(f, "buffer too small"),
            ProtocolError::UnexpectedEnd => write!(f, "unexpected end of packet"),
            ProtocolError::MalformedLength => write!(f, "malformed remaining length"),
            ProtocolError::PacketTooLarge => write!(f, "packet too large"),
            ProtocolError::InvalidPacketType(t) => write!(f, "invalid packet type {}", t),
            ProtocolError::InvalidQoS(q) => write!(f, "invalid QoS {}", q),
            ProtocolError::MissingPacketId => write!(f, "missing packet identifier"),
        }
    }
}

/// Error type for MQTT client operations
#[derive(Debug)]
pub enum MqttError<E> {
    /// The underlying transport failed
    Transport(E),
    /// Malformed packet on the wire
    Protocol(ProtocolError),
    /// CONNACK carried a non-zero return / reason code
    ConnectionRefused(u8),
    /// The broker closed the byte stream
    ConnectionClosed,
    /// The broker sent DISCONNECT (v5 reason code, 0 for v3.1.1)
    ServerDisconnect(u8),
    /// No PINGRESP within one keep-alive interval
    KeepAliveTimeout,
    /// A packet arrived that is not valid in the current state
    UnexpectedPacket(u8),
    /// Too many SUBSCRIBE packets awaiting SUBACK
    TooManyPendingSubscriptions,
    /// Operation requires an established session
    NotConnected,
}

impl<E: fmt::Debug> fmt::Display for MqttError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MqttError::Transport(e) => write!(f, "transport error: {:?}", e),
            MqttError::Protocol(e) => write!(f, "protocol error: {}", e),
            MqttError::ConnectionRefused(code) => {
                write!(f, "connection refused, code 0x{:02X}", code)
            }
            MqttError::ConnectionClosed => write!(f, "connection closed by broker"),
            MqttError::ServerDisconnect(code) => {
                write!(f, "broker sent DISCONNECT, reason 0x{:02X}", code)
            }
            MqttError::KeepAliveTimeout => write!(f, "keep-alive timeout"),
            MqttError::UnexpectedPacket(t) => write!(f, "unexpected packet type {}", t),
            MqttError::TooManyPendingSubscriptions => write!(f, "too many pending subscriptions"),
            MqttError::NotConnected => write!(f, "not connected"),
        }
    }
}

impl<E> From<ProtocolError> for MqttError<E> {
    fn from(e: ProtocolError) -> Self {
        MqttError::Protocol(e)
    }
}
