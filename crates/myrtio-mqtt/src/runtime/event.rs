use core::fmt;

use crate::client::MqttEvent;
use crate::error::{MqttError, ProtocolError};
use crate::packet::{self, Publish};

/// Everything a module can observe about the session, in arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent<'m> {
    /// CONNACK accepted; the session is usable
    Connected,
    /// The session is gone; the runtime will not deliver anything else
    Disconnected,
    /// The broker granted a subscription
    Subscribed { packet_id: u16 },
    /// Inbound application message, borrowed from the receive buffer
    Message(Publish<'m>),
    /// Something went wrong; fatal unless followed by more events
    Error(SessionError),
    /// A packet the runtime does not interpret, identified by its type
    Unhandled { id: u8 },
}

impl<'m> From<MqttEvent<'m>> for SessionEvent<'m> {
    fn from(event: MqttEvent<'m>) -> Self {
        match event {
            MqttEvent::Publish(publish) => SessionEvent::Message(publish),
            MqttEvent::SubAck {
                packet_id,
                reason_code,
            } if packet::is_success_code(reason_code) => SessionEvent::Subscribed { packet_id },
            MqttEvent::SubAck {
                packet_id,
                reason_code,
            } => SessionEvent::Error(SessionError::SubscriptionRejected {
                packet_id,
                reason_code,
            }),
            MqttEvent::PubAck { .. } => SessionEvent::Unhandled {
                id: packet::packet_type::PUBACK,
            },
            MqttEvent::Other { packet_type } => SessionEvent::Unhandled { id: packet_type },
        }
    }
}

/// Transport-independent description of a session failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    Transport,
    Protocol(ProtocolError),
    ConnectionRefused { reason_code: u8 },
    ConnectionClosed,
    ServerDisconnect { reason_code: u8 },
    KeepAliveTimeout,
    /// SUBACK carried a failure code; the session stays up
    SubscriptionRejected { packet_id: u16, reason_code: u8 },
    UnexpectedPacket { packet_type: u8 },
    TooManyPendingSubscriptions,
    NotConnected,
}

impl<E> From<&MqttError<E>> for SessionError {
    fn from(error: &MqttError<E>) -> Self {
        match error {
            MqttError::Transport(_) => SessionError::Transport,
            MqttError::Protocol(e) => SessionError::Protocol(*e),
            MqttError::ConnectionRefused(code) => SessionError::ConnectionRefused { reason_code: *code },
            MqttError::ConnectionClosed => SessionError::ConnectionClosed,
            MqttError::ServerDisconnect(code) => SessionError::ServerDisconnect { reason_code: *code },
            MqttError::KeepAliveTimeout => SessionError::KeepAliveTimeout,
            MqttError::UnexpectedPacket(t) => SessionError::UnexpectedPacket { packet_type: *t },
            MqttError::TooManyPendingSubscriptions => SessionError::TooManyPendingSubscriptions,
            MqttError::NotConnected => SessionError::NotConnected,
        }
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Transport => write!(f, "transport failure"),
            SessionError::Protocol(e) => write!(f, "protocol error: {}", e),
            SessionError::ConnectionRefused { reason_code } => {
                write!(f, "connection refused, code 0x{:02X}", reason_code)
            }
            SessionError::ConnectionClosed => write!(f, "connection closed by broker"),
            SessionError::ServerDisconnect { reason_code } => {
                write!(f, "broker sent DISCONNECT, reason 0x{:02X}", reason_code)
            }
            SessionError::KeepAliveTimeout => write!(f, "keep-alive timeout"),
            SessionError::SubscriptionRejected {
                packet_id,
                reason_code,
            } => write!(
                f,
                "subscription {} rejected, code 0x{:02X}",
                packet_id, reason_code
            ),
            SessionError::UnexpectedPacket { packet_type } => {
                write!(f, "unexpected packet type {}", packet_type)
            }
            SessionError::TooManyPendingSubscriptions => write!(f, "too many pending subscriptions"),
            SessionError::NotConnected => write!(f, "not connected"),
        }
    }
}
