//! MQTT control packets
//!
//! Encoders write complete frames (fixed header included) into caller-provided
//! buffers. The decoder borrows topic and payload straight out of the receive
//! buffer; nothing is copied and nothing is assumed to be NUL-terminated.

use crate::error::ProtocolError;
use crate::util::{Reader, Writer, decode_varint};

/// Control packet type identifiers (upper nibble of the fixed header)
pub mod packet_type {
    pub const CONNECT: u8 = 1;
    pub const CONNACK: u8 = 2;
    pub const PUBLISH: u8 = 3;
    pub const PUBACK: u8 = 4;
    pub const PUBREC: u8 = 5;
    pub const PUBREL: u8 = 6;
    pub const PUBCOMP: u8 = 7;
    pub const SUBSCRIBE: u8 = 8;
    pub const SUBACK: u8 = 9;
    pub const UNSUBSCRIBE: u8 = 10;
    pub const UNSUBACK: u8 = 11;
    pub const PINGREQ: u8 = 12;
    pub const PINGRESP: u8 = 13;
    pub const DISCONNECT: u8 = 14;
    pub const AUTH: u8 = 15;
}

/// Protocol level sent in CONNECT
#[cfg(feature = "v5")]
pub const PROTOCOL_LEVEL: u8 = 5;
#[cfg(not(feature = "v5"))]
pub const PROTOCOL_LEVEL: u8 = 4;

/// Size of an empty property block on the wire
const EMPTY_PROPERTIES_LEN: usize = if cfg!(feature = "v5") { 1 } else { 0 };

/// CONNECT property block: length byte plus Maximum Packet Size (id + u32)
const CONNECT_PROPERTIES_LEN: usize = if cfg!(feature = "v5") { 6 } else { 0 };
#[cfg(feature = "v5")]
const MAXIMUM_PACKET_SIZE_PROPERTY: u8 = 0x27;

const PROTOCOL_NAME: &[u8] = b"MQTT";
const CLEAN_SESSION_FLAG: u8 = 0x02;

/// Quality of service level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum QoS {
    /// At most once delivery
    AtMostOnce = 0,
    /// At least once delivery
    AtLeastOnce = 1,
    /// Exactly once delivery
    ExactlyOnce = 2,
}

impl QoS {
    pub fn from_bits(bits: u8) -> Result<Self, ProtocolError> {
        match bits {
            0 => Ok(QoS::AtMostOnce),
            1 => Ok(QoS::AtLeastOnce),
            2 => Ok(QoS::ExactlyOnce),
            other => Err(ProtocolError::InvalidQoS(other)),
        }
    }

    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// An application message, borrowed from the receive buffer.
///
/// `topic` is the raw topic name exactly as delivered, bounded by its
/// length prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Publish<'a> {
    pub topic: &'a [u8],
    pub payload: &'a [u8],
    pub qos: QoS,
    pub packet_id: Option<u16>,
    pub retain: bool,
    pub dup: bool,
    /// The message did not fit into the receive buffer; `payload` is only
    /// the part that did and the rest was discarded.
    pub truncated: bool,
}

/// A decoded inbound packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Packet<'a> {
    ConnAck { session_present: bool, reason_code: u8 },
    Publish(Publish<'a>),
    PubAck { packet_id: u16 },
    SubAck { packet_id: u16, reason_code: u8 },
    PingResp,
    Disconnect { reason_code: u8 },
    /// Valid packet this client does not act on
    Other { packet_type: u8 },
}

impl Packet<'_> {
    pub fn packet_type(&self) -> u8 {
        match self {
            Packet::ConnAck { .. } => packet_type::CONNACK,
            Packet::Publish(_) => packet_type::PUBLISH,
            Packet::PubAck { .. } => packet_type::PUBACK,
            Packet::SubAck { .. } => packet_type::SUBACK,
            Packet::PingResp => packet_type::PINGRESP,
            Packet::Disconnect { .. } => packet_type::DISCONNECT,
            Packet::Other { packet_type } => *packet_type,
        }
    }
}

/// Returns `true` if a SUBACK return / reason code reports success.
///
/// Granted QoS values (0..=2) are success in both protocol versions, anything
/// from 0x80 up is a failure.
pub const fn is_success_code(code: u8) -> bool {
    code < 0x80
}

/// Total length of the frame starting at `buf[0]`, once the fixed header is complete.
///
/// The returned length may exceed `buf.len()`; the caller keeps reading until
/// the whole frame is buffered.
pub fn frame_length(buf: &[u8]) -> Result<Option<usize>, ProtocolError> {
    let Some(rest) = buf.get(1..) else {
        return Ok(None);
    };
    Ok(decode_varint(rest)?.map(|(remaining, used)| 1 + used + remaining))
}

/// Decodes one complete frame.
pub fn decode(frame: &[u8]) -> Result<Packet<'_>, ProtocolError> {
    let mut reader = Reader::new(frame);
    let header = reader.take_u8()?;
    let remaining = reader.take_varint()?;
    let mut body = Reader::new(reader.take(remaining)?);
    let flags = header & 0x0F;

    match header >> 4 {
        packet_type::CONNACK => {
            let ack_flags = body.take_u8()?;
            let reason_code = body.take_u8()?;
            Ok(Packet::ConnAck {
                session_present: ack_flags & 0x01 == 0x01,
                reason_code,
            })
        }
        packet_type::PUBLISH => Ok(Packet::Publish(read_publish(flags, &mut body)?)),
        packet_type::PUBACK => Ok(Packet::PubAck {
            packet_id: body.take_u16()?,
        }),
        packet_type::SUBACK => {
            let packet_id = body.take_u16()?;
            body.skip_properties()?;
            let reason_code = body.take_u8()?;
            Ok(Packet::SubAck {
                packet_id,
                reason_code,
            })
        }
        packet_type::PINGRESP => Ok(Packet::PingResp),
        packet_type::DISCONNECT => {
            let reason_code = if body.is_empty() { 0 } else { body.take_u8()? };
            Ok(Packet::Disconnect { reason_code })
        }
        0 => Err(ProtocolError::InvalidPacketType(0)),
        other => Ok(Packet::Other { packet_type: other }),
    }
}

/// Decodes the head of a PUBLISH frame that is larger than the buffer holding it.
///
/// `head` starts at the fixed header and ends wherever the buffer ended. The
/// topic, packet identifier and (v5) properties must be complete; the payload
/// is whatever follows them and the result is marked `truncated`.
pub fn decode_truncated_publish(head: &[u8]) -> Result<Publish<'_>, ProtocolError> {
    let mut reader = Reader::new(head);
    let header = reader.take_u8()?;
    if header >> 4 != packet_type::PUBLISH {
        return Err(ProtocolError::PacketTooLarge);
    }
    reader.take_varint()?;
    let mut publish = read_publish(header & 0x0F, &mut reader)?;
    publish.truncated = true;
    Ok(publish)
}

fn read_publish<'a>(flags: u8, body: &mut Reader<'a>) -> Result<Publish<'a>, ProtocolError> {
    let qos = QoS::from_bits((flags >> 1) & 0b11)?;
    let topic = body.take_binary()?;
    let packet_id = if qos == QoS::AtMostOnce {
        None
    } else {
        Some(body.take_u16()?)
    };
    body.skip_properties()?;
    Ok(Publish {
        topic,
        payload: body.rest(),
        qos,
        packet_id,
        retain: flags & 0x01 == 0x01,
        dup: flags & 0x08 == 0x08,
        truncated: false,
    })
}

/// CONNECT with a clean session and no will, username or password.
pub fn encode_connect(
    buf: &mut [u8],
    client_id: &str,
    keep_alive_secs: u16,
    max_packet_size: u32,
) -> Result<usize, ProtocolError> {
    let remaining =
        2 + PROTOCOL_NAME.len() + 1 + 1 + 2 + CONNECT_PROPERTIES_LEN + 2 + client_id.len();
    let mut w = Writer::new(buf);
    w.put_u8(packet_type::CONNECT << 4)?;
    w.put_varint(remaining)?;
    w.put_binary(PROTOCOL_NAME)?;
    w.put_u8(PROTOCOL_LEVEL)?;
    w.put_u8(CLEAN_SESSION_FLAG)?;
    w.put_u16(keep_alive_secs)?;
    // v5 tells the broker not to send packets we cannot buffer; v3.1.1 has no
    // such field and relies on the client skipping them.
    #[cfg(feature = "v5")]
    {
        w.put_u8(5)?;
        w.put_u8(MAXIMUM_PACKET_SIZE_PROPERTY)?;
        w.put_bytes(&max_packet_size.to_be_bytes())?;
    }
    #[cfg(not(feature = "v5"))]
    let _ = max_packet_size;
    w.put_binary(client_id.as_bytes())?;
    Ok(w.position())
}

/// SUBSCRIBE with a single topic filter.
pub fn encode_subscribe(
    buf: &mut [u8],
    packet_id: u16,
    topic: &str,
    qos: QoS,
) -> Result<usize, ProtocolError> {
    let remaining = 2 + EMPTY_PROPERTIES_LEN + 2 + topic.len() + 1;
    let mut w = Writer::new(buf);
    // SUBSCRIBE carries the mandatory 0b0010 flags
    w.put_u8(packet_type::SUBSCRIBE << 4 | 0x02)?;
    w.put_varint(remaining)?;
    w.put_u16(packet_id)?;
    w.put_empty_properties()?;
    w.put_binary(topic.as_bytes())?;
    w.put_u8(qos.bits())?;
    Ok(w.position())
}

/// PUBLISH; `packet_id` is required for QoS above 0 and ignored otherwise.
pub fn encode_publish(
    buf: &mut [u8],
    topic: &str,
    payload: &[u8],
    qos: QoS,
    packet_id: Option<u16>,
) -> Result<usize, ProtocolError> {
    let packet_id = match qos {
        QoS::AtMostOnce => None,
        _ => Some(packet_id.ok_or(ProtocolError::MissingPacketId)?),
    };
    let id_len = if packet_id.is_some() { 2 } else { 0 };
    let remaining = 2 + topic.len() + id_len + EMPTY_PROPERTIES_LEN + payload.len();
    let mut w = Writer::new(buf);
    w.put_u8(packet_type::PUBLISH << 4 | qos.bits() << 1)?;
    w.put_varint(remaining)?;
    w.put_binary(topic.as_bytes())?;
    if let Some(id) = packet_id {
        w.put_u16(id)?;
    }
    w.put_empty_properties()?;
    w.put_bytes(payload)?;
    Ok(w.position())
}

/// PUBACK. The short form (no reason code) is valid for both protocol versions.
pub fn encode_puback(buf: &mut [u8], packet_id: u16) -> Result<usize, ProtocolError> {
    let mut w = Writer::new(buf);
    w.put_u8(packet_type::PUBACK << 4)?;
    w.put_u8(2)?;
    w.put_u16(packet_id)?;
    Ok(w.position())
}

pub fn encode_pingreq(buf: &mut [u8]) -> Result<usize, ProtocolError> {
    let mut w = Writer::new(buf);
    w.put_bytes(&[packet_type::PINGREQ << 4, 0])?;
    Ok(w.position())
}

pub fn encode_disconnect(buf: &mut [u8]) -> Result<usize, ProtocolError> {
    let mut w = Writer::new(buf);
    w.put_bytes(&[packet_type::DISCONNECT << 4, 0])?;
    Ok(w.position())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(feature = "v5"))]
    #[test]
    fn connect_matches_v311_wire_format() {
        let mut buf = [0u8; 64];
        let len = encode_connect(&mut buf, "abc", 15, 512).unwrap();
        assert_eq!(
            &buf[..len],
            &[
                0x10, 0x0F, 0x00, 0x04, b'M', b'Q', b'T', b'T', 0x04, 0x02, 0x00, 0x0F, 0x00,
                0x03, b'a', b'b', b'c'
            ]
        );
    }

    #[cfg(feature = "v5")]
    #[test]
    fn connect_matches_v5_wire_format() {
        let mut buf = [0u8; 64];
        let len = encode_connect(&mut buf, "abc", 15, 512).unwrap();
        assert_eq!(
            &buf[..len],
            &[
                0x10, 0x15, 0x00, 0x04, b'M', b'Q', b'T', b'T', 0x05, 0x02, 0x00, 0x0F, 0x05,
                0x27, 0x00, 0x00, 0x02, 0x00, 0x00, 0x03, b'a', b'b', b'c'
            ]
        );
    }

    #[test]
    fn subscribe_carries_packet_id_topic_and_qos() {
        let mut buf = [0u8; 64];
        let len = encode_subscribe(&mut buf, 7, "a/b", QoS::AtLeastOnce).unwrap();
        let frame = &buf[..len];
        assert_eq!(frame[0], 0x82);
        assert_eq!(frame_length(frame).unwrap(), Some(len));
        assert_eq!(&frame[2..4], &[0x00, 0x07]);
        assert_eq!(&frame[len - 6..], &[0x00, 0x03, b'a', b'/', b'b', 0x01]);
    }

    #[test]
    fn encoders_report_small_buffers() {
        let mut buf = [0u8; 8];
        assert_eq!(
            encode_connect(&mut buf, "client", 60, 512),
            Err(ProtocolError::BufferTooSmall)
        );
        assert_eq!(encode_pingreq(&mut buf[..1]), Err(ProtocolError::BufferTooSmall));
    }

    #[test]
    fn publish_decodes_topic_and_payload_by_length() {
        let mut buf = [0u8; 64];
        let len = encode_publish(&mut buf, "t/led", b"1", QoS::AtLeastOnce, Some(42)).unwrap();
        let Packet::Publish(publish) = decode(&buf[..len]).unwrap() else {
            panic!("expected PUBLISH");
        };
        assert_eq!(publish.topic, b"t/led");
        assert_eq!(publish.payload, b"1");
        assert_eq!(publish.qos, QoS::AtLeastOnce);
        assert_eq!(publish.packet_id, Some(42));
        assert!(!publish.retain);
        assert!(!publish.truncated);
    }

    #[test]
    fn publish_at_most_once_has_no_packet_id() {
        let mut buf = [0u8; 64];
        let len = encode_publish(&mut buf, "t", b"", QoS::AtMostOnce, Some(9)).unwrap();
        let Packet::Publish(publish) = decode(&buf[..len]).unwrap() else {
            panic!("expected PUBLISH");
        };
        assert_eq!(publish.packet_id, None);
        assert!(publish.payload.is_empty());
    }

    #[test]
    fn truncated_publish_keeps_topic_and_payload_head() {
        let mut buf = [0u8; 64];
        let len = encode_publish(&mut buf, "t/led", &[b'x'; 40], QoS::AtLeastOnce, Some(3)).unwrap();
        let head = &buf[..len - 30];

        let publish = decode_truncated_publish(head).unwrap();

        assert!(publish.truncated);
        assert_eq!(publish.topic, b"t/led");
        assert_eq!(publish.packet_id, Some(3));
        assert_eq!(publish.payload, &[b'x'; 10]);
    }

    #[test]
    fn truncated_decode_needs_a_publish_with_a_complete_topic() {
        let mut buf = [0u8; 64];
        let len = encode_publish(&mut buf, "a/long/topic", b"1", QoS::AtMostOnce, None).unwrap();

        assert_eq!(
            decode_truncated_publish(&buf[..6]),
            Err(ProtocolError::UnexpectedEnd)
        );
        assert!(len > 6);
        assert_eq!(
            decode_truncated_publish(&[0x90, 0x03, 0x00]),
            Err(ProtocolError::PacketTooLarge)
        );
    }

    #[test]
    fn connack_and_suback_expose_codes() {
        let connack: &[u8] = if cfg!(feature = "v5") {
            &[0x20, 0x03, 0x01, 0x00, 0x00]
        } else {
            &[0x20, 0x02, 0x01, 0x00]
        };
        assert_eq!(
            decode(connack).unwrap(),
            Packet::ConnAck {
                session_present: true,
                reason_code: 0
            }
        );

        let suback: &[u8] = if cfg!(feature = "v5") {
            &[0x90, 0x04, 0x00, 0x05, 0x00, 0x80]
        } else {
            &[0x90, 0x03, 0x00, 0x05, 0x80]
        };
        assert_eq!(
            decode(suback).unwrap(),
            Packet::SubAck {
                packet_id: 5,
                reason_code: 0x80
            }
        );
        assert!(!is_success_code(0x80));
        assert!(is_success_code(0x01));
    }

    #[test]
    fn frame_length_waits_for_the_fixed_header() {
        assert_eq!(frame_length(&[]).unwrap(), None);
        assert_eq!(frame_length(&[0x30]).unwrap(), None);
        assert_eq!(frame_length(&[0x30, 0x80]).unwrap(), None);
        assert_eq!(frame_length(&[0x30, 0x80, 0x01]).unwrap(), Some(131));
        assert_eq!(frame_length(&[0xD0, 0x00]).unwrap(), Some(2));
    }

    #[test]
    fn unknown_and_reserved_types() {
        assert_eq!(
            decode(&[0xB0, 0x02, 0x00, 0x01]).unwrap(),
            Packet::Other {
                packet_type: packet_type::UNSUBACK
            }
        );
        assert_eq!(decode(&[0x00, 0x00]), Err(ProtocolError::InvalidPacketType(0)));
        assert_eq!(decode(&[0x36, 0x00]), Err(ProtocolError::InvalidQoS(3)));
    }
}
