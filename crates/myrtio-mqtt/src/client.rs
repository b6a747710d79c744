//! MQTT client
//!
//! `MqttClient` keeps one session over an [`MqttTransport`]: it frames inbound
//! bytes into packets, answers keep-alive and QoS 1 acknowledgements on its own
//! and hands everything else to the caller as an [`MqttEvent`].
//!
//! A packet larger than the receive buffer does not end the session. A PUBLISH
//! is handed out once with the part of the payload that fit and
//! [`Publish::truncated`] set; the remaining bytes are read and dropped.

use embassy_futures::select::{Either, select};
use embassy_time::{Duration, Instant, Timer};
use heapless::Vec;

use crate::error::{MqttError, ProtocolError};
use crate::packet::{self, Packet, Publish, QoS};
use crate::transport::MqttTransport;
use crate::util::PacketIds;

/// Connection options
#[derive(Debug, Clone)]
pub struct MqttOptions<'a> {
    client_id: &'a str,
    keep_alive: Duration,
}

impl<'a> MqttOptions<'a> {
    /// Options with a 60 second keep-alive
    pub const fn new(client_id: &'a str) -> Self {
        Self {
            client_id,
            keep_alive: Duration::from_secs(60),
        }
    }

    /// Keep-alive interval; zero disables pings
    #[must_use]
    pub const fn with_keep_alive(mut self, keep_alive: Duration) -> Self {
        self.keep_alive = keep_alive;
        self
    }

    pub fn client_id(&self) -> &'a str {
        self.client_id
    }

    fn keep_alive_secs(&self) -> u16 {
        u16::try_from(self.keep_alive.as_secs()).unwrap_or(u16::MAX)
    }
}

/// Something the caller has to know about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MqttEvent<'p> {
    /// Inbound application message (already acknowledged if QoS 1)
    Publish(Publish<'p>),
    /// The broker answered a SUBSCRIBE
    SubAck { packet_id: u16, reason_code: u8 },
    /// The broker acknowledged one of our QoS 1 publishes
    PubAck { packet_id: u16 },
    /// Any other packet the client does not handle itself
    Other { packet_type: u8 },
}

/// Async MQTT client.
///
/// # Type Parameters
///
/// - `MAX_TOPICS`: maximum number of SUBSCRIBE packets awaiting their SUBACK
/// - `BUF_SIZE`: size of each of the receive and transmit buffers; also the
///   largest packet the client can receive
pub struct MqttClient<'a, T, const MAX_TOPICS: usize, const BUF_SIZE: usize>
where
    T: MqttTransport,
{
    transport: T,
    options: MqttOptions<'a>,
    packet_ids: PacketIds,
    pending_subscriptions: Vec<u16, MAX_TOPICS>,
    rx: [u8; BUF_SIZE],
    rx_len: usize,
    rx_consumed: usize,
    /// Bytes of an oversized packet still to be dropped from the stream
    skip_remaining: usize,
    tx: [u8; BUF_SIZE],
    last_sent: Instant,
    ping_outstanding: bool,
    connected: bool,
}

impl<'a, T, const MAX_TOPICS: usize, const BUF_SIZE: usize> MqttClient<'a, T, MAX_TOPICS, BUF_SIZE>
where
    T: MqttTransport,
{
    pub fn new(transport: T, options: MqttOptions<'a>) -> Self {
        Self {
            transport,
            options,
            packet_ids: PacketIds::new(),
            pending_subscriptions: Vec::new(),
            rx: [0u8; BUF_SIZE],
            rx_len: 0,
            rx_consumed: 0,
            skip_remaining: 0,
            tx: [0u8; BUF_SIZE],
            last_sent: Instant::now(),
            ping_outstanding: false,
            connected: false,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn options(&self) -> &MqttOptions<'a> {
        &self.options
    }

    /// Sends CONNECT and waits for CONNACK.
    ///
    /// Returns the broker's "session present" flag.
    pub async fn connect(&mut self) -> Result<bool, MqttError<T::Error>> {
        let len = packet::encode_connect(
            &mut self.tx,
            self.options.client_id,
            self.options.keep_alive_secs(),
            u32::try_from(BUF_SIZE).unwrap_or(u32::MAX),
        )?;
        self.send_tx(len).await?;

        loop {
            self.fill_until_frame().await?;
            match self.take_frame()? {
                Packet::ConnAck {
                    session_present,
                    reason_code: 0,
                } => {
                    self.connected = true;
                    self.ping_outstanding = false;
                    #[cfg(feature = "log")]
                    log::debug!("mqtt: session established (present: {})", session_present);
                    return Ok(session_present);
                }
                Packet::ConnAck { reason_code, .. } => {
                    return Err(MqttError::ConnectionRefused(reason_code));
                }
                other => return Err(MqttError::UnexpectedPacket(other.packet_type())),
            }
        }
    }

    /// Sends SUBSCRIBE with a freshly allocated packet identifier and returns it.
    ///
    /// The matching SUBACK is reported by [`poll`](Self::poll).
    pub async fn subscribe(&mut self, topic: &str, qos: QoS) -> Result<u16, MqttError<T::Error>> {
        let packet_id = self.packet_ids.next_id();
        self.subscribe_with_id(topic, qos, packet_id).await?;
        Ok(packet_id)
    }

    /// Sends SUBSCRIBE with a caller-chosen packet identifier.
    pub async fn subscribe_with_id(
        &mut self,
        topic: &str,
        qos: QoS,
        packet_id: u16,
    ) -> Result<(), MqttError<T::Error>> {
        if !self.connected {
            return Err(MqttError::NotConnected);
        }
        self.pending_subscriptions
            .push(packet_id)
            .map_err(|_| MqttError::TooManyPendingSubscriptions)?;
        let len = packet::encode_subscribe(&mut self.tx, packet_id, topic, qos)?;
        self.send_tx(len).await
    }

    /// Publishes a message. Returns the packet identifier for QoS 1 and above.
    pub async fn publish(
        &mut self,
        topic: &str,
        payload: &[u8],
        qos: QoS,
    ) -> Result<Option<u16>, MqttError<T::Error>> {
        if !self.connected {
            return Err(MqttError::NotConnected);
        }
        let packet_id = match qos {
            QoS::AtMostOnce => None,
            _ => Some(self.packet_ids.next_id()),
        };
        let len = packet::encode_publish(&mut self.tx, topic, payload, qos, packet_id)?;
        self.send_tx(len).await?;
        Ok(packet_id)
    }

    /// Waits for the next inbound packet or the keep-alive deadline.
    ///
    /// Returns `Ok(None)` when the call only did housekeeping (a ping went out,
    /// a PINGRESP came in, or a partial packet was buffered or dropped).
    pub async fn poll(&mut self) -> Result<Option<MqttEvent<'_>>, MqttError<T::Error>> {
        if !self.connected {
            return Err(MqttError::NotConnected);
        }
        self.discard_consumed();

        // Inbound traffic always wins the select below, so an overdue ping
        // has to go out first.
        if self
            .keep_alive_deadline()
            .is_some_and(|deadline| Instant::now() >= deadline)
        {
            self.keep_alive().await?;
        }

        if !self.has_frame()? {
            let deadline = self.keep_alive_deadline();
            match deadline {
                Some(deadline) => match select(self.fill_rx(), Timer::at(deadline)).await {
                    Either::First(result) => result?,
                    Either::Second(()) => {
                        self.keep_alive().await?;
                        return Ok(None);
                    }
                },
                None => self.fill_rx().await?,
            }
            if !self.has_frame()? {
                return Ok(None);
            }
        }

        self.handle_frame().await
    }

    /// Sends DISCONNECT and marks the session closed.
    pub async fn disconnect(&mut self) -> Result<(), MqttError<T::Error>> {
        if !self.connected {
            return Ok(());
        }
        self.connected = false;
        let len = packet::encode_disconnect(&mut self.tx)?;
        self.send_tx(len).await
    }

    /// Consumes the client and returns the transport
    pub fn into_transport(self) -> T {
        self.transport
    }

    async fn handle_frame(&mut self) -> Result<Option<MqttEvent<'_>>, MqttError<T::Error>> {
        let announced = self
            .announced_len()?
            .ok_or(MqttError::Protocol(ProtocolError::UnexpectedEnd))?;

        let Self {
            transport,
            rx,
            rx_len,
            rx_consumed,
            skip_remaining,
            tx,
            pending_subscriptions,
            ping_outstanding,
            last_sent,
            connected,
            ..
        } = self;

        let packet = if announced > BUF_SIZE {
            // The buffer is full with the head of the packet: consume all of
            // it and drop the rest as it arrives.
            *rx_consumed = *rx_len;
            *skip_remaining = announced - *rx_len;
            match packet::decode_truncated_publish(&rx[..*rx_len]) {
                Ok(publish) => {
                    #[cfg(feature = "log")]
                    log::warn!("mqtt: truncated {} byte message", announced);
                    Packet::Publish(publish)
                }
                Err(_e) => {
                    #[cfg(feature = "log")]
                    log::warn!("mqtt: dropped {} byte packet: {}", announced, _e);
                    return Ok(None);
                }
            }
        } else {
            *rx_consumed = announced;
            packet::decode(&rx[..announced])?
        };

        match packet {
            Packet::Publish(publish) => {
                if let (QoS::AtLeastOnce, Some(packet_id)) = (publish.qos, publish.packet_id) {
                    let len = packet::encode_puback(tx, packet_id)?;
                    transport
                        .send(&tx[..len])
                        .await
                        .map_err(MqttError::Transport)?;
                    *last_sent = Instant::now();
                }
                Ok(Some(MqttEvent::Publish(publish)))
            }
            Packet::SubAck {
                packet_id,
                reason_code,
            } => {
                pending_subscriptions.retain(|id| *id != packet_id);
                Ok(Some(MqttEvent::SubAck {
                    packet_id,
                    reason_code,
                }))
            }
            Packet::PubAck { packet_id } => Ok(Some(MqttEvent::PubAck { packet_id })),
            Packet::PingResp => {
                *ping_outstanding = false;
                Ok(None)
            }
            Packet::Disconnect { reason_code } => {
                *connected = false;
                Err(MqttError::ServerDisconnect(reason_code))
            }
            Packet::ConnAck { .. } => Err(MqttError::UnexpectedPacket(packet::packet_type::CONNACK)),
            Packet::Other { packet_type } => Ok(Some(MqttEvent::Other { packet_type })),
        }
    }

    async fn keep_alive(&mut self) -> Result<(), MqttError<T::Error>> {
        if self.ping_outstanding {
            self.connected = false;
            return Err(MqttError::KeepAliveTimeout);
        }
        let len = packet::encode_pingreq(&mut self.tx)?;
        self.send_tx(len).await?;
        self.ping_outstanding = true;
        Ok(())
    }

    /// `None` when keep-alive is disabled
    fn keep_alive_deadline(&self) -> Option<Instant> {
        if self.options.keep_alive.as_ticks() == 0 {
            return None;
        }
        Some(self.last_sent + self.options.keep_alive)
    }

    async fn send_tx(&mut self, len: usize) -> Result<(), MqttError<T::Error>> {
        self.transport
            .send(&self.tx[..len])
            .await
            .map_err(MqttError::Transport)?;
        self.last_sent = Instant::now();
        Ok(())
    }

    /// Reads once from the transport into the free part of the receive buffer,
    /// dropping what is left of an oversized packet.
    async fn fill_rx(&mut self) -> Result<(), MqttError<T::Error>> {
        if self.rx_len == BUF_SIZE {
            return Err(ProtocolError::PacketTooLarge.into());
        }
        let read = self
            .transport
            .recv(&mut self.rx[self.rx_len..])
            .await
            .map_err(MqttError::Transport)?;
        if read == 0 {
            self.connected = false;
            return Err(MqttError::ConnectionClosed);
        }
        self.rx_len += read;

        if self.skip_remaining > 0 {
            let skipped = self.skip_remaining.min(self.rx_len);
            self.rx.copy_within(skipped..self.rx_len, 0);
            self.rx_len -= skipped;
            self.skip_remaining -= skipped;
        }
        Ok(())
    }

    async fn fill_until_frame(&mut self) -> Result<(), MqttError<T::Error>> {
        self.discard_consumed();
        while !self.has_frame()? {
            self.fill_rx().await?;
        }
        Ok(())
    }

    /// Decodes the buffered frame; only for packets that borrow nothing.
    fn take_frame(&mut self) -> Result<Packet<'static>, MqttError<T::Error>> {
        let frame_len = self.frame_len()?;
        self.rx_consumed = frame_len;
        match packet::decode(&self.rx[..frame_len])? {
            Packet::ConnAck {
                session_present,
                reason_code,
            } => Ok(Packet::ConnAck {
                session_present,
                reason_code,
            }),
            other => Ok(Packet::Other {
                packet_type: other.packet_type(),
            }),
        }
    }

    /// A frame is ready when it is complete, or when an oversized one has
    /// filled the whole buffer.
    fn has_frame(&self) -> Result<bool, MqttError<T::Error>> {
        match self.announced_len()? {
            Some(len) if len > BUF_SIZE => Ok(self.rx_len == BUF_SIZE),
            Some(len) => Ok(len <= self.rx_len),
            None => Ok(false),
        }
    }

    fn announced_len(&self) -> Result<Option<usize>, MqttError<T::Error>> {
        Ok(packet::frame_length(&self.rx[..self.rx_len])?)
    }

    /// Length of the complete frame at the front of the buffer
    fn frame_len(&self) -> Result<usize, MqttError<T::Error>> {
        match self.announced_len()? {
            Some(len) if len > BUF_SIZE => Err(ProtocolError::PacketTooLarge.into()),
            Some(len) if len <= self.rx_len => Ok(len),
            _ => Err(ProtocolError::UnexpectedEnd.into()),
        }
    }

    /// Drops the previously returned frame from the front of the receive buffer.
    fn discard_consumed(&mut self) {
        if self.rx_consumed == 0 {
            return;
        }
        self.rx.copy_within(self.rx_consumed..self.rx_len, 0);
        self.rx_len -= self.rx_consumed;
        self.rx_consumed = 0;
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::vec::Vec;

    use embassy_futures::block_on;

    use super::*;

    /// Scripted transport: hands out `inbound` chunk by chunk and records every send.
    ///
    /// Once drained it fails the read, or never completes it when `idle` is set.
    struct ScriptedTransport {
        inbound: Vec<Vec<u8>>,
        sent: Vec<Vec<u8>>,
        idle: bool,
    }

    impl ScriptedTransport {
        fn new(inbound: &[&[u8]]) -> Self {
            Self {
                inbound: inbound.iter().rev().map(|chunk| chunk.to_vec()).collect(),
                sent: Vec::new(),
                idle: false,
            }
        }

        fn idle(inbound: &[&[u8]]) -> Self {
            Self {
                idle: true,
                ..Self::new(inbound)
            }
        }
    }

    impl MqttTransport for ScriptedTransport {
        type Error = ();

        async fn send(&mut self, buf: &[u8]) -> Result<(), ()> {
            self.sent.push(buf.to_vec());
            Ok(())
        }

        async fn recv(&mut self, buf: &mut [u8]) -> Result<usize, ()> {
            let Some(mut chunk) = self.inbound.pop() else {
                if self.idle {
                    core::future::pending::<()>().await;
                }
                return Err(());
            };
            let read = chunk.len().min(buf.len());
            buf[..read].copy_from_slice(&chunk[..read]);
            if read < chunk.len() {
                self.inbound.push(chunk.split_off(read));
            }
            Ok(read)
        }
    }

    fn connack() -> &'static [u8] {
        if cfg!(feature = "v5") {
            &[0x20, 0x03, 0x00, 0x00, 0x00]
        } else {
            &[0x20, 0x02, 0x00, 0x00]
        }
    }

    const PINGREQ: [u8; 2] = [0xC0, 0x00];

    fn publish_frame(topic: &str, payload: &[u8], qos: QoS, packet_id: Option<u16>) -> Vec<u8> {
        let mut buf = [0u8; 128];
        let len = packet::encode_publish(&mut buf, topic, payload, qos, packet_id).unwrap();
        buf[..len].to_vec()
    }

    #[test]
    fn connect_sends_connect_and_accepts_connack() {
        let transport = ScriptedTransport::new(&[connack()]);
        let mut client: MqttClient<_, 2, 128> = MqttClient::new(transport, MqttOptions::new("led"));

        let session_present = block_on(client.connect()).unwrap();

        assert!(!session_present);
        assert!(client.is_connected());
        let transport = client.into_transport();
        assert_eq!(transport.sent.len(), 1);
        assert_eq!(transport.sent[0][0], 0x10);
    }

    #[test]
    fn refused_connection_reports_the_code() {
        let refused: &[u8] = if cfg!(feature = "v5") {
            &[0x20, 0x03, 0x00, 0x87, 0x00]
        } else {
            &[0x20, 0x02, 0x00, 0x05]
        };
        let transport = ScriptedTransport::new(&[refused]);
        let mut client: MqttClient<_, 2, 128> = MqttClient::new(transport, MqttOptions::new("led"));

        let result = block_on(client.connect());

        assert!(matches!(result, Err(MqttError::ConnectionRefused(code)) if code == refused[3]));
        assert!(!client.is_connected());
    }

    #[test]
    fn qos1_publish_is_acknowledged_before_it_is_returned() {
        let frame = publish_frame("a/led", b"1", QoS::AtLeastOnce, Some(0x0102));
        let transport = ScriptedTransport::new(&[connack(), &frame]);
        let mut client: MqttClient<_, 2, 128> = MqttClient::new(transport, MqttOptions::new("led"));
        block_on(client.connect()).unwrap();

        let event = block_on(client.poll()).unwrap();
        let Some(MqttEvent::Publish(publish)) = event else {
            panic!("expected a publish, got {:?}", event);
        };
        assert_eq!(publish.topic, b"a/led");
        assert_eq!(publish.payload, b"1");

        let transport = client.into_transport();
        assert_eq!(transport.sent.last().unwrap(), &[0x40, 0x02, 0x01, 0x02]);
    }

    #[test]
    fn frames_split_across_reads_and_coalesced_frames_are_both_handled() {
        let first = publish_frame("t", b"0", QoS::AtMostOnce, None);
        let second = publish_frame("t", b"1", QoS::AtMostOnce, None);
        let mut joined = first.clone();
        joined.extend_from_slice(&second);
        let (head, tail) = joined.split_at(2);
        let transport = ScriptedTransport::new(&[connack(), head, tail]);
        let mut client: MqttClient<_, 2, 128> = MqttClient::new(transport, MqttOptions::new("led"));
        block_on(client.connect()).unwrap();

        // Only the fixed header arrived: nothing to report yet.
        assert_eq!(block_on(client.poll()).unwrap(), None);

        let payloads: Vec<Vec<u8>> = (0..2)
            .map(|_| match block_on(client.poll()).unwrap() {
                Some(MqttEvent::Publish(p)) => p.payload.to_vec(),
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        assert_eq!(payloads, [b"0".to_vec(), b"1".to_vec()]);
    }

    #[test]
    fn suback_is_reported_with_its_packet_id() {
        let suback: &[u8] = if cfg!(feature = "v5") {
            &[0x90, 0x04, 0x00, 0x01, 0x00, 0x01]
        } else {
            &[0x90, 0x03, 0x00, 0x01, 0x01]
        };
        let transport = ScriptedTransport::new(&[connack(), suback]);
        let mut client: MqttClient<_, 2, 128> = MqttClient::new(transport, MqttOptions::new("led"));
        block_on(client.connect()).unwrap();

        let packet_id = block_on(client.subscribe("a/led", QoS::AtLeastOnce)).unwrap();
        assert_eq!(packet_id, 1);
        assert_eq!(
            block_on(client.poll()).unwrap(),
            Some(MqttEvent::SubAck {
                packet_id: 1,
                reason_code: 1
            })
        );
    }

    #[test]
    fn pending_subscriptions_are_bounded() {
        let transport = ScriptedTransport::new(&[connack()]);
        let mut client: MqttClient<_, 1, 128> = MqttClient::new(transport, MqttOptions::new("led"));
        block_on(client.connect()).unwrap();

        block_on(client.subscribe("a", QoS::AtLeastOnce)).unwrap();
        assert!(matches!(
            block_on(client.subscribe("b", QoS::AtLeastOnce)),
            Err(MqttError::TooManyPendingSubscriptions)
        ));
    }

    #[test]
    fn server_disconnect_ends_the_session() {
        let transport = ScriptedTransport::new(&[connack(), &[0xE0, 0x00]]);
        let mut client: MqttClient<_, 2, 128> = MqttClient::new(transport, MqttOptions::new("led"));
        block_on(client.connect()).unwrap();

        assert!(matches!(
            block_on(client.poll()),
            Err(MqttError::ServerDisconnect(0))
        ));
        assert!(!client.is_connected());
    }

    /// Polls until the next inbound message and copies it out.
    fn next_publish<const N: usize>(
        client: &mut MqttClient<'_, ScriptedTransport, 2, N>,
    ) -> (Vec<u8>, Vec<u8>, bool) {
        for _ in 0..8 {
            if let Some(MqttEvent::Publish(p)) = block_on(client.poll()).unwrap() {
                return (p.topic.to_vec(), p.payload.to_vec(), p.truncated);
            }
        }
        panic!("no publish arrived");
    }

    #[test]
    fn oversized_publish_is_truncated_and_the_session_survives() {
        let oversized = publish_frame("a/led", &[b'x'; 64], QoS::AtLeastOnce, Some(5));
        let next = publish_frame("a/led", b"1", QoS::AtMostOnce, None);
        let transport = ScriptedTransport::new(&[connack(), &oversized, &next]);
        let mut client: MqttClient<_, 2, 32> = MqttClient::new(transport, MqttOptions::new("led"));
        block_on(client.connect()).unwrap();

        let (topic, payload, truncated) = next_publish(&mut client);
        assert_eq!(topic, b"a/led");
        assert!(truncated);
        assert!(payload.len() < 64);
        assert!(payload.iter().all(|b| *b == b'x'));

        // The tail of the oversized frame is dropped, not parsed as a packet.
        let (topic, payload, truncated) = next_publish(&mut client);
        assert_eq!(topic, b"a/led");
        assert_eq!(payload, b"1");
        assert!(!truncated);
        assert!(client.is_connected());

        let transport = client.into_transport();
        assert_eq!(transport.sent[1], [0x40, 0x02, 0x00, 0x05]);
    }

    #[test]
    fn oversized_non_publish_is_dropped() {
        let mut suback = std::vec![0x90, 0x40, 0x00, 0x01];
        suback.resize(2 + 0x40, 0x00);
        let next = publish_frame("t", b"0", QoS::AtMostOnce, None);
        let transport = ScriptedTransport::new(&[connack(), &suback, &next]);
        let mut client: MqttClient<_, 2, 32> = MqttClient::new(transport, MqttOptions::new("led"));
        block_on(client.connect()).unwrap();

        let (topic, payload, truncated) = next_publish(&mut client);
        assert_eq!((topic.as_slice(), payload.as_slice(), truncated), (&b"t"[..], &b"0"[..], false));
    }

    #[cfg(feature = "v5")]
    #[test]
    fn connect_advertises_the_receive_buffer_size() {
        let transport = ScriptedTransport::new(&[connack()]);
        let mut client: MqttClient<_, 2, 512> = MqttClient::new(transport, MqttOptions::new("led"));
        block_on(client.connect()).unwrap();

        let transport = client.into_transport();
        let connect = &transport.sent[0];
        let property = [0x27, 0x00, 0x00, 0x02, 0x00];
        assert!(connect.windows(property.len()).any(|w| w == property));
    }

    #[test]
    fn idle_session_sends_pingreq_then_times_out_without_pingresp() {
        let transport = ScriptedTransport::idle(&[connack()]);
        let options = MqttOptions::new("led").with_keep_alive(Duration::from_secs(1));
        let mut client: MqttClient<_, 2, 128> = MqttClient::new(transport, options);
        block_on(client.connect()).unwrap();

        assert_eq!(block_on(client.poll()).unwrap(), None);
        assert!(matches!(block_on(client.poll()), Err(MqttError::KeepAliveTimeout)));
        assert!(!client.is_connected());

        let transport = client.into_transport();
        assert_eq!(transport.sent.len(), 2);
        assert_eq!(transport.sent[1], PINGREQ);
    }

    #[test]
    fn pingresp_clears_the_outstanding_ping() {
        let transport = ScriptedTransport::new(&[connack()]);
        let options = MqttOptions::new("led").with_keep_alive(Duration::from_secs(1));
        let mut client: MqttClient<_, 2, 128> = MqttClient::new(transport, options);
        block_on(client.connect()).unwrap();

        block_on(Timer::after(Duration::from_millis(1100)));
        client.transport.inbound.push(std::vec![0xD0, 0x00]);
        assert_eq!(block_on(client.poll()).unwrap(), None);
        assert!(!client.ping_outstanding);
        assert!(client.is_connected());
    }

    #[test]
    fn zero_keep_alive_never_pings() {
        let transport = ScriptedTransport::idle(&[connack()]);
        let options = MqttOptions::new("led").with_keep_alive(Duration::from_secs(0));
        let mut client: MqttClient<_, 2, 128> = MqttClient::new(transport, options);
        block_on(client.connect()).unwrap();

        let outcome = block_on(select(client.poll(), Timer::after(Duration::from_millis(1500))));
        assert!(matches!(outcome, Either::Second(())));

        let transport = client.into_transport();
        assert_eq!(transport.sent.len(), 1);
    }

    #[test]
    fn overdue_ping_goes_out_even_when_data_is_waiting() {
        let frame = publish_frame("a/led", b"1", QoS::AtMostOnce, None);
        let transport = ScriptedTransport::new(&[connack(), &frame]);
        let options = MqttOptions::new("led").with_keep_alive(Duration::from_secs(1));
        let mut client: MqttClient<_, 2, 128> = MqttClient::new(transport, options);
        block_on(client.connect()).unwrap();

        block_on(Timer::after(Duration::from_millis(1100)));
        let event = block_on(client.poll()).unwrap();
        assert!(matches!(event, Some(MqttEvent::Publish(p)) if p.payload == b"1"));

        let transport = client.into_transport();
        assert_eq!(transport.sent.last().unwrap(), &PINGREQ);
    }

    #[test]
    fn publish_allocates_ids_only_above_qos0() {
        let transport = ScriptedTransport::new(&[connack()]);
        let mut client: MqttClient<_, 2, 128> = MqttClient::new(transport, MqttOptions::new("led"));
        block_on(client.connect()).unwrap();

        assert_eq!(block_on(client.publish("a/led", b"1", QoS::AtMostOnce)).unwrap(), None);
        assert_eq!(
            block_on(client.publish("a/led", b"1", QoS::AtLeastOnce)).unwrap(),
            Some(1)
        );

        let transport = client.into_transport();
        assert_eq!(transport.sent[1][0], 0x30);
        assert_eq!(transport.sent[2][0], 0x32);
    }

    #[test]
    fn publish_requires_a_session() {
        let transport = ScriptedTransport::new(&[]);
        let mut client: MqttClient<_, 2, 128> = MqttClient::new(transport, MqttOptions::new("led"));

        assert!(matches!(
            block_on(client.publish("a/led", b"1", QoS::AtMostOnce)),
            Err(MqttError::NotConnected)
        ));
    }

    #[test]
    fn disconnect_is_sent_once() {
        let transport = ScriptedTransport::new(&[connack()]);
        let mut client: MqttClient<_, 2, 128> = MqttClient::new(transport, MqttOptions::new("led"));
        block_on(client.connect()).unwrap();

        block_on(client.disconnect()).unwrap();
        block_on(client.disconnect()).unwrap();
        assert!(!client.is_connected());

        let transport = client.into_transport();
        assert_eq!(transport.sent.len(), 2);
        assert_eq!(transport.sent[1], [0xE0, 0x00]);
    }

    #[test]
    fn poll_requires_a_session() {
        let transport = ScriptedTransport::new(&[]);
        let mut client: MqttClient<_, 2, 128> = MqttClient::new(transport, MqttOptions::new("led"));

        assert!(matches!(block_on(client.poll()), Err(MqttError::NotConnected)));
    }
}
