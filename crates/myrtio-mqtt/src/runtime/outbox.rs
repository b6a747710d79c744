use core::fmt;

use heapless::Vec;

use crate::packet::QoS;
use crate::util::PacketIds;

/// The outbox is full; the request was not queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutboxFull;

impl fmt::Display for OutboxFull {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "subscription outbox is full")
    }
}

/// What a module may ask of the session while handling an event.
pub trait SessionControl {
    /// Queues a SUBSCRIBE and returns the packet identifier it will carry.
    ///
    /// The packet is sent after the current handler returns.
    fn subscribe(&mut self, topic: &'static str, qos: QoS) -> Result<u16, OutboxFull>;
}

/// A SUBSCRIBE waiting to be sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionRequest {
    pub topic: &'static str,
    pub qos: QoS,
    pub packet_id: u16,
}

/// [`SessionControl`] backed by a bounded queue.
///
/// Packet identifiers are allocated only for requests that fit.
pub struct SubscriptionOutbox<'r, const N: usize> {
    packet_ids: &'r mut PacketIds,
    queue: &'r mut Vec<SubscriptionRequest, N>,
}

impl<'r, const N: usize> SubscriptionOutbox<'r, N> {
    pub fn new(packet_ids: &'r mut PacketIds, queue: &'r mut Vec<SubscriptionRequest, N>) -> Self {
        Self { packet_ids, queue }
    }
}

impl<const N: usize> SessionControl for SubscriptionOutbox<'_, N> {
    fn subscribe(&mut self, topic: &'static str, qos: QoS) -> Result<u16, OutboxFull> {
        if self.queue.is_full() {
            return Err(OutboxFull);
        }
        let packet_id = self.packet_ids.next_id();
        self.queue
            .push(SubscriptionRequest {
                topic,
                qos,
                packet_id,
            })
            .map_err(|_| OutboxFull)?;
        Ok(packet_id)
    }
}
