use heapless::Vec;

use super::event::{SessionError, SessionEvent};
use super::outbox::{SubscriptionOutbox, SubscriptionRequest};
use super::traits::MqttModule;
use crate::client::MqttClient;
use crate::error::MqttError;
use crate::transport::MqttTransport;
use crate::util::PacketIds;

/// Runs one MQTT session and feeds its events to a module.
///
/// `MAX_TOPICS` bounds both the subscription outbox and the number of
/// SUBSCRIBE packets awaiting SUBACK.
pub struct MqttRuntime<'a, T, M, const MAX_TOPICS: usize, const BUF_SIZE: usize>
where
    T: MqttTransport,
    M: MqttModule,
{
    client: MqttClient<'a, T, MAX_TOPICS, BUF_SIZE>,
    module: M,
    packet_ids: PacketIds,
    outbox: Vec<SubscriptionRequest, MAX_TOPICS>,
}

impl<'a, T, M, const MAX_TOPICS: usize, const BUF_SIZE: usize>
    MqttRuntime<'a, T, M, MAX_TOPICS, BUF_SIZE>
where
    T: MqttTransport,
    M: MqttModule,
{
    pub fn new(client: MqttClient<'a, T, MAX_TOPICS, BUF_SIZE>, module: M) -> Self {
        Self {
            client,
            module,
            packet_ids: PacketIds::new(),
            outbox: Vec::new(),
        }
    }

    /// Connects and serves the session until it fails.
    ///
    /// Before returning the error the module receives it as
    /// [`SessionEvent::Error`], followed by [`SessionEvent::Disconnected`].
    pub async fn run(&mut self) -> Result<(), MqttError<T::Error>> {
        self.outbox.clear();
        let result = self.serve().await;
        if let Err(error) = &result {
            #[cfg(feature = "log")]
            log::warn!("mqtt: session ended: {}", error);
            self.dispatch(&SessionEvent::Error(SessionError::from(error)));
            self.dispatch(&SessionEvent::Disconnected);
        }
        result
    }

    async fn serve(&mut self) -> Result<(), MqttError<T::Error>> {
        self.client.connect().await?;
        #[cfg(feature = "log")]
        log::info!("mqtt: connected as {}", self.client.options().client_id());
        self.dispatch(&SessionEvent::Connected);
        self.flush().await?;

        loop {
            let Self {
                client,
                module,
                packet_ids,
                outbox,
            } = self;
            if let Some(event) = client.poll().await? {
                deliver(module, packet_ids, outbox, &SessionEvent::from(event));
            }
            self.flush().await?;
        }
    }

    fn dispatch(&mut self, event: &SessionEvent<'_>) {
        deliver(&mut self.module, &mut self.packet_ids, &mut self.outbox, event);
    }

    /// Sends every queued SUBSCRIBE in order
    async fn flush(&mut self) -> Result<(), MqttError<T::Error>> {
        for request in &self.outbox {
            #[cfg(feature = "log")]
            log::debug!(
                "mqtt: subscribing to {} (packet id {})",
                request.topic,
                request.packet_id
            );
            self.client
                .subscribe_with_id(request.topic, request.qos, request.packet_id)
                .await?;
        }
        self.outbox.clear();
        Ok(())
    }
}

fn deliver<M: MqttModule, const N: usize>(
    module: &mut M,
    packet_ids: &mut PacketIds,
    queue: &mut Vec<SubscriptionRequest, N>,
    event: &SessionEvent<'_>,
) {
    let mut outbox = SubscriptionOutbox::new(packet_ids, queue);
    module.on_event(event, &mut outbox);
}
