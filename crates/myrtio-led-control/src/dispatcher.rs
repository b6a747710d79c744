//! Session events in, pin levels out.
//!
//! The dispatcher keeps no history: what it does depends only on the event at
//! hand, the configured topic and the payload. In particular a lost session
//! leaves the LED as it was, and every new session subscribes again because
//! `Connected` is delivered again.

use embedded_hal::digital::{Error as _, OutputPin};
use myrtio_mqtt::QoS;
use myrtio_mqtt::runtime::{MqttModule, SessionControl, SessionError, SessionEvent};

use crate::command::{Command, PinLevel};
use crate::reaction::{Diagnostic, Escaped, Reaction};
use crate::topic::Topic;

/// Which topic to watch and how to subscribe to it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatcherConfig {
    pub topic: Topic,
    pub qos: QoS,
}

impl DispatcherConfig {
    /// At-least-once subscription to `topic`
    pub const fn new(topic: Topic) -> Self {
        Self {
            topic,
            qos: QoS::AtLeastOnce,
        }
    }

    #[must_use]
    pub const fn with_qos(mut self, qos: QoS) -> Self {
        self.qos = qos;
        self
    }
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self::new(Topic::default())
    }
}

/// Maps session events onto one output pin.
pub struct CommandDispatcher<P: OutputPin> {
    config: DispatcherConfig,
    pin: P,
}

impl<P: OutputPin> CommandDispatcher<P> {
    /// Takes ownership of `pin` and drives it low.
    pub fn new(config: DispatcherConfig, mut pin: P) -> Result<Self, P::Error> {
        PinLevel::Off.apply(&mut pin)?;
        Ok(Self { config, pin })
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    pub fn pin(&self) -> &P {
        &self.pin
    }

    /// Routes one event to its handler and logs the outcome.
    pub fn dispatch<'m>(
        &mut self,
        event: &SessionEvent<'m>,
        session: &mut dyn SessionControl,
    ) -> Reaction<'m> {
        let reaction = match event {
            SessionEvent::Connected => self.on_connected(session),
            SessionEvent::Disconnected => self.on_disconnected(),
            SessionEvent::Subscribed { packet_id } => self.on_subscribed(*packet_id),
            SessionEvent::Message(publish) => {
                log::debug!(
                    "TOPIC={} DATA={}",
                    Escaped(publish.topic),
                    Escaped(publish.payload)
                );
                if publish.truncated {
                    self.on_truncated_message(publish.topic, publish.payload)
                } else {
                    self.on_message(publish.topic, publish.payload)
                }
            }
            SessionEvent::Error(error) => self.on_error(*error),
            SessionEvent::Unhandled { id } => self.on_unhandled_event(*id),
        };
        reaction.diagnostic.emit();
        reaction
    }

    /// Requests exactly one subscription to the configured topic.
    pub fn on_connected(&mut self, session: &mut dyn SessionControl) -> Reaction<'static> {
        let topic = self.config.topic;
        let diagnostic = match session.subscribe(topic.as_str(), self.config.qos) {
            Ok(packet_id) => Diagnostic::SubscriptionRequested { topic, packet_id },
            Err(_) => Diagnostic::SubscriptionNotQueued { topic },
        };
        Reaction::log_only(diagnostic)
    }

    pub fn on_disconnected(&mut self) -> Reaction<'static> {
        Reaction::log_only(Diagnostic::Disconnected)
    }

    pub fn on_subscribed(&mut self, packet_id: u16) -> Reaction<'static> {
        Reaction::log_only(Diagnostic::Subscribed { packet_id })
    }

    /// Applies `"1"`/`"0"` on the configured topic; ignores everything else.
    pub fn on_message<'m>(&mut self, topic: &'m [u8], payload: &'m [u8]) -> Reaction<'m> {
        if !self.config.topic.matches(topic) {
            return Reaction::log_only(Diagnostic::ForeignTopic { topic });
        }

        let command = Command::decode(payload);
        let Some(level) = command.level() else {
            return Reaction::log_only(Diagnostic::UnknownCommand {
                payload,
                truncated: false,
            });
        };

        match level.apply(&mut self.pin) {
            Ok(()) => Reaction {
                action: Some(level),
                diagnostic: Diagnostic::CommandApplied { level },
            },
            Err(e) => Reaction::log_only(Diagnostic::PinWriteFailed {
                level,
                kind: e.kind(),
            }),
        }
    }

    /// A message cut short by the receive buffer is never a valid command.
    pub fn on_truncated_message<'m>(&mut self, topic: &'m [u8], payload: &'m [u8]) -> Reaction<'m> {
        if !self.config.topic.matches(topic) {
            return Reaction::log_only(Diagnostic::ForeignTopic { topic });
        }
        Reaction::log_only(Diagnostic::UnknownCommand {
            payload,
            truncated: true,
        })
    }

    pub fn on_error(&mut self, error: SessionError) -> Reaction<'static> {
        Reaction::log_only(Diagnostic::SessionError(error))
    }

    pub fn on_unhandled_event(&mut self, id: u8) -> Reaction<'static> {
        Reaction::log_only(Diagnostic::UnhandledEvent { id })
    }
}

impl<P: OutputPin> MqttModule for CommandDispatcher<P> {
    fn on_event(&mut self, event: &SessionEvent<'_>, session: &mut dyn SessionControl) {
        self.dispatch(event, session);
    }
}
