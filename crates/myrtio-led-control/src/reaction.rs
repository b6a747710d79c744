use core::fmt;

use embedded_hal::digital::ErrorKind;
use log::Level;
use myrtio_mqtt::runtime::SessionError;

use crate::command::PinLevel;
use crate::topic::Topic;

/// Outcome of handling one session event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reaction<'m> {
    /// Level the pin was actually driven to, if any
    pub action: Option<PinLevel>,
    pub diagnostic: Diagnostic<'m>,
}

impl<'m> Reaction<'m> {
    pub(crate) fn log_only(diagnostic: Diagnostic<'m>) -> Self {
        Self {
            action: None,
            diagnostic,
        }
    }
}

/// Human-readable record of what the dispatcher did and why.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diagnostic<'m> {
    SubscriptionRequested { topic: Topic, packet_id: u16 },
    /// The session could not take the SUBSCRIBE
    SubscriptionNotQueued { topic: Topic },
    Disconnected,
    Subscribed { packet_id: u16 },
    CommandApplied { level: PinLevel },
    /// `truncated` payloads did not fit the receive buffer; only their head is kept
    UnknownCommand { payload: &'m [u8], truncated: bool },
    /// Message for some other topic; ignored
    ForeignTopic { topic: &'m [u8] },
    PinWriteFailed { level: PinLevel, kind: ErrorKind },
    SessionError(SessionError),
    UnhandledEvent { id: u8 },
}

impl Diagnostic<'_> {
    pub fn level(&self) -> Level {
        match self {
            Diagnostic::UnknownCommand { .. } => Level::Warn,
            Diagnostic::SubscriptionNotQueued { .. }
            | Diagnostic::PinWriteFailed { .. }
            | Diagnostic::SessionError(_) => Level::Error,
            Diagnostic::ForeignTopic { .. } => Level::Trace,
            Diagnostic::SubscriptionRequested { .. }
            | Diagnostic::Disconnected
            | Diagnostic::Subscribed { .. }
            | Diagnostic::CommandApplied { .. }
            | Diagnostic::UnhandledEvent { .. } => Level::Info,
        }
    }

    /// Writes the record to the global logger
    pub fn emit(&self) {
        log::log!(self.level(), "{}", self);
    }
}

impl fmt::Display for Diagnostic<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::SubscriptionRequested { topic, packet_id } => {
                write!(f, "subscribing to {}, msg_id={}", topic, packet_id)
            }
            Diagnostic::SubscriptionNotQueued { topic } => {
                write!(f, "could not subscribe to {}", topic)
            }
            Diagnostic::Disconnected => write!(f, "disconnected from broker"),
            Diagnostic::Subscribed { packet_id } => {
                write!(f, "subscribed, msg_id={}, ready for commands", packet_id)
            }
            Diagnostic::CommandApplied { level } => write!(f, "LED {}", level),
            Diagnostic::UnknownCommand {
                payload,
                truncated: false,
            } => write!(f, "unknown command \"{}\"", Escaped(payload)),
            Diagnostic::UnknownCommand {
                payload,
                truncated: true,
            } => {
                let head = &payload[..payload.len().min(TRUNCATED_HEAD)];
                write!(f, "unknown command \"{}...\" (truncated)", Escaped(head))
            }
            Diagnostic::ForeignTopic { topic } => {
                write!(f, "ignoring message on {}", Escaped(topic))
            }
            Diagnostic::PinWriteFailed { level, kind } => {
                write!(f, "failed to switch LED {}: {:?}", level, kind)
            }
            Diagnostic::SessionError(error) => write!(f, "session error: {}", error),
            Diagnostic::UnhandledEvent { id } => write!(f, "other event, id={}", id),
        }
    }
}

/// Bytes of a truncated payload worth printing
const TRUNCATED_HEAD: usize = 16;

/// Prints wire bytes as text, escaping anything that is not valid UTF-8.
pub(crate) struct Escaped<'a>(pub(crate) &'a [u8]);

impl fmt::Display for Escaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in self.0.utf8_chunks() {
            f.write_str(chunk.valid())?;
            for byte in chunk.invalid() {
                write!(f, "\\x{:02X}", byte)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::string::ToString;

    use super::*;

    #[test]
    fn unknown_command_is_the_only_warning() {
        let unknown = Diagnostic::UnknownCommand {
            payload: b"9",
            truncated: false,
        };
        assert_eq!(unknown.level(), Level::Warn);
        assert_eq!(Diagnostic::ForeignTopic { topic: b"/x" }.level(), Level::Trace);
        assert_eq!(Diagnostic::Disconnected.level(), Level::Info);
    }

    #[test]
    fn payloads_are_printed_without_trusting_the_bytes() {
        let diagnostic = Diagnostic::UnknownCommand {
            payload: b"o\xFFn",
            truncated: false,
        };
        assert_eq!(diagnostic.to_string(), "unknown command \"o\\xFFn\"");
    }

    #[test]
    fn truncated_payloads_print_only_their_head() {
        let diagnostic = Diagnostic::UnknownCommand {
            payload: &[b'1'; 40],
            truncated: true,
        };
        assert_eq!(
            diagnostic.to_string(),
            "unknown command \"1111111111111111...\" (truncated)"
        );
    }
}
