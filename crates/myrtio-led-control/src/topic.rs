use core::fmt;

/// Topic the LED listens on unless configured otherwise
pub const DEFAULT_LED_TOPIC: &str = "/ifpe/ads/embarcados/esp32/led";

/// The single topic a dispatcher reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Topic(&'static str);

impl Topic {
    pub const fn new(topic: &'static str) -> Self {
        Self(topic)
    }

    pub const fn as_str(&self) -> &'static str {
        self.0
    }

    /// Exact comparison against a topic as delivered on the wire.
    ///
    /// Lengths must match, so neither a prefix nor an extension of the topic
    /// is accepted.
    pub fn matches(&self, delivered: &[u8]) -> bool {
        self.0.as_bytes() == delivered
    }
}

impl Default for Topic {
    fn default() -> Self {
        Self(DEFAULT_LED_TOPIC)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}
