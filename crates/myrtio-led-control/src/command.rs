use core::fmt;

use embedded_hal::digital::OutputPin;

/// Level of the controlled output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinLevel {
    On,
    Off,
}

impl PinLevel {
    /// Drives `pin` to this level (`On` is high).
    pub fn apply<P: OutputPin>(self, pin: &mut P) -> Result<(), P::Error> {
        match self {
            PinLevel::On => pin.set_high(),
            PinLevel::Off => pin.set_low(),
        }
    }
}

impl fmt::Display for PinLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinLevel::On => f.write_str("on"),
            PinLevel::Off => f.write_str("off"),
        }
    }
}

/// A decoded message payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    TurnOn,
    TurnOff,
    /// Anything other than exactly `"1"` or `"0"`, empty payloads included
    Unrecognized(&'a [u8]),
}

impl<'a> Command<'a> {
    pub fn decode(payload: &'a [u8]) -> Self {
        match payload {
            b"1" => Command::TurnOn,
            b"0" => Command::TurnOff,
            other => Command::Unrecognized(other),
        }
    }

    /// The output level this command asks for
    pub fn level(&self) -> Option<PinLevel> {
        match self {
            Command::TurnOn => Some(PinLevel::On),
            Command::TurnOff => Some(PinLevel::Off),
            Command::Unrecognized(_) => None,
        }
    }
}
