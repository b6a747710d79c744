//! Broker address parsing
//!
//! Accepts `mqtt://host[:port]`, `tcp://host[:port]` and plain `host[:port]`.
//! Secure and websocket schemes are rejected, as are credentials and paths.

use core::fmt;

/// Port used when the URL does not name one
pub const DEFAULT_MQTT_PORT: u16 = 1883;

const PLAIN_SCHEMES: [&str; 2] = ["mqtt", "tcp"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrokerUrlError {
    /// Anything but `mqtt://` or `tcp://`
    UnsupportedScheme,
    /// `user:password@` is not supported
    Credentials,
    EmptyHost,
    InvalidPort,
    UnexpectedPath,
}

impl fmt::Display for BrokerUrlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrokerUrlError::UnsupportedScheme => write!(f, "unsupported scheme"),
            BrokerUrlError::Credentials => write!(f, "credentials are not supported"),
            BrokerUrlError::EmptyHost => write!(f, "missing host"),
            BrokerUrlError::InvalidPort => write!(f, "invalid port"),
            BrokerUrlError::UnexpectedPath => write!(f, "unexpected path"),
        }
    }
}

/// Host and port of a plain TCP MQTT broker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrokerUrl<'a> {
    pub host: &'a str,
    pub port: u16,
}

impl<'a> BrokerUrl<'a> {
    pub fn parse(url: &'a str) -> Result<Self, BrokerUrlError> {
        let url = url.trim();
        let rest = match url.split_once("://") {
            Some((scheme, rest)) => {
                if !PLAIN_SCHEMES
                    .iter()
                    .any(|plain| scheme.eq_ignore_ascii_case(plain))
                {
                    return Err(BrokerUrlError::UnsupportedScheme);
                }
                rest
            }
            None => url,
        };

        let authority = match rest.split_once('/') {
            Some((authority, "")) => authority,
            Some(_) => return Err(BrokerUrlError::UnexpectedPath),
            None => rest,
        };
        if authority.contains('@') {
            return Err(BrokerUrlError::Credentials);
        }

        let (host, port) = match authority.rsplit_once(':') {
            Some((host, port)) => (host, parse_port(port)?),
            None => (authority, DEFAULT_MQTT_PORT),
        };
        if host.is_empty() {
            return Err(BrokerUrlError::EmptyHost);
        }

        Ok(Self { host, port })
    }
}

fn parse_port(port: &str) -> Result<u16, BrokerUrlError> {
    match port.parse::<u16>() {
        Ok(0) | Err(_) => Err(BrokerUrlError::InvalidPort),
        Ok(port) => Ok(port),
    }
}

impl fmt::Display for BrokerUrl<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mqtt://{}:{}", self.host, self.port)
    }
}
