use core::fmt;

use embassy_net::{IpAddress, Ipv4Address, Stack, dns};
use embassy_time::{Duration, Timer};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Wait for the network link to become active
pub async fn wait_for_link(stack: Stack<'_>) {
    while !stack.is_link_up() {
        Timer::after(POLL_INTERVAL).await;
    }
}

/// Wait for the network stack to obtain an IPv4 address via DHCP
/// Returns the obtained IPv4 configuration
pub async fn wait_for_ip(stack: Stack<'_>) -> embassy_net::StaticConfigV4 {
    loop {
        if let Some(config) = stack.config_v4() {
            return config;
        }
        Timer::after(POLL_INTERVAL).await;
    }
}

/// Wait for full network connectivity (link + IP address)
pub async fn wait_for_connection(stack: Stack<'_>) -> embassy_net::StaticConfigV4 {
    wait_for_link(stack).await;
    wait_for_ip(stack).await
}

/// Host name resolution failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveError {
    Dns(dns::Error),
    /// The query succeeded but returned no A record
    NoAddress,
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::Dns(e) => write!(f, "DNS query failed: {:?}", e),
            ResolveError::NoAddress => write!(f, "no IPv4 address found"),
        }
    }
}

impl From<dns::Error> for ResolveError {
    fn from(e: dns::Error) -> Self {
        ResolveError::Dns(e)
    }
}

/// Resolves a hostname to an IP address. IPv4 literals skip the DNS query.
pub async fn resolve_host(stack: Stack<'_>, host: &str) -> Result<IpAddress, ResolveError> {
    if let Ok(ip) = host.parse::<Ipv4Address>() {
        return Ok(IpAddress::Ipv4(ip));
    }

    let addresses = stack.dns_query(host, dns::DnsQueryType::A).await?;
    addresses.first().copied().ok_or(ResolveError::NoAddress)
}
