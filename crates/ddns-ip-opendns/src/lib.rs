// # OpenDNS WAN IP Source
//
// This crate resolves the caller's public address through the OpenDNS echo
// service: asking an OpenDNS resolver for `myip.opendns.com` returns the
// address the query arrived from.
//
// ## Resolution Steps
//
// 1. Look up the resolver hostname for the requested family
//    (`resolver4.opendns.com` for A, `resolver1.ipv6-sandbox.opendns.com`
//    for AAAA) and keep an address of that family
// 2. Query it over UDP for `myip.opendns.com` with the requested type
// 3. Take the first answer and validate it as an address of that family
//
// Nothing is cached: every call performs both lookups again.

use async_trait::async_trait;
use ddns_core::{Error, RecordType, Result, WanIpSource};
use hickory_client::client::{Client, SyncClient};
use hickory_client::rr::{DNSClass, Name};
use hickory_client::udp::UdpClientConnection;

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

/// Hostname the echo service answers with the caller's address
pub const ECHO_HOSTNAME: &str = "myip.opendns.com.";

/// Resolver queried for A records
pub const IPV4_RESOLVER: &str = "resolver4.opendns.com";

/// Resolver queried for AAAA records
pub const IPV6_RESOLVER: &str = "resolver1.ipv6-sandbox.opendns.com";

/// DNS port
pub const DNS_PORT: u16 = 53;

/// Default timeout for one UDP query (5 seconds)
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// WAN IP source backed by the OpenDNS echo service
#[derive(Debug, Clone)]
pub struct OpenDnsWanIp {
    /// Resolver hostname (or literal address) for IPv4
    ipv4_resolver: String,

    /// Resolver hostname (or literal address) for IPv6
    ipv6_resolver: String,

    /// Port the resolvers listen on
    port: u16,

    /// Per-query timeout
    timeout: Duration,
}

impl OpenDnsWanIp {
    /// Create a source using the public OpenDNS resolvers
    pub fn new() -> Self {
        Self::with_resolvers(IPV4_RESOLVER, IPV6_RESOLVER)
    }

    /// Create a source using other resolvers
    pub fn with_resolvers(ipv4_resolver: impl Into<String>, ipv6_resolver: impl Into<String>) -> Self {
        Self {
            ipv4_resolver: ipv4_resolver.into(),
            ipv6_resolver: ipv6_resolver.into(),
            port: DNS_PORT,
            timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    /// Query the resolvers on `port` instead of 53
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Use a custom per-query timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolver hostname used for `record_type`
    pub fn resolver_host(&self, record_type: RecordType) -> &str {
        match record_type {
            RecordType::A => &self.ipv4_resolver,
            RecordType::Aaaa => &self.ipv6_resolver,
        }
    }

    /// Resolve the resolver hostname to an address of the right family
    async fn resolver_addr(&self, record_type: RecordType) -> Result<SocketAddr> {
        let host = self.resolver_host(record_type);
        let mut addrs = tokio::net::lookup_host((host, self.port)).await.map_err(|e| {
            tracing::error!("Trying to access the ip finder service failed: {}", e);
            Error::resolve(format!("lookup of {} failed: {}", host, e))
        })?;

        addrs
            .find(|addr| family_matches(addr.ip(), record_type))
            .ok_or_else(|| {
                tracing::error!("Ip finder service {} has no {} address", host, record_type);
                Error::resolve(format!("{} has no address usable for {} queries", host, record_type))
            })
    }
}

impl Default for OpenDnsWanIp {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WanIpSource for OpenDnsWanIp {
    async fn wan_ip(&self, record_type: RecordType) -> Result<IpAddr> {
        let resolver = self.resolver_addr(record_type).await?;
        tracing::debug!("Querying {} for {} {}", resolver, ECHO_HOSTNAME, record_type);

        // hickory's sync client blocks; keep it off the runtime thread
        let timeout = self.timeout;
        let answer = tokio::task::spawn_blocking(move || query_echo(resolver, record_type, timeout))
            .await
            .map_err(|e| Error::resolve(format!("DNS query task failed: {}", e)))??;

        let Some(answer) = answer else {
            tracing::error!("DNS error: no answer for {} from {}", ECHO_HOSTNAME, resolver);
            return Err(Error::resolve(format!(
                "no {} answer for {} from {}",
                record_type, ECHO_HOSTNAME, resolver
            )));
        };

        parse_wan_ip(&answer, record_type)
    }

    fn source_name(&self) -> &'static str {
        "opendns"
    }
}

/// Validate the echo service's answer
///
/// # Errors
///
/// [`Error::QueryFailed`] if `answer` is not an address, or is an address of
/// the other family. The offending value is logged.
pub fn parse_wan_ip(answer: &str, record_type: RecordType) -> Result<IpAddr> {
    match answer.trim().parse::<IpAddr>() {
        Ok(address) if family_matches(address, record_type) => Ok(address),
        _ => {
            tracing::error!(
                "Error while recovering the {} wan ip address: {}",
                record_type,
                answer
            );
            Err(Error::query_failed(format!(
                "invalid {} address from echo service: {}",
                record_type, answer
            )))
        }
    }
}

fn family_matches(address: IpAddr, record_type: RecordType) -> bool {
    match record_type {
        RecordType::A => address.is_ipv4(),
        RecordType::Aaaa => address.is_ipv6(),
    }
}

fn query_type(record_type: RecordType) -> hickory_client::rr::RecordType {
    match record_type {
        RecordType::A => hickory_client::rr::RecordType::A,
        RecordType::Aaaa => hickory_client::rr::RecordType::AAAA,
    }
}

/// Blocking: send one query and return the first answer's data as text
fn query_echo(
    resolver: SocketAddr,
    record_type: RecordType,
    timeout: Duration,
) -> Result<Option<String>> {
    let name = Name::from_str(ECHO_HOSTNAME)
        .map_err(|e| Error::resolve(format!("invalid echo hostname: {}", e)))?;

    let conn = UdpClientConnection::with_timeout(resolver, timeout)
        .map_err(|e| Error::resolve(format!("failed to create UDP connection: {}", e)))?;
    let client = SyncClient::new(conn);

    let response = client
        .query(&name, DNSClass::IN, query_type(record_type))
        .map_err(|e| {
            tracing::error!("DNS error: {}", e);
            Error::resolve(format!("query to {} failed: {}", resolver, e))
        })?;

    Ok(response
        .answers()
        .first()
        .and_then(|record| record.data())
        .map(|data| data.to_string()))
}
