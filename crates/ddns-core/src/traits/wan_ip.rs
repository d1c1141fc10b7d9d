// # WAN IP Source Trait
//
// Defines the interface for discovering the caller's public address.
//
// ## Implementations
//
// - OpenDNS echo service: `ddns-ip-opendns` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::{RecordType, WanIpSource};
//
// let source = /* WanIpSource implementation */;
// let address = source.wan_ip(RecordType::A).await?;
// ```

use async_trait::async_trait;
use std::net::IpAddr;

use crate::config::RecordType;

/// Trait for WAN address resolvers
///
/// A resolver is asked once per update cycle and must not cache answers
/// across calls: the address may change between cycles.
///
/// # Errors
///
/// - [`Error::QueryFailed`](crate::Error::QueryFailed): the service answered
///   with something that is not an address of the requested family
/// - [`Error::Resolve`](crate::Error::Resolve): name resolution or socket failure
#[async_trait]
pub trait WanIpSource: Send + Sync {
    /// Resolve the current public address for the family of `record_type`
    async fn wan_ip(&self, record_type: RecordType) -> Result<IpAddr, crate::Error>;

    /// Name of the source (for logging/debugging)
    fn source_name(&self) -> &'static str;
}
