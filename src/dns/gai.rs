//! System DNS resolver using getaddrinfo.
//!
//! This resolver uses the operating system's native DNS resolution via
//! `getaddrinfo`, executed in a thread pool to avoid blocking the async runtime.
//! It is the default local capability behind [`LocalResolver`](super::LocalResolver).

use super::{IpPreference, Name, Resolve, Resolving};
use crate::base::context::IoResultExt;
use crate::base::neterror::NetError;
use std::{
    io,
    net::{IpAddr, ToSocketAddrs},
};

/// System DNS resolver using `getaddrinfo` in a thread pool.
///
/// Each resolution spawns a blocking task. For high-throughput scenarios,
/// consider using `HickoryResolver` which is fully async.
#[derive(Clone, Debug, Default)]
pub struct GaiResolver {
    preference: IpPreference,
}

impl GaiResolver {
    /// Creates a new `GaiResolver` preferring IPv4 answers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a `GaiResolver` with an explicit address-family preference.
    pub fn with_preference(preference: IpPreference) -> Self {
        Self { preference }
    }
}

/// Parse a literal address, skipping the lookup entirely.
fn parse_literal(host: &str) -> Option<IpAddr> {
    host.parse().ok()
}

impl Resolve for GaiResolver {
    fn resolve(&self, name: Name) -> Resolving {
        let preference = self.preference;
        Box::pin(async move {
            if let Some(addr) = parse_literal(name.as_str()) {
                return Ok(addr);
            }

            let host = name.as_str().to_string();
            let domain = host.clone();

            let result = tokio::task::spawn_blocking(move || {
                tracing::debug!(host = %host, "resolving via getaddrinfo");
                (host.as_str(), 0u16)
                    .to_socket_addrs()
                    .map(|iter| iter.map(|sa| sa.ip()).collect::<Vec<_>>())
            })
            .await;

            // Handle task join error (cancellation, panic)
            let addrs = result
                .map_err(|e| {
                    tracing::error!(error = %e, "DNS resolution task failed");
                    NetError::NameNotResolved
                })?
                .dns_context(&domain)?;

            let addr = preference.pick(addrs).ok_or_else(|| {
                NetError::dns_failed(
                    &domain,
                    io::Error::new(io::ErrorKind::NotFound, "No addresses returned by getaddrinfo"),
                )
            })?;

            tracing::debug!(domain = %domain, addr = %addr, "DNS resolution complete");
            Ok(addr)
        })
    }
}
