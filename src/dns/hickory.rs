//! Async DNS resolver using hickory-dns.
//!
//! An alternative local capability to [`GaiResolver`](super::GaiResolver):
//! fully async, reads the system DNS configuration, and keeps connection pools
//! to the name servers.

use super::{IpPreference, Name, Resolve, Resolving};
use crate::base::neterror::NetError;
use hickory_resolver::{
    config::{LookupIpStrategy, ResolverConfig},
    name_server::TokioConnectionProvider,
    TokioResolver,
};
use std::sync::Arc;

/// Async DNS resolver backed by hickory-dns.
///
/// Cloning is cheap; clones share the underlying resolver and its cache.
///
/// # Example
///
/// ```rust,ignore
/// use relaydns::dns::{HickoryResolver, IpPreference, Name, Resolve};
///
/// let resolver = HickoryResolver::new(IpPreference::V4);
/// let addr = resolver.resolve(Name::new("example.com")).await?;
/// ```
#[derive(Clone)]
pub struct HickoryResolver {
    resolver: Arc<TokioResolver>,
}

impl HickoryResolver {
    /// Creates a new `HickoryResolver`.
    ///
    /// Reads the system DNS configuration; if that fails, falls back to
    /// hickory's defaults.
    pub fn new(preference: IpPreference) -> Self {
        let mut builder = match TokioResolver::builder_tokio() {
            Ok(builder) => {
                tracing::debug!("Using system DNS configuration");
                builder
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Failed to read system DNS config, using defaults"
                );
                TokioResolver::builder_with_config(
                    ResolverConfig::default(),
                    TokioConnectionProvider::default(),
                )
            }
        };

        builder.options_mut().ip_strategy = match preference {
            IpPreference::V4 => LookupIpStrategy::Ipv4thenIpv6,
            IpPreference::V6 => LookupIpStrategy::Ipv6thenIpv4,
        };

        Self {
            resolver: Arc::new(builder.build()),
        }
    }
}

impl std::fmt::Debug for HickoryResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HickoryResolver").finish_non_exhaustive()
    }
}

impl Resolve for HickoryResolver {
    fn resolve(&self, name: Name) -> Resolving {
        let resolver = Arc::clone(&self.resolver);
        Box::pin(async move {
            let domain = name.as_str();
            tracing::debug!(domain = %domain, "resolving via hickory-dns");

            let lookup = resolver.lookup_ip(domain).await.map_err(|e| {
                tracing::debug!(domain = %domain, error = %e, "hickory-dns lookup failed");
                NetError::dns_failed(
                    domain,
                    std::io::Error::new(std::io::ErrorKind::NotFound, e.to_string()),
                )
            })?;

            let addr = lookup.iter().next().ok_or_else(|| {
                NetError::dns_failed(
                    domain,
                    std::io::Error::new(std::io::ErrorKind::NotFound, "No addresses returned"),
                )
            })?;

            tracing::debug!(domain = %domain, addr = %addr, "hickory-dns resolution complete");
            Ok(addr)
        })
    }
}
