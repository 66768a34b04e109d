//! Core DNS resolution types and traits.
//!
//! `Resolve` is the capability every resolver in this crate implements: the
//! system resolvers, the relay resolver, and any test double.

use crate::base::neterror::NetError;
use crate::config::DnsType;
use std::{fmt, future::Future, net::IpAddr, pin::Pin, sync::Arc};

/// A domain name to resolve.
///
/// Compared byte-for-byte: no case folding and no trailing-dot handling.
#[derive(Clone, Hash, Eq, PartialEq)]
pub struct Name {
    host: Box<str>,
}

impl Name {
    /// Creates a new [`Name`] from any string-like type.
    #[inline]
    pub fn new(host: impl Into<Box<str>>) -> Self {
        Self { host: host.into() }
    }

    /// View the domain as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.host
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Name::new(value)
    }
}

impl From<String> for Name {
    fn from(value: String) -> Self {
        Name::new(value)
    }
}

impl From<&Name> for Name {
    fn from(value: &Name) -> Self {
        value.clone()
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.host, f)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.host, f)
    }
}

/// Alias for the `Future` type returned by a resolver.
pub type Resolving = Pin<Box<dyn Future<Output = Result<IpAddr, NetError>> + Send>>;

/// Trait for DNS resolution.
///
/// Implementations must be thread-safe; many requests resolve concurrently
/// through one shared instance.
pub trait Resolve: Send + Sync {
    /// Resolves a domain name to a single address.
    fn resolve(&self, name: Name) -> Resolving;
}

/// Blanket implementation for Arc-wrapped resolvers.
impl<R: Resolve + ?Sized> Resolve for Arc<R> {
    fn resolve(&self, name: Name) -> Resolving {
        (**self).resolve(name)
    }
}

/// Which address family a system resolver should return when a name has
/// both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IpPreference {
    #[default]
    V4,
    V6,
}

impl IpPreference {
    /// Pick the first address of the preferred family, falling back to the
    /// first address of any family.
    pub fn pick(self, addrs: impl IntoIterator<Item = IpAddr>) -> Option<IpAddr> {
        let mut fallback = None;
        for addr in addrs {
            let preferred = match self {
                IpPreference::V4 => addr.is_ipv4(),
                IpPreference::V6 => addr.is_ipv6(),
            };
            if preferred {
                return Some(addr);
            }
            fallback.get_or_insert(addr);
        }
        fallback
    }
}

impl From<DnsType> for IpPreference {
    fn from(value: DnsType) -> Self {
        match value {
            DnsType::Dns => IpPreference::V4,
            DnsType::Dns6 => IpPreference::V6,
        }
    }
}
