//! Routing policy: local resolver or relay, per domain.
//!
//! Order of evaluation for every request:
//!
//! 1. [`HostsOverride`] hit: returned as-is, no cache, no policy.
//! 2. [`ProxyMode::Enabled`]: relay, through the relay-scope cache.
//! 3. [`ProxyMode::Smart`]:
//!    - whitelisted domain: relay, through the relay-scope cache;
//!    - otherwise local, through the local-scope cache. A local failure is
//!      returned directly (no relay fallback). On success the address is
//!      classified; when the decider asks for the relay, a second, independent
//!      relay resolution replaces the local address, and its failure is the
//!      request's failure.
//! 4. Any other mode is a configuration error for this request.

use super::cache::{CacheScope, ResolutionCache};
use super::location::{locate_or_unknown, DirectLocations, Locate, Location, ProxyDecider};
use super::{HostsOverride, LocalResolver, Name, Resolve, Whitelist};
use crate::base::neterror::NetError;
use crate::config::{DnsConfig, ProxyMode};
use std::net::IpAddr;
use std::sync::Arc;

/// Where a resolution's final address came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    Hosts,
    Local,
    Relay,
}

/// Outcome of one resolution request. Owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub domain: Name,
    pub address: IpAddr,
    /// Classification of the locally resolved address, when one was made.
    pub location: Option<Location>,
    pub source: ResolutionSource,
}

impl Resolution {
    fn new(domain: Name, address: IpAddr, source: ResolutionSource) -> Self {
        Self { domain, address, location: None, source }
    }
}

/// Chooses between local and relay resolution for each domain.
pub struct RoutingPolicy {
    mode: ProxyMode,
    hosts: HostsOverride,
    whitelist: Whitelist,
    local: LocalResolver,
    relay: Arc<dyn Resolve>,
    local_cache: ResolutionCache,
    relay_cache: ResolutionCache,
    locator: Arc<dyn Locate>,
    decider: Arc<dyn ProxyDecider>,
}

impl RoutingPolicy {
    /// Build a policy from configuration.
    ///
    /// `local` is the system-level capability (wrapped in a [`LocalResolver`]),
    /// `relay` resolves through the tunnel (normally a
    /// [`RelayResolver`](super::RelayResolver)). The decider defaults to
    /// [`DirectLocations`] over `config.direct_locations`.
    pub fn new(
        config: &DnsConfig,
        local: Arc<dyn Resolve>,
        relay: Arc<dyn Resolve>,
        locator: Arc<dyn Locate>,
    ) -> Self {
        let wait_timeout = config.wait_timeout();
        Self {
            mode: config.proxy_mode,
            hosts: HostsOverride::new(config.hosts.iter().map(|(k, v)| (k.as_str(), *v))),
            whitelist: Whitelist::new(config.whitelist.iter().cloned()),
            local: LocalResolver::new(local),
            relay,
            local_cache: ResolutionCache::new(CacheScope::Local).with_wait_timeout(wait_timeout),
            relay_cache: ResolutionCache::new(CacheScope::Relay).with_wait_timeout(wait_timeout),
            locator,
            decider: Arc::new(DirectLocations::new(config.direct_locations.iter().cloned())),
        }
    }

    /// Replace the proxy decision predicate.
    pub fn with_decider(mut self, decider: Arc<dyn ProxyDecider>) -> Self {
        self.decider = decider;
        self
    }

    /// Replace the hosts overrides from the configuration.
    pub fn with_hosts(mut self, hosts: HostsOverride) -> Self {
        self.hosts = hosts;
        self
    }

    /// Replace the whitelist from the configuration.
    pub fn with_whitelist(mut self, whitelist: Whitelist) -> Self {
        self.whitelist = whitelist;
        self
    }

    pub fn mode(&self) -> ProxyMode {
        self.mode
    }

    pub fn local_cache(&self) -> &ResolutionCache {
        &self.local_cache
    }

    pub fn relay_cache(&self) -> &ResolutionCache {
        &self.relay_cache
    }

    pub fn local_resolver(&self) -> &LocalResolver {
        &self.local
    }

    /// Resolve `domain` according to the policy.
    pub async fn resolve(&self, domain: impl Into<Name>) -> Result<Resolution, NetError> {
        let domain = domain.into();

        if let Some(addr) = self.hosts.get(&domain) {
            tracing::debug!(domain = %domain, addr = %addr, "hosts override");
            return Ok(Resolution::new(domain, addr, ResolutionSource::Hosts));
        }

        match self.mode {
            ProxyMode::Enabled => self.resolve_by_relay(domain).await,
            ProxyMode::Smart => self.resolve_smart(domain).await,
            mode => {
                tracing::error!(domain = %domain, mode = %mode, "dns resolution with invalid proxy mode");
                Err(NetError::InvalidProxyMode(mode))
            }
        }
    }

    async fn resolve_smart(&self, domain: Name) -> Result<Resolution, NetError> {
        if self.whitelist.matches(domain.as_str()) {
            tracing::debug!(domain = %domain, "whitelisted, resolving via relay");
            return self.resolve_by_relay(domain).await;
        }

        let mut resolution = self.resolve_by_local(domain).await?;

        let location =
            locate_or_unknown(self.locator.as_ref(), &resolution.domain, resolution.address).await;
        let proxy = self.decider.should_proxy(&location);
        resolution.location = Some(location);

        if !proxy {
            return Ok(resolution);
        }

        tracing::debug!(
            domain = %resolution.domain,
            local = %resolution.address,
            location = ?resolution.location,
            "location requires relay, re-resolving"
        );
        let relayed = self.resolve_by_relay(resolution.domain.clone()).await?;
        resolution.address = relayed.address;
        resolution.source = ResolutionSource::Relay;
        Ok(resolution)
    }

    /// Resolve through the relay-scope cache.
    pub async fn resolve_by_relay(&self, domain: Name) -> Result<Resolution, NetError> {
        let address = self
            .relay_cache
            .resolve_with(&domain, || self.relay.resolve(domain.clone()))
            .await?;
        Ok(Resolution::new(domain, address, ResolutionSource::Relay))
    }

    /// Resolve through the local-scope cache.
    pub async fn resolve_by_local(&self, domain: Name) -> Result<Resolution, NetError> {
        let address = self
            .local_cache
            .resolve_with(&domain, || self.local.resolve(domain.clone()))
            .await?;
        Ok(Resolution::new(domain, address, ResolutionSource::Local))
    }
}

impl std::fmt::Debug for RoutingPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoutingPolicy")
            .field("mode", &self.mode)
            .field("hosts", &self.hosts.len())
            .field("whitelist", &self.whitelist.len())
            .field("local_cache", &self.local_cache)
            .field("relay_cache", &self.relay_cache)
            .finish_non_exhaustive()
    }
}
