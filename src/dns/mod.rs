//! DNS Resolution Module
//!
//! Decides, per domain, between the local system resolver and the relay at
//! the far end of the tunnel:
//!
//! - [`LocalResolver`]: wraps an injected system-level capability
//!   ([`GaiResolver`] or [`HickoryResolver`] by default)
//! - [`RelayResolver`]: `DNS <domain>` over a [`Tunnel`](crate::tunnel::Tunnel)
//! - [`ResolutionCache`]: single-flight cache, one per resolver
//! - [`RoutingPolicy`]: hosts override, proxy mode, whitelist and geolocation
//!   re-verification
//! - [`DnsHandler`]: relay-side answering of inbound requests
//!
//! # Example
//!
//! ```rust,ignore
//! use relaydns::config::DnsConfig;
//! use relaydns::dns::{GaiResolver, RelayResolver, RoutingPolicy};
//! use relaydns::tunnel::TcpTunnel;
//! use std::sync::Arc;
//!
//! let config = DnsConfig::from_json(&std::fs::read_to_string("dns.json")?)?;
//! let tunnel = Arc::new(TcpTunnel::from_config(&config)?);
//! let policy = RoutingPolicy::new(
//!     &config,
//!     Arc::new(GaiResolver::new()),
//!     Arc::new(RelayResolver::new(tunnel, config.dns_type)),
//!     Arc::new(my_geoip),
//! );
//! let resolution = policy.resolve("example.com").await?;
//! println!("{} -> {}", resolution.domain, resolution.address);
//! ```

pub mod cache;
mod gai;
mod handler;
mod hickory;
mod hosts;
mod local;
pub mod location;
mod policy;
mod relay;
mod resolve;
mod whitelist;

pub use cache::{CacheScope, ResolutionCache};
pub use gai::GaiResolver;
pub use handler::{DnsHandler, Handling, Inbound, SubProtocol};
pub use hickory::HickoryResolver;
pub use hosts::HostsOverride;
pub use local::LocalResolver;
pub use location::{DirectLocations, Locate, Locating, Location, ProxyDecider};
pub use policy::{Resolution, ResolutionSource, RoutingPolicy};
pub use relay::{parse_reply, RelayResolver};
pub use resolve::{IpPreference, Name, Resolve, Resolving};
pub use whitelist::Whitelist;
