//! # relaydns
//!
//! Domain-name resolution for a tunnel/proxy client.
//!
//! Each requested domain is resolved either by the local system resolver or
//! by a trusted relay reached through the tunnel. Concurrent lookups of the
//! same domain share one in-flight resolution, and a whitelist + geolocation
//! policy can replace a locally resolved address with the relay's answer.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use relaydns::config::{DnsConfig, ProxyMode};
//! use relaydns::dns::{GaiResolver, RelayResolver, RoutingPolicy};
//! use relaydns::tunnel::TcpTunnel;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), relaydns::base::neterror::NetError> {
//!     let config = DnsConfig {
//!         proxy_mode: ProxyMode::Smart,
//!         whitelist: vec!["google.com".into()],
//!         relay_addr: Some("10.0.0.1:8080".parse().unwrap()),
//!         ..DnsConfig::default()
//!     };
//!     let tunnel = Arc::new(TcpTunnel::from_config(&config)?);
//!     let policy = RoutingPolicy::new(
//!         &config,
//!         Arc::new(GaiResolver::new()),
//!         Arc::new(RelayResolver::new(tunnel, config.dns_type)),
//!         Arc::new(MyGeoIp::load()?),
//!     );
//!     let resolution = policy.resolve("www.google.com").await?;
//!     println!("{:?}", resolution);
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Error type and IO error context helpers
//! - [`config`] - Proxy mode, DNS type and resolver configuration
//! - [`dns`] - Resolvers, single-flight caches, routing policy, inbound handler
//! - [`tunnel`] - Tunnel interface and a line-based TCP implementation

pub mod base;
pub mod config;
pub mod dns;
pub mod tunnel;
