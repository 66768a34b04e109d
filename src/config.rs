//! Resolver configuration.
//!
//! [`DnsConfig`] is built once (by hand or from JSON) and handed to the
//! constructors that need it. Nothing in the crate reads configuration from
//! global state.

use crate::base::neterror::NetError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

/// How domains are routed between the local resolver and the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProxyMode {
    /// Proxying is off; resolution never reaches the routing policy.
    Disabled,
    /// Every domain is resolved by the relay.
    Enabled,
    /// Whitelist plus geolocation re-verification.
    #[default]
    Smart,
}

impl fmt::Display for ProxyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ProxyMode::Disabled => "disabled",
            ProxyMode::Enabled => "enabled",
            ProxyMode::Smart => "smart",
        };
        f.write_str(text)
    }
}

impl FromStr for ProxyMode {
    type Err = NetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "disable" | "disabled" => Ok(ProxyMode::Disabled),
            "enable" | "enabled" => Ok(ProxyMode::Enabled),
            "smart" => Ok(ProxyMode::Smart),
            other => Err(NetError::InvalidConfig(format!("unknown proxy mode: {other}"))),
        }
    }
}

/// Address family requested by a DNS sub-protocol query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DnsType {
    /// IPv4 (`DNS`)
    #[default]
    Dns,
    /// IPv6 (`DNS6`)
    Dns6,
}

impl DnsType {
    /// Token identifying this query type on the wire.
    pub fn token(&self) -> &'static str {
        match self {
            DnsType::Dns => "DNS",
            DnsType::Dns6 => "DNS6",
        }
    }
}

pub const DEFAULT_PROTOCOL_TOKEN: &str = "ET";
pub const DEFAULT_RELAY_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 30_000;

/// Configuration for the resolution subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DnsConfig {
    /// Global routing mode.
    pub proxy_mode: ProxyMode,

    /// Address family for relay queries and local lookups.
    pub dns_type: DnsType,

    /// Domain suffixes that always go through the relay in smart mode.
    pub whitelist: Vec<String>,

    /// Static domain -> address overrides consulted before anything else.
    pub hosts: HashMap<String, IpAddr>,

    /// Locations whose addresses are used directly in smart mode.
    pub direct_locations: Vec<String>,

    /// Token prefixed to every outbound tunnel request.
    pub protocol_token: String,

    /// Relay endpoint for [`TcpTunnel`](crate::tunnel::TcpTunnel).
    pub relay_addr: Option<SocketAddr>,

    /// Bound on one relay round-trip (None = unbounded).
    pub relay_timeout_ms: Option<u64>,

    /// Bound on waiting for another caller's in-flight resolution (None = unbounded).
    pub wait_timeout_ms: Option<u64>,
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            proxy_mode: ProxyMode::default(),
            dns_type: DnsType::default(),
            whitelist: Vec::new(),
            hosts: HashMap::new(),
            direct_locations: vec!["CN".to_string(), "Private".to_string()],
            protocol_token: DEFAULT_PROTOCOL_TOKEN.to_string(),
            relay_addr: None,
            relay_timeout_ms: Some(DEFAULT_RELAY_TIMEOUT_MS),
            wait_timeout_ms: Some(DEFAULT_WAIT_TIMEOUT_MS),
        }
    }
}

impl DnsConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self, NetError> {
        serde_json::from_str(text).map_err(|e| NetError::InvalidConfig(e.to_string()))
    }

    pub fn relay_timeout(&self) -> Option<Duration> {
        self.relay_timeout_ms.map(Duration::from_millis)
    }

    pub fn wait_timeout(&self) -> Option<Duration> {
        self.wait_timeout_ms.map(Duration::from_millis)
    }
}
