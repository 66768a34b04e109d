//! Resolution through the relay at the far end of the tunnel.

use super::{Name, Resolve, Resolving};
use crate::base::neterror::NetError;
use crate::config::DnsType;
use crate::tunnel::Tunnel;
use std::net::IpAddr;
use std::sync::Arc;

/// Sends `<dns-subtype-token> <domain>` over the tunnel and expects a single
/// line holding an IP literal back.
///
/// Any other reply (error text, empty line) fails with
/// [`NetError::InvalidReply`]. There is no retry within one call.
#[derive(Clone)]
pub struct RelayResolver {
    tunnel: Arc<dyn Tunnel>,
    dns_type: DnsType,
}

impl RelayResolver {
    pub fn new(tunnel: Arc<dyn Tunnel>, dns_type: DnsType) -> Self {
        Self { tunnel, dns_type }
    }

    pub fn dns_type(&self) -> DnsType {
        self.dns_type
    }

    /// Format the sub-protocol request for `domain`.
    pub fn format_query(&self, domain: &Name) -> String {
        format!("{} {}", self.dns_type.token(), domain)
    }
}

/// Parse a relay reply. Surrounding whitespace is ignored.
pub fn parse_reply(domain: &Name, reply: &str) -> Result<IpAddr, NetError> {
    reply.trim().parse().map_err(|_| {
        tracing::warn!(domain = %domain, reply = %reply, "fail to resolve by relay");
        NetError::InvalidReply { domain: domain.to_string(), reply: reply.to_string() }
    })
}

impl Resolve for RelayResolver {
    fn resolve(&self, name: Name) -> Resolving {
        let request = self.format_query(&name);
        let tunnel = Arc::clone(&self.tunnel);
        Box::pin(async move {
            tracing::debug!(domain = %name, "resolving via relay");
            let reply = tunnel.query(request).await?;
            parse_reply(&name, &reply)
        })
    }
}

impl std::fmt::Debug for RelayResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayResolver")
            .field("dns_type", &self.dns_type)
            .finish_non_exhaustive()
    }
}
