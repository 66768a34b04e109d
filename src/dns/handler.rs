//! Relay-side handling of inbound DNS requests.
//!
//! A node answering requests from a connected client resolves them with its
//! local resolver only. Forwarding them to its own relay could loop across
//! chained relays.

use super::cache::ResolutionCache;
use super::{LocalResolver, Name, Resolve, RoutingPolicy};
use crate::base::context::IoResultExt;
use crate::base::neterror::NetError;
use crate::config::DnsType;
use futures::future::BoxFuture;
use std::net::IpAddr;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Alias for the `Future` returned by a sub-protocol handler.
pub type Handling<'a> = BoxFuture<'a, Result<(), NetError>>;

/// Inbound side of a tunnel: where replies to a connected client go.
pub type Inbound = dyn AsyncWrite + Unpin + Send;

/// A sub-protocol command handler, as registered with the request dispatcher.
pub trait SubProtocol: Send + Sync {
    /// Handle one request line (sub-protocol token first) and reply on `inbound`.
    fn handle<'a>(&'a self, request: &'a str, inbound: &'a mut Inbound) -> Handling<'a>;

    /// Token the dispatcher routes on.
    fn kind(&self) -> &'static str;

    /// Human-readable name for logs.
    fn name(&self) -> &'static str;
}

/// Answers `<dns-subtype-token> <domain>` requests with the locally resolved
/// address, one line of text.
#[derive(Debug, Clone)]
pub struct DnsHandler {
    dns_type: DnsType,
    local: LocalResolver,
    cache: ResolutionCache,
}

impl DnsHandler {
    pub fn new(dns_type: DnsType, local: LocalResolver, cache: ResolutionCache) -> Self {
        Self { dns_type, local, cache }
    }

    /// Share the local resolver and local-scope cache of `policy`.
    pub fn from_policy(dns_type: DnsType, policy: &RoutingPolicy) -> Self {
        Self::new(dns_type, policy.local_resolver().clone(), policy.local_cache().clone())
    }

    /// Parse the request and resolve its domain locally.
    pub async fn resolve_request(&self, request: &str) -> Result<IpAddr, NetError> {
        let tokens: Vec<&str> = request.split(' ').collect();
        if tokens.len() < 2 {
            tracing::warn!(request = %request, "dns request is too short");
            return Err(NetError::MalformedRequest(request.to_string()));
        }

        let domain = Name::new(tokens[1]);
        self.cache
            .resolve_with(&domain, || self.local.resolve(domain.clone()))
            .await
    }
}

impl SubProtocol for DnsHandler {
    fn handle<'a>(&'a self, request: &'a str, inbound: &'a mut Inbound) -> Handling<'a> {
        Box::pin(async move {
            let addr = self.resolve_request(request).await?;
            tracing::debug!(request = %request, addr = %addr, "answering dns request");
            inbound.write_all(format!("{addr}\n").as_bytes()).await.tunnel_context()?;
            inbound.flush().await.tunnel_context()
        })
    }

    fn kind(&self) -> &'static str {
        self.dns_type.token()
    }

    fn name(&self) -> &'static str {
        match self.dns_type {
            DnsType::Dns => "ET-DNS",
            DnsType::Dns6 => "ET-DNS6",
        }
    }
}
