use super::{Tunnel, TunnelFuture};
use crate::base::context::IoResultExt;
use crate::base::neterror::NetError;
use crate::config::{DnsConfig, DEFAULT_PROTOCOL_TOKEN};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

/// Line-based tunnel over a fresh TCP connection per query.
///
/// Writes `<protocol-token> <request>\n` and reads one reply line (up to a
/// newline or EOF). The whole exchange, connect included, is bounded by the
/// timeout when one is set.
#[derive(Debug, Clone)]
pub struct TcpTunnel {
    relay_addr: SocketAddr,
    protocol_token: String,
    timeout: Option<Duration>,
}

impl TcpTunnel {
    pub fn new(relay_addr: SocketAddr) -> Self {
        Self {
            relay_addr,
            protocol_token: DEFAULT_PROTOCOL_TOKEN.to_string(),
            timeout: None,
        }
    }

    /// Build from configuration. `relay_addr` must be set.
    pub fn from_config(config: &DnsConfig) -> Result<Self, NetError> {
        let relay_addr = config
            .relay_addr
            .ok_or_else(|| NetError::InvalidConfig("relay_addr is not set".to_string()))?;
        Ok(Self {
            relay_addr,
            protocol_token: config.protocol_token.clone(),
            timeout: config.relay_timeout(),
        })
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_protocol_token(mut self, token: impl Into<String>) -> Self {
        self.protocol_token = token.into();
        self
    }

    pub fn relay_addr(&self) -> SocketAddr {
        self.relay_addr
    }
}

async fn exchange(addr: SocketAddr, line: String) -> Result<String, NetError> {
    let mut stream = TcpStream::connect(addr).await.connection_context(addr)?;
    stream.write_all(line.as_bytes()).await.tunnel_context()?;
    stream.flush().await.tunnel_context()?;

    let mut reader = BufReader::new(stream);
    let mut reply = String::new();
    reader.read_line(&mut reply).await.tunnel_context()?;

    Ok(reply.trim_end_matches(['\r', '\n']).to_string())
}

impl Tunnel for TcpTunnel {
    fn query(&self, request: String) -> TunnelFuture<String> {
        let addr = self.relay_addr;
        let line = format!("{} {}\n", self.protocol_token, request);
        let timeout = self.timeout;

        Box::pin(async move {
            tracing::debug!(relay = %addr, request = %line.trim_end(), "sending tunnel request");
            match timeout {
                Some(limit) => tokio::time::timeout(limit, exchange(addr, line))
                    .await
                    .map_err(|_| {
                        tracing::warn!(relay = %addr, "tunnel request timed out");
                        NetError::ConnectionTimedOut
                    })?,
                None => exchange(addr, line).await,
            }
        })
    }
}
