use crate::config::ProxyMode;
use std::io;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum NetError {
    // Request Errors
    #[error("Malformed request: {0:?}")]
    MalformedRequest(String),
    #[error("Invalid proxy mode: {0}")]
    InvalidProxyMode(ProxyMode),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Resolution Errors
    #[error("Name not resolved")]
    NameNotResolved,
    #[error("Name not resolved: {domain}: {source}")]
    NameNotResolvedFor {
        domain: String,
        #[source]
        source: Arc<io::Error>,
    },
    #[error("Invalid reply for {domain}: {reply:?}")]
    InvalidReply { domain: String, reply: String },
    #[error("Resolution of {domain} timed out")]
    ResolveTimedOut { domain: String },
    #[error("Resolution of {domain} was abandoned")]
    ResolveAbandoned { domain: String },

    // Tunnel Errors
    #[error("Connection to {addr} failed: {source}")]
    ConnectionFailedTo {
        addr: String,
        #[source]
        source: Arc<io::Error>,
    },
    #[error("Tunnel I/O error: {source}")]
    TunnelIo {
        #[source]
        source: Arc<io::Error>,
    },
    #[error("Connection timed out")]
    ConnectionTimedOut,
}

impl NetError {
    pub fn dns_failed(domain: &str, error: io::Error) -> Self {
        NetError::NameNotResolvedFor { domain: domain.to_string(), source: Arc::new(error) }
    }

    pub fn connection_failed_to(addr: impl ToString, error: io::Error) -> Self {
        NetError::ConnectionFailedTo { addr: addr.to_string(), source: Arc::new(error) }
    }

    pub fn tunnel_io(error: io::Error) -> Self {
        NetError::TunnelIo { source: Arc::new(error) }
    }

    /// Numeric code for the error. Chromium's `net_error_list.h` values are
    /// reused where a matching error exists; the rest start at -900.
    pub fn as_i32(&self) -> i32 {
        match self {
            NetError::ConnectionFailedTo { .. } => -104,
            NetError::NameNotResolved => -105,
            NetError::NameNotResolvedFor { .. } => -105,
            NetError::TunnelIo { .. } => -111,
            NetError::ConnectionTimedOut => -118,
            NetError::InvalidReply { .. } => -320,
            NetError::MalformedRequest(_) => -900,
            NetError::InvalidProxyMode(_) => -901,
            NetError::InvalidConfig(_) => -902,
            NetError::ResolveTimedOut { .. } => -903,
            NetError::ResolveAbandoned { .. } => -904,
        }
    }
}
