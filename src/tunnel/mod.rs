//! Tunnel collaborator interface.
//!
//! The resolution core only needs a request/reply exchange with the relay
//! ([`Tunnel`]) and, on the relay side, somewhere to write replies (any
//! `tokio::io::AsyncWrite`). The transport behind it is not this crate's
//! concern; [`TcpTunnel`] is a plain line-based implementation.

mod tcp;

pub use tcp::TcpTunnel;

use crate::base::neterror::NetError;
use std::{future::Future, pin::Pin, sync::Arc};

/// Alias for the `Future` returned by a tunnel exchange.
pub type TunnelFuture<T> = Pin<Box<dyn Future<Output = Result<T, NetError>> + Send>>;

/// Outbound request/reply exchange with the relay.
pub trait Tunnel: Send + Sync {
    /// Send one request and return the relay's single-line reply.
    fn query(&self, request: String) -> TunnelFuture<String>;
}

impl<T: Tunnel + ?Sized> Tunnel for Arc<T> {
    fn query(&self, request: String) -> TunnelFuture<String> {
        (**self).query(request)
    }
}
