//! Ergonomic error context helpers.
//!
//! Provides extension traits for adding context to `Result` types,
//! converting IO errors into context-rich `NetError` variants.

use crate::base::neterror::NetError;
use std::fmt::Display;
use std::io;

/// Extension trait for adding context to IO Results.
pub trait IoResultExt<T> {
    /// Add connection context to an IO error.
    ///
    /// # Example
    /// ```ignore
    /// use relaydns::base::context::IoResultExt;
    ///
    /// let stream = TcpStream::connect(addr).await.connection_context(addr)?;
    /// // Error: "Connection to 10.0.0.1:8080 failed: connection refused"
    /// ```
    fn connection_context(self, addr: impl Display) -> Result<T, NetError>;

    /// Add DNS resolution context to an IO error.
    fn dns_context(self, domain: &str) -> Result<T, NetError>;

    /// Mark an IO error as a failure on an established tunnel.
    fn tunnel_context(self) -> Result<T, NetError>;
}

impl<T> IoResultExt<T> for Result<T, io::Error> {
    fn connection_context(self, addr: impl Display) -> Result<T, NetError> {
        self.map_err(|e| NetError::connection_failed_to(addr, e))
    }

    fn dns_context(self, domain: &str) -> Result<T, NetError> {
        self.map_err(|e| NetError::dns_failed(domain, e))
    }

    fn tunnel_context(self) -> Result<T, NetError> {
        self.map_err(NetError::tunnel_io)
    }
}
