//! Base types and error handling.
//!
//! - [`NetError`](neterror::NetError): the error type shared by resolvers,
//!   caches, the routing policy and the tunnel
//! - [`context`]: helpers that attach domain/address context to IO errors

pub mod context;
pub mod neterror;
