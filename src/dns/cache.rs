//! Single-flight resolution cache.
//!
//! Each domain maps to a [`CacheNode`]. The first caller to miss becomes the
//! owner of a [`PendingSlot`] and performs the resolution; everyone else who
//! arrives while it is in flight waits on the node and receives the same
//! outcome. Successful results stay cached for the life of the cache; failures
//! are evicted so the next request retries from scratch.
//!
//! Every node settles: `PendingSlot` fails itself with
//! [`NetError::ResolveAbandoned`] when dropped unsettled, so waiters are
//! released on error paths, panics, and cancelled owner futures alike.

use super::Name;
use crate::base::neterror::NetError;
use dashmap::{mapref::entry::Entry, DashMap};
use std::fmt;
use std::future::Future;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Which resolver a cache instance belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheScope {
    Local,
    Relay,
}

impl fmt::Display for CacheScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheScope::Local => f.write_str("local"),
            CacheScope::Relay => f.write_str("relay"),
        }
    }
}

/// State of a cache node. Moves out of `Pending` exactly once.
#[derive(Debug, Clone)]
pub enum NodeState {
    Pending,
    Resolved(IpAddr),
    Failed(NetError),
}

impl NodeState {
    pub fn is_pending(&self) -> bool {
        matches!(self, NodeState::Pending)
    }
}

/// Per-domain synchronization slot shared by the owner and all waiters.
pub struct CacheNode {
    domain: Name,
    state: watch::Receiver<NodeState>,
}

impl CacheNode {
    pub fn domain(&self) -> &Name {
        &self.domain
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> NodeState {
        self.state.borrow().clone()
    }

    /// The address, if the node has resolved.
    pub fn resolved(&self) -> Option<IpAddr> {
        match *self.state.borrow() {
            NodeState::Resolved(addr) => Some(addr),
            _ => None,
        }
    }

    /// Wait until the node resolves or fails.
    ///
    /// With a timeout, only this waiter gives up; the in-flight resolution
    /// and the other waiters are unaffected.
    pub async fn wait(&self, timeout: Option<Duration>) -> Result<IpAddr, NetError> {
        let domain = self.domain.to_string();
        let mut rx = self.state.clone();
        let abandoned = NetError::ResolveAbandoned { domain: domain.clone() };

        let settled = async move {
            let outcome = rx.wait_for(|s| !s.is_pending()).await.map(|state| state.clone());
            outcome.unwrap_or(NodeState::Failed(abandoned))
        };

        let state = match timeout {
            Some(limit) => tokio::time::timeout(limit, settled).await.map_err(|_| {
                tracing::warn!(domain = %domain, "gave up waiting for in-flight resolution");
                NetError::ResolveTimedOut { domain: domain.clone() }
            })?,
            None => settled.await,
        };

        match state {
            NodeState::Resolved(addr) => Ok(addr),
            NodeState::Failed(e) => Err(e),
            NodeState::Pending => Err(NetError::ResolveAbandoned { domain }),
        }
    }
}

impl fmt::Debug for CacheNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheNode")
            .field("domain", &self.domain)
            .field("state", &*self.state.borrow())
            .finish()
    }
}

type Entries = Arc<DashMap<Name, Arc<CacheNode>>>;

/// Exclusive right to settle a freshly created node.
pub struct PendingSlot {
    node: Arc<CacheNode>,
    sender: Option<watch::Sender<NodeState>>,
    entries: Entries,
    scope: CacheScope,
}

impl PendingSlot {
    pub fn node(&self) -> &Arc<CacheNode> {
        &self.node
    }

    /// Pending -> Resolved. The entry stays cached.
    pub fn publish(mut self, addr: IpAddr) {
        if let Some(tx) = self.sender.take() {
            tracing::debug!(scope = %self.scope, domain = %self.node.domain, addr = %addr, "resolution cached");
            tx.send_replace(NodeState::Resolved(addr));
        }
    }

    /// Pending -> Failed. Evicts the entry and releases every waiter.
    pub fn fail(mut self, error: NetError) {
        self.settle_failed(error);
    }

    fn settle_failed(&mut self, error: NetError) {
        if let Some(tx) = self.sender.take() {
            // Only evict our own node; a newer attempt may already own the key.
            self.entries
                .remove_if(&self.node.domain, |_, node| Arc::ptr_eq(node, &self.node));
            tx.send_replace(NodeState::Failed(error));
        }
    }
}

impl Drop for PendingSlot {
    fn drop(&mut self) {
        if self.sender.is_some() {
            tracing::warn!(scope = %self.scope, domain = %self.node.domain, "resolution abandoned before completion");
            let domain = self.node.domain.to_string();
            self.settle_failed(NetError::ResolveAbandoned { domain });
        }
    }
}

impl fmt::Debug for PendingSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingSlot")
            .field("scope", &self.scope)
            .field("domain", &self.node.domain)
            .finish_non_exhaustive()
    }
}

/// Result of [`ResolutionCache::get_or_create`].
#[derive(Debug)]
pub enum Slot {
    /// The entry already existed; wait on it.
    Waiter(Arc<CacheNode>),
    /// The entry was just created; the caller must resolve and settle it.
    Owner(PendingSlot),
}

impl Slot {
    pub fn already_existed(&self) -> bool {
        matches!(self, Slot::Waiter(_))
    }
}

/// Thread-safe domain -> node map with single-flight semantics.
///
/// Sharded by `DashMap`, so unrelated domains never contend on one lock.
#[derive(Clone)]
pub struct ResolutionCache {
    scope: CacheScope,
    entries: Entries,
    wait_timeout: Option<Duration>,
}

impl ResolutionCache {
    pub fn new(scope: CacheScope) -> Self {
        Self { scope, entries: Arc::new(DashMap::new()), wait_timeout: None }
    }

    /// Bound how long a waiter blocks on someone else's resolution.
    pub fn with_wait_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.wait_timeout = timeout;
        self
    }

    pub fn scope(&self) -> CacheScope {
        self.scope
    }

    /// Atomic lookup-or-insert.
    pub fn get_or_create(&self, domain: &Name) -> Slot {
        match self.entries.entry(domain.clone()) {
            Entry::Occupied(entry) => Slot::Waiter(Arc::clone(entry.get())),
            Entry::Vacant(entry) => {
                let (tx, rx) = watch::channel(NodeState::Pending);
                let node = Arc::new(CacheNode { domain: domain.clone(), state: rx });
                entry.insert(Arc::clone(&node));
                Slot::Owner(PendingSlot {
                    node,
                    sender: Some(tx),
                    entries: Arc::clone(&self.entries),
                    scope: self.scope,
                })
            }
        }
    }

    /// Resolve `domain` at most once across concurrent callers.
    ///
    /// Waiters block on the existing node; the owner runs `resolve` and
    /// publishes or fails the node with its outcome.
    pub async fn resolve_with<F, Fut>(&self, domain: &Name, resolve: F) -> Result<IpAddr, NetError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<IpAddr, NetError>>,
    {
        match self.get_or_create(domain) {
            Slot::Waiter(node) => {
                tracing::debug!(scope = %self.scope, domain = %domain, "cache hit");
                node.wait(self.wait_timeout).await
            }
            Slot::Owner(slot) => match resolve().await {
                Ok(addr) => {
                    slot.publish(addr);
                    Ok(addr)
                }
                Err(e) => {
                    slot.fail(e.clone());
                    Err(e)
                }
            },
        }
    }

    /// The cached address for `domain`, if resolved.
    pub fn get(&self, domain: &Name) -> Option<IpAddr> {
        self.entries.get(domain).and_then(|node| node.resolved())
    }

    /// Whether any entry (pending or resolved) exists for `domain`.
    pub fn contains(&self, domain: &Name) -> bool {
        self.entries.contains_key(domain)
    }

    /// Remove an entry outright. Returns whether one existed.
    pub fn delete(&self, domain: &Name) -> bool {
        self.entries.remove(domain).is_some()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for ResolutionCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolutionCache")
            .field("scope", &self.scope)
            .field("entries", &self.entries.len())
            .field("wait_timeout", &self.wait_timeout)
            .finish()
    }
}
