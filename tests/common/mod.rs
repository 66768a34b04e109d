//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use relaydns::base::neterror::NetError;
use relaydns::dns::{Locate, Locating, Location, Name, Resolve, Resolving};
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub fn ip(text: &str) -> IpAddr {
    text.parse().unwrap()
}

/// Resolver double that counts invocations and answers after an optional delay.
pub struct CountingResolver {
    answer: Mutex<Result<IpAddr, NetError>>,
    delay: Duration,
    calls: AtomicUsize,
}

impl CountingResolver {
    pub fn ok(addr: &str) -> Self {
        Self::with(Ok(ip(addr)))
    }

    pub fn err(error: NetError) -> Self {
        Self::with(Err(error))
    }

    fn with(answer: Result<IpAddr, NetError>) -> Self {
        Self { answer: Mutex::new(answer), delay: Duration::ZERO, calls: AtomicUsize::new(0) }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Change what later calls return.
    pub fn set_answer(&self, answer: Result<IpAddr, NetError>) {
        *self.answer.lock().unwrap() = answer;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Resolve for CountingResolver {
    fn resolve(&self, _name: Name) -> Resolving {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let answer = self.answer.lock().unwrap().clone();
        let delay = self.delay;
        Box::pin(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            answer
        })
    }
}

/// Locator double backed by a fixed table; unlisted addresses are "US".
#[derive(Default)]
pub struct TableLocator {
    table: HashMap<IpAddr, &'static str>,
    calls: AtomicUsize,
}

impl TableLocator {
    pub fn new(entries: &[(&str, &'static str)]) -> Self {
        Self {
            table: entries.iter().map(|(addr, loc)| (ip(addr), *loc)).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Locate for TableLocator {
    fn locate(&self, addr: IpAddr) -> Locating {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let location = Location::new(self.table.get(&addr).copied().unwrap_or("US"));
        Box::pin(async move { Ok(location) })
    }
}
