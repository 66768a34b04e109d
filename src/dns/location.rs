//! Geolocation collaborator.
//!
//! Classifying an address is someone else's job ([`Locate`]); deciding
//! whether a classification warrants the relay is [`ProxyDecider`].

use super::Name;
use crate::base::neterror::NetError;
use std::collections::HashSet;
use std::{fmt, future::Future, net::IpAddr, pin::Pin};

/// Location classification of an address, e.g. a country code or `Private`.
#[derive(Clone, Hash, Eq, PartialEq)]
pub struct Location(Box<str>);

impl Location {
    pub fn new(label: impl Into<Box<str>>) -> Self {
        Self(label.into())
    }

    /// Placeholder for addresses the classifier could not place.
    pub fn unknown() -> Self {
        Self::new("")
    }

    pub fn is_unknown(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Location {
    fn from(value: &str) -> Self {
        Location::new(value)
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Alias for the `Future` returned by a locator.
pub type Locating = Pin<Box<dyn Future<Output = Result<Location, NetError>> + Send>>;

/// Classifies an address.
pub trait Locate: Send + Sync {
    fn locate(&self, addr: IpAddr) -> Locating;
}

/// Decides whether an address in `location` should be re-resolved by the relay.
pub trait ProxyDecider: Send + Sync {
    fn should_proxy(&self, location: &Location) -> bool;
}

impl<F> ProxyDecider for F
where
    F: Fn(&Location) -> bool + Send + Sync,
{
    fn should_proxy(&self, location: &Location) -> bool {
        self(location)
    }
}

/// Proxy everything except addresses in a fixed set of locations.
///
/// Unknown locations are proxied.
#[derive(Debug, Clone, Default)]
pub struct DirectLocations {
    direct: HashSet<String>,
}

impl DirectLocations {
    pub fn new<I, S>(locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { direct: locations.into_iter().map(Into::into).collect() }
    }
}

impl ProxyDecider for DirectLocations {
    fn should_proxy(&self, location: &Location) -> bool {
        !self.direct.contains(location.as_str())
    }
}

/// Classify `addr`, degrading a classifier failure to an unknown location.
pub(crate) async fn locate_or_unknown(locator: &dyn Locate, domain: &Name, addr: IpAddr) -> Location {
    match locator.locate(addr).await {
        Ok(location) => location,
        Err(e) => {
            tracing::warn!(domain = %domain, addr = %addr, error = %e, "fail to locate address");
            Location::unknown()
        }
    }
}
