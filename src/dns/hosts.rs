use super::Name;
use std::collections::HashMap;
use std::net::IpAddr;

/// Static domain -> address overrides.
///
/// Consulted before the cache and the routing policy. A hit bypasses
/// resolution entirely. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct HostsOverride {
    entries: HashMap<Name, IpAddr>,
}

impl HostsOverride {
    pub fn new<I, N>(entries: I) -> Self
    where
        I: IntoIterator<Item = (N, IpAddr)>,
        N: Into<Name>,
    {
        Self { entries: entries.into_iter().map(|(name, addr)| (name.into(), addr)).collect() }
    }

    /// Parse hosts(5) text: an address followed by one or more names per line.
    ///
    /// `#` starts a comment. Lines whose address does not parse are skipped.
    pub fn parse(text: &str) -> Self {
        let mut entries = HashMap::new();

        for (lineno, raw) in text.lines().enumerate() {
            let line = raw.split('#').next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }

            let mut fields = line.split_whitespace();
            let Some(addr_text) = fields.next() else {
                continue;
            };
            let Ok(addr) = addr_text.parse::<IpAddr>() else {
                tracing::warn!(line = lineno + 1, entry = %line, "skipping invalid hosts entry");
                continue;
            };

            for name in fields {
                entries.insert(Name::new(name), addr);
            }
        }

        Self { entries }
    }

    pub fn get(&self, domain: &Name) -> Option<IpAddr> {
        self.entries.get(domain).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
