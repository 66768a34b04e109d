use super::{Name, Resolve, Resolving};
use std::sync::Arc;

/// Resolves through an injected system-level capability.
///
/// Failures are logged with a hint to whitelist the domain (local failures are
/// usually domains that are only reachable through the relay) and returned
/// unchanged. No retry happens here.
#[derive(Clone)]
pub struct LocalResolver {
    inner: Arc<dyn Resolve>,
}

impl LocalResolver {
    pub fn new(inner: Arc<dyn Resolve>) -> Self {
        Self { inner }
    }
}

impl Resolve for LocalResolver {
    fn resolve(&self, name: Name) -> Resolving {
        let inner = Arc::clone(&self.inner);
        Box::pin(async move {
            let result = inner.resolve(name.clone()).await;
            if let Err(e) = &result {
                tracing::warn!(
                    domain = %name,
                    error = %e,
                    "fail to resolve locally, consider adding this domain to the whitelist"
                );
            }
            result
        })
    }
}

impl std::fmt::Debug for LocalResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalResolver").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::neterror::NetError;
    use std::net::{IpAddr, Ipv4Addr};

    struct Fixed(Result<IpAddr, NetError>);

    impl Resolve for Fixed {
        fn resolve(&self, _name: Name) -> Resolving {
            let result = self.0.clone();
            Box::pin(async move { result })
        }
    }

    #[tokio::test]
    async fn test_passes_through_success() {
        let ip = IpAddr::V4(Ipv4Addr::new(1, 2, 3, 4));
        let resolver = LocalResolver::new(Arc::new(Fixed(Ok(ip))));
        assert_eq!(resolver.resolve(Name::new("example.com")).await.unwrap(), ip);
    }

    #[tokio::test]
    async fn test_propagates_error_unchanged() {
        let err = NetError::dns_failed("example.com", std::io::Error::other("nxdomain"));
        let resolver = LocalResolver::new(Arc::new(Fixed(Err(err))));

        match resolver.resolve(Name::new("example.com")).await {
            Err(NetError::NameNotResolvedFor { domain, .. }) => assert_eq!(domain, "example.com"),
            other => panic!("Unexpected result: {other:?}"),
        }
    }
}
