//! Client-to-relay tests over real TCP.
//!
//! A relay node is a `TcpListener` dispatching `ET <kind> <domain>` lines to a
//! `DnsHandler`. The client side is a `RoutingPolicy` whose relay resolver
//! talks to it through a `TcpTunnel`.

mod common;

use common::{ip, CountingResolver, TableLocator};
use relaydns::base::neterror::NetError;
use relaydns::config::{DnsConfig, DnsType, ProxyMode};
use relaydns::dns::{
    CacheScope, DnsHandler, LocalResolver, Name, RelayResolver, Resolve, ResolutionCache,
    ResolutionSource, RoutingPolicy, SubProtocol,
};
use relaydns::tunnel::{TcpTunnel, Tunnel};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

/// Serve one request per connection until the listener is dropped.
async fn spawn_relay(handler: Arc<DnsHandler>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((socket, _)) = listener.accept().await else {
                break;
            };
            let handler = Arc::clone(&handler);
            tokio::spawn(async move {
                let (read, mut write) = socket.into_split();
                let mut reader = BufReader::new(read);
                let mut line = String::new();
                reader.read_line(&mut line).await.unwrap();

                let request = line.trim_end().strip_prefix("ET ").unwrap_or_default();
                if !request.starts_with(handler.kind()) {
                    write.write_all(b"error: unknown protocol\n").await.unwrap();
                    return;
                }
                if let Err(e) = handler.handle(request, &mut write).await {
                    write.write_all(format!("error: {e}\n").as_bytes()).await.unwrap();
                }
            });
        }
    });

    addr
}

/// Relay that answers every request with a fixed line.
async fn spawn_fixed_relay(reply: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut reader = BufReader::new(socket);
                let mut line = String::new();
                reader.read_line(&mut line).await.unwrap();
                reader.get_mut().write_all(reply.as_bytes()).await.unwrap();
            });
        }
    });

    addr
}

fn relay_node(local: Arc<CountingResolver>) -> Arc<DnsHandler> {
    Arc::new(DnsHandler::new(
        DnsType::Dns,
        LocalResolver::new(local),
        ResolutionCache::new(CacheScope::Local),
    ))
}

fn client_policy(
    config: &DnsConfig,
    local: Arc<CountingResolver>,
    locator: TableLocator,
) -> RoutingPolicy {
    let tunnel = Arc::new(TcpTunnel::from_config(config).unwrap());
    let relay = Arc::new(RelayResolver::new(tunnel, config.dns_type));
    RoutingPolicy::new(config, local, relay, Arc::new(locator))
}

#[tokio::test]
async fn test_tunnel_to_handler_round_trip() {
    let far_local = Arc::new(CountingResolver::ok("9.9.9.9"));
    let addr = spawn_relay(relay_node(far_local.clone())).await;

    let tunnel = TcpTunnel::new(addr);
    let reply = tunnel.query("DNS example.com".to_string()).await.unwrap();

    assert_eq!(reply, "9.9.9.9");
    assert_eq!(far_local.calls(), 1);
}

#[tokio::test]
async fn test_whitelisted_domain_resolved_by_relay_node() {
    let far_local = Arc::new(CountingResolver::ok("142.250.1.1"));
    let addr = spawn_relay(relay_node(far_local.clone())).await;

    let config = DnsConfig {
        proxy_mode: ProxyMode::Smart,
        whitelist: vec!["google.com".into()],
        relay_addr: Some(addr),
        ..DnsConfig::default()
    };
    let near_local = Arc::new(CountingResolver::ok("1.2.3.4"));
    let policy = client_policy(&config, near_local.clone(), TableLocator::default());

    let resolution = policy.resolve("www.google.com").await.unwrap();

    assert_eq!(resolution.address, ip("142.250.1.1"));
    assert_eq!(resolution.source, ResolutionSource::Relay);
    assert_eq!(near_local.calls(), 0);
    assert_eq!(far_local.calls(), 1);
}

#[tokio::test]
async fn test_geolocation_override_through_relay_node() {
    let far_local = Arc::new(CountingResolver::ok("9.9.9.9"));
    let addr = spawn_relay(relay_node(far_local.clone())).await;

    let config = DnsConfig {
        proxy_mode: ProxyMode::Smart,
        relay_addr: Some(addr),
        ..DnsConfig::default()
    };
    let near_local = Arc::new(CountingResolver::ok("5.6.7.8"));
    let policy = client_policy(&config, near_local.clone(), TableLocator::new(&[("5.6.7.8", "US")]));

    let resolution = policy.resolve("example.com").await.unwrap();

    assert_eq!(resolution.address, ip("9.9.9.9"));
    assert_eq!(near_local.calls(), 1);
    assert_eq!(far_local.calls(), 1);
}

#[tokio::test]
async fn test_relay_error_reply_is_not_cached() {
    let addr = spawn_fixed_relay("error: timeout\n").await;

    let config = DnsConfig {
        proxy_mode: ProxyMode::Enabled,
        relay_addr: Some(addr),
        ..DnsConfig::default()
    };
    let policy = client_policy(&config, Arc::new(CountingResolver::ok("1.2.3.4")), TableLocator::default());

    let err = policy.resolve("example.com").await.unwrap_err();

    match err {
        NetError::InvalidReply { domain, reply } => {
            assert_eq!(domain, "example.com");
            assert_eq!(reply, "error: timeout");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!policy.relay_cache().contains(&Name::new("example.com")));
}

#[tokio::test]
async fn test_relay_failure_on_far_side_surfaces_as_invalid_reply() {
    let far_local = Arc::new(CountingResolver::err(NetError::NameNotResolved));
    let addr = spawn_relay(relay_node(far_local)).await;

    let tunnel = Arc::new(TcpTunnel::new(addr));
    let relay = RelayResolver::new(tunnel, DnsType::Dns);

    let err = relay.resolve(Name::new("missing.example")).await.unwrap_err();

    assert!(matches!(err, NetError::InvalidReply { .. }));
}

#[tokio::test]
async fn test_unreachable_relay() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = DnsConfig {
        proxy_mode: ProxyMode::Enabled,
        relay_addr: Some(addr),
        ..DnsConfig::default()
    };
    let policy = client_policy(&config, Arc::new(CountingResolver::ok("1.2.3.4")), TableLocator::default());

    let err = policy.resolve("example.com").await.unwrap_err();

    assert!(matches!(err, NetError::ConnectionFailedTo { .. }));
}

#[tokio::test]
async fn test_inbound_handler_never_uses_relay() {
    let config = DnsConfig { proxy_mode: ProxyMode::Enabled, ..DnsConfig::default() };
    let local = Arc::new(CountingResolver::ok("10.1.1.1"));
    let relay = Arc::new(CountingResolver::ok("9.9.9.9"));
    let policy = RoutingPolicy::new(&config, local.clone(), relay.clone(), Arc::new(TableLocator::default()));
    let handler = Arc::new(DnsHandler::from_policy(DnsType::Dns, &policy));
    let addr = spawn_relay(handler).await;

    let reply = TcpTunnel::new(addr)
        .query("DNS example.com".to_string())
        .await
        .unwrap();

    assert_eq!(reply, "10.1.1.1");
    assert_eq!(local.calls(), 1);
    assert_eq!(relay.calls(), 0);
    assert_eq!(policy.local_cache().get(&Name::new("example.com")), Some(ip("10.1.1.1")));
}

#[tokio::test]
async fn test_concurrent_inbound_requests_share_local_resolution() {
    let far_local = Arc::new(CountingResolver::ok("9.9.9.9").delayed(Duration::from_millis(50)));
    let addr = spawn_relay(relay_node(far_local.clone())).await;
    let tunnel = TcpTunnel::new(addr);

    let replies = futures::future::join_all(
        (0..8).map(|_| tunnel.query("DNS example.com".to_string())),
    )
    .await;

    assert!(replies.iter().all(|r| matches!(r, Ok(reply) if reply == "9.9.9.9")));
    assert_eq!(far_local.calls(), 1);
}
