#![allow(dead_code)]

use axum::extract::ConnectInfo;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::Layer;
use quota_shortener::config::Config;
use quota_shortener::prelude::*;

pub const DOMAIN: &str = "s.example.com";
pub const CLIENT_IP: &str = "203.0.113.7";

/// Config used by handler tests: in-memory stores and a fixed public domain.
pub fn test_config() -> Config {
    Config {
        domain: DOMAIN.to_string(),
        ..Config::default()
    }
}

pub struct TestContext {
    pub state: AppState,
    pub links: Arc<MemoryStore>,
    pub quotas: Arc<MemoryStore>,
}

pub fn create_test_state(config: &Config) -> TestContext {
    let links = Arc::new(MemoryStore::new());
    let quotas = Arc::new(MemoryStore::new());

    let keyspaces = Keyspaces::new(
        links.clone() as Arc<dyn KeyValueStore>,
        quotas.clone() as Arc<dyn KeyValueStore>,
    );

    TestContext {
        state: AppState::new(keyspaces, config),
        links,
        quotas,
    }
}

/// Injects a fixed peer address so handlers can extract `ConnectInfo`.
#[derive(Clone)]
pub struct MockConnectInfoLayer {
    addr: SocketAddr,
}

impl MockConnectInfoLayer {
    pub fn new(ip: &str) -> Self {
        Self {
            addr: SocketAddr::new(ip.parse().unwrap(), 12345),
        }
    }
}

impl Default for MockConnectInfoLayer {
    fn default() -> Self {
        Self::new(CLIENT_IP)
    }
}

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService {
            inner,
            addr: self.addr,
        }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
    addr: SocketAddr,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        req.extensions_mut().insert(ConnectInfo(self.addr));
        self.inner.call(req)
    }
}
