//! Shared fixtures for integration tests.

#![allow(dead_code)]

use dataorch_client::{ApiClientBuilder, BackendClients, BackendId, BackendRegistry, KeyValueStore};
use mockito::{Server, ServerGuard};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// A mockito server plus clients pointed at it.
///
/// The data platform is mounted under `/api`, like the real deployment.
pub struct MockServerFixture {
    pub server: ServerGuard,
    pub base_url: String,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let base_url = server.url();
        Self { server, base_url }
    }

    pub fn registry(&self) -> BackendRegistry {
        BackendRegistry::new()
            .with_base_url(BackendId::OpencodeAgent, &self.base_url)
            .expect("agent url")
            .with_base_url(BackendId::DataPlatform, &format!("{}/api", self.base_url))
            .expect("data url")
    }

    pub fn clients(&self, store: Arc<dyn KeyValueStore>) -> BackendClients {
        ApiClientBuilder::new()
            .registry(self.registry())
            .store(store)
            .build_all()
            .expect("build clients")
    }

    pub fn mock_clients(&self, store: Arc<dyn KeyValueStore>) -> BackendClients {
        ApiClientBuilder::new()
            .registry(self.registry())
            .store(store)
            .mock_mode(BackendId::DataPlatform, true)
            .mock_mode(BackendId::OpencodeAgent, true)
            .build_all()
            .expect("build mock clients")
    }
}

/// A server that accepts connections and never answers.
///
/// Returns its base URL and a counter of accepted connections.
pub async fn silent_server() -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let accepted = Arc::new(AtomicUsize::new(0));
    let counter = accepted.clone();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            held.push(socket);
        }
    });
    (format!("http://{}", addr), accepted)
}

/// A base URL nothing listens on.
pub fn refused_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("addr").port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

pub const SHORT_TIMEOUT: Duration = Duration::from_millis(200);
