//! Test server harness.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use ssakdb::gateway::{GatewayState, create_router};
use ssakdb::{KnowledgeCaches, KnowledgeResolver, LabelTable, MemoryStore};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

pub struct TestServer {
    pub addr: SocketAddr,
    pub store: Arc<MemoryStore>,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Serves the gateway over a real socket, backed by `store`.
pub async fn spawn_test_server(
    store: Arc<MemoryStore>,
    cache_ttl: Duration,
) -> std::io::Result<TestServer> {
    let resolver = KnowledgeResolver::new(
        store.clone(),
        LabelTable::builtin(),
        KnowledgeCaches::new(cache_ttl),
    );
    let app = create_router(GatewayState::new(Arc::new(resolver)));

    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
    let addr = listener.local_addr()?;
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await;
    });

    Ok(TestServer {
        addr,
        store,
        _server_handle: handle,
        shutdown_tx: Some(shutdown_tx),
    })
}
