//! Test server harness.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use artify::gateway::{AppState, RouterOptions, create_router_with_state};
use artify::{
    AuthenticityEngine, Blake3Signer, ContentStore, LocalContentStore, MemoryRecordStore,
    ReportSigner,
};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::fixtures::TEST_SIGNER_KEY_HEX;

const STARTUP_WAIT_TIMEOUT_SECS: u64 = 5;
const STARTUP_POLL_INTERVAL_MS: u64 = 50;

pub struct TestServer {
    pub addr: SocketAddr,
    pub records: Arc<MemoryRecordStore>,
    pub content_root: PathBuf,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    _temp_dir: TempDir,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

pub async fn wait_for_server_ready(
    addr: SocketAddr,
    timeout: Duration,
    interval: Duration,
) -> Result<(), ServerStartupError> {
    let start = std::time::Instant::now();

    loop {
        if start.elapsed() > timeout {
            return Err(ServerStartupError::Timeout);
        }

        match tokio::net::TcpStream::connect(addr).await {
            Ok(_) => return Ok(()),
            Err(_) => {
                tokio::time::sleep(interval).await;
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerStartupError {
    #[error("Server failed to start within timeout")]
    Timeout,
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
}

pub fn test_signer() -> Arc<dyn ReportSigner> {
    Arc::new(Blake3Signer::from_hex(TEST_SIGNER_KEY_HEX).unwrap())
}

/// Serves `engine` on an ephemeral port with a local content store and an
/// in-memory record store, both rooted in a fresh temp dir.
pub async fn spawn_test_server(
    engine: Arc<AuthenticityEngine>,
    options: RouterOptions,
) -> Result<TestServer, ServerStartupError> {
    let temp_dir = TempDir::new()?;
    let content_root = temp_dir.path().join("content");
    let records = Arc::new(MemoryRecordStore::new());
    let store: Arc<dyn ContentStore> = Arc::new(LocalContentStore::new(&content_root));

    let state = AppState::new(
        engine,
        test_signer(),
        store,
        records.clone(),
        temp_dir.path().to_path_buf(),
    );
    let app = create_router_with_state(state, &options);

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await;
    });

    wait_for_server_ready(
        addr,
        Duration::from_secs(STARTUP_WAIT_TIMEOUT_SECS),
        Duration::from_millis(STARTUP_POLL_INTERVAL_MS),
    )
    .await?;

    Ok(TestServer {
        addr,
        records,
        content_root,
        _server_handle: handle,
        shutdown_tx: Some(shutdown_tx),
        _temp_dir: temp_dir,
    })
}
