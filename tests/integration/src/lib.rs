//! Integration tests for the BucketView server.
//!
//! Most tests start an in-process server on `127.0.0.1:0` backed by a
//! [`MemoryStore`] and talk to it over a real socket. Tests marked
//! `#[ignore]` require a BucketView server running against a real bucket
//! that contains the fixtures described in [`test_live`].
//!
//! Run the ignored ones with:
//! ```text
//! BUCKETVIEW_TEST_URL=http://localhost:8080 cargo test -p bucketview-integration -- --ignored
//! ```

use std::net::SocketAddr;
use std::sync::Once;

use bucketview_core::gateway::StoreGateway;
use bucketview_core::memory::MemoryStore;
use bucketview_core::store::ObjectStore;
use bucketview_http::BucketViewService;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

mod test_error;
mod test_live;
mod test_object;
mod test_precondition;

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// A server running on an ephemeral local port.
#[derive(Debug)]
pub struct TestServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl TestServer {
    /// Start a server over `store`.
    pub async fn start(store: MemoryStore) -> Self {
        Self::start_with(store).await
    }

    /// Start a server over any store.
    pub async fn start_with<S: ObjectStore>(store: S) -> Self {
        init_tracing();

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        let service = BucketViewService::new(StoreGateway::new(store));
        let (tx, rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(bucketview_http::serve(listener, service, async {
            rx.await.ok();
        }));

        Self {
            addr,
            shutdown: Some(tx),
            handle: Some(handle),
        }
    }

    /// Absolute URL for `path` (which must start with `/`).
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Stop accepting and wait for open connections to drain.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.await.expect("server task");
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// HTTP client for tests.
#[must_use]
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("build http client")
}

/// Base URL of a running server for live tests.
#[must_use]
pub fn live_url() -> String {
    std::env::var("BUCKETVIEW_TEST_URL").unwrap_or_else(|_| "http://localhost:8080".to_owned())
}

/// A store with a small tree used across tests:
///
/// ```text
/// a.txt            "hello"       text/plain, x-amz-meta-owner: alice
/// a/b.txt          "nested"
/// docs/guide.md    "# guide"
/// empty.bin        ""
/// ```
#[must_use]
pub fn fixture_store() -> MemoryStore {
    use bucketview_core::metadata::ObjectMetadata;

    let store = MemoryStore::new();
    store.put_with(
        "a.txt",
        "hello",
        ObjectMetadata {
            content_type: Some("text/plain".to_owned()),
            user_metadata: [("owner".to_owned(), "alice".to_owned())].into(),
            version_id: Some("v1".to_owned()),
            ..ObjectMetadata::default()
        },
    );
    store.put("a/b.txt", "nested");
    store.put("docs/guide.md", "# guide");
    store.put("empty.bin", "");
    store
}
