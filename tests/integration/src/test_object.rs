//! Object integration tests: GET and HEAD with metadata headers.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use bucketview_core::conditional::ConditionalRequest;
    use bucketview_core::entry::ListPage;
    use bucketview_core::error::StoreError;
    use bucketview_core::memory::MemoryStore;
    use bucketview_core::metadata::ObjectMetadata;
    use bucketview_core::store::{ObjectBody, ObjectStore};
    use bytes::Bytes;
    use futures::StreamExt;
    use reqwest::StatusCode;

    use crate::{TestServer, fixture_store, http_client};

    /// Sets its flag when the stream owning it is dropped.
    struct ReleaseFlag(Arc<AtomicBool>);

    impl Drop for ReleaseFlag {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    /// A store whose objects never end.
    struct EndlessStore {
        released: Arc<AtomicBool>,
    }

    #[async_trait]
    impl ObjectStore for EndlessStore {
        async fn list_page(
            &self,
            _prefix: &str,
            _delimiter: &str,
            _token: Option<String>,
        ) -> Result<ListPage, StoreError> {
            Ok(ListPage::default())
        }

        async fn head(
            &self,
            _key: &str,
            _cond: &ConditionalRequest,
        ) -> Result<ObjectMetadata, StoreError> {
            Ok(ObjectMetadata::default())
        }

        async fn get(
            &self,
            _key: &str,
            _cond: &ConditionalRequest,
        ) -> Result<(ObjectMetadata, ObjectBody), StoreError> {
            let guard = ReleaseFlag(self.released.clone());
            let body = futures::stream::repeat_with(|| Ok(Bytes::from(vec![b'x'; 16 * 1024])))
                .map(move |chunk| {
                    let _held = &guard;
                    chunk
                })
                .boxed();
            Ok((ObjectMetadata::default(), body))
        }
    }

    fn header<'a>(resp: &'a reqwest::Response, name: &str) -> Option<&'a str> {
        resp.headers().get(name).and_then(|v| v.to_str().ok())
    }

    #[tokio::test]
    async fn test_should_get_object_with_metadata() {
        let server = TestServer::start(fixture_store()).await;

        let resp = http_client()
            .get(server.url("/a.txt"))
            .send()
            .await
            .expect("request");
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(header(&resp, "content-type"), Some("text/plain"));
        assert_eq!(header(&resp, "content-length"), Some("5"));
        assert_eq!(header(&resp, "x-amz-meta-owner"), Some("alice"));
        assert_eq!(header(&resp, "x-amz-version-id"), Some("v1"));
        assert_eq!(
            header(&resp, "etag"),
            Some("\"5d41402abc4b2a76b9719d911017c592\"")
        );
        assert!(header(&resp, "last-modified").is_some_and(|v| v.ends_with(" GMT")));
        assert_eq!(resp.text().await.expect("body"), "hello");

        server.stop().await;
    }

    #[tokio::test]
    async fn test_should_head_object_without_body() {
        let server = TestServer::start(fixture_store()).await;

        let resp = http_client()
            .head(server.url("/a.txt"))
            .send()
            .await
            .expect("request");
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(header(&resp, "content-length"), Some("5"));
        assert_eq!(header(&resp, "x-amz-meta-owner"), Some("alice"));
        assert!(resp.bytes().await.expect("body").is_empty());

        server.stop().await;
    }

    #[tokio::test]
    async fn test_should_get_nested_and_empty_objects() {
        let server = TestServer::start(fixture_store()).await;
        let client = http_client();

        let nested = client
            .get(server.url("/a/b.txt"))
            .send()
            .await
            .expect("request");
        assert_eq!(nested.status(), StatusCode::OK);
        assert_eq!(nested.text().await.expect("body"), "nested");

        let empty = client
            .get(server.url("/empty.bin"))
            .send()
            .await
            .expect("request");
        assert_eq!(empty.status(), StatusCode::OK);
        assert_eq!(header(&empty, "content-length"), Some("0"));
        assert!(empty.bytes().await.expect("body").is_empty());

        server.stop().await;
    }

    #[tokio::test]
    async fn test_should_stream_large_object_intact() {
        let payload: Vec<u8> = (0..300_000u32).map(|i| (i % 251) as u8).collect();
        let store = MemoryStore::new();
        store.put("big.bin", payload.clone());
        let server = TestServer::start(store).await;

        let resp = http_client()
            .get(server.url("/big.bin"))
            .send()
            .await
            .expect("request");
        assert_eq!(header(&resp, "content-length"), Some("300000"));
        let body = resp.bytes().await.expect("body");
        assert_eq!(body.as_ref(), payload.as_slice());

        server.stop().await;
    }

    #[tokio::test]
    async fn test_should_decode_percent_encoded_key() {
        let store = MemoryStore::new();
        store.put("reports/q1 summary.txt", "figures");
        let server = TestServer::start(store).await;

        let resp = http_client()
            .get(server.url("/reports/q1%20summary.txt"))
            .send()
            .await
            .expect("request");
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.text().await.expect("body"), "figures");

        server.stop().await;
    }

    #[tokio::test]
    async fn test_should_release_store_stream_on_client_disconnect() {
        let released = Arc::new(AtomicBool::new(false));
        let server = TestServer::start_with(EndlessStore {
            released: released.clone(),
        })
        .await;

        let mut resp = http_client()
            .get(server.url("/endless.bin"))
            .send()
            .await
            .expect("request");
        assert_eq!(resp.status(), StatusCode::OK);
        let first = resp.chunk().await.expect("read").expect("first chunk");
        assert!(!first.is_empty());
        assert!(!released.load(Ordering::SeqCst));
        drop(resp);

        tokio::time::timeout(Duration::from_secs(5), async {
            while !released.load(Ordering::SeqCst) {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("store stream released after disconnect");

        server.stop().await;
    }
}
