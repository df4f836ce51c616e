//! Error mapping, common headers and server lifecycle.

#[cfg(test)]
mod tests {
    use bucketview_core::error::StoreError;
    use reqwest::StatusCode;

    use crate::{TestServer, fixture_store, http_client};

    #[tokio::test]
    async fn test_should_answer_not_found_for_missing_key() {
        let server = TestServer::start(fixture_store()).await;

        let resp = http_client()
            .get(server.url("/missing.txt"))
            .send()
            .await
            .expect("request");
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            resp.headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok()),
            Some("text/plain; charset=utf-8")
        );
        assert_eq!(resp.text().await.expect("body"), "Not found");

        server.stop().await;
    }

    #[tokio::test]
    async fn test_should_reject_unsupported_methods() {
        let server = TestServer::start(fixture_store()).await;
        let client = http_client();

        let post = client
            .post(server.url("/a.txt"))
            .body("payload")
            .send()
            .await
            .expect("request");
        assert_eq!(post.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            post.text().await.expect("body"),
            "POST requests are not supported"
        );

        let delete = client
            .delete(server.url("/"))
            .send()
            .await
            .expect("request");
        assert_eq!(delete.status(), StatusCode::METHOD_NOT_ALLOWED);

        server.stop().await;
    }

    #[tokio::test]
    async fn test_should_pass_through_store_status() {
        let store = fixture_store();
        store.fail(
            "a.txt",
            StoreError::new(Some(503), "Please reduce your request rate.").with_code("SlowDown"),
        );
        store.fail(
            "docs/",
            StoreError::new(Some(400), "bad listing").with_code("InvalidArgument"),
        );
        let server = TestServer::start(store).await;
        let client = http_client();

        let get = client
            .get(server.url("/a.txt"))
            .send()
            .await
            .expect("request");
        assert_eq!(get.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            get.text().await.expect("body"),
            "Failed to GET an S3 object: Please reduce your request rate."
        );

        let list = client
            .get(server.url("/docs/"))
            .send()
            .await
            .expect("request");
        assert_eq!(list.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            list.text().await.expect("body"),
            "Failed to list S3 objects: bad listing"
        );

        server.stop().await;
    }

    #[tokio::test]
    async fn test_should_use_500_when_store_unreachable() {
        let store = fixture_store();
        store.fail("a.txt", StoreError::dispatch("connection refused"));
        let server = TestServer::start(store).await;

        let resp = http_client()
            .get(server.url("/a.txt"))
            .send()
            .await
            .expect("request");
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(
            resp.text()
                .await
                .expect("body")
                .starts_with("Failed to GET an S3 object: ")
        );

        server.stop().await;
    }

    #[tokio::test]
    async fn test_should_answer_health_check() {
        let server = TestServer::start(fixture_store()).await;

        let resp = http_client()
            .get(server.url("/_health"))
            .send()
            .await
            .expect("request");
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = resp.json().await.expect("json body");
        assert_eq!(body["status"], "running");
        assert_eq!(body["service"], "bucketview");

        server.stop().await;
    }

    #[tokio::test]
    async fn test_should_stamp_server_and_request_id() {
        let server = TestServer::start(fixture_store()).await;
        let client = http_client();

        let first = client
            .get(server.url("/a.txt"))
            .send()
            .await
            .expect("request");
        let second = client
            .get(server.url("/missing"))
            .send()
            .await
            .expect("request");

        for resp in [&first, &second] {
            assert_eq!(
                resp.headers().get("server").and_then(|v| v.to_str().ok()),
                Some("BucketView")
            );
        }
        let id = |resp: &reqwest::Response| {
            resp.headers()
                .get("x-request-id")
                .and_then(|v| v.to_str().ok())
                .map(ToOwned::to_owned)
        };
        assert!(id(&first).is_some());
        assert_ne!(id(&first), id(&second));

        server.stop().await;
    }

    #[tokio::test]
    async fn test_should_stop_gracefully() {
        let server = TestServer::start(fixture_store()).await;
        let url = server.url("/a.txt");

        let resp = http_client().get(&url).send().await.expect("request");
        assert_eq!(resp.status(), StatusCode::OK);
        drop(resp);

        server.stop().await;

        let after = http_client().get(&url).send().await;
        assert!(after.is_err(), "listener is closed after shutdown");
    }
}
