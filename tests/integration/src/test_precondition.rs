//! Conditional request integration tests.

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use crate::{TestServer, fixture_store, http_client};

    const HELLO_ETAG: &str = "\"5d41402abc4b2a76b9719d911017c592\"";

    fn content_length(resp: &reqwest::Response) -> Option<&str> {
        resp.headers()
            .get("content-length")
            .and_then(|v| v.to_str().ok())
    }

    #[tokio::test]
    async fn test_should_fail_stale_if_match_with_empty_body() {
        let server = TestServer::start(fixture_store()).await;

        let resp = http_client()
            .get(server.url("/a.txt"))
            .header("if-match", "\"stale\"")
            .send()
            .await
            .expect("request");
        assert_eq!(resp.status(), StatusCode::PRECONDITION_FAILED);
        assert_eq!(content_length(&resp), Some("0"));
        assert!(resp.bytes().await.expect("body").is_empty());

        server.stop().await;
    }

    #[tokio::test]
    async fn test_should_serve_matching_if_match() {
        let server = TestServer::start(fixture_store()).await;

        let resp = http_client()
            .get(server.url("/a.txt"))
            .header("if-match", HELLO_ETAG)
            .send()
            .await
            .expect("request");
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.text().await.expect("body"), "hello");

        server.stop().await;
    }

    #[tokio::test]
    async fn test_should_answer_not_modified_for_current_etag() {
        let server = TestServer::start(fixture_store()).await;
        let client = http_client();

        for req in [
            client.get(server.url("/a.txt")),
            client.head(server.url("/a.txt")),
        ] {
            let resp = req
                .header("if-none-match", HELLO_ETAG)
                .send()
                .await
                .expect("request");
            assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);
            // hyper omits Content-Length on 304; a present value must be 0.
            assert!(content_length(&resp).is_none_or(|v| v == "0"));
            assert!(resp.bytes().await.expect("body").is_empty());
        }

        server.stop().await;
    }

    #[tokio::test]
    async fn test_should_check_if_match_before_if_none_match() {
        let server = TestServer::start(fixture_store()).await;

        let resp = http_client()
            .get(server.url("/a.txt"))
            .header("if-match", "\"stale\"")
            .header("if-none-match", HELLO_ETAG)
            .send()
            .await
            .expect("request");
        assert_eq!(resp.status(), StatusCode::PRECONDITION_FAILED);

        server.stop().await;
    }

    #[tokio::test]
    async fn test_should_honor_if_modified_since() {
        let server = TestServer::start(fixture_store()).await;
        let client = http_client();

        let fresh = client
            .get(server.url("/a.txt"))
            .header("if-modified-since", "Fri, 01 Jan 2100 00:00:00 GMT")
            .send()
            .await
            .expect("request");
        assert_eq!(fresh.status(), StatusCode::NOT_MODIFIED);

        let stale = client
            .get(server.url("/a.txt"))
            .header("if-modified-since", "Thu, 01 Jan 1970 00:00:00 GMT")
            .send()
            .await
            .expect("request");
        assert_eq!(stale.status(), StatusCode::OK);

        server.stop().await;
    }

    #[tokio::test]
    async fn test_should_ignore_unparseable_dates() {
        let server = TestServer::start(fixture_store()).await;

        let resp = http_client()
            .get(server.url("/a.txt"))
            .header("if-modified-since", "yesterday-ish")
            .send()
            .await
            .expect("request");
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.text().await.expect("body"), "hello");

        server.stop().await;
    }

    #[tokio::test]
    async fn test_should_fail_if_unmodified_since_in_past() {
        let server = TestServer::start(fixture_store()).await;

        let resp = http_client()
            .head(server.url("/a.txt"))
            .header("if-unmodified-since", "Thu, 01 Jan 1970 00:00:00 GMT")
            .send()
            .await
            .expect("request");
        assert_eq!(resp.status(), StatusCode::PRECONDITION_FAILED);
        assert_eq!(content_length(&resp), Some("0"));

        server.stop().await;
    }
}
