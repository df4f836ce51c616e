//! Tests against a running server.
//!
//! The bucket behind the server must contain at least one object or prefix
//! at its root.

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use crate::{http_client, live_url};

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_report_healthy() {
        let resp = http_client()
            .get(format!("{}/_health", live_url()))
            .send()
            .await
            .expect("request");
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = resp.json().await.expect("json body");
        assert_eq!(body["status"], "running");
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_list_bucket_root() {
        let resp = http_client()
            .get(format!("{}/", live_url()))
            .header("accept", "application/json")
            .send()
            .await
            .expect("request");
        assert_eq!(resp.status(), StatusCode::OK);
        let listing: serde_json::Value = resp.json().await.expect("json body");
        let entries = listing.as_array().expect("array");
        assert!(!entries.is_empty());

        let first_file = entries.iter().position(|e| e["type"] == "file");
        if let Some(idx) = first_file {
            assert!(entries[idx..].iter().all(|e| e["type"] == "file"));
        }
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_put() {
        let resp = http_client()
            .put(format!("{}/anything", live_url()))
            .body("x")
            .send()
            .await
            .expect("request");
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            resp.text().await.expect("body"),
            "PUT requests are not supported"
        );
    }
}
