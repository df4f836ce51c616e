//! The BucketView HTTP service implementing hyper's `Service` trait.
//!
//! [`BucketViewService`] handles, in order:
//!
//! 1. Health check interception (`GET /_health`)
//! 2. Routing via [`Route::resolve`] (method filter, path classification)
//! 3. Conditional header resolution for object routes
//! 4. The store call through the [`StoreGateway`]
//! 5. Listing negotiation and rendering, or metadata headers and body
//! 6. Common response headers (`x-request-id`, `Server`)
//!
//! The request body is never read.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;

use bucketview_core::conditional::ConditionalRequest;
use bucketview_core::error::ViewError;
use bucketview_core::gateway::StoreGateway;
use http::header::{HOST, HeaderValue};
use http::request::Parts;
use hyper::body::Incoming;
use hyper::service::Service;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::body::ResponseBody;
use crate::listing::render;
use crate::negotiate::negotiate;
use crate::response::{error_to_response, listing_response, object_response, text_response};
use crate::router::Route;

/// Value of the `Server` response header.
pub const SERVER_NAME: &str = "BucketView";

/// Request id response header.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Path answered by the health check.
pub const HEALTH_PATH: &str = "/_health";

/// The read-only bucket view as a hyper service.
///
/// Cloning is cheap; every connection gets a clone sharing one gateway.
#[derive(Debug, Clone)]
pub struct BucketViewService {
    gateway: StoreGateway,
}

impl BucketViewService {
    /// Create a service over a gateway.
    #[must_use]
    pub fn new(gateway: StoreGateway) -> Self {
        Self { gateway }
    }

    /// Handle a request. The body is dropped unread.
    pub async fn handle<B>(&self, req: http::Request<B>) -> http::Response<ResponseBody> {
        let (parts, _) = req.into_parts();
        handle_parts(self.gateway.clone(), parts).await
    }
}

impl Service<http::Request<Incoming>> for BucketViewService {
    type Response = http::Response<ResponseBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<Incoming>) -> Self::Future {
        let gateway = self.gateway.clone();
        let (parts, _) = req.into_parts();
        Box::pin(async move { Ok(handle_parts(gateway, parts).await) })
    }
}

async fn handle_parts(gateway: StoreGateway, parts: Parts) -> http::Response<ResponseBody> {
    let request_id = Uuid::new_v4().to_string();
    let response = process_request(&gateway, &parts, &request_id).await;
    add_common_headers(response, &request_id)
}

/// Process a request through routing, the store call and response writing.
async fn process_request(
    gateway: &StoreGateway,
    parts: &Parts,
    request_id: &str,
) -> http::Response<ResponseBody> {
    let method = &parts.method;
    let uri = &parts.uri;
    debug!(%method, %uri, request_id, "processing request");

    if is_health_check(method, uri.path()) {
        return health_check_response();
    }

    let route = match Route::resolve(method, uri.path()) {
        Ok(route) => route,
        Err(err) => {
            warn!(%method, path = uri.path(), request_id, "rejected unsupported method");
            return error_to_response(&err, "");
        }
    };

    info!(route = %route, path = route.path(), request_id, "routed request");

    let result = match route {
        Route::Listing { ref prefix } => serve_listing(gateway, parts, prefix).await,
        Route::HeadObject { ref key } => {
            let cond = ConditionalRequest::from_headers(&parts.headers);
            gateway
                .head(key, &cond)
                .await
                .map(|meta| object_response(&meta, ResponseBody::empty()))
        }
        Route::GetObject { ref key } => {
            let cond = ConditionalRequest::from_headers(&parts.headers);
            gateway
                .get(key, &cond)
                .await
                .map(|(meta, body)| object_response(&meta, ResponseBody::streaming(body)))
        }
    };

    result.unwrap_or_else(|err| {
        log_failure(route.operation(), route.path(), &err, request_id);
        error_to_response(&err, route.operation())
    })
}

async fn serve_listing(
    gateway: &StoreGateway,
    parts: &Parts,
    prefix: &str,
) -> Result<http::Response<ResponseBody>, ViewError> {
    let entries = gateway.list(prefix).await?;
    let format = negotiate(&parts.headers);
    let host = request_host(parts);

    match render(&host, prefix, &entries, format) {
        Ok(listing) => Ok(listing_response(listing)),
        Err(err) => {
            error!(error = %err, prefix, "failed to render listing");
            Ok(text_response(
                http::StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to render listing: {err}"),
            ))
        }
    }
}

/// The `Host` header, else the request-target authority (HTTP/2 carries
/// `:authority` there), else empty.
fn request_host(parts: &Parts) -> String {
    parts
        .headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .map(ToOwned::to_owned)
        .or_else(|| parts.uri.authority().map(ToString::to_string))
        .unwrap_or_default()
}

/// Log a failed operation once, at a level matching who is at fault.
fn log_failure(operation: &str, path: &str, err: &ViewError, request_id: &str) {
    let status = err.status_code().as_u16();
    let message = err.message();
    match err {
        ViewError::NotModified | ViewError::PreconditionFailed | ViewError::NotFound { .. } => {
            debug!(operation, path, status, error = %message, request_id, "operation failed");
        }
        ViewError::TransientStoreError { .. } => {
            warn!(operation, path, status, error = %message, request_id, "operation failed");
        }
        _ => {
            error!(operation, path, status, error = %message, request_id, "operation failed");
        }
    }
}

/// Check if the request is a health check probe.
fn is_health_check(method: &http::Method, path: &str) -> bool {
    *method == http::Method::GET && path == HEALTH_PATH
}

/// Produce a health check response.
fn health_check_response() -> http::Response<ResponseBody> {
    http::Response::builder()
        .status(http::StatusCode::OK)
        .header("Content-Type", "application/json")
        .body(ResponseBody::from_string(
            r#"{"status":"running","service":"bucketview"}"#,
        ))
        .expect("static health response should be valid")
}

/// Add common response headers to every response.
fn add_common_headers(
    mut response: http::Response<ResponseBody>,
    request_id: &str,
) -> http::Response<ResponseBody> {
    let headers = response.headers_mut();

    if let Ok(hv) = HeaderValue::from_str(request_id) {
        headers.insert(REQUEST_ID_HEADER, hv);
    }
    headers.insert("Server", HeaderValue::from_static(SERVER_NAME));

    response
}
