//! Response construction.
//!
//! Successful object responses carry the metadata-derived headers. Failures
//! are mapped by kind:
//!
//! | Kind | Status | Body |
//! |------|--------|------|
//! | not modified | 304 | empty, `Content-Length: 0` |
//! | precondition failed | 412 | empty, `Content-Length: 0` |
//! | not found | 404 | `Not found` |
//! | unsupported method | 405 | `{METHOD} requests are not supported` |
//! | anything else | store status or 500 | `Failed to {operation}: {message}` |

use bucketview_core::error::ViewError;
use bucketview_core::metadata::ObjectMetadata;
use http::StatusCode;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderValue};

use crate::body::ResponseBody;
use crate::listing::RenderedListing;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// A `200 OK` object response with metadata headers.
#[must_use]
pub fn object_response(meta: &ObjectMetadata, body: ResponseBody) -> http::Response<ResponseBody> {
    let mut response = http::Response::new(body);
    meta.write_headers(response.headers_mut());
    response
}

/// A `200 OK` listing response.
#[must_use]
pub fn listing_response(listing: RenderedListing) -> http::Response<ResponseBody> {
    let mut response = http::Response::new(ResponseBody::from_bytes(listing.body));
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static(listing.content_type),
    );
    response
}

/// Map a failure of `operation` to its response.
#[must_use]
pub fn error_to_response(err: &ViewError, operation: &str) -> http::Response<ResponseBody> {
    let status = err.status_code();
    match err {
        ViewError::NotModified | ViewError::PreconditionFailed => {
            let mut response = http::Response::new(ResponseBody::empty());
            *response.status_mut() = status;
            response
                .headers_mut()
                .insert(CONTENT_LENGTH, HeaderValue::from_static("0"));
            response
        }
        ViewError::NotFound { .. } => text_response(status, "Not found".to_owned()),
        ViewError::UnsupportedMethod { .. } => text_response(status, err.to_string()),
        ViewError::Forbidden { message }
        | ViewError::TransientStoreError { message, .. }
        | ViewError::UnknownStoreError { message, .. } => {
            text_response(status, format!("Failed to {operation}: {message}"))
        }
    }
}

/// A plain-text response for anything that is not a store outcome.
#[must_use]
pub fn text_response(status: StatusCode, text: String) -> http::Response<ResponseBody> {
    let mut response = http::Response::new(ResponseBody::from_string(text));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN));
    response
        .headers_mut()
        .insert("x-content-type-options", HeaderValue::from_static("nosniff"));
    response
}
