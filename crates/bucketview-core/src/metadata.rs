//! Object metadata and its mapping to and from HTTP response headers.
//!
//! Absence is always signalled by omitting a header, never by an empty
//! value. `Content-Length` is tri-state: `Some(0)` emits `0`, `None` emits
//! nothing.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use http::header::{CONTENT_LENGTH, CONTENT_TYPE, ETAG, EXPIRES, LAST_MODIFIED};
use http::{HeaderMap, HeaderName, HeaderValue};

use crate::http_date::{format_http_date, parse_http_date};

/// Prefix of user-defined metadata headers.
pub const META_PREFIX: &str = "x-amz-meta-";

/// Header carrying the object version id.
pub const VERSION_ID_HEADER: &str = "x-amz-version-id";

/// Metadata of a single object, as returned by a head or get.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectMetadata {
    /// MIME type.
    pub content_type: Option<String>,
    /// Body length in bytes.
    pub content_length: Option<u64>,
    /// Entity tag, quotes included.
    pub etag: Option<String>,
    /// `Expires` instant.
    pub expires: Option<DateTime<Utc>>,
    /// Last modification time.
    pub last_modified: Option<DateTime<Utc>>,
    /// User-defined metadata, keyed without the `x-amz-meta-` prefix.
    pub user_metadata: BTreeMap<String, String>,
    /// Object version id.
    pub version_id: Option<String>,
}

impl ObjectMetadata {
    /// Map this metadata to response headers, in a stable order.
    ///
    /// User metadata keys are lowercased. When two keys collide after
    /// lowercasing only the first (in key order) is emitted. Values that are
    /// not valid header values are skipped.
    #[must_use]
    pub fn to_headers(&self) -> Vec<(HeaderName, HeaderValue)> {
        let mut headers: Vec<(HeaderName, HeaderValue)> = Vec::new();

        push_str(&mut headers, CONTENT_TYPE, self.content_type.as_deref());
        if let Some(len) = self.content_length {
            headers.push((CONTENT_LENGTH, HeaderValue::from(len)));
        }
        push_str(
            &mut headers,
            ETAG,
            self.etag.as_deref().filter(|e| !e.is_empty()),
        );
        if let Some(ref t) = self.expires {
            push_str(&mut headers, EXPIRES, Some(&format_http_date(t)));
        }
        if let Some(ref t) = self.last_modified {
            push_str(&mut headers, LAST_MODIFIED, Some(&format_http_date(t)));
        }

        for (key, value) in &self.user_metadata {
            let name = format!("{META_PREFIX}{}", key.to_ascii_lowercase());
            let Ok(name) = HeaderName::from_bytes(name.as_bytes()) else {
                tracing::debug!(key = %key, "skipping user metadata with invalid header name");
                continue;
            };
            if headers.iter().any(|(n, _)| *n == name) {
                continue;
            }
            push_str(&mut headers, name, Some(value));
        }

        if let Some(ref version_id) = self.version_id {
            push_str(
                &mut headers,
                HeaderName::from_static(VERSION_ID_HEADER),
                Some(version_id.as_str()).filter(|v| !v.is_empty()),
            );
        }

        headers
    }

    /// Append the mapped headers to a header map.
    pub fn write_headers(&self, map: &mut HeaderMap) {
        for (name, value) in self.to_headers() {
            map.insert(name, value);
        }
    }

    /// Recover metadata from response headers; the inverse of
    /// [`ObjectMetadata::to_headers`].
    ///
    /// Unparseable `Content-Length` or dates are treated as absent.
    #[must_use]
    pub fn from_headers(map: &HeaderMap) -> Self {
        let user_metadata = map
            .iter()
            .filter_map(|(name, value)| {
                let key = name.as_str().strip_prefix(META_PREFIX)?;
                Some((key.to_owned(), value.to_str().ok()?.to_owned()))
            })
            .collect();

        Self {
            content_type: header_string(map, CONTENT_TYPE.as_str()),
            content_length: header_string(map, CONTENT_LENGTH.as_str()).and_then(|v| v.parse().ok()),
            etag: header_string(map, ETAG.as_str()),
            expires: header_string(map, EXPIRES.as_str()).and_then(|v| parse_http_date(&v)),
            last_modified: header_string(map, LAST_MODIFIED.as_str())
                .and_then(|v| parse_http_date(&v)),
            user_metadata,
            version_id: header_string(map, VERSION_ID_HEADER),
        }
    }
}

/// Push a header if the value is present and valid.
fn push_str(headers: &mut Vec<(HeaderName, HeaderValue)>, name: HeaderName, value: Option<&str>) {
    if let Some(v) = value {
        if let Ok(hv) = HeaderValue::from_str(v) {
            headers.push((name, hv));
        }
    }
}

/// Read a header as a non-empty owned string.
fn header_string(map: &HeaderMap, name: &str) -> Option<String> {
    map.get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(ToOwned::to_owned)
}
