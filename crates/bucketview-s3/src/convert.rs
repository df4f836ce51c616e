//! Conversions between SDK types and the BucketView data model.

use std::collections::{BTreeMap, HashMap};

use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::DateTime as SmithyDateTime;
use aws_sdk_s3::types::Object;
use bucketview_core::entry::ObjectSummary;
use bucketview_core::error::StoreError;
use bucketview_core::http_date::parse_http_date;
use bucketview_core::metadata::ObjectMetadata;
use chrono::{DateTime, Utc};

/// Convert an SDK timestamp, dropping values chrono cannot represent.
pub(crate) fn to_chrono(dt: &SmithyDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(dt.secs(), dt.subsec_nanos())
}

/// Convert to an SDK timestamp. HTTP-dates have second precision.
pub(crate) fn to_smithy(dt: DateTime<Utc>) -> SmithyDateTime {
    SmithyDateTime::from_secs(dt.timestamp())
}

/// A listed object.
pub(crate) fn summary_from_object(obj: &Object) -> Option<ObjectSummary> {
    Some(ObjectSummary {
        key: obj.key()?.to_owned(),
        size: obj.size().and_then(|s| u64::try_from(s).ok()),
        etag: obj.e_tag().map(ToOwned::to_owned),
        last_modified: obj.last_modified().and_then(to_chrono),
    })
}

/// The metadata fields shared by `HeadObject` and `GetObject` outputs.
#[derive(Debug, Default)]
pub(crate) struct RawMetadata<'a> {
    pub content_type: Option<&'a str>,
    pub content_length: Option<i64>,
    pub etag: Option<&'a str>,
    pub expires: Option<&'a str>,
    pub last_modified: Option<&'a SmithyDateTime>,
    pub user_metadata: Option<&'a HashMap<String, String>>,
    pub version_id: Option<&'a str>,
}

impl RawMetadata<'_> {
    /// Normalize into [`ObjectMetadata`]. Empty strings count as absent and
    /// an unparseable `Expires` is dropped.
    pub(crate) fn into_metadata(self) -> ObjectMetadata {
        ObjectMetadata {
            content_type: non_empty(self.content_type),
            content_length: self.content_length.and_then(|l| u64::try_from(l).ok()),
            etag: non_empty(self.etag),
            expires: self.expires.and_then(parse_http_date),
            last_modified: self.last_modified.and_then(to_chrono),
            user_metadata: self
                .user_metadata
                .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
                .unwrap_or_else(BTreeMap::new),
            version_id: non_empty(self.version_id),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(ToOwned::to_owned)
}

/// Translate an SDK failure into a [`StoreError`].
///
/// The status is that of the raw HTTP response; failures that never got a
/// response (dispatch, timeout, construction) carry no status.
pub(crate) fn store_error<E>(err: &SdkError<E, HttpResponse>) -> StoreError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    let status = err.raw_response().map(|r| r.status().as_u16());
    let message = err
        .message()
        .map_or_else(|| DisplayErrorContext(err).to_string(), ToOwned::to_owned);
    let store_err = StoreError::new(status, message);
    match err.code() {
        Some(code) => store_err.with_code(code),
        None => store_err,
    }
}
