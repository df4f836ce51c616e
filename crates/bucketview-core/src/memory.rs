//! In-memory [`ObjectStore`].
//!
//! Keeps objects in a sorted map and answers like S3 does: delimited
//! listings paged by a key budget, MD5 ETags, and preconditions evaluated in
//! RFC 7232 order. Used as the store in tests.

use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{SubsecRound, Utc};
use md5::{Digest, Md5};
use parking_lot::RwLock;

use crate::conditional::{ConditionalRequest, TagCondition, TimeCondition};
use crate::entry::{ListPage, ObjectSummary};
use crate::error::StoreError;
use crate::metadata::ObjectMetadata;
use crate::store::{ObjectBody, ObjectStore};

/// Default number of keys and prefixes per listing page, as in S3.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// Size of the chunks an object body is streamed in.
const CHUNK_SIZE: usize = 64 * 1024;

/// Content type given to objects stored without one.
const DEFAULT_CONTENT_TYPE: &str = "binary/octet-stream";

#[derive(Debug)]
struct StoredObject {
    body: Bytes,
    meta: ObjectMetadata,
}

#[derive(Debug, Default)]
struct Inner {
    objects: BTreeMap<String, StoredObject>,
    failures: HashMap<String, StoreError>,
}

/// A bucket held in memory.
///
/// Clones share the same contents, so a test can keep a handle for
/// mutation after handing the store to a gateway.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
    page_size: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Position a continuation token resumes after.
#[derive(Clone, Copy)]
enum Resume<'a> {
    Prefix(&'a str),
    Key(&'a str),
}

impl MemoryStore {
    /// An empty bucket.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Limit listing pages to `page_size` keys and prefixes (minimum 1).
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Store an object with default metadata.
    pub fn put(&self, key: impl Into<String>, body: impl Into<Bytes>) {
        self.put_with(key, body, ObjectMetadata::default());
    }

    /// Store an object.
    ///
    /// `content_type`, `expires`, `user_metadata` and `version_id` are taken
    /// from `meta`. `last_modified` is taken from `meta` if set, otherwise
    /// it is the current second. Length and ETag are always computed.
    pub fn put_with(&self, key: impl Into<String>, body: impl Into<Bytes>, meta: ObjectMetadata) {
        let body = body.into();
        let key = key.into();
        let meta = ObjectMetadata {
            content_type: meta
                .content_type
                .or_else(|| Some(DEFAULT_CONTENT_TYPE.to_owned())),
            content_length: Some(body.len() as u64),
            etag: Some(compute_etag(&body)),
            last_modified: Some(
                meta.last_modified
                    .unwrap_or_else(Utc::now)
                    .trunc_subsecs(0),
            ),
            ..meta
        };
        tracing::trace!(key = %key, size = body.len(), "stored object");
        self.inner
            .write()
            .objects
            .insert(key, StoredObject { body, meta });
    }

    /// Remove an object. Returns whether it existed.
    pub fn remove(&self, key: &str) -> bool {
        self.inner.write().objects.remove(key).is_some()
    }

    /// Make every operation on `path` fail with `err`.
    ///
    /// `path` is matched exactly against object keys (head, get) and listing
    /// prefixes (list).
    pub fn fail(&self, path: impl Into<String>, err: StoreError) {
        self.inner.write().failures.insert(path.into(), err);
    }

    /// Remove an injected failure.
    pub fn clear_failure(&self, path: &str) {
        self.inner.write().failures.remove(path);
    }

    /// Number of stored objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().objects.len()
    }

    /// Whether the bucket is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().objects.is_empty()
    }

    fn lookup(&self, key: &str, cond: &ConditionalRequest) -> Result<(ObjectMetadata, Bytes), StoreError> {
        let inner = self.inner.read();
        if let Some(err) = inner.failures.get(key) {
            return Err(err.clone());
        }
        let obj = inner.objects.get(key).ok_or_else(|| {
            StoreError::new(Some(404), "The specified key does not exist.").with_code("NoSuchKey")
        })?;
        evaluate_preconditions(&obj.meta, cond)?;
        Ok((obj.meta.clone(), obj.body.clone()))
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list_page(
        &self,
        prefix: &str,
        delimiter: &str,
        token: Option<String>,
    ) -> Result<ListPage, StoreError> {
        let inner = self.inner.read();
        if let Some(err) = inner.failures.get(prefix) {
            return Err(err.clone());
        }

        let resume = token.as_deref().map(decode_token).transpose()?;
        let mut page = ListPage::default();
        let mut count = 0usize;
        let mut last_token: Option<String> = None;

        let from_prefix = (Bound::Included(prefix), Bound::Unbounded);
        for (key, obj) in inner.objects.range::<str, _>(from_prefix) {
            if !key.starts_with(prefix) {
                break;
            }
            match resume {
                Some(Resume::Key(after)) if key.as_str() <= after => continue,
                Some(Resume::Prefix(after)) if key.as_str() <= after || key.starts_with(after) => {
                    continue;
                }
                _ => {}
            }

            let rest = &key[prefix.len()..];
            let common = (!delimiter.is_empty())
                .then(|| rest.find(delimiter))
                .flatten()
                .map(|pos| format!("{prefix}{}{delimiter}", &rest[..pos]));

            if let Some(ref cp) = common {
                if page.common_prefixes.last() == Some(cp) {
                    continue;
                }
            }

            if count == self.page_size {
                page.next_token = last_token;
                return Ok(page);
            }
            count += 1;

            match common {
                Some(cp) => {
                    last_token = Some(format!("P{cp}"));
                    page.common_prefixes.push(cp);
                }
                None => {
                    last_token = Some(format!("K{key}"));
                    page.objects.push(ObjectSummary {
                        key: key.clone(),
                        size: obj.meta.content_length,
                        etag: obj.meta.etag.clone(),
                        last_modified: obj.meta.last_modified,
                    });
                }
            }
        }

        Ok(page)
    }

    async fn head(
        &self,
        key: &str,
        cond: &ConditionalRequest,
    ) -> Result<ObjectMetadata, StoreError> {
        self.lookup(key, cond).map(|(meta, _)| meta)
    }

    async fn get(
        &self,
        key: &str,
        cond: &ConditionalRequest,
    ) -> Result<(ObjectMetadata, ObjectBody), StoreError> {
        let (meta, body) = self.lookup(key, cond)?;
        let chunks: Vec<Result<Bytes, StoreError>> = (0..body.len())
            .step_by(CHUNK_SIZE)
            .map(|start| Ok(body.slice(start..(start + CHUNK_SIZE).min(body.len()))))
            .collect();
        Ok((meta, Box::pin(futures::stream::iter(chunks))))
    }
}

fn decode_token(token: &str) -> Result<Resume<'_>, StoreError> {
    if let Some(p) = token.strip_prefix('P') {
        Ok(Resume::Prefix(p))
    } else if let Some(k) = token.strip_prefix('K') {
        Ok(Resume::Key(k))
    } else {
        Err(StoreError::new(Some(400), "The continuation token provided is incorrect")
            .with_code("InvalidArgument"))
    }
}

/// Quoted hex MD5 of the body, as S3 reports for single-part uploads.
fn compute_etag(body: &[u8]) -> String {
    format!("\"{}\"", hex::encode(Md5::digest(body)))
}

/// Evaluate preconditions in RFC 7232 order.
///
/// `If-Unmodified-Since` only applies without `If-Match`, and
/// `If-Modified-Since` only without `If-None-Match`.
fn evaluate_preconditions(meta: &ObjectMetadata, cond: &ConditionalRequest) -> Result<(), StoreError> {
    let etag = meta.etag.as_deref().unwrap_or_default();

    match cond.tag() {
        Some(TagCondition::Match(v)) if !is_valid_if_match(etag, v) => {
            return Err(precondition_failed());
        }
        Some(TagCondition::NoneMatch(v)) if !is_valid_if_none_match(etag, v) => {
            return Err(not_modified());
        }
        _ => {}
    }

    let Some(modified) = meta.last_modified else {
        return Ok(());
    };
    match cond.time() {
        Some(TimeCondition::UnmodifiedSince(t)) if cond.if_match().is_none() && modified > t => {
            Err(precondition_failed())
        }
        Some(TimeCondition::ModifiedSince(t)) if cond.if_none_match().is_none() && modified <= t => {
            Err(not_modified())
        }
        _ => Ok(()),
    }
}

/// Whether `etag` satisfies an `If-Match` list (`*` matches anything).
fn is_valid_if_match(etag: &str, if_match: &str) -> bool {
    if_match
        .split(',')
        .map(str::trim)
        .any(|candidate| candidate == "*" || normalize_etag(candidate) == normalize_etag(etag))
}

/// Whether `etag` satisfies an `If-None-Match` list, i.e. matches none of it.
fn is_valid_if_none_match(etag: &str, if_none_match: &str) -> bool {
    !is_valid_if_match(etag, if_none_match)
}

/// Strip a weak indicator and surrounding double quotes.
fn normalize_etag(etag: &str) -> &str {
    let etag = etag.strip_prefix("W/").unwrap_or(etag);
    etag.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(etag)
}

fn precondition_failed() -> StoreError {
    StoreError::new(Some(412), "At least one of the pre-conditions you specified did not hold")
        .with_code("PreconditionFailed")
}

fn not_modified() -> StoreError {
    StoreError::new(Some(304), "Not Modified").with_code("NotModified")
}
