//! The object store collaborator interface.
//!
//! An [`ObjectStore`] exposes one page of a delimited listing at a time plus
//! conditional metadata and body reads. Pagination, prefix stripping and
//! error classification live in [`StoreGateway`](crate::gateway::StoreGateway),
//! so implementations stay thin translations of their backend's API.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

use crate::conditional::ConditionalRequest;
use crate::entry::ListPage;
use crate::error::StoreError;
use crate::metadata::ObjectMetadata;

/// A lazily consumed, single-pass object body.
///
/// Dropping the stream before it is exhausted must release the underlying
/// connection without draining it.
pub type ObjectBody = BoxStream<'static, Result<Bytes, StoreError>>;

/// Read-only access to a single bucket.
///
/// Implementations must be safe to share across concurrently handled
/// requests without external locking.
#[async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    /// Fetch one page of keys under `prefix`, grouped by `delimiter`.
    ///
    /// `token` is `None` for the first page and the previous page's
    /// `next_token` afterwards.
    async fn list_page(
        &self,
        prefix: &str,
        delimiter: &str,
        token: Option<String>,
    ) -> Result<ListPage, StoreError>;

    /// Fetch object metadata, evaluating the preconditions in `cond`.
    async fn head(&self, key: &str, cond: &ConditionalRequest)
    -> Result<ObjectMetadata, StoreError>;

    /// Fetch object metadata and body, evaluating the preconditions in `cond`.
    async fn get(
        &self,
        key: &str,
        cond: &ConditionalRequest,
    ) -> Result<(ObjectMetadata, ObjectBody), StoreError>;
}
