//! Typed facade over an [`ObjectStore`].
//!
//! The gateway follows listing pagination to exhaustion, strips the queried
//! prefix from entry names, and classifies every store failure into a
//! [`ViewError`]. It never retries.

use std::fmt;
use std::sync::Arc;

use crate::conditional::ConditionalRequest;
use crate::entry::ObjectEntry;
use crate::error::{ViewError, ViewResult};
use crate::metadata::ObjectMetadata;
use crate::store::{ObjectBody, ObjectStore};

/// Path delimiter used for directory-style listings.
pub const DELIMITER: &str = "/";

/// Shared, read-only handle to the bucket.
///
/// Cloning is cheap; all clones share the same store.
#[derive(Clone)]
pub struct StoreGateway {
    store: Arc<dyn ObjectStore>,
}

impl fmt::Debug for StoreGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreGateway").finish_non_exhaustive()
    }
}

impl StoreGateway {
    /// Wrap a store.
    #[must_use]
    pub fn new<S: ObjectStore>(store: S) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Wrap an already shared store.
    #[must_use]
    pub fn from_shared(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// List everything directly under `prefix`.
    ///
    /// Common prefixes from all pages come first, then objects from all
    /// pages, each group in store order. Names have `prefix` stripped.
    pub async fn list(&self, prefix: &str) -> ViewResult<Vec<ObjectEntry>> {
        let mut prefixes = Vec::new();
        let mut objects = Vec::new();
        let mut token = None;
        let mut pages = 0usize;

        loop {
            let page = self
                .store
                .list_page(prefix, DELIMITER, token.take())
                .await
                .map_err(ViewError::from)?;
            pages += 1;

            prefixes.extend(page.common_prefixes);
            objects.extend(page.objects);

            match page.next_token {
                Some(next) if !next.is_empty() => token = Some(next),
                _ => break,
            }
        }

        tracing::debug!(
            prefix,
            pages,
            prefixes = prefixes.len(),
            objects = objects.len(),
            "listed prefix"
        );

        let mut entries = Vec::with_capacity(prefixes.len() + objects.len());
        entries.extend(
            prefixes
                .into_iter()
                .map(|p| ObjectEntry::directory(strip_prefix(&p, prefix))),
        );
        entries.extend(objects.into_iter().map(|o| {
            ObjectEntry::file(strip_prefix(&o.key, prefix), o.size, o.etag, o.last_modified)
        }));

        Ok(entries)
    }

    /// Fetch object metadata.
    pub async fn head(&self, key: &str, cond: &ConditionalRequest) -> ViewResult<ObjectMetadata> {
        self.store.head(key, cond).await.map_err(ViewError::from)
    }

    /// Fetch object metadata and a lazily consumed body.
    pub async fn get(
        &self,
        key: &str,
        cond: &ConditionalRequest,
    ) -> ViewResult<(ObjectMetadata, ObjectBody)> {
        self.store.get(key, cond).await.map_err(ViewError::from)
    }
}

fn strip_prefix(name: &str, prefix: &str) -> String {
    name.strip_prefix(prefix).unwrap_or(name).to_owned()
}
