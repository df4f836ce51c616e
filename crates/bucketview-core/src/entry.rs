//! Directory listing entries.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Whether a listing entry is an object or a common prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// An object key.
    File,
    /// A common prefix ("directory").
    Directory,
}

impl EntryKind {
    /// The wire name of this kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "directory",
        }
    }
}

/// One row of a directory listing.
///
/// Serializes to the JSON listing shape: `name`, `type`, and, when present,
/// `size`, `eTag` and `lastModified`. Directory entries never carry a size,
/// tag or timestamp; use [`ObjectEntry::directory`] to build them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectEntry {
    /// Key or common prefix with the queried prefix stripped.
    pub name: String,
    /// File or directory.
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Object size in bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Object ETag, as reported by the store (quotes included).
    #[serde(rename = "eTag", skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    /// Last modification time.
    #[serde(rename = "lastModified", skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
}

impl ObjectEntry {
    /// A directory entry.
    #[must_use]
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Directory,
            size: None,
            etag: None,
            last_modified: None,
        }
    }

    /// A file entry.
    #[must_use]
    pub fn file(
        name: impl Into<String>,
        size: Option<u64>,
        etag: Option<String>,
        last_modified: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File,
            size,
            etag: etag.filter(|e| !e.is_empty()),
            last_modified,
        }
    }

    /// Whether this entry is a directory.
    #[must_use]
    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// An object as reported by one page of a store listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectSummary {
    /// Full object key.
    pub key: String,
    /// Size in bytes.
    pub size: Option<u64>,
    /// ETag.
    pub etag: Option<String>,
    /// Last modification time.
    pub last_modified: Option<DateTime<Utc>>,
}

/// One page of a delimited store listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    /// Full common prefixes, each ending in the delimiter.
    pub common_prefixes: Vec<String>,
    /// Objects directly under the queried prefix.
    pub objects: Vec<ObjectSummary>,
    /// Token for the next page; `None` on the last page.
    pub next_token: Option<String>,
}
