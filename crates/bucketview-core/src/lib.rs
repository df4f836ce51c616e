//! Core of BucketView, a read-only HTTP view over an object storage bucket.
//!
//! This crate holds everything that does not depend on a particular HTTP
//! server or store backend: the data model, conditional request parsing, the
//! metadata-to-header mapping, the error taxonomy, and the gateway that turns
//! raw store pages and failures into listings and typed errors.
//!
//! # Architecture
//!
//! ```text
//! bucketview-http (router, negotiation, rendering)
//!        |
//!        v
//!   StoreGateway (pagination, prefix stripping, classification)
//!        |
//!        v
//!   dyn ObjectStore (S3Store, MemoryStore)
//! ```

pub mod conditional;
pub mod config;
pub mod entry;
pub mod error;
pub mod gateway;
pub mod http_date;
pub mod memory;
pub mod metadata;
pub mod store;

pub use conditional::ConditionalRequest;
pub use config::BucketViewConfig;
pub use entry::{EntryKind, ListPage, ObjectEntry, ObjectSummary};
pub use error::{StoreError, ViewError, ViewResult};
pub use gateway::StoreGateway;
pub use memory::MemoryStore;
pub use metadata::ObjectMetadata;
pub use store::{ObjectBody, ObjectStore};
