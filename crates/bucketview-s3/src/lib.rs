//! Amazon S3 driver for BucketView.
//!
//! [`S3Store`] implements [`ObjectStore`](bucketview_core::store::ObjectStore)
//! on `aws-sdk-s3`: delimited `ListObjectsV2` pages, and `HeadObject` /
//! `GetObject` with the request's preconditions forwarded as the SDK's
//! native conditional parameters. SDK failures become
//! [`StoreError`](bucketview_core::error::StoreError)s carrying the raw HTTP
//! status, so a precondition answered with 304 or 412 is classified like any
//! other store outcome.

mod convert;
mod store;

pub use store::S3Store;
