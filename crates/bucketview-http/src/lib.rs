//! HTTP layer of BucketView.
//!
//! Turns requests into gateway calls and gateway results into responses:
//!
//! - [`router`]: method filter and listing/object classification
//! - [`negotiate`]: HTML vs JSON choice for listings
//! - [`listing`]: listing rendering and size/time formatting
//! - [`response`]: metadata headers and the error-to-status mapping
//! - [`body`]: buffered, streaming and empty response bodies
//! - [`service`]: the hyper `Service`
//! - [`server`]: the accept loop with graceful shutdown

pub mod body;
pub mod listing;
pub mod negotiate;
pub mod response;
pub mod router;
pub mod server;
pub mod service;

pub use body::ResponseBody;
pub use server::serve;
pub use service::BucketViewService;
