//! Request routing.
//!
//! Only GET and HEAD are served. The URI path is percent-decoded and its
//! leading `/` stripped; an empty path or one ending in `/` is a listing,
//! anything else names an object.

use std::fmt;

use bucketview_core::error::ViewError;
use http::Method;
use percent_encoding::percent_decode_str;

/// What a request asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// List the entries under a prefix (empty for the bucket root).
    Listing {
        /// Decoded prefix, empty or ending in `/`.
        prefix: String,
    },
    /// Object metadata only.
    HeadObject {
        /// Decoded object key.
        key: String,
    },
    /// Object metadata and body.
    GetObject {
        /// Decoded object key.
        key: String,
    },
}

impl Route {
    /// Resolve a method and raw URI path.
    ///
    /// # Examples
    ///
    /// ```
    /// use bucketview_http::router::Route;
    /// use http::Method;
    ///
    /// let route = Route::resolve(&Method::GET, "/docs/").unwrap();
    /// assert_eq!(route, Route::Listing { prefix: "docs/".into() });
    /// assert!(Route::resolve(&Method::POST, "/docs/").is_err());
    /// ```
    pub fn resolve(method: &Method, path: &str) -> Result<Self, ViewError> {
        if *method != Method::GET && *method != Method::HEAD {
            return Err(ViewError::UnsupportedMethod {
                method: method.to_string(),
            });
        }

        let path = decode_path(path);
        let path = path.strip_prefix('/').unwrap_or(&path);

        if path.is_empty() || path.ends_with('/') {
            return Ok(Self::Listing {
                prefix: path.to_owned(),
            });
        }

        let key = path.to_owned();
        if *method == Method::HEAD {
            Ok(Self::HeadObject { key })
        } else {
            Ok(Self::GetObject { key })
        }
    }

    /// The operation name used in logs and error messages.
    #[must_use]
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Listing { .. } => "list S3 objects",
            Self::HeadObject { .. } => "HEAD an S3 object",
            Self::GetObject { .. } => "GET an S3 object",
        }
    }

    /// The decoded prefix or key.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Listing { prefix } => prefix,
            Self::HeadObject { key } | Self::GetObject { key } => key,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Self::Listing { .. } => "listing",
            Self::HeadObject { .. } => "head_object",
            Self::GetObject { .. } => "get_object",
        };
        f.write_str(kind)
    }
}

/// Decode a percent-encoded URI path.
fn decode_path(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}
