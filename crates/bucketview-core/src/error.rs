//! Error types.
//!
//! Two layers:
//!
//! - [`StoreError`] is what an [`ObjectStore`](crate::store::ObjectStore)
//!   collaborator reports: an HTTP-equivalent status (if a response was
//!   received at all), the store's error code, and a message.
//! - [`ViewError`] is the taxonomy the rest of the service works with. The
//!   [`From<StoreError>`] implementation classifies raw store failures, and
//!   [`ViewError::status_code`] maps each kind to the HTTP status a client
//!   sees.
//!
//! # Usage
//!
//! ```
//! use bucketview_core::error::{StoreError, ViewError};
//!
//! let err: ViewError = StoreError::new(Some(412), "precondition failed").into();
//! assert!(matches!(err, ViewError::PreconditionFailed));
//! assert_eq!(err.status_code(), http::StatusCode::PRECONDITION_FAILED);
//! ```

use http::StatusCode;

/// A failure reported by the object store collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct StoreError {
    /// HTTP-equivalent status. `None` when no response was received.
    pub status: Option<u16>,
    /// Store-specific error code (e.g. `NoSuchKey`).
    pub code: Option<String>,
    /// Human-readable message.
    pub message: String,
}

impl StoreError {
    /// Create an error with a status and message.
    #[must_use]
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: None,
            message: message.into(),
        }
    }

    /// Attach the store's error code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// A failure where the store never answered (connection, timeout).
    #[must_use]
    pub fn dispatch(message: impl Into<String>) -> Self {
        Self::new(None, message)
    }
}

/// Every way serving a request can fail.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewError {
    /// A precondition made the store answer "not modified".
    #[error("not modified")]
    NotModified,

    /// A precondition did not hold.
    #[error("precondition failed")]
    PreconditionFailed,

    /// The key or bucket does not exist.
    #[error("not found: {message}")]
    NotFound {
        /// Store message.
        message: String,
    },

    /// The store refused access.
    #[error("access denied: {message}")]
    Forbidden {
        /// Store message.
        message: String,
    },

    /// Network failure, timeout, throttling or a 5xx from the store.
    /// Safe for a caller to retry; never retried here.
    #[error("{message}")]
    TransientStoreError {
        /// Store status, if a response was received.
        status: Option<u16>,
        /// Store message.
        message: String,
    },

    /// Any other store failure.
    #[error("{message}")]
    UnknownStoreError {
        /// Store status, if a response was received.
        status: Option<u16>,
        /// Store error code.
        code: Option<String>,
        /// Store message.
        message: String,
    },

    /// The HTTP method is not GET or HEAD.
    #[error("{method} requests are not supported")]
    UnsupportedMethod {
        /// The rejected method.
        method: String,
    },
}

impl From<StoreError> for ViewError {
    fn from(err: StoreError) -> Self {
        let StoreError {
            status,
            code,
            message,
        } = err;

        match status {
            Some(304) => Self::NotModified,
            Some(412) => Self::PreconditionFailed,
            Some(404) => Self::NotFound { message },
            Some(403) => Self::Forbidden { message },
            None | Some(408 | 429 | 500..=599) => Self::TransientStoreError { status, message },
            Some(_) => Self::UnknownStoreError {
                status,
                code,
                message,
            },
        }
    }
}

impl ViewError {
    /// The HTTP status a client receives for this error.
    ///
    /// Store-originated failures other than 304/404/412 keep the store's
    /// own status when it is a valid client or server error, and fall back
    /// to 500 otherwise.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotModified => StatusCode::NOT_MODIFIED,
            Self::PreconditionFailed => StatusCode::PRECONDITION_FAILED,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::TransientStoreError { status, .. } | Self::UnknownStoreError { status, .. } => {
                native_error_status(*status)
            }
            Self::UnsupportedMethod { .. } => StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    /// The underlying message, without the kind prefix.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::NotFound { message }
            | Self::Forbidden { message }
            | Self::TransientStoreError { message, .. }
            | Self::UnknownStoreError { message, .. } => message.clone(),
            Self::NotModified | Self::PreconditionFailed | Self::UnsupportedMethod { .. } => {
                self.to_string()
            }
        }
    }

    /// Whether a caller at a higher layer may safely retry.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::TransientStoreError { .. })
    }
}

/// Keep a store status if it is a 4xx/5xx, otherwise answer 500.
fn native_error_status(status: Option<u16>) -> StatusCode {
    status
        .and_then(|s| StatusCode::from_u16(s).ok())
        .filter(|s| s.is_client_error() || s.is_server_error())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Convenience result type for service operations.
pub type ViewResult<T> = Result<T, ViewError>;
