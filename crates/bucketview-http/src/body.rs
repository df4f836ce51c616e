//! Response body types supporting buffered, streaming and empty modes.
//!
//! - **Buffered**: listings, health checks and error messages.
//! - **Streaming**: object bodies, forwarded chunk by chunk from the store.
//! - **Empty**: HEAD responses, 304 and 412.
//!
//! Dropping a streaming body (for example when the client disconnects)
//! drops the store stream with it, which releases the store connection
//! without draining it.

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use bucketview_core::store::ObjectBody;
use bytes::Bytes;
use futures::StreamExt;
use http_body_util::Full;

/// Response body implementing [`http_body::Body`].
#[derive(Default)]
pub enum ResponseBody {
    /// Fully buffered content.
    Buffered(Full<Bytes>),
    /// Object content read lazily from the store.
    Streaming(ObjectBody),
    /// No content.
    #[default]
    Empty,
}

impl fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buffered(full) => f.debug_tuple("Buffered").field(full).finish(),
            Self::Streaming(_) => f.write_str("Streaming"),
            Self::Empty => f.write_str("Empty"),
        }
    }
}

impl ResponseBody {
    /// Create a buffered body from bytes.
    #[must_use]
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self::Buffered(Full::new(data.into()))
    }

    /// Create a buffered body from a UTF-8 string.
    #[must_use]
    pub fn from_string(s: impl Into<String>) -> Self {
        Self::Buffered(Full::new(Bytes::from(s.into())))
    }

    /// Create a streaming body.
    #[must_use]
    pub fn streaming(body: ObjectBody) -> Self {
        Self::Streaming(body)
    }

    /// Create an empty body.
    #[must_use]
    pub fn empty() -> Self {
        Self::Empty
    }
}

impl http_body::Body for ResponseBody {
    type Data = Bytes;
    type Error = std::io::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<http_body::Frame<Self::Data>, Self::Error>>> {
        match self.get_mut() {
            Self::Buffered(full) => Pin::new(full)
                .poll_frame(cx)
                .map_err(|never| match never {}),
            Self::Streaming(stream) => stream.poll_next_unpin(cx).map(|chunk| {
                chunk.map(|res| {
                    res.map(http_body::Frame::data)
                        .map_err(|e| std::io::Error::other(e.message))
                })
            }),
            Self::Empty => Poll::Ready(None),
        }
    }

    fn is_end_stream(&self) -> bool {
        match self {
            Self::Buffered(full) => full.is_end_stream(),
            Self::Streaming(_) => false,
            Self::Empty => true,
        }
    }

    fn size_hint(&self) -> http_body::SizeHint {
        match self {
            Self::Buffered(full) => full.size_hint(),
            Self::Streaming(_) => http_body::SizeHint::default(),
            Self::Empty => http_body::SizeHint::with_exact(0),
        }
    }
}
