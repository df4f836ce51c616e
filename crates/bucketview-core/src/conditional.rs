//! Conditional request headers, resolved into a single value object.
//!
//! A [`ConditionalRequest`] carries two independent axes:
//!
//! - **Tag axis**: `If-Match` or `If-None-Match`. `If-Match` wins when both
//!   are present.
//! - **Time axis**: `If-Modified-Since` or `If-Unmodified-Since`.
//!   `If-Modified-Since` wins when both are present.
//!
//! Both axes are forwarded to the store together. Within an axis only the
//! winning header is ever forwarded, which the types enforce: each axis is a
//! single optional enum rather than a pair of optionals.

use chrono::{DateTime, Utc};
use http::HeaderMap;
use http::header::{IF_MATCH, IF_MODIFIED_SINCE, IF_NONE_MATCH, IF_UNMODIFIED_SINCE};

use crate::http_date::parse_http_date;

/// The entity-tag precondition of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagCondition {
    /// `If-Match`: serve only if the current ETag matches.
    Match(String),
    /// `If-None-Match`: serve only if the current ETag does not match.
    NoneMatch(String),
}

/// The timestamp precondition of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeCondition {
    /// `If-Modified-Since`: serve only if modified after the instant.
    ModifiedSince(DateTime<Utc>),
    /// `If-Unmodified-Since`: serve only if not modified after the instant.
    UnmodifiedSince(DateTime<Utc>),
}

/// Precedence-resolved conditional request headers.
///
/// Constructed once per request by [`ConditionalRequest::from_headers`] and
/// never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionalRequest {
    tag: Option<TagCondition>,
    time: Option<TimeCondition>,
}

impl ConditionalRequest {
    /// A request without any preconditions.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Build a request from already-resolved axes.
    #[must_use]
    pub fn new(tag: Option<TagCondition>, time: Option<TimeCondition>) -> Self {
        Self { tag, time }
    }

    /// Extract and resolve the conditional headers of a request.
    ///
    /// Empty header values count as absent. A timestamp header that is
    /// present but unparseable drops the whole time axis instead of failing
    /// the request; it does not fall back to the other time header.
    ///
    /// # Examples
    ///
    /// ```
    /// use bucketview_core::conditional::ConditionalRequest;
    ///
    /// let mut headers = http::HeaderMap::new();
    /// headers.insert("If-Match", "\"a\"".parse().unwrap());
    /// headers.insert("If-None-Match", "\"b\"".parse().unwrap());
    ///
    /// let cond = ConditionalRequest::from_headers(&headers);
    /// assert_eq!(cond.if_match(), Some("\"a\""));
    /// assert_eq!(cond.if_none_match(), None);
    /// ```
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let tag = if let Some(v) = non_empty_header(headers, &IF_MATCH) {
            Some(TagCondition::Match(v.to_owned()))
        } else {
            non_empty_header(headers, &IF_NONE_MATCH).map(|v| TagCondition::NoneMatch(v.to_owned()))
        };

        let time = if let Some(v) = non_empty_header(headers, &IF_MODIFIED_SINCE) {
            parse_http_date(v).map(TimeCondition::ModifiedSince)
        } else {
            non_empty_header(headers, &IF_UNMODIFIED_SINCE)
                .and_then(parse_http_date)
                .map(TimeCondition::UnmodifiedSince)
        };

        Self { tag, time }
    }

    /// The tag axis, if any.
    #[must_use]
    pub fn tag(&self) -> Option<&TagCondition> {
        self.tag.as_ref()
    }

    /// The time axis, if any.
    #[must_use]
    pub fn time(&self) -> Option<TimeCondition> {
        self.time
    }

    /// The `If-Match` value to forward, if it won the tag axis.
    #[must_use]
    pub fn if_match(&self) -> Option<&str> {
        match &self.tag {
            Some(TagCondition::Match(v)) => Some(v),
            _ => None,
        }
    }

    /// The `If-None-Match` value to forward, if it won the tag axis.
    #[must_use]
    pub fn if_none_match(&self) -> Option<&str> {
        match &self.tag {
            Some(TagCondition::NoneMatch(v)) => Some(v),
            _ => None,
        }
    }

    /// The `If-Modified-Since` instant to forward, if it won the time axis.
    #[must_use]
    pub fn if_modified_since(&self) -> Option<DateTime<Utc>> {
        match self.time {
            Some(TimeCondition::ModifiedSince(t)) => Some(t),
            _ => None,
        }
    }

    /// The `If-Unmodified-Since` instant to forward, if it won the time axis.
    #[must_use]
    pub fn if_unmodified_since(&self) -> Option<DateTime<Utc>> {
        match self.time {
            Some(TimeCondition::UnmodifiedSince(t)) => Some(t),
            _ => None,
        }
    }

    /// Whether the request carries no precondition at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tag.is_none() && self.time.is_none()
    }
}

/// Read a header as a non-empty string.
fn non_empty_header<'a>(headers: &'a HeaderMap, name: &http::HeaderName) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}
