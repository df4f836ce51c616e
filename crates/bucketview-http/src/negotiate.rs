//! Content negotiation for listings.
//!
//! Compares the quality the `Accept` header assigns to `text/html` against
//! `application/json`. HTML is chosen only when its quality is strictly
//! greater; JSON is the default. Wildcard ranges count for neither.

use http::HeaderMap;
use http::header::ACCEPT;
use mime::Mime;

/// Representation of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingFormat {
    /// `text/html; charset=utf-8`
    Html,
    /// `application/json`
    Json,
}

impl ListingFormat {
    /// The `Content-Type` of this representation.
    #[must_use]
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Html => "text/html; charset=utf-8",
            Self::Json => "application/json",
        }
    }
}

/// Pick the listing representation for a request.
///
/// # Examples
///
/// ```
/// use bucketview_http::negotiate::{ListingFormat, negotiate};
///
/// let mut headers = http::HeaderMap::new();
/// headers.insert("accept", "text/html;q=0.5,application/json;q=0.9".parse().unwrap());
/// assert_eq!(negotiate(&headers), ListingFormat::Json);
/// ```
#[must_use]
pub fn negotiate(headers: &HeaderMap) -> ListingFormat {
    let mut html = 0.0_f32;
    let mut json = 0.0_f32;

    let ranges = headers
        .get_all(ACCEPT)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(parse_range);

    for (essence, q) in ranges {
        if essence.eq_ignore_ascii_case("text/html") {
            html = q;
        } else if essence.eq_ignore_ascii_case("application/json") {
            json = q;
        }
    }

    if html > json {
        ListingFormat::Html
    } else {
        ListingFormat::Json
    }
}

/// Parse one media range into its essence and quality.
///
/// Unparseable ranges and out-of-range or malformed `q` values yield `None`.
fn parse_range(range: &str) -> Option<(String, f32)> {
    let mime: Mime = range.trim().parse().ok()?;
    let q = match mime.get_param("q") {
        Some(q) => q.as_str().parse::<f32>().ok().filter(|q| (0.0..=1.0).contains(q))?,
        None => 1.0,
    };
    Some((mime.essence_str().to_owned(), q))
}
