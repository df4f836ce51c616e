//! HTTP-date parsing and formatting.
//!
//! Conditional request headers and the `Expires` / `Last-Modified` response
//! headers all carry HTTP-dates. Three wire formats are accepted on input:
//!
//! - IMF-fixdate (preferred): `Sun, 06 Nov 1994 08:49:37 GMT`
//! - RFC 850 (obsolete): `Sunday, 06-Nov-94 08:49:37 GMT`
//! - ANSI C `asctime()` (obsolete): `Sun Nov  6 08:49:37 1994`
//!
//! Output is always IMF-fixdate.

use chrono::{DateTime, NaiveDateTime, Utc};

/// IMF-fixdate format string.
const IMF_FIXDATE: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// RFC 850 format string.
const RFC_850: &str = "%A, %d-%b-%y %H:%M:%S GMT";

/// ANSI C `asctime()` format string.
const ASCTIME: &str = "%a %b %e %H:%M:%S %Y";

/// Parse an HTTP-date string into a `DateTime<Utc>`.
///
/// Returns `None` when the value matches none of the accepted formats.
///
/// # Examples
///
/// ```
/// use bucketview_core::http_date::parse_http_date;
///
/// let dt = parse_http_date("Sun, 06 Nov 1994 08:49:37 GMT").unwrap();
/// assert_eq!(dt.timestamp(), 784_111_777);
/// assert!(parse_http_date("yesterday").is_none());
/// ```
#[must_use]
pub fn parse_http_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    [IMF_FIXDATE, RFC_850, ASCTIME]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.and_utc())
        .or_else(|| {
            // Some stores emit RFC 2822 with a numeric zone.
            DateTime::parse_from_rfc2822(s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        })
}

/// Format a timestamp as an IMF-fixdate HTTP-date.
///
/// # Examples
///
/// ```
/// use bucketview_core::http_date::{format_http_date, parse_http_date};
///
/// let dt = parse_http_date("Sun, 06 Nov 1994 08:49:37 GMT").unwrap();
/// assert_eq!(format_http_date(&dt), "Sun, 06 Nov 1994 08:49:37 GMT");
/// ```
#[must_use]
pub fn format_http_date(dt: &DateTime<Utc>) -> String {
    dt.format(IMF_FIXDATE).to_string()
}
