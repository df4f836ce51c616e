//! Listing rendering in HTML and JSON.

use std::fmt::Write as _;

use bucketview_core::entry::ObjectEntry;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::negotiate::ListingFormat;

/// Characters escaped in listing links; `/` is kept.
const LINK: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'\'')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Unit prefixes for successive powers of 1000.
const SIZE_PREFIXES: &[u8] = b"kMGTPE";

/// A rendered listing.
#[derive(Debug, Clone)]
pub struct RenderedListing {
    /// Response body.
    pub body: Bytes,
    /// Matching `Content-Type`.
    pub content_type: &'static str,
}

/// Render `entries` of the listing at `path` in the requested format.
///
/// `host` only appears in the HTML title and root header.
pub fn render(
    host: &str,
    path: &str,
    entries: &[ObjectEntry],
    format: ListingFormat,
) -> Result<RenderedListing, serde_json::Error> {
    let body = match format {
        ListingFormat::Json => Bytes::from(serde_json::to_vec(entries)?),
        ListingFormat::Html => Bytes::from(render_html(host, path, entries)),
    };
    Ok(RenderedListing {
        body,
        content_type: format.content_type(),
    })
}

/// Format a byte count with decimal units: `999 B`, `1.0 kB`, `1.5 MB`.
///
/// ```
/// use bucketview_http::listing::format_size;
///
/// assert_eq!(format_size(999), "999 B");
/// assert_eq!(format_size(1000), "1.0 kB");
/// assert_eq!(format_size(1_500_000), "1.5 MB");
/// ```
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_size(bytes: u64) -> String {
    const UNIT: u64 = 1000;
    if bytes < UNIT {
        return format!("{bytes} B");
    }
    let mut div = UNIT;
    let mut exp = 0usize;
    let mut n = bytes / UNIT;
    while n >= UNIT {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }
    format!(
        "{:.1} {}B",
        bytes as f64 / div as f64,
        char::from(SIZE_PREFIXES[exp])
    )
}

/// Format a timestamp as `YYYY-MM-DD HH:MM:SS ZONE`.
#[must_use]
pub fn format_time(t: &DateTime<Utc>) -> String {
    t.format("%Y-%m-%d %H:%M:%S %Z").to_string()
}

/// The listing one level up from `path`: `a/b/` gives `/a/`, `a/` gives `/`.
#[must_use]
pub fn parent_path(path: &str) -> String {
    match path.trim_end_matches('/').rsplit_once('/') {
        Some((parent, _)) => format!("/{parent}/"),
        None => "/".to_owned(),
    }
}

/// Escape text for HTML content and attribute values.
fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn link(path: &str) -> String {
    utf8_percent_encode(path, LINK).to_string()
}

fn render_html(host: &str, path: &str, entries: &[ObjectEntry]) -> String {
    let host = html_escape(host);
    let shown_path = html_escape(path);

    let mut html = String::with_capacity(4096 + entries.len() * 256);
    html.push_str("<!doctype html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(html, "<title>/{shown_path} \u{2022} {host}</title>");
    html.push_str(STYLE);
    html.push_str("</head>\n<body>\n<header>\n<div class=\"container\">\n<h1>\n");

    if path.is_empty() {
        let _ = writeln!(html, "{host}/");
    } else {
        let _ = writeln!(
            html,
            "<a class=\"up\" href=\"{}\" title=\"Parent directory\">&#x2191;</a>",
            link(&parent_path(path))
        );
        let _ = writeln!(html, "/{shown_path}");
    }

    html.push_str("</h1>\n</div>\n</header>\n<main>\n<div class=\"container\">\n");
    html.push_str("<table class=\"listing\">\n");

    for entry in entries {
        let name = html_escape(&entry.name);
        let href = link(&format!("/{path}{}", entry.name));
        let (icon, size, date) = if entry.is_directory() {
            ("&#x1F4C2;", String::new(), String::new())
        } else {
            (
                "",
                entry.size.map(format_size).unwrap_or_default(),
                entry.last_modified.as_ref().map(format_time).unwrap_or_default(),
            )
        };
        let _ = writeln!(
            html,
            "<tr>\
             <td class=\"icon\">{icon}</td>\
             <td class=\"name text\"><a href=\"{href}\">{name}</a></td>\
             <td class=\"size detail text\">{size}</td>\
             <td class=\"date detail text\">{date}</td>\
             </tr>"
        );
    }

    html.push_str("</table>\n</div>\n</main>\n");
    html.push_str("<footer>Served by BucketView.</footer>\n</body>\n</html>\n");
    html
}

const STYLE: &str = r#"<style type="text/css">
html, body { background: white; color: #333; margin: 0; padding: 0; font-family: monospace; }
.container { max-width: 60rem; margin: 0 auto; padding: 0 2rem; }
header { background: #D0EEFE; color: #00A6FB; padding: 1em; }
header h1 { font-size: 1.3rem; margin: 0; font-weight: 400; }
header .up { display: inline-block; margin-left: -28px; width: 24px; text-decoration: none; }
main { margin: 2rem 0; }
a:link, a:visited { color: #00A6FB; }
table.listing { box-sizing: border-box; width: 100%; margin: 0 0 0 -28px; padding: 0; border: none; border-collapse: collapse; border-spacing: 0; empty-cells: show; }
td.icon { width: 28px; vertical-align: middle; }
td.text { padding: 4px 0; vertical-align: middle; }
td.name { font-weight: 300; }
td.detail { color: #666; font-weight: 200; font-size: 0.9em; }
td.size { width: 8em; padding-right: 2em; text-align: right; }
td.date { width: 16em; }
footer { color: #666; font-weight: 300; font-size: 0.85rem; margin: 2em 0; text-align: center; }
</style>
"#;
