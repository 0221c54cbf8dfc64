//! Pick the media request out of a HAR capture.

use anyhow::{bail, Context, Result};
use std::path::Path;

use crate::request::{Header, RequestDescriptor};

use super::parse::{Archive, Exchange};

/// Request headers never copied from the capture: the agent computes them,
/// or the descriptor carries them separately (Cookie, Range).
const SKIPPED_HEADERS: &[&str] = &["cookie", "range", "host", "content-length", "connection"];

/// Resolves a HAR file to the descriptor of its media request.
///
/// Candidates are entries whose response carries a body (200/206 with
/// Content-Length). Among them an audio/video MIME type wins, then 206, then
/// `Accept-Ranges: bytes`, then the latest entry. Without candidates the
/// redirect chain from the first entry is followed to its end.
///
/// Request headers are kept in capture order, minus HTTP/2 pseudo-headers and
/// [`SKIPPED_HEADERS`]. With `include_cookies` the `Cookie` header becomes the
/// descriptor's cookie.
pub fn resolve_har(path: &Path, include_cookies: bool) -> Result<RequestDescriptor> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("read HAR file: {}", path.display()))?;
    let archive: Archive = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse HAR JSON: {}", path.display()))?;

    let entries = archive.log.entries;
    if entries.is_empty() {
        bail!("HAR file has no entries");
    }

    let index = best_media_entry(&entries).unwrap_or_else(|| end_of_redirect_chain(&entries));
    let entry = &entries[index];
    if !entry.request.is_http() {
        bail!("HAR entry is not an HTTP(S) request: {}", entry.request.url);
    }

    let headers = entry
        .request
        .headers
        .iter()
        .filter(|h| !h.name.starts_with(':'))
        .filter(|h| !SKIPPED_HEADERS.iter().any(|s| h.name.eq_ignore_ascii_case(s)))
        .map(|h| Header::new(h.name.trim(), h.value.trim()))
        .collect();
    let cookie = include_cookies
        .then(|| entry.request.header("Cookie").map(str::to_string))
        .flatten();

    tracing::debug!(url = %entry.request.url, index, cookies = include_cookies, "resolved HAR entry");
    Ok(RequestDescriptor::new(entry.request.url.clone(), headers, cookie))
}

fn best_media_entry(entries: &[Exchange]) -> Option<usize> {
    entries
        .iter()
        .enumerate()
        .filter(|(_, e)| e.response.carries_body())
        .max_by_key(|(i, e)| {
            (
                e.response.is_media(),
                e.response.status == 206,
                e.response.accepts_byte_ranges(),
                *i,
            )
        })
        .map(|(i, _)| i)
}

/// Follows redirects starting at the first entry; the last entry requesting
/// the final URL, or the first entry if none does.
fn end_of_redirect_chain(entries: &[Exchange]) -> usize {
    let mut target = entries[0].request.url.as_str();
    for entry in entries {
        if entry.request.url != target {
            continue;
        }
        if let Some(next) = entry.response.redirect_target() {
            target = next;
        }
    }
    entries
        .iter()
        .rposition(|e| e.request.url == target)
        .unwrap_or(0)
}
