//! Request descriptor: the URL, headers and cookie of a pasted `curl` capture.
//!
//! Browsers export a request as a `curl` command ("Copy as cURL"). The parser
//! pulls out the first HTTP(S) URL, every `-H` header and the `-b` cookie.
//! Range headers are dropped and replaced by `Range: bytes=0-` so the agent
//! always fetches the whole file.

mod paste;
mod tokenize;

use regex::Regex;
use std::sync::OnceLock;

use crate::error::PipelineError;
use crate::url_model;

pub use paste::{collect_paste, is_quit, Paste, QUIT_SENTINEL};
pub use tokenize::{join_lines, tokenize};

/// Header appended to every request; supersedes any pasted Range header.
pub const FULL_RANGE_HEADER: (&str, &str) = ("Range", "bytes=0-");

/// One request header, kept in paste order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Parses `name: value`; `None` when there is no colon or the name is empty.
    pub fn parse(raw: &str) -> Option<Self> {
        let (name, value) = raw.split_once(':')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some(Self::new(name, value.trim()))
    }

    fn is_range(&self) -> bool {
        self.name.eq_ignore_ascii_case("range")
    }

    /// `Name: value`, as handed to the download agent.
    pub fn line(&self) -> String {
        format!("{}: {}", self.name, self.value)
    }
}

/// Parsed representation of a pasted authenticated download request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    url: String,
    headers: Vec<Header>,
    cookie: Option<String>,
}

impl RequestDescriptor {
    /// Builds a descriptor, dropping any Range header and appending the
    /// full-range header last.
    pub fn new(url: impl Into<String>, headers: Vec<Header>, cookie: Option<String>) -> Self {
        let mut headers: Vec<Header> = headers.into_iter().filter(|h| !h.is_range()).collect();
        headers.push(Header::new(FULL_RANGE_HEADER.0, FULL_RANGE_HEADER.1));
        Self {
            url: url.into(),
            headers,
            cookie: cookie.filter(|c| !c.is_empty()),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    pub fn cookie(&self) -> Option<&str> {
        self.cookie.as_deref()
    }

    /// Headers as `Name: value` lines.
    pub fn header_lines(&self) -> Vec<String> {
        self.headers.iter().map(Header::line).collect()
    }

    /// Sanitized output filename derived from the URL.
    pub fn filename_seed(&self) -> String {
        url_model::filename_seed(&self.url)
    }
}

fn url_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"https?://[^\s"'\\]+"#).expect("valid URL regex"))
}

/// Parses pasted lines (as returned by [`collect_paste`]).
pub fn parse_lines<S: AsRef<str>>(lines: &[S]) -> Result<RequestDescriptor, PipelineError> {
    parse_buffer(&join_lines(lines.iter().map(|l| l.as_ref())))
}

/// Parses raw pasted text (may span several lines).
pub fn parse(raw: &str) -> Result<RequestDescriptor, PipelineError> {
    parse_buffer(&join_lines(raw.lines()))
}

fn parse_buffer(buffer: &str) -> Result<RequestDescriptor, PipelineError> {
    let url = url_pattern()
        .find(buffer)
        .map(|m| m.as_str().to_string())
        .ok_or(PipelineError::NoUrlFound)?;

    let tokens = tokenize(buffer);
    let headers: Vec<Header> = tokenize::flag_values(&tokens, "-H", "--header")
        .into_iter()
        .filter_map(|raw| {
            let parsed = Header::parse(raw);
            if parsed.is_none() {
                tracing::debug!(header = raw, "ignoring header without name");
            }
            parsed
        })
        .collect();
    let cookie = tokenize::flag_values(&tokens, "-b", "--cookie")
        .into_iter()
        .next()
        .map(str::to_string);

    let descriptor = RequestDescriptor::new(url, headers, cookie);
    tracing::debug!(
        url = descriptor.url(),
        headers = descriptor.headers().len(),
        cookie = descriptor.cookie().is_some(),
        "parsed request descriptor"
    );
    Ok(descriptor)
}
