//! The slice of HAR 1.2 a media capture needs: request URL and headers,
//! response status, headers, redirect target and MIME type.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Archive {
    pub log: ArchiveLog,
}

#[derive(Debug, Deserialize)]
pub struct ArchiveLog {
    #[serde(default)]
    pub entries: Vec<Exchange>,
}

/// One request/response pair from the network log.
#[derive(Debug, Deserialize)]
pub struct Exchange {
    pub request: CapturedRequest,
    pub response: CapturedResponse,
}

#[derive(Debug, Deserialize)]
pub struct CapturedRequest {
    pub url: String,
    #[serde(default)]
    pub headers: Vec<NameValue>,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        lookup(&self.headers, name)
    }

    pub fn is_http(&self) -> bool {
        self.url.starts_with("http://") || self.url.starts_with("https://")
    }
}

#[derive(Debug, Deserialize)]
pub struct CapturedResponse {
    #[serde(default)]
    pub status: u16,
    #[serde(default, rename = "redirectURL")]
    pub redirect_url: Option<String>,
    #[serde(default)]
    pub headers: Vec<NameValue>,
    #[serde(default)]
    pub content: Content,
}

impl CapturedResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        lookup(&self.headers, name)
    }

    /// Where a 301/302/303/307/308 points; `redirectURL` wins over `Location`.
    pub fn redirect_target(&self) -> Option<&str> {
        if !matches!(self.status, 301 | 302 | 303 | 307 | 308) {
            return None;
        }
        self.redirect_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .or_else(|| self.header("Location").map(str::trim))
    }

    /// 200/206 with a declared body length.
    pub fn carries_body(&self) -> bool {
        matches!(self.status, 200 | 206) && self.header("Content-Length").is_some()
    }

    pub fn accepts_byte_ranges(&self) -> bool {
        self.header("Accept-Ranges")
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("bytes"))
    }

    /// Audio or video body, judged by the recorded MIME type.
    pub fn is_media(&self) -> bool {
        let mime = self
            .content
            .mime_type
            .as_deref()
            .or_else(|| self.header("Content-Type"))
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();
        mime.starts_with("audio/") || mime.starts_with("video/")
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Content {
    #[serde(default, rename = "mimeType")]
    pub mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NameValue {
    pub name: String,
    pub value: String,
}

fn lookup<'a>(headers: &'a [NameValue], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case(name))
        .map(|h| h.value.as_str())
}
