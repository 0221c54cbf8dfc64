//! Filename extraction from URL path.

/// Extracts the last path segment of a URL (query string and fragment
/// stripped) for use as a filename hint.
///
/// Falls back to plain string splitting when the URL does not parse, so a
/// pasted URL the `url` crate rejects still yields its basename.
pub fn filename_from_url_path(url: &str) -> Option<String> {
    let path = match url::Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => {
            let no_query = url.split(['?', '#']).next().unwrap_or("");
            let after_scheme = no_query.split_once("://").map_or(no_query, |(_, rest)| rest);
            match after_scheme.find('/') {
                Some(i) => after_scheme[i..].to_string(),
                None => String::new(),
            }
        }
    };
    let segment = path.split('/').filter(|s| !s.is_empty()).last()?;
    if segment == "." || segment == ".." {
        return None;
    }
    Some(segment.to_string())
}

/// Lowercased extension of the URL's last path segment, if any.
pub fn extension_from_url_path(url: &str) -> Option<String> {
    let name = filename_from_url_path(url)?;
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
