//! URL modeling and filename derivation.
//!
//! Derives the output filename seed from the request URL and picks a
//! destination path that never overwrites an existing file.

mod path;
mod sanitize;

use std::path::{Path, PathBuf};

pub use path::{extension_from_url_path, filename_from_url_path};
pub use sanitize::sanitize_filename;

/// Default filename when the URL path yields nothing usable.
const DEFAULT_FILENAME: &str = "download";

/// Derives the output filename seed from a request URL.
///
/// # Examples
///
/// - `filename_seed("https://host/path/FileGroup1/show_club.mp4?x=1")` → `"show_club.mp4"`
/// - `filename_seed("https://host/a/my-show.m4a")` → `"my_show.m4a"`
pub fn filename_seed(url: &str) -> String {
    let sanitized = filename_from_url_path(url)
        .map(|raw| sanitize_filename(&raw))
        .unwrap_or_default();
    if sanitized.is_empty() || sanitized == "." || sanitized == ".." {
        DEFAULT_FILENAME.to_string()
    } else {
        sanitized
    }
}

/// Returns `path` if nothing exists there, otherwise the first free
/// `<stem>_<n><.ext>` for n = 1, 2, ...
pub fn unique_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }
    let parent = path.parent().unwrap_or_else(|| Path::new(""));
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let mut i = 1u32;
    loop {
        let candidate = parent.join(format!("{stem}_{i}{ext}"));
        if !candidate.exists() {
            return candidate;
        }
        i += 1;
    }
}

/// `<dir>/<stem><suffix>.<ext>`: the sibling path used for derived outputs
/// such as `track.mp3` → `track_cover.mp3`.
pub fn sibling_with_suffix(path: &Path, suffix: &str, ext: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_FILENAME.to_string());
    path.with_file_name(format!("{stem}{suffix}.{ext}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn filename_seed_from_url_path() {
        assert_eq!(
            filename_seed("https://host/path/FileGroup1/show_club.mp4?x=1"),
            "show_club.mp4"
        );
        assert_eq!(filename_seed("https://cdn.example.com/ep-12-final.m4a"), "ep_12_final.m4a");
    }

    #[test]
    fn filename_seed_empty_path_fallback() {
        assert_eq!(filename_seed("https://example.com/"), "download");
        assert_eq!(filename_seed("https://example.com"), "download");
        assert_eq!(filename_seed("https://example.com/.."), "download");
    }

    #[test]
    fn unique_path_returns_input_when_free() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("ep.mp3");
        assert_eq!(unique_path(&p), p);
    }

    #[test]
    fn unique_path_appends_counter() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("ep.mp3");
        fs::write(&p, b"x").unwrap();
        assert_eq!(unique_path(&p), dir.path().join("ep_1.mp3"));

        fs::write(dir.path().join("ep_1.mp3"), b"x").unwrap();
        assert_eq!(unique_path(&p), dir.path().join("ep_2.mp3"));
        assert_eq!(fs::read(&p).unwrap(), b"x");
    }

    #[test]
    fn unique_path_without_extension() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("download");
        fs::write(&p, b"x").unwrap();
        assert_eq!(unique_path(&p), dir.path().join("download_1"));
    }

    #[test]
    fn sibling_suffix() {
        assert_eq!(
            sibling_with_suffix(Path::new("/m/track.mp3"), "_cover", "mp3"),
            PathBuf::from("/m/track_cover.mp3")
        );
        assert_eq!(
            sibling_with_suffix(Path::new("/m/ep.mp4"), "", "mp3"),
            PathBuf::from("/m/ep.mp3")
        );
    }
}
