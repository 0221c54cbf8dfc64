//! Cover art: fetch an image, normalize it, attach it to the MP3 as ID3 APIC.
//!
//! Linear: fetch → (convert to PNG if webp/heic) → embed into a new
//! `<stem>_cover.mp3`. Temp images live in [`CoverSpec`] and are deleted
//! when it drops, on every exit path.

mod image;

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tempfile::{Builder, TempPath};

use crate::agent::args;
use crate::downloader::{remove_if_exists, RetryingDownloader};
use crate::error::CoverError;
use crate::request::RequestDescriptor;
use crate::url_model::{sibling_with_suffix, unique_path};

pub use image::{CoverSpec, ImageFormat, NormalizedFormat};

/// Runs the transcoding agent to completion; `Err` carries a short reason.
fn run_agent(program: &Path, args: Vec<OsString>) -> Result<(), String> {
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| format!("could not run {}: {}", program.display(), e))?;
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    let last = stderr.lines().rev().find(|l| !l.trim().is_empty()).unwrap_or("");
    if last.is_empty() {
        Err(output.status.to_string())
    } else {
        Err(format!("{}: {}", output.status, last.trim()))
    }
}

/// Embeds cover art through the transcoding agent.
#[derive(Debug, Clone)]
pub struct CoverArtEmbedder {
    ffmpeg: PathBuf,
    temp_dir: Option<PathBuf>,
}

impl CoverArtEmbedder {
    pub fn new(ffmpeg: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            temp_dir: None,
        }
    }

    /// Create temp images under `dir` instead of the system temp dir.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    fn temp_path(&self, ext: &str) -> Result<TempPath, CoverError> {
        let suffix = format!(".{ext}");
        let mut builder = Builder::new();
        builder.prefix("aiod-cover-").suffix(&suffix);
        let file = match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(CoverError::TempFile)?;
        Ok(file.into_temp_path())
    }

    /// Steps 1 and 2: download the image with the request's header/cookie
    /// context and convert it to PNG when needed.
    pub fn prepare(
        &self,
        downloader: &RetryingDownloader,
        image_url: &str,
        request: &RequestDescriptor,
    ) -> Result<CoverSpec, CoverError> {
        let (format, ext) = ImageFormat::from_url(image_url);
        let working_copy = self.temp_path(ext)?;

        tracing::info!(url = image_url, ?format, "downloading cover image");
        let fetched = downloader.download_url(image_url, request, &working_copy);
        if !fetched.succeeded || fetched.byte_size == 0 {
            return Err(CoverError::ImageFetchFailed {
                url: image_url.to_string(),
            });
        }

        let converted = if format.needs_conversion() {
            let png = self.temp_path("png")?;
            tracing::info!(from = ext, "converting cover image to png");
            run_agent(&self.ffmpeg, args::convert_image_to_png(&working_copy, &png))
                .map_err(|reason| CoverError::ImageNormalizeFailed { reason })?;
            Some(png)
        } else {
            None
        };

        Ok(CoverSpec {
            source_url: image_url.to_string(),
            working_copy,
            converted,
            normalized_format: format.normalized(),
        })
    }

    /// Step 3: multiplex the MP3's audio (stream copy) with the cover into a
    /// new file. The input is never modified.
    pub fn attach(&self, mp3: &Path, cover: &CoverSpec) -> Result<PathBuf, CoverError> {
        let output = unique_path(&sibling_with_suffix(mp3, "_cover", "mp3"));
        tracing::info!(mp3 = %mp3.display(), output = %output.display(), "embedding cover");
        let codec = cover.normalized_format.codec();
        if let Err(reason) = run_agent(
            &self.ffmpeg,
            args::embed_cover(mp3, cover.embed_path(), codec, &output),
        ) {
            if let Err(e) = remove_if_exists(&output) {
                tracing::warn!(path = %output.display(), error = %e, "could not delete partial cover output");
            }
            return Err(CoverError::EmbedFailed {
                mp3: mp3.to_path_buf(),
                reason,
            });
        }
        Ok(output)
    }

    /// Fetch, normalize and embed. Returns the new `_cover.mp3` path.
    ///
    /// The pre-embed MP3 is removed only after a successful embed and only
    /// when `keep_original` is false; any failure leaves it in place.
    pub fn embed(
        &self,
        downloader: &RetryingDownloader,
        mp3: &Path,
        image_url: &str,
        request: &RequestDescriptor,
        keep_original: bool,
    ) -> Result<PathBuf, CoverError> {
        let cover = self.prepare(downloader, image_url, request)?;
        let result = self.attach(mp3, &cover);
        drop(cover);

        let output = result?;
        if !keep_original {
            if let Err(e) = remove_if_exists(mp3) {
                tracing::warn!(path = %mp3.display(), error = %e, "could not remove pre-embed mp3");
            }
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downloader::stub::{no_sleep, ScriptedAgent};
    use crate::retry::RetryPolicy;
    use std::fs;
    use tempfile::tempdir;

    fn request() -> RequestDescriptor {
        RequestDescriptor::new("https://cdn.example.com/ep.mp4", vec![], Some("sid=1".into()))
    }

    fn temp_entries(dir: &Path) -> Vec<PathBuf> {
        fs::read_dir(dir).unwrap().map(|e| e.unwrap().path()).collect()
    }

    #[test]
    fn fetch_failure_aborts_and_leaves_no_temp_files() {
        let tmp = tempdir().unwrap();
        let media = tempdir().unwrap();
        let mp3 = media.path().join("ep.mp3");
        fs::write(&mp3, b"mp3").unwrap();

        let downloader = RetryingDownloader::new(
            Box::new(ScriptedAgent::new(vec![None, None, None])),
            RetryPolicy::default(),
        )
        .with_sleep(no_sleep);
        let embedder = CoverArtEmbedder::new("aiod-test-no-such-ffmpeg").with_temp_dir(tmp.path());

        let err = embedder
            .embed(&downloader, &mp3, "https://img.example.com/c.webp", &request(), false)
            .unwrap_err();
        assert!(matches!(err, CoverError::ImageFetchFailed { .. }));
        assert!(temp_entries(tmp.path()).is_empty());
        assert!(mp3.exists());
    }

    #[test]
    fn empty_image_counts_as_fetch_failure() {
        let tmp = tempdir().unwrap();
        let downloader = RetryingDownloader::new(
            Box::new(ScriptedAgent::new(vec![Some(Vec::new())])),
            RetryPolicy::default(),
        )
        .with_sleep(no_sleep);
        let embedder = CoverArtEmbedder::new("aiod-test-no-such-ffmpeg").with_temp_dir(tmp.path());
        let err = embedder
            .prepare(&downloader, "https://img.example.com/c.jpg", &request())
            .unwrap_err();
        assert!(matches!(err, CoverError::ImageFetchFailed { .. }));
        assert!(temp_entries(tmp.path()).is_empty());
    }

    #[test]
    fn normalize_failure_removes_both_temp_files() {
        let tmp = tempdir().unwrap();
        let downloader = RetryingDownloader::new(
            Box::new(ScriptedAgent::new(vec![Some(b"RIFF....WEBP".to_vec())])),
            RetryPolicy::default(),
        )
        .with_sleep(no_sleep);
        let embedder = CoverArtEmbedder::new("aiod-test-no-such-ffmpeg").with_temp_dir(tmp.path());
        let err = embedder
            .prepare(&downloader, "https://img.example.com/c.webp", &request())
            .unwrap_err();
        assert!(matches!(err, CoverError::ImageNormalizeFailed { .. }));
        assert!(temp_entries(tmp.path()).is_empty());
    }

    #[test]
    fn jpeg_is_embedded_without_conversion() {
        let tmp = tempdir().unwrap();
        let downloader = RetryingDownloader::new(
            Box::new(ScriptedAgent::new(vec![Some(vec![0xff, 0xd8, 0xff])])),
            RetryPolicy::default(),
        )
        .with_sleep(no_sleep);
        let embedder = CoverArtEmbedder::new("aiod-test-no-such-ffmpeg").with_temp_dir(tmp.path());
        let spec = embedder
            .prepare(&downloader, "https://img.example.com/c.jpg?size=600", &request())
            .unwrap();
        assert!(spec.converted.is_none());
        assert_eq!(spec.normalized_format, NormalizedFormat::Jpeg);
        assert_eq!(spec.embed_path(), &*spec.working_copy);
        assert!(spec.embed_path().to_string_lossy().ends_with(".jpg"));
        drop(spec);
        assert!(temp_entries(tmp.path()).is_empty());
    }
}
