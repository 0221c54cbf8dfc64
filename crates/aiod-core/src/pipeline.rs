//! One download → validate → transcode → cover run.
//!
//! The pipeline owns no UI. Progress goes through a [`ProgressSink`] and the
//! outcome comes back as a [`RunReport`] or a [`PipelineError`]; the caller
//! prints the hint and decides whether to loop.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::AiodConfig;
use crate::cover::CoverArtEmbedder;
use crate::downloader::{validate, Curl, RetryingDownloader};
use crate::error::{CoverError, PipelineError};
use crate::probe::MediaProbe;
use crate::request::{self, RequestDescriptor};
use crate::transcode::{ContainerKind, MediaAsset, ProgressSink, Transcoder};
use crate::url_model::unique_path;

/// Optional cover-art step of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverRequest {
    pub image_url: String,
    /// Keep the pre-embed MP3 next to the `_cover.mp3`.
    pub keep_original: bool,
}

/// What a successful run produced.
#[derive(Debug)]
pub struct RunReport {
    /// The MP3 without cover art. Removed again when the cover step succeeded
    /// and the original was not kept.
    pub audio_path: PathBuf,
    pub cover_path: Option<PathBuf>,
    /// Set when a cover was requested but could not be attached.
    pub cover_error: Option<CoverError>,
}

impl RunReport {
    /// The file the user should look at.
    pub fn final_path(&self) -> &Path {
        self.cover_path.as_deref().unwrap_or(&self.audio_path)
    }
}

pub struct Pipeline {
    downloader: RetryingDownloader,
    transcoder: Transcoder,
    embedder: CoverArtEmbedder,
    min_media_bytes: u64,
}

impl Pipeline {
    pub fn new(
        downloader: RetryingDownloader,
        transcoder: Transcoder,
        embedder: CoverArtEmbedder,
        min_media_bytes: u64,
    ) -> Self {
        Self {
            downloader,
            transcoder,
            embedder,
            min_media_bytes,
        }
    }

    /// Wires the real agents named in `cfg.tools`.
    pub fn from_config(cfg: &AiodConfig) -> Self {
        let downloader = RetryingDownloader::new(Box::new(Curl::new(&cfg.tools.curl)), cfg.retry.policy());
        let transcoder = Transcoder::new(
            &cfg.tools.ffmpeg,
            MediaProbe::new(&cfg.tools.ffprobe),
            cfg.audio_bitrate.clone(),
        );
        let embedder = CoverArtEmbedder::new(&cfg.tools.ffmpeg);
        Self::new(downloader, transcoder, embedder, cfg.min_media_bytes)
    }

    /// Where the download for `request` will land in `dest_dir`.
    pub fn destination(&self, request: &RequestDescriptor, dest_dir: &Path) -> PathBuf {
        unique_path(&dest_dir.join(request.filename_seed()))
    }

    /// Parses a pasted request and runs it. No agent is invoked when the
    /// paste has no URL.
    pub fn run_text(
        &self,
        raw: &str,
        dest_dir: &Path,
        cover: Option<&CoverRequest>,
        sink: &mut dyn ProgressSink,
    ) -> Result<RunReport, PipelineError> {
        let request = request::parse(raw)?;
        self.run(&request, dest_dir, cover, sink)
    }

    /// Download, validate and (unless already MP3) transcode. Returns the
    /// path of the ready MP3.
    pub fn fetch_audio(
        &self,
        request: &RequestDescriptor,
        dest_dir: &Path,
        sink: &mut dyn ProgressSink,
    ) -> Result<PathBuf, PipelineError> {
        fs::create_dir_all(dest_dir).map_err(|e| {
            PipelineError::io(format!("create download directory {}", dest_dir.display()), e)
        })?;

        let dest = self.destination(request, dest_dir);
        tracing::info!(url = request.url(), dest = %dest.display(), "starting run");

        let result = self.downloader.download(request, &dest);
        let downloaded = validate(result, request.url(), self.min_media_bytes)?;

        let asset = MediaAsset::new(downloaded);
        let audio = match asset.container_kind {
            ContainerKind::Mp3 => {
                tracing::info!(path = %asset.path.display(), "already mp3, skipping transcode");
                asset
            }
            ContainerKind::Raw => self.transcoder.transcode(&asset.path, sink)?,
        };
        tracing::info!(path = %audio.path.display(), "audio ready");
        Ok(audio.path)
    }

    /// Fetches the image with `request`'s header/cookie context and embeds it
    /// into `mp3`. Failures leave `mp3` untouched.
    pub fn attach_cover(
        &self,
        request: &RequestDescriptor,
        mp3: &Path,
        cover: &CoverRequest,
    ) -> Result<PathBuf, CoverError> {
        self.embedder.embed(
            &self.downloader,
            mp3,
            &cover.image_url,
            request,
            cover.keep_original,
        )
    }

    /// [`fetch_audio`](Self::fetch_audio) followed by the optional cover step.
    /// A cover failure is reported in the [`RunReport`], not as an error.
    pub fn run(
        &self,
        request: &RequestDescriptor,
        dest_dir: &Path,
        cover: Option<&CoverRequest>,
        sink: &mut dyn ProgressSink,
    ) -> Result<RunReport, PipelineError> {
        let audio_path = self.fetch_audio(request, dest_dir, sink)?;
        let mut report = RunReport {
            audio_path,
            cover_path: None,
            cover_error: None,
        };

        if let Some(cover) = cover {
            match self.attach_cover(request, &report.audio_path, cover) {
                Ok(path) => {
                    tracing::info!(path = %path.display(), "cover embedded");
                    report.cover_path = Some(path);
                }
                Err(e) => {
                    tracing::error!(error = %e, "cover embed failed; mp3 kept");
                    report.cover_error = Some(e);
                }
            }
        }

        Ok(report)
    }
}
