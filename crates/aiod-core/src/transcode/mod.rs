//! Audio transcoding to MP3 with streamed progress.

mod progress;

use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::agent::args;
use crate::downloader::remove_if_exists;
use crate::error::PipelineError;
use crate::probe::MediaProbe;
use crate::url_model::{sibling_with_suffix, unique_path};

pub use progress::{
    consume_progress, display_total, parse_progress_line, NoProgress, ProgressLine, ProgressSink,
    ProgressSummary,
};

/// Container of a media file on disk, judged by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    /// Whatever the server sent (mp4, m4a, aac, ...).
    Raw,
    Mp3,
}

impl ContainerKind {
    pub fn of(path: &Path) -> Self {
        match path.extension() {
            Some(ext) if ext.eq_ignore_ascii_case("mp3") => ContainerKind::Mp3,
            _ => ContainerKind::Raw,
        }
    }
}

/// A media file owned by the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaAsset {
    pub path: PathBuf,
    pub container_kind: ContainerKind,
    /// Probed duration; `0.0` when unknown or not probed.
    pub duration_seconds: f64,
}

impl MediaAsset {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            container_kind: ContainerKind::of(&path),
            path,
            duration_seconds: 0.0,
        }
    }
}

/// Drives the transcoding agent (`ffmpeg`).
#[derive(Debug, Clone)]
pub struct Transcoder {
    ffmpeg: PathBuf,
    probe: MediaProbe,
    bitrate: String,
}

impl Transcoder {
    pub fn new(ffmpeg: impl Into<PathBuf>, probe: MediaProbe, bitrate: impl Into<String>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            probe,
            bitrate: bitrate.into(),
        }
    }

    /// Converts `input` to a CBR MP3 next to it.
    ///
    /// On success the input is deleted and the MP3 asset returned. On agent
    /// failure the input is left untouched, any partial output removed, and
    /// [`PipelineError::TranscodeFailed`] returned.
    pub fn transcode(
        &self,
        input: &Path,
        sink: &mut dyn ProgressSink,
    ) -> Result<MediaAsset, PipelineError> {
        let duration = self.probe.duration(input);
        let output = unique_path(&sibling_with_suffix(input, "", "mp3"));
        tracing::info!(
            input = %input.display(),
            output = %output.display(),
            duration,
            bitrate = %self.bitrate,
            "transcoding to mp3"
        );

        let mut child = Command::new(&self.ffmpeg)
            .args(args::transcode_to_mp3(input, &output, &self.bitrate))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| PipelineError::io("spawn transcoding agent", e))?;

        // Keep the pipe open until the child has exited: closing it early
        // could kill ffmpeg with SIGPIPE on its final progress block.
        let mut stdout = child.stdout.take().map(BufReader::new);
        let summary = match stdout.as_mut() {
            Some(reader) => consume_progress(reader, duration, sink),
            None => {
                sink.start(display_total(duration));
                sink.finish();
                Ok(ProgressSummary {
                    shown_secs: 0.0,
                    saw_end: false,
                })
            }
        };
        let status = child
            .wait()
            .map_err(|e| PipelineError::io("wait for transcoding agent", e))?;
        drop(stdout);

        match summary {
            Ok(s) => tracing::debug!(shown_secs = s.shown_secs, saw_end = s.saw_end, "progress stream done"),
            Err(e) => tracing::warn!(error = %e, "progress stream read failed"),
        }

        if !status.success() {
            if let Err(e) = remove_if_exists(&output) {
                tracing::warn!(path = %output.display(), error = %e, "could not remove partial mp3");
            }
            tracing::error!(input = %input.display(), %status, "transcode failed; input kept");
            return Err(PipelineError::TranscodeFailed {
                input: input.to_path_buf(),
                status,
            });
        }

        if !output.exists() {
            return Err(PipelineError::io(
                format!("transcoding agent produced no file at {}", output.display()),
                std::io::Error::from(std::io::ErrorKind::NotFound),
            ));
        }
        if let Err(e) = remove_if_exists(input) {
            tracing::warn!(path = %input.display(), error = %e, "could not remove transcoded input");
        }

        Ok(MediaAsset {
            path: output,
            container_kind: ContainerKind::Mp3,
            duration_seconds: duration,
        })
    }
}
