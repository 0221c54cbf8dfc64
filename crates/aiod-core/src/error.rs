//! Pipeline error taxonomy.
//!
//! Every stage returns one of these; the orchestrator's caller prints
//! [`PipelineError::hint`] and goes back to the prompt loop.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The paste contained no HTTP(S) URL.
    #[error("no URL found in the pasted request")]
    NoUrlFound,

    /// The download agent failed on every attempt.
    #[error("download failed after {attempts} attempt(s): {url}")]
    DownloadFailed { url: String, attempts: u32 },

    /// The agent succeeded but the body is too small to be media.
    #[error("downloaded file is only {size} bytes (minimum {min}): {}", path.display())]
    UndersizedResponse { path: PathBuf, size: u64, min: u64 },

    /// The transcoding agent exited nonzero; the input is kept.
    #[error("ffmpeg failed to convert '{}' to MP3 ({status})", input.display())]
    TranscodeFailed { input: PathBuf, status: ExitStatus },

    /// Cover art could not be attached.
    #[error(transparent)]
    Cover(#[from] CoverError),

    /// Filesystem or process plumbing failed.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        PipelineError::Io {
            context: context.into(),
            source,
        }
    }

    /// Actionable one-liner for the user.
    pub fn hint(&self) -> &'static str {
        match self {
            PipelineError::NoUrlFound => "Paste the full cURL command, including the URL.",
            PipelineError::DownloadFailed { .. } => {
                "Token may be expired. Paste a fresh cURL and try again."
            }
            PipelineError::UndersizedResponse { .. } => {
                "File too small; probably an HTML error page. Paste a fresh cURL."
            }
            PipelineError::TranscodeFailed { .. } => {
                "The original download was kept; you can convert it manually."
            }
            PipelineError::Cover(_) => "The MP3 without cover art was kept.",
            PipelineError::Io { .. } => "Check the download directory and try again.",
        }
    }
}

/// Failures of the cover-art sub-pipeline.
#[derive(Debug, Error)]
pub enum CoverError {
    #[error("image download failed: {url}")]
    ImageFetchFailed { url: String },

    #[error("image conversion to PNG failed ({reason})")]
    ImageNormalizeFailed { reason: String },

    #[error("ffmpeg failed to embed cover art into '{}' ({reason})", mp3.display())]
    EmbedFailed { mp3: PathBuf, reason: String },

    #[error("temporary image file: {0}")]
    TempFile(#[source] std::io::Error),
}
