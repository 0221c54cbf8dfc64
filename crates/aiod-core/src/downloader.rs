//! Retrying download through the external download agent.
//!
//! The agent does the HTTP work; this module owns attempts, backoff and the
//! post-download size check.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use crate::agent::args::{self, TransferMode};
use crate::error::PipelineError;
use crate::request::RequestDescriptor;
use crate::retry::{run_with_retry_using, RetryPolicy};

/// One transfer attempt. Implemented by [`Curl`]; tests substitute stubs.
pub trait DownloadAgent {
    /// Fetches `url` into `dest` with the request's headers and cookie.
    /// `Ok(true)` when the agent reported success.
    fn fetch(
        &self,
        url: &str,
        request: &RequestDescriptor,
        dest: &Path,
        mode: TransferMode,
    ) -> io::Result<bool>;
}

/// The `curl` executable.
#[derive(Debug, Clone)]
pub struct Curl {
    program: PathBuf,
}

impl Curl {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl DownloadAgent for Curl {
    fn fetch(
        &self,
        url: &str,
        request: &RequestDescriptor,
        dest: &Path,
        mode: TransferMode,
    ) -> io::Result<bool> {
        let mut cmd = Command::new(&self.program);
        cmd.args(args::download(url, request, dest, mode))
            .stdin(Stdio::null())
            .stdout(Stdio::null());
        if mode == TransferMode::Progress {
            // The progress bar and any error go straight to the terminal.
            let status = cmd.stderr(Stdio::inherit()).status()?;
            if !status.success() {
                tracing::warn!(%status, "download agent failed");
            }
            return Ok(status.success());
        }
        let output = cmd.stderr(Stdio::piped()).output()?;
        if !output.status.success() {
            tracing::warn!(
                status = %output.status,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "download agent failed"
            );
        }
        Ok(output.status.success())
    }
}

/// Transport outcome of a download. Content is not interpreted here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadResult {
    pub path: PathBuf,
    pub byte_size: u64,
    pub succeeded: bool,
    pub attempts: u32,
}

/// Runs the download agent with bounded retries and exponential backoff.
pub struct RetryingDownloader {
    agent: Box<dyn DownloadAgent>,
    policy: RetryPolicy,
    sleep: fn(Duration),
}

impl RetryingDownloader {
    pub fn new(agent: Box<dyn DownloadAgent>, policy: RetryPolicy) -> Self {
        Self {
            agent,
            policy,
            sleep: std::thread::sleep,
        }
    }

    /// Replaces the backoff sleep (tests use a no-op).
    pub fn with_sleep(mut self, sleep: fn(Duration)) -> Self {
        self.sleep = sleep;
        self
    }

    /// Downloads the descriptor's own URL to `dest`, showing transfer
    /// progress.
    pub fn download(&self, request: &RequestDescriptor, dest: &Path) -> DownloadResult {
        self.transfer(request.url(), request, dest, TransferMode::Progress)
    }

    /// Downloads another URL (e.g. cover art) quietly, with the same
    /// header/cookie context as `request`.
    pub fn download_url(&self, url: &str, request: &RequestDescriptor, dest: &Path) -> DownloadResult {
        self.transfer(url, request, dest, TransferMode::Quiet)
    }

    fn transfer(
        &self,
        url: &str,
        request: &RequestDescriptor,
        dest: &Path,
        mode: TransferMode,
    ) -> DownloadResult {
        let outcome = run_with_retry_using(&self.policy, self.sleep, |attempt| {
            tracing::info!(url, attempt = attempt + 1, dest = %dest.display(), ?mode, "download attempt");
            match self.agent.fetch(url, request, dest, mode) {
                Ok(ok) => ok,
                Err(e) => {
                    tracing::warn!(error = %e, "could not run download agent");
                    false
                }
            }
        });

        let byte_size = if outcome.succeeded {
            fs::metadata(dest).map(|m| m.len()).unwrap_or(0)
        } else {
            0
        };
        tracing::info!(
            url,
            succeeded = outcome.succeeded,
            attempts = outcome.attempts,
            byte_size,
            "download finished"
        );
        DownloadResult {
            path: dest.to_path_buf(),
            byte_size,
            succeeded: outcome.succeeded,
            attempts: outcome.attempts,
        }
    }
}

/// Removes a file, treating "already gone" as success.
pub(crate) fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

/// Applies the media-size heuristic to a download result.
///
/// Failed transfers become [`PipelineError::DownloadFailed`]; successful ones
/// under `min_bytes` (typically an HTML error page) become
/// [`PipelineError::UndersizedResponse`]. In both cases the file is deleted.
pub fn validate(result: DownloadResult, url: &str, min_bytes: u64) -> Result<PathBuf, PipelineError> {
    if !result.succeeded {
        if let Err(e) = remove_if_exists(&result.path) {
            tracing::warn!(path = %result.path.display(), error = %e, "could not delete failed download");
        }
        return Err(PipelineError::DownloadFailed {
            url: url.to_string(),
            attempts: result.attempts,
        });
    }
    if result.byte_size < min_bytes {
        if let Err(e) = remove_if_exists(&result.path) {
            tracing::warn!(path = %result.path.display(), error = %e, "could not delete undersized file");
        }
        return Err(PipelineError::UndersizedResponse {
            path: result.path,
            size: result.byte_size,
            min: min_bytes,
        });
    }
    Ok(result.path)
}
