//! Media duration via the probe agent (`ffprobe`).

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::agent::args::{self, DurationQuery};

/// Parses the probe agent's output: the first line that is a finite,
/// non-negative number.
pub fn parse_duration(stdout: &str) -> Option<f64> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .find_map(|l| l.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
}

/// Media duration lookup. Never fails: an unknown duration is `0.0`.
#[derive(Debug, Clone)]
pub struct MediaProbe {
    program: PathBuf,
}

impl MediaProbe {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn query(&self, input: &Path, query: DurationQuery) -> Option<f64> {
        let output = Command::new(&self.program)
            .args(args::probe_duration(input, query))
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output();
        match output {
            Ok(out) => parse_duration(&String::from_utf8_lossy(&out.stdout)),
            Err(e) => {
                tracing::warn!(error = %e, "could not run probe agent");
                None
            }
        }
    }

    /// Container duration, falling back to stream duration, else `0.0`.
    pub fn duration(&self, input: &Path) -> f64 {
        if let Some(d) = self.query(input, DurationQuery::Format) {
            return d;
        }
        tracing::debug!(input = %input.display(), "no container duration, trying stream duration");
        if let Some(d) = self.query(input, DurationQuery::Stream) {
            return d;
        }
        tracing::warn!(input = %input.display(), "probe failed; duration unknown");
        0.0
    }
}
