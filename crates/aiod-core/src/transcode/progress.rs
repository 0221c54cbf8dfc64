//! Machine-readable progress from the transcoding agent.
//!
//! `ffmpeg -progress pipe:1` writes `key=value` lines in blocks, each block
//! closed by `progress=continue` or, at the very end, `progress=end`.

use std::io::{self, BufRead};

/// Observer for transcode progress, in seconds of media.
///
/// The CLI renders this as a progress bar; the library never draws anything.
pub trait ProgressSink {
    /// Called once before any `advance`, with the display total (>= 1.0).
    fn start(&mut self, total_secs: f64);
    /// Called with a strictly positive increment.
    fn advance(&mut self, delta_secs: f64);
    /// Called once when the stream is done, successful or not.
    fn finish(&mut self);
}

/// Sink that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn start(&mut self, _total_secs: f64) {}
    fn advance(&mut self, _delta_secs: f64) {}
    fn finish(&mut self) {}
}

/// One classified progress line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProgressLine {
    /// Elapsed output time in seconds.
    OutTime(f64),
    /// `progress=end`.
    End,
    /// Anything else (other keys, `N/A` values, noise).
    Other,
}

/// Classifies a progress line. `out_time_ms` is in microseconds despite its
/// name (long-standing ffmpeg quirk), same as `out_time_us`.
pub fn parse_progress_line(line: &str) -> ProgressLine {
    let line = line.trim();
    let Some((key, value)) = line.split_once('=') else {
        return ProgressLine::Other;
    };
    match key {
        "out_time_ms" | "out_time_us" => match value.trim().parse::<i64>() {
            Ok(us) => ProgressLine::OutTime(us.max(0) as f64 / 1_000_000.0),
            Err(_) => ProgressLine::Other,
        },
        "progress" if value.trim() == "end" => ProgressLine::End,
        _ => ProgressLine::Other,
    }
}

/// Display total for a probed duration: never below one second.
pub fn display_total(probed_secs: f64) -> f64 {
    if probed_secs.is_finite() {
        probed_secs.max(1.0)
    } else {
        1.0
    }
}

/// What the consumer loop observed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSummary {
    /// Highest elapsed time forwarded to the sink.
    pub shown_secs: f64,
    /// Whether the explicit end marker was seen (vs. plain EOF).
    pub saw_end: bool,
}

/// Reads progress lines until `progress=end` or EOF, forwarding monotonic
/// increments to `sink`. Lines that are not valid UTF-8 are skipped.
///
/// Calls `sink.start` first and `sink.finish` last. The reader is borrowed
/// so the caller can keep the pipe open while it waits on the child.
pub fn consume_progress<R: BufRead>(
    reader: &mut R,
    probed_secs: f64,
    sink: &mut dyn ProgressSink,
) -> io::Result<ProgressSummary> {
    sink.start(display_total(probed_secs));
    let mut summary = ProgressSummary {
        shown_secs: 0.0,
        saw_end: false,
    };
    let mut buf = Vec::new();
    let result = loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break Ok(()),
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => break Err(e),
        }
        let Ok(line) = std::str::from_utf8(&buf) else {
            continue;
        };
        match parse_progress_line(line) {
            ProgressLine::OutTime(secs) => {
                let delta = secs - summary.shown_secs;
                if delta > 0.0 {
                    sink.advance(delta);
                    summary.shown_secs = secs;
                }
            }
            ProgressLine::End => {
                summary.saw_end = true;
                break Ok(());
            }
            ProgressLine::Other => {}
        }
    };
    sink.finish();
    result.map(|()| summary)
}
