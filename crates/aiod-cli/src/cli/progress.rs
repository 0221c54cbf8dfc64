//! Terminal progress bar for the transcode step.

use aiod_core::transcode::ProgressSink;
use indicatif::{ProgressBar, ProgressStyle};

const TEMPLATE: &str =
    "Converting [{elapsed_precise}] [{bar:40.cyan/blue}] {percent:>3}% {msg} ETA:{eta_precise}";

/// Renders transcode progress in milliseconds of media; the message shows
/// seconds done out of the total.
#[derive(Default)]
pub struct BarSink {
    bar: Option<ProgressBar>,
    total_secs: f64,
    shown_secs: f64,
}

impl BarSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn message(&self) -> String {
        format!("{:.1}/{:.1}s", self.shown_secs, self.total_secs)
    }
}

fn millis(secs: f64) -> u64 {
    (secs * 1000.0).round().max(0.0) as u64
}

impl ProgressSink for BarSink {
    fn start(&mut self, total_secs: f64) {
        self.total_secs = total_secs;
        self.shown_secs = 0.0;
        let bar = ProgressBar::new(millis(total_secs));
        let style = ProgressStyle::with_template(TEMPLATE)
            .map(|s| s.progress_chars("=> "))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        bar.set_message(self.message());
        self.bar = Some(bar);
    }

    fn advance(&mut self, delta_secs: f64) {
        self.shown_secs += delta_secs;
        let msg = self.message();
        if let Some(bar) = &self.bar {
            // Past the probed total when the probe under-reported.
            if millis(self.shown_secs) > bar.length().unwrap_or(0) {
                bar.set_length(millis(self.shown_secs));
            }
            bar.set_position(millis(self.shown_secs));
            bar.set_message(msg);
        }
    }

    fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish();
        }
    }
}
