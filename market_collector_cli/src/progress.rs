//! Download progress bar.

use indicatif::{ProgressBar, ProgressStyle};
use market_collector_lib::{DownloadObserver, InstrumentOutcome, Ticker};

/// Drives an `indicatif` bar from per-instrument download events.
pub struct ProgressObserver {
    pb: ProgressBar,
    ok: usize,
    failed: usize,
}

impl ProgressObserver {
    pub fn new() -> Self {
        Self::with_bar(ProgressBar::new(0))
    }

    pub fn with_bar(pb: ProgressBar) -> Self {
        Self { pb, ok: 0, failed: 0 }
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl DownloadObserver for ProgressObserver {
    fn on_start(&mut self, total: usize) {
        self.pb.set_length(total as u64);
        if let Ok(style) = ProgressStyle::with_template(
            "[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} ({eta}) {msg}",
        ) {
            self.pb.set_style(style);
        }
        self.pb.set_message("downloading...");
    }

    fn on_instrument(&mut self, ticker: &Ticker, outcome: &InstrumentOutcome) {
        match outcome {
            InstrumentOutcome::Rows(_) => self.ok += 1,
            InstrumentOutcome::Failed(reason) => {
                self.failed += 1;
                self.pb.println(format!("  {} failed: {}", ticker, reason));
            }
        }
        self.pb.set_message(format!("{} ok, {} err", self.ok, self.failed));
        self.pb.inc(1);
    }

    fn on_finish(&mut self) {
        self.pb.finish_with_message(format!(
            "Done: {} ok, {} failed",
            self.ok, self.failed
        ));
    }
}
