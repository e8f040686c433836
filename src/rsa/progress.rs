use chrono::Duration;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Sink for the attempt counter of long-running searches.
pub trait Progress {
    fn tick(&self, attempts: u64, elapsed: Duration);
    fn done(&self, attempts: u64, elapsed: Duration);
    /// Called instead of `done` when the search is stopped early.
    fn abandon(&self, attempts: u64, elapsed: Duration);
}

pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.num_seconds().max(0);
    format!("{}:{:02}:{:02}", secs / 3600, secs / 60 % 60, secs % 60)
}

/// Writes each report through the `log` facade.
pub struct LogProgress;

impl Progress for LogProgress {
    fn tick(&self, attempts: u64, elapsed: Duration) {
        log::info!("Attempts: {} Time: {}", attempts, format_elapsed(elapsed));
    }

    fn done(&self, attempts: u64, elapsed: Duration) {
        self.tick(attempts, elapsed);
        log::info!("Done!");
    }

    fn abandon(&self, attempts: u64, elapsed: Duration) {
        log::warn!("Stopped after {} attempts in {}", attempts, format_elapsed(elapsed));
    }
}

/// Terminal spinner.
pub struct BarProgress {
    pb: ProgressBar,
}

impl BarProgress {
    pub fn new() -> Self {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}") {
            pb.set_style(style);
        }
        Self { pb }
    }
}

impl Default for BarProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress for BarProgress {
    fn tick(&self, attempts: u64, _elapsed: Duration) {
        self.pb.set_message(format!("{} attempts", attempts));
        self.pb.tick();
    }

    fn done(&self, attempts: u64, elapsed: Duration) {
        self.pb.finish_with_message(format!("{} attempts in {}", attempts, format_elapsed(elapsed)));
    }

    fn abandon(&self, attempts: u64, elapsed: Duration) {
        self.pb.abandon_with_message(format!("stopped after {} attempts in {}", attempts, format_elapsed(elapsed)));
    }
}

pub struct NoProgress;

impl Progress for NoProgress {
    fn tick(&self, _attempts: u64, _elapsed: Duration) {}
    fn done(&self, _attempts: u64, _elapsed: Duration) {}
    fn abandon(&self, _attempts: u64, _elapsed: Duration) {}
}

/// Spinner on an interactive stderr, log lines otherwise, nothing when silent.
pub fn select(silent: bool) -> Box<dyn Progress> {
    if silent {
        Box::new(NoProgress)
    } else if ProgressDrawTarget::stderr().is_hidden() {
        Box::new(LogProgress)
    } else {
        Box::new(BarProgress::new())
    }
}
