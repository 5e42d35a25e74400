//! Progress reporting module

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress reporter for long-running stages
pub struct ProgressReporter {
    progress_bar: Option<ProgressBar>,
    quiet: bool,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new(quiet: bool) -> Self {
        Self {
            progress_bar: None,
            quiet,
        }
    }

    /// Initialize a bar counting `total` units such as "files" or "sentences"
    pub fn init(&mut self, total: u64, unit: &str) {
        if self.quiet {
            return;
        }

        let pb = ProgressBar::new(total);
        let template = format!("[{{elapsed_precise}}] {{bar:40.cyan/blue}} {{pos}}/{{len}} {unit} {{msg}}");
        let style = ProgressStyle::default_bar()
            .template(&template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-");
        pb.set_style(style);
        pb.enable_steady_tick(Duration::from_millis(100));

        self.progress_bar = Some(pb);
    }

    /// Initialize a spinner for work of unknown size
    pub fn spinner(&mut self, message: &str) {
        if self.quiet {
            return;
        }

        let pb = ProgressBar::new_spinner();
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        self.progress_bar = Some(pb);
    }

    /// Replace the bar length once the amount of work is known
    pub fn set_total(&self, total: u64) {
        if let Some(pb) = &self.progress_bar {
            pb.set_length(total);
        }
    }

    /// Advance by one unit, showing `message`
    pub fn advance(&self, message: &str) {
        if let Some(pb) = &self.progress_bar {
            pb.set_message(message.to_string());
            pb.inc(1);
        }
    }

    /// Advance by one unit
    pub fn tick(&self) {
        if let Some(pb) = &self.progress_bar {
            pb.inc(1);
        }
    }

    /// Finish progress reporting
    pub fn finish(&self) {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message("Complete");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_reporter_is_inert() {
        let mut reporter = ProgressReporter::new(true);
        reporter.init(10, "files");
        reporter.spinner("working");
        reporter.advance("a");
        reporter.tick();
        reporter.finish();
        assert!(reporter.progress_bar.is_none());
    }

    #[test]
    fn test_bar_counts_units() {
        let mut reporter = ProgressReporter::new(false);
        reporter.init(2, "sentences");
        reporter.tick();
        reporter.advance("done");
        assert_eq!(reporter.progress_bar.as_ref().map(|pb| pb.position()), Some(2));
        reporter.finish();
    }

    #[test]
    fn test_total_known_later() {
        let mut reporter = ProgressReporter::new(false);
        reporter.init(0, "files");
        reporter.set_total(5);
        assert_eq!(reporter.progress_bar.as_ref().and_then(|pb| pb.length()), Some(5));
    }
}
