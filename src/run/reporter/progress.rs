use std::sync::atomic::{AtomicUsize, Ordering};

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    run::{JobOutcome, reporter::{RunReporter, write_echo}},
    template::RenderedCommand,
};

/// Shows a progress bar on stderr, echoed commands are printed above it.
pub struct ProgressReporter {
    bar: ProgressBar,
    failed: AtomicUsize,
}

impl ProgressReporter {
    pub fn new(jobs: usize) -> anyhow::Result<Self> {
        let bar = ProgressBar::new(jobs as u64);
        bar.set_style(ProgressStyle::with_template("[{elapsed_precise}] [{bar:40.green/white}] {pos:>7}/{len:7} {msg}")?
            .progress_chars("=>-"));
        Ok(Self {
            bar,
            failed: AtomicUsize::new(0),
        })
    }
}

impl RunReporter for ProgressReporter {
    fn echo(&self, _job_index: usize, command: &RenderedCommand) -> std::io::Result<()> {
        self.bar.suspend(|| write_echo(&mut std::io::stdout().lock(), command))
    }

    fn job_finished(&self, job_index: usize, outcome: &JobOutcome) {
        self.bar.inc(1);
        match outcome {
            JobOutcome::Success => self.bar.set_message(format!("job #{job_index} done")),
            JobOutcome::Failure(_) => {
                let failed = self.failed.fetch_add(1, Ordering::Relaxed) + 1;
                self.bar.set_message(format!("{failed} failed").red().to_string());
            }
            JobOutcome::Cancelled => self.bar.set_message("cancelling...".yellow().to_string()),
        }
    }

    fn finish(&self, succeeded: bool) {
        if succeeded {
            self.bar.finish_with_message("All jobs completed".green().to_string());
        } else {
            self.bar.abandon();
        }
    }
}
