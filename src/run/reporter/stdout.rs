use log::debug;

use crate::{
    run::{JobOutcome, reporter::{RunReporter, write_echo}},
    template::RenderedCommand,
};

/// Echoes straight to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutReporter;

impl RunReporter for StdoutReporter {
    fn echo(&self, _job_index: usize, command: &RenderedCommand) -> std::io::Result<()> {
        // one write under the lock, so concurrent echoes never split a block
        write_echo(&mut std::io::stdout().lock(), command)
    }

    fn job_finished(&self, job_index: usize, outcome: &JobOutcome) {
        debug!("job {job_index} finished: {outcome:?}");
    }
}
