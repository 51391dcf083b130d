use log::debug;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::run::{JobOutcome, RunError};

/// The spawned jobs of a run, each yielding exactly one [`JobOutcome`].
pub struct JobSet {
    jobs: JoinSet<JobOutcome>,
    cancel: CancellationToken,
}

impl JobSet {
    pub fn new(jobs: JoinSet<JobOutcome>, cancel: CancellationToken) -> Self {
        Self { jobs, cancel }
    }

    /// Waits for one outcome per job, failing fast.
    ///
    /// The first failure cancels the remaining jobs. They are still joined
    /// before this returns, but their outcomes are discarded. A cancelled
    /// job seen before any failure means the run was interrupted.
    pub async fn collect(mut self) -> Result<(), RunError> {
        let total = self.jobs.len();
        let mut succeeded = 0;

        while let Some(joined) = self.jobs.join_next().await {
            let error = match joined {
                Ok(JobOutcome::Success) => {
                    succeeded += 1;
                    continue;
                }
                Ok(JobOutcome::Failure(err)) => RunError::Job(err),
                Ok(JobOutcome::Cancelled) => RunError::Interrupted,
                Err(err) => RunError::Panicked(err),
            };
            debug!("stopping after {succeeded}/{total} jobs: {error}");
            self.drain().await;
            return Err(error);
        }

        debug_assert_eq!(succeeded, total);
        Ok(())
    }

    async fn drain(&mut self) {
        self.cancel.cancel();
        while let Some(joined) = self.jobs.join_next().await {
            match joined {
                Ok(JobOutcome::Failure(err)) => debug!("ignored after cancellation: {err}"),
                Ok(_) => {}
                Err(err) => debug!("ignored after cancellation: {err}"),
            }
        }
    }
}
