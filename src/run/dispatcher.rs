use std::sync::Arc;

use log::{debug, trace};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::{
    pool::ResourcePool,
    run::{JobError, JobErrorKind, JobOutcome, RunContext, collector::JobSet, reporter::RunReporter},
    template::{JobContext, Renderer},
};

/// Spawns one task per job and returns without waiting for them.
///
/// Spawning is unbounded, only [`ResourcePool::execute`] limits how many
/// jobs do remote work at once.
pub fn dispatch<P: ResourcePool, R: RunReporter>(context: &RunContext<P, R>) -> JobSet {
    let mut jobs = JoinSet::new();
    for job_index in 0..context.config.repeat {
        let job = Job {
            context: context.config.job_context(job_index),
            echo: context.config.echo,
            pretend: context.config.pretend,
            renderer: Arc::clone(&context.renderer),
            pool: Arc::clone(&context.pool),
            reporter: Arc::clone(&context.reporter),
            cancel: context.cancel.clone(),
        };
        jobs.spawn(job.run());
    }
    debug!("dispatched {} jobs", context.config.repeat);
    JobSet::new(jobs, context.cancel.clone())
}

/// How a job that did not fail came to an end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Finished {
    Executed,
    Skipped,
    Cancelled,
}

struct Job<P, R> {
    context: JobContext,
    echo: bool,
    pretend: bool,
    renderer: Arc<Renderer>,
    pool: Arc<P>,
    reporter: Arc<R>,
    cancel: CancellationToken,
}

impl<P: ResourcePool, R: RunReporter> Job<P, R> {
    async fn run(self) -> JobOutcome {
        let job_index = self.context.job_index;
        let outcome = match self.process().await {
            Ok(Finished::Executed | Finished::Skipped) => JobOutcome::Success,
            Ok(Finished::Cancelled) => JobOutcome::Cancelled,
            Err(kind) => JobOutcome::Failure(JobError { job_index, kind }),
        };
        self.reporter.job_finished(job_index, &outcome);
        outcome
    }

    /// render -> echo -> execute, checking for cancellation before each step
    async fn process(&self) -> Result<Finished, JobErrorKind> {
        let job_index = self.context.job_index;

        if self.cancel.is_cancelled() {
            return Ok(Finished::Cancelled);
        }
        let command = self.renderer.render(&self.context)?;
        if log::log_enabled!(log::Level::Trace) {
            let bindings = serde_json::to_string(&self.context).unwrap_or_default();
            trace!("job {job_index}: bindings {bindings}, command {command:?}");
        }

        if self.echo {
            if self.cancel.is_cancelled() {
                return Ok(Finished::Cancelled);
            }
            self.reporter.echo(job_index, &command)?;
        }

        if self.pretend {
            debug!("job {job_index}: pretend, not executing");
            return Ok(Finished::Skipped);
        }

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                debug!("job {job_index}: cancelled");
                Ok(Finished::Cancelled)
            }
            result = self.pool.execute(&command) => {
                result?;
                debug!("job {job_index}: executed");
                Ok(Finished::Executed)
            }
        }
    }
}
