use std::sync::Arc;

use log::info;
use tokio_util::sync::CancellationToken;

use crate::{
    config::{ConfigError, RunConfig},
    pool::{ConnectError, ExecError, ResourcePool},
    run::{collector::JobSet, dispatcher::dispatch, reporter::RunReporter},
    template::{CompileError, RenderError, Renderer},
};

pub mod collector;
pub mod dispatcher;
pub mod reporter;

/// Everything a run needs, built once at startup.
pub struct RunContext<P, R> {
    pub config: RunConfig,
    pub renderer: Arc<Renderer>,
    pub pool: Arc<P>,
    pub reporter: Arc<R>,
    /// Cancelled on the first job failure, or from outside to interrupt the run.
    pub cancel: CancellationToken,
}

impl<P: ResourcePool, R: RunReporter> RunContext<P, R> {
    pub fn new(config: RunConfig, renderer: Renderer, pool: P, reporter: R) -> Self {
        Self {
            config,
            renderer: Arc::new(renderer),
            pool: Arc::new(pool),
            reporter: Arc::new(reporter),
            cancel: CancellationToken::new(),
        }
    }
}

/// Final state of a single job.
#[derive(Debug)]
pub enum JobOutcome {
    Success,
    Failure(JobError),
    /// The job saw the run's cancellation before finishing.
    Cancelled,
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Success)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Job {job_index} failed: {kind}")]
pub struct JobError {
    pub job_index: usize,
    #[source]
    pub kind: JobErrorKind,
}

#[derive(Debug, thiserror::Error)]
pub enum JobErrorKind {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("Failed to echo command: {0}")]
    Echo(#[from] std::io::Error),
    #[error(transparent)]
    Exec(#[from] ExecError),
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Connect(#[from] ConnectError),
    #[error(transparent)]
    Job(#[from] JobError),
    #[error("A job panicked: {0}")]
    Panicked(#[from] tokio::task::JoinError),
    #[error("Run interrupted")]
    Interrupted,
}

/// Runs every job of `context` and closes the pool.
///
/// Returns the first job failure. The pool is closed only after every job
/// has finished or observed the cancellation, so no checkout is ever
/// outstanding at that point.
pub async fn run<P: ResourcePool, R: RunReporter>(context: RunContext<P, R>) -> Result<(), RunError> {
    let jobs: JobSet = dispatch(&context);
    let result = jobs.collect().await;

    context.reporter.finish(result.is_ok());
    info!("all jobs joined, closing pool");
    context.pool.close().await;

    result
}
