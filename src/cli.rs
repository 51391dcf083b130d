use std::path::PathBuf;

use clap::Parser;
use log::{debug, info};

use crate::{
    config::{self, ConnectionSettings, RunConfig},
    pool::PgResourcePool,
    run::{
        self, RunContext, RunError,
        reporter::{ProgressReporter, RunReporter, StdoutReporter},
    },
    signal,
    template::Renderer,
};

/// Render a statement template once per job and run the jobs concurrently
/// against PostgreSQL.
///
/// The template is a handlebars template with the bindings `Parallel`,
/// `Repeat` (also `Count`) and `JobNumber` (zero based),
/// e.g. `SELECT {{JobNumber}};`.
/// Connection settings default to the usual PG* environment variables.
/// The first failing job stops the run.
#[derive(Parser, Debug)]
#[clap(styles = cli_styles::CLAP_STYLES, version, verbatim_doc_comment)]
pub struct Cli {
    /// Template file
    pub file: PathBuf,

    /// Number of pool connections, i.e. jobs executing at once
    #[clap(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    pub parallel: u64,

    /// Number of jobs to run
    #[clap(long, visible_alias = "count", default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    pub repeat: u64,

    /// Print each rendered command
    #[clap(long)]
    pub echo: bool,

    /// Render (and maybe echo) the commands without executing them
    #[clap(long)]
    pub pretend: bool,

    /// Show a progress bar on stderr
    #[clap(long)]
    pub progress: bool,

    #[clap(flatten)]
    pub connection: ConnectionSettings,
}

impl Cli {
    pub fn run_config(&self) -> Result<RunConfig, config::ConfigError> {
        RunConfig {
            parallelism: self.parallel as usize,
            repeat: self.repeat as usize,
            echo: self.echo,
            pretend: self.pretend,
        }
        .validate()
    }
}

/// Exit code for a failed argument parse: help and version are not errors.
pub fn parse_error_exit_code(err: &clap::Error) -> u8 {
    use clap::error::ErrorKind;
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}

/// Exit code for a failed run.
pub fn run_error_exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<RunError>() {
        Some(RunError::Interrupted) => 130,
        _ => 1,
    }
}

pub async fn main(args: &Cli) -> anyhow::Result<()> {
    let config = args.run_config().map_err(RunError::from)?;
    let options = args.connection.connect_options().map_err(RunError::from)?;

    let source = config::load_template(&args.file).map_err(RunError::from)?;
    let name = args.file.display().to_string();
    let renderer = Renderer::compile(&name, &source).map_err(RunError::from)?;
    debug!("compiled template '{name}'");

    let pool = if config.pretend {
        PgResourcePool::open_lazy(options, config.parallelism)
    } else {
        PgResourcePool::open(options, config.parallelism)
            .await
            .map_err(RunError::from)?
    };

    info!(
        "running {} jobs, parallelism {}{}",
        config.repeat,
        config.parallelism,
        if config.pretend { " (pretend)" } else { "" }
    );

    if args.progress {
        let reporter = ProgressReporter::new(config.repeat)?;
        run_with(config, renderer, pool, reporter).await?;
    } else {
        run_with(config, renderer, pool, StdoutReporter).await?;
    }

    Ok(())
}

async fn run_with<R: RunReporter>(
    config: RunConfig,
    renderer: Renderer,
    pool: PgResourcePool,
    reporter: R,
) -> Result<(), RunError> {
    let context = RunContext::new(config, renderer, pool, reporter);
    let interrupt = signal::cancel_on_interrupt(context.cancel.clone());
    let result = run::run(context).await;
    interrupt.abort();
    result
}
