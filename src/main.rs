use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use ppg::cli::{self, Cli};

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let args = match Cli::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            return ExitCode::from(cli::parse_error_exit_code(&err));
        }
    };

    match cli::main(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            ExitCode::from(cli::run_error_exit_code(&err))
        }
    }
}
