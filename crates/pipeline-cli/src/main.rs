use std::io;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use pipeline_cli::{Cli, Controller};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let invocation = match cli.into_invocation() {
        Ok(invocation) => invocation,
        Err(e) => {
            eprintln!("{e}");
            Cli::command().print_help().ok();
            println!();
            return ExitCode::from(1);
        }
    };

    let stdin = io::stdin();
    let outcome = Controller::run(&invocation.stages, invocation.capacity, stdin.lock(), io::stdout());

    ExitCode::from(outcome.code() as u8)
}
