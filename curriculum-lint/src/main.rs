// These Clippy lints are disabled because this is a CLI binary, not a library:
// - print_stdout/print_stderr: CLI tools are expected to print to stdout/stderr for user output.
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;
mod logging;

use std::process::ExitCode;

use clap::Parser;
use curriculum_lint::ExitStatus;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    match cli::run(&cli) {
        Ok(status) => ExitCode::from(status.code()),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(ExitStatus::Fatal.code())
        }
    }
}
