use std::process::ExitCode;

use aiod_core::logging;

mod cli;

use crate::cli::CliCommand;

fn main() -> ExitCode {
    // The log file is preferred; stderr keeps the CLI usable when the state
    // dir is not writable.
    if let Err(err) = logging::init_logging() {
        logging::init_logging_stderr();
        tracing::warn!("file logging unavailable, using stderr: {:#}", err);
    }

    match CliCommand::run_from_args() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("aiod error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
