mod infra;
mod runtime;

use std::process::ExitCode;

fn main() -> ExitCode {
    match runtime::run_from_args() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "hydra-sim failed");
            eprintln!("hydra-sim: {e}");
            ExitCode::FAILURE
        }
    }
}
