//! metaselect binary entry point.

use std::process::ExitCode;

use metaselect::ui::output;

fn main() -> ExitCode {
    match metaselect::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}
