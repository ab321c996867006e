//! The main function for the Bookshelf terminal application
use std::process::ExitCode;

#[allow(clippy::print_stderr, reason = "No other tracing loaded at this point")]
fn main() -> ExitCode {
    // a missing .env file is fine, a broken one is worth mentioning
    if let Err(err) = dotenvy::dotenv() {
        if !err.not_found() {
            eprintln!("Failed to load environment variables: {err}");
        }
    }
    if bookshelf_lib::run() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
