//! Appy catalog CLI entry point
//!
//! Parses arguments, runs the command and prints its JSON response.
//! On failure, prints a JSON error response and exits non-zero.

use appy_catalog::cli;

fn main() {
    if let Err(e) = cli::run() {
        if cli::write_error(e.code_str(), e.message()).is_err() {
            eprintln!("{}", e);
        }
        std::process::exit(1);
    }
}
