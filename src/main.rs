//! clusterward CLI entry point
//!
//! Parses arguments and dispatches via `cli::run`. On failure the error is
//! printed as a JSON response on stdout and as text on stderr, and the
//! process exits non-zero.

use clusterward::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        if let Err(write_err) = cli::write_error(e.code_str(), e.message()) {
            eprintln!("failed to write error response: {}", write_err);
        }
        std::process::exit(1);
    }
}
