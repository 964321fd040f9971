//! rollcall entry point
//!
//! This is a minimal entrypoint that:
//! 1. Parses CLI arguments (via cli::run)
//! 2. Loads configuration and starts the HTTP server (via cli::run)
//! 3. Prints errors to stderr
//! 4. Exits with non-zero on failure

use rollcall::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
