//! `harness` binary entry point

use std::process::ExitCode;

fn main() -> ExitCode {
    // Diagnostics go to stderr; stdout is reserved for the report
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .try_init();

    golden_harness::cli::run()
}
