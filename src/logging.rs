// src/logging.rs
// =============================================================================
// Sets up tracing for the CLI.
//
// Log lines go to stderr so that `--json` output on stdout stays parseable.
// RUST_LOG wins when set; otherwise only our own crate logs at info (or
// debug with --verbose).
// =============================================================================

use tracing_subscriber::EnvFilter;

pub fn init_logging(verbose: bool) {
    let default = if verbose {
        "warn,link_guardian=debug"
    } else {
        "warn,link_guardian=info"
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // try_init: a second call (tests) must not panic
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
