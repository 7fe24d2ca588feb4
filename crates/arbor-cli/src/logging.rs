#![forbid(unsafe_code)]

//! Log output for the binary.
//!
//! Events go to stderr so stdout stays parseable with `--json`. The filter
//! comes from `RUST_LOG` and defaults to warnings only.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn";

/// Install the global subscriber. A second call is a no-op.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}
