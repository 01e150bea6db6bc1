//! Process-level tracing setup for the `fq` binary.
//!
//! Filter directives come from `FQ_LOG`, then `RUST_LOG`, and default to
//! `warn`. Both accept full `EnvFilter` syntax, e.g.
//! `FQ_LOG=file_queue_core::queue=debug`.

use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVE: &str = "warn";

static INIT: OnceLock<()> = OnceLock::new();

fn filter_directive() -> String {
    ["FQ_LOG", "RUST_LOG"]
        .into_iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DIRECTIVE.to_string())
}

fn build_filter(directive: &str) -> EnvFilter {
    EnvFilter::try_new(directive).unwrap_or_else(|e| {
        eprintln!("fq: ignoring invalid log filter {directive:?}: {e}");
        EnvFilter::new(DEFAULT_DIRECTIVE)
    })
}

/// Install the stderr subscriber once.
///
/// Queue items go to stdout, so logs stay on stderr where driver scripts
/// will not read them as items. Later calls are no-ops.
pub fn init() {
    INIT.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(build_filter(&filter_directive()))
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init();
    });
}
