//! Logging and tracing configuration
//!
//! The runner prints check results on stdout; tracing carries the
//! per-invocation detail (commands sent, exit statuses) on stderr.

use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Initialize tracing for the runner binary
///
/// Log level is controlled by `RUST_LOG`. Default is INFO for this crate,
/// WARN for dependencies.
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("smoke=info,stemcell_smoke=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}
