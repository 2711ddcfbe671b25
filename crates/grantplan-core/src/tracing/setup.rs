//! Tracing initialization.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Initialize logging for the grantplan crates.
///
/// Reads the `GRANTPLAN_LOG` environment variable for per-crate log levels.
/// Format: `GRANTPLAN_LOG=grantplan_engine=debug,grantplan_storage=warn`
///
/// Falls back to `grantplan=info` if `GRANTPLAN_LOG` is not set or is invalid.
/// Output goes to stderr so rendered plans on stdout stay clean.
///
/// Idempotent.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("GRANTPLAN_LOG")
            .unwrap_or_else(|_| EnvFilter::new("grantplan=info"));

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(filter)
            .init();
    });
}
