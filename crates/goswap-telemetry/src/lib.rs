//! Logging and timing for goswap.
//!
//! Log output is filtered through `RUST_LOG`, falling back to `goswap=warn`
//! (or `goswap=debug` in verbose mode). Setting `GOSWAP_LOG_JSON` switches to
//! JSON lines with span timings.

use goswap_core::EnvVars;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    prelude::*,
};

/// Initialize the tracing subscriber.
pub fn init(verbose: bool) {
    let subscriber = tracing_subscriber::registry().with(env_filter(verbose));

    if std::env::var(EnvVars::GOSWAP_LOG_JSON).is_ok() {
        let json_layer = fmt::layer()
            .json()
            .with_span_events(FmtSpan::CLOSE)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_writer(std::io::stderr);

        subscriber.with(json_layer).init();
    } else {
        let fmt_layer = fmt::layer()
            .with_target(false)
            .with_file(false)
            .without_time()
            .with_writer(std::io::stderr);

        subscriber.with(fmt_layer).init();
    }
}

fn env_filter(verbose: bool) -> EnvFilter {
    let default = if verbose { "goswap=debug" } else { "goswap=warn" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// A timing guard that logs duration on drop.
pub struct TimingGuard {
    name: String,
    start: std::time::Instant,
}

impl TimingGuard {
    /// Start timing an operation.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for TimingGuard {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        tracing::debug!(
            operation = %self.name,
            duration_ms = duration.as_millis() as u64,
            "Operation completed"
        );
    }
}

/// Macro to time a block of code.
#[macro_export]
macro_rules! time {
    ($name:expr, $block:expr) => {{
        let _guard = $crate::TimingGuard::new($name);
        $block
    }};
}
