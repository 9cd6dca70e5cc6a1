//! Tracing subscriber setup.
//!
//! Filter comes from `RUST_LOG` (default `techglobal_e2e=info`). Set
//! `E2E_LOG_FORMAT=json` for machine-readable output. Installing twice is a
//! no-op, so every test may call [`init`].

use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "techglobal_e2e=info";

/// Output format for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable, compact
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

impl LogFormat {
    /// Read the format from `E2E_LOG_FORMAT`
    #[must_use]
    pub fn from_env() -> Self {
        match std::env::var("E2E_LOG_FORMAT") {
            Ok(v) if v.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Install the global subscriber with the format from the environment
pub fn init() {
    init_with(LogFormat::from_env());
}

/// Install the global subscriber with an explicit format
pub fn init_with(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = fmt().with_env_filter(filter).with_test_writer();
    // try_init fails only when a subscriber is already installed
    let _ = match format {
        LogFormat::Pretty => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
