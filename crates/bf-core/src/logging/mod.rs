//! Logging setup.
//!
//! stdout carries command payloads only; every log line goes to stderr,
//! either through the `tracing_subscriber` fmt layer (`human`) or through
//! [`JsonlLayer`] (`jsonl`). Events name themselves with an `event` field
//! from [`event_names`] and pick up `run_id` and `stage` from their spans:
//!
//! ```ignore
//! use bf_core::logging::{event_names, Stage};
//!
//! let _stage = tracing::info_span!("stage", stage = %Stage::Merge).entered();
//! tracing::info!(event = event_names::MERGE_FINISHED, matched = 12, "merge finished");
//! ```

pub mod config;
pub mod events;
pub mod layer;

pub use config::{LogConfig, LogFormat, LogLevel};
pub use events::{event_names, Level, LogEvent, Stage};
pub use layer::JsonlLayer;

use std::io::IsTerminal;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Install the global subscriber. Call once, before the first event.
pub fn init_logging(config: &LogConfig) {
    let output = match config.format {
        LogFormat::Jsonl => JsonlLayer::stderr().boxed(),
        LogFormat::Human => {
            let human = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(std::io::stderr().is_terminal());
            if config.timestamps {
                human.boxed()
            } else {
                human.without_time().boxed()
            }
        }
    };

    tracing_subscriber::registry()
        .with(output.with_filter(level_filter(config.level)))
        .init();
}

/// Filter for our own crates at `level`. A valid `RUST_LOG` replaces it
/// unless logging is switched off.
fn level_filter(level: LogLevel) -> EnvFilter {
    if level == LogLevel::Off {
        return EnvFilter::default().add_directive(LevelFilter::OFF.into());
    }
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("bf_core={0},bf_export={0}", level)))
}

/// `run-` followed by 12 hex digits.
pub fn generate_run_id() -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("run-{}", &hex[..12])
}
