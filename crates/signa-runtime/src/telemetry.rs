//! Tracing setup

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_LOG_DIRECTIVE: &str = "signa=info";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

/// Install the global subscriber with the default filter.
///
/// Returns `false` if a subscriber was already installed.
pub fn init_tracing(format: LogFormat) -> bool {
    init_tracing_with(format, DEFAULT_LOG_DIRECTIVE)
}

/// Install the global subscriber; `default_directive` applies when `RUST_LOG` is unset
pub fn init_tracing_with(format: LogFormat, default_directive: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let result = match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    result.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_harmless() {
        init_tracing(LogFormat::Json);
        assert!(!init_tracing(LogFormat::Pretty));
    }

    #[test]
    fn test_log_format_serde() {
        let format: LogFormat = serde_json::from_str(r#""json""#).unwrap();
        assert_eq!(format, LogFormat::Json);
        assert_eq!(LogFormat::default(), LogFormat::Pretty);
    }
}
