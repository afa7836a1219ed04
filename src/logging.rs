//! Diagnostic logging setup
//!
//! Installs a `tracing` subscriber writing to stderr so that command output on
//! stdout stays clean. The filter comes from `BIZDESK_LOG` when set, otherwise
//! from the `log_level` setting.
//!
//! ```rust,ignore
//! use bizdesk::logging::init_logging;
//!
//! init_logging(&settings.log_level)?;
//! tracing::info!(client = %client.id, "Client created");
//! ```

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{BizdeskError, BizdeskResult};

/// Environment variable overriding the configured filter
pub const LOG_ENV_VAR: &str = "BIZDESK_LOG";

/// Build the filter from `BIZDESK_LOG`, falling back to `default_directives`
pub fn build_filter(default_directives: &str) -> BizdeskResult<EnvFilter> {
    match std::env::var(LOG_ENV_VAR) {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(&directives)
            .map_err(|e| BizdeskError::Config(format!("Invalid {}: {}", LOG_ENV_VAR, e))),
        _ => EnvFilter::try_new(default_directives)
            .map_err(|e| BizdeskError::Config(format!("Invalid log_level setting: {}", e))),
    }
}

/// Initialize the global subscriber
///
/// Must only be called once, at process start.
pub fn init_logging(default_directives: &str) -> BizdeskResult<()> {
    let filter = build_filter(default_directives)?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .compact(),
        )
        .try_init()
        .map_err(|e| BizdeskError::Config(format!("Failed to initialize logging: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_accepts_directives() {
        assert!(EnvFilter::try_new("bizdesk=debug,warn").is_ok());
        assert!(build_filter("info").is_ok());
    }
}
