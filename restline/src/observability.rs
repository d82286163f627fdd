//! Tracing subscriber bootstrap

use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::error::Result;

/// Initialize JSON-formatted tracing with the configured log level.
///
/// Call once, early in `main`; a second call panics because the global
/// subscriber is already set.
pub fn init_tracing(config: &Config) -> Result<()> {
    let log_level = config.service.log_level.clone();

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Tracing initialized for service: {}", config.service.name);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_tracing_accepts_the_default_config() {
        let config = Config::default();
        // This should not panic
        let _ = init_tracing(&config);
    }
}
