//! Structured logging with tracing.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable that overrides the configured log filter.
pub const LOG_ENV: &str = "LOCK_STATES_LOG";

/// Install the global subscriber. Call once, from `main`.
pub fn init_logging(level: &str, json: bool) -> anyhow::Result<()> {
    let registry = tracing_subscriber::registry().with(env_filter(level)?);

    if json {
        registry
            .with(fmt::layer().json().with_target(true))
            .try_init()?;
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()?;
    }

    tracing::info!(level, json, "logging initialized");
    Ok(())
}

/// `LOCK_STATES_LOG` when set, otherwise `level`.
pub fn env_filter(level: &str) -> anyhow::Result<EnvFilter> {
    match EnvFilter::try_from_env(LOG_ENV) {
        Ok(filter) => Ok(filter),
        Err(_) => Ok(EnvFilter::try_new(level)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_levels_and_directives() {
        assert!(env_filter("debug").is_ok());
        assert!(env_filter("lock_states=trace,axum=warn").is_ok());
    }
}
