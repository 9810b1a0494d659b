//! Subscriber setup for binaries and demos

use tracing_subscriber::EnvFilter;

use crate::EngineError;

/// Install a formatted `tracing` subscriber.
///
/// `RUST_LOG` wins over `filter` when set. Calling this again after a
/// subscriber is installed does nothing.
pub fn init_logging(filter: &str) -> Result<(), EngineError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(env_filter) => env_filter,
        Err(_) => EnvFilter::try_new(filter)
            .map_err(|err| EngineError::Config(format!("bad log filter {:?}: {}", filter, err)))?,
    };

    if tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .try_init()
        .is_ok()
    {
        tracing::debug!("Logging initialized with filter {:?}", filter);
    }
    Ok(())
}
