use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{error, info, instrument};

use super::service::AuthService;

/// Configuration for the expired-token sweep task
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// How often to run the sweep
    pub sweep_interval: Duration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(60 * 60), // hourly
        }
    }
}

/// Starts the background task that periodically deletes expired
/// refresh-token rows. The sweep is pure garbage collection: expired
/// tokens are already unusable, so it can run concurrently with normal
/// traffic and as often as desired.
#[instrument(skip(auth_service))]
pub async fn start_token_sweep_task(auth_service: Arc<AuthService>, config: SweepConfig) {
    info!(
        sweep_interval_secs = config.sweep_interval.as_secs(),
        "Starting refresh-token sweep background task"
    );

    let mut sweep_interval = interval(config.sweep_interval);

    loop {
        sweep_interval.tick().await;

        match auth_service.remove_expired_tokens().await {
            Ok(removed_count) => {
                info!(removed_count = removed_count, "Refresh-token sweep completed");
            }
            Err(e) => {
                error!(error = %e, "Refresh-token sweep failed");
            }
        }
    }
}
