//! Database Config

use std::time::Duration;

use clap::Args;

/// Database settings.
#[derive(Debug, Args)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: String,

    /// How long a redemption waits on user and coupon locks before failing as retryable.
    #[arg(long, env = "REDEMPTION_LOCK_TIMEOUT_MS", default_value_t = 2_000_u64)]
    pub redemption_lock_timeout_ms: u64,
}

impl DatabaseConfig {
    /// Redemption lock timeout as a [`Duration`].
    #[must_use]
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.redemption_lock_timeout_ms)
    }
}
