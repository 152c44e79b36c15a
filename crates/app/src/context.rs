//! App Context

use std::{sync::Arc, time::Duration};

use thiserror::Error;

use crate::{
    database::{self, Db},
    domain::{
        analytics::{AnalyticsService, PgAnalyticsService},
        coupons::{CouponsService, PgCouponsService},
        eligibility::{EligibilityService, PgEligibilityService},
        redemptions::{PgRedemptionsService, RedemptionsService},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),
}

#[derive(Clone)]
pub struct AppContext {
    pub coupons: Arc<dyn CouponsService>,
    pub eligibility: Arc<dyn EligibilityService>,
    pub redemptions: Arc<dyn RedemptionsService>,
    pub analytics: Arc<dyn AnalyticsService>,
}

impl AppContext {
    /// Build application context from a database URL.
    ///
    /// `lock_timeout` bounds how long a redemption waits on user and coupon locks.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails.
    pub async fn from_database_url(url: &str, lock_timeout: Duration) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        Ok(Self::from_db(Db::new(pool).with_lock_timeout(lock_timeout)))
    }

    #[must_use]
    pub fn from_db(db: Db) -> Self {
        Self {
            coupons: Arc::new(PgCouponsService::new(db.clone())),
            eligibility: Arc::new(PgEligibilityService::new(db.clone())),
            redemptions: Arc::new(PgRedemptionsService::new(db.clone())),
            analytics: Arc::new(PgAnalyticsService::new(db)),
        }
    }
}
