//! Coupons Service

use async_trait::async_trait;
use mockall::automock;
use tracing::{Span, info};

use crate::{
    database::Db,
    domain::coupons::{
        CouponsServiceError,
        data::{CouponFilter, NewCoupon, normalize_code},
        records::{CouponRecord, CouponUuid},
        repository::PgCouponsRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgCouponsService {
    db: Db,
    repository: PgCouponsRepository,
}

impl PgCouponsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgCouponsRepository::new(),
        }
    }
}

#[async_trait]
impl CouponsService for PgCouponsService {
    #[tracing::instrument(
        name = "coupons.service.create_coupon",
        skip(self, coupon),
        fields(
            coupon_uuid = %coupon.uuid,
            coupon_code = tracing::field::Empty,
            coupon_type = %coupon.kind,
            applicable_asset_count = coupon.applicable_assets.len()
        ),
        err
    )]
    async fn create_coupon(&self, coupon: NewCoupon) -> Result<CouponRecord, CouponsServiceError> {
        let mut coupon = coupon;

        coupon.code = normalize_code(&coupon.code);

        Span::current().record("coupon_code", tracing::field::display(&coupon.code));

        if coupon.code.is_empty() || coupon.valid_from > coupon.valid_until {
            return Err(CouponsServiceError::InvalidData);
        }

        let mut tx = self.db.begin().await?;

        let record = self.repository.create_coupon(&mut tx, coupon).await?;

        tx.commit().await?;

        info!(coupon_uuid = %record.uuid, code = %record.code, "created coupon");

        Ok(record)
    }

    #[tracing::instrument(
        name = "coupons.service.get_coupon",
        skip(self),
        fields(coupon_uuid = %coupon),
        err
    )]
    async fn get_coupon(&self, coupon: CouponUuid) -> Result<CouponRecord, CouponsServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self
            .repository
            .find_coupon(&mut tx, coupon)
            .await?
            .ok_or(CouponsServiceError::NotFound)?;

        tx.commit().await?;

        Ok(record)
    }

    #[tracing::instrument(
        name = "coupons.service.find_coupon_by_code",
        skip(self, code),
        fields(coupon_code = tracing::field::Empty),
        err
    )]
    async fn find_coupon_by_code(&self, code: String) -> Result<CouponRecord, CouponsServiceError> {
        let code = normalize_code(&code);

        Span::current().record("coupon_code", tracing::field::display(&code));

        let mut tx = self.db.begin().await?;

        let record = self
            .repository
            .find_coupon_by_code(&mut tx, &code)
            .await?
            .ok_or(CouponsServiceError::NotFound)?;

        tx.commit().await?;

        Ok(record)
    }

    #[tracing::instrument(
        name = "coupons.service.list_coupons",
        skip(self),
        fields(coupon_count = tracing::field::Empty),
        err
    )]
    async fn list_coupons(
        &self,
        filter: CouponFilter,
    ) -> Result<Vec<CouponRecord>, CouponsServiceError> {
        let mut tx = self.db.begin().await?;

        let records = self.repository.list_coupons(&mut tx, filter).await?;

        tx.commit().await?;

        Span::current().record("coupon_count", tracing::field::display(records.len()));

        Ok(records)
    }

    #[tracing::instrument(
        name = "coupons.service.delete_coupon",
        skip(self),
        fields(coupon_uuid = %coupon),
        err
    )]
    async fn delete_coupon(&self, coupon: CouponUuid) -> Result<(), CouponsServiceError> {
        let mut tx = self.db.begin().await?;

        let rows_affected = self.repository.delete_coupon(&mut tx, coupon).await?;

        if rows_affected == 0 {
            return Err(CouponsServiceError::NotFound);
        }

        tx.commit().await?;

        info!(coupon_uuid = %coupon, "deleted coupon");

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait CouponsService: Send + Sync {
    /// Create a coupon with a normalized code.
    async fn create_coupon(&self, coupon: NewCoupon) -> Result<CouponRecord, CouponsServiceError>;

    /// Retrieve a live coupon by UUID.
    async fn get_coupon(&self, coupon: CouponUuid) -> Result<CouponRecord, CouponsServiceError>;

    /// Retrieve a live coupon by code; the code is normalized before lookup.
    async fn find_coupon_by_code(&self, code: String) -> Result<CouponRecord, CouponsServiceError>;

    /// List live coupons, oldest first.
    async fn list_coupons(
        &self,
        filter: CouponFilter,
    ) -> Result<Vec<CouponRecord>, CouponsServiceError>;

    /// Soft delete a coupon.
    async fn delete_coupon(&self, coupon: CouponUuid) -> Result<(), CouponsServiceError>;
}
