//! Usage Ledger Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};

use crate::{
    database::{
        try_get_optional_u64, try_get_parsed, try_get_u64, try_i64_from_u64, try_u64_from_i64,
    },
    domain::{
        coupons::records::CouponUuid,
        usages::{
            data::{NewUsage, UsageDrift, UsageStatus},
            records::{UsageRecord, UsageUuid},
        },
        users::UserId,
    },
};

const CREATE_USAGE_SQL: &str = include_str!("sql/create_usage.sql");
const FIND_USAGE_SQL: &str = include_str!("sql/find_usage.sql");
const TRANSITION_USAGE_SQL: &str = include_str!("sql/transition_usage.sql");
const LIST_USAGES_SQL: &str = include_str!("sql/list_usages.sql");
const COUNT_USER_COUPON_USAGES_SQL: &str = include_str!("sql/count_user_coupon_usages.sql");
const COUNT_USER_USAGES_SQL: &str = include_str!("sql/count_user_usages.sql");
const FIND_USAGE_DRIFT_SQL: &str = include_str!("sql/find_usage_drift.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgUsagesRepository;

impl PgUsagesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_usage(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        usage: NewUsage,
    ) -> Result<UsageRecord, sqlx::Error> {
        query_as::<Postgres, UsageRecord>(CREATE_USAGE_SQL)
            .bind(usage.uuid.into_uuid())
            .bind(usage.coupon.into_uuid())
            .bind(usage.user.into_string())
            .bind(try_i64_from_u64(usage.discount_amount, "discount_amount")?)
            .bind(try_i64_from_u64(usage.original_amount, "original_amount")?)
            .bind(SqlxTimestamp::from(usage.applied_at))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn find_usage(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        usage: UsageUuid,
    ) -> Result<Option<UsageRecord>, sqlx::Error> {
        query_as::<Postgres, UsageRecord>(FIND_USAGE_SQL)
            .bind(usage.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    /// Move an `applied` entry to `status`. `None` when the entry is missing or already moved.
    pub(crate) async fn transition_usage(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        usage: UsageUuid,
        status: UsageStatus,
        at: Timestamp,
    ) -> Result<Option<UsageRecord>, sqlx::Error> {
        query_as::<Postgres, UsageRecord>(TRANSITION_USAGE_SQL)
            .bind(usage.into_uuid())
            .bind(status.as_str())
            .bind(SqlxTimestamp::from(at))
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn list_usages(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        coupon: CouponUuid,
    ) -> Result<Vec<UsageRecord>, sqlx::Error> {
        query_as::<Postgres, UsageRecord>(LIST_USAGES_SQL)
            .bind(coupon.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    /// Non-cancelled entries for one user on one coupon.
    pub(crate) async fn count_user_coupon_usages(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        coupon: CouponUuid,
        user: &UserId,
    ) -> Result<u64, sqlx::Error> {
        let count: i64 = query_scalar(COUNT_USER_COUPON_USAGES_SQL)
            .bind(coupon.into_uuid())
            .bind(user.as_str())
            .fetch_one(&mut **tx)
            .await?;

        try_u64_from_i64(count, "count")
    }

    /// Non-cancelled entries for one user across every coupon.
    pub(crate) async fn count_user_usages(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: &UserId,
    ) -> Result<u64, sqlx::Error> {
        let count: i64 = query_scalar(COUNT_USER_USAGES_SQL)
            .bind(user.as_str())
            .fetch_one(&mut **tx)
            .await?;

        try_u64_from_i64(count, "count")
    }

    pub(crate) async fn find_usage_drift(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<UsageDrift>, sqlx::Error> {
        let rows = query(FIND_USAGE_DRIFT_SQL).fetch_all(&mut **tx).await?;

        rows.iter()
            .map(|row| -> Result<UsageDrift, sqlx::Error> {
                Ok(UsageDrift {
                    coupon: CouponUuid::from_uuid(row.try_get("coupon_uuid")?),
                    code: row.try_get("code")?,
                    usage_count: try_get_u64(row, "usage_count")?,
                    usage_limit: try_get_optional_u64(row, "usage_limit")?,
                    ledger_count: try_get_u64(row, "ledger_count")?,
                })
            })
            .collect()
    }
}

impl<'r> FromRow<'r, PgRow> for UsageRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let user: String = row.try_get("user_id")?;

        Ok(Self {
            uuid: UsageUuid::from_uuid(row.try_get("uuid")?),
            coupon: CouponUuid::from_uuid(row.try_get("coupon_uuid")?),
            user: UserId::from(user),
            status: try_get_parsed(row, "status")?,
            discount_amount: try_get_u64(row, "discount_amount")?,
            original_amount: try_get_u64(row, "original_amount")?,
            applied_at: row.try_get::<SqlxTimestamp, _>("applied_at")?.to_jiff(),
            status_changed_at: row
                .try_get::<Option<SqlxTimestamp>, _>("status_changed_at")?
                .map(SqlxTimestamp::to_jiff),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
