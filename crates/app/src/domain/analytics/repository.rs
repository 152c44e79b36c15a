//! Analytics Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{Postgres, Row, Transaction, postgres::PgRow, query};

use crate::{
    database::try_get_u64,
    domain::{
        analytics::data::{AnalyticsScope, CouponCounts, TopCoupon, UsageTotals},
        coupons::records::CouponUuid,
    },
};

const COUPON_USAGE_TOTALS_SQL: &str = include_str!("sql/coupon_usage_totals.sql");
const SCOPE_USAGE_TOTALS_SQL: &str = include_str!("sql/scope_usage_totals.sql");
const TOP_COUPONS_SQL: &str = include_str!("sql/top_coupons.sql");
const SCOPE_COUPON_COUNTS_SQL: &str = include_str!("sql/scope_coupon_counts.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgAnalyticsRepository;

impl PgAnalyticsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn coupon_usage_totals(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        coupon: CouponUuid,
        at: Timestamp,
    ) -> Result<UsageTotals, sqlx::Error> {
        let row = query(COUPON_USAGE_TOTALS_SQL)
            .bind(coupon.into_uuid())
            .bind(SqlxTimestamp::from(at))
            .fetch_one(&mut **tx)
            .await?;

        usage_totals_from_row(&row)
    }

    pub(crate) async fn scope_usage_totals(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        scope: AnalyticsScope,
        at: Timestamp,
    ) -> Result<UsageTotals, sqlx::Error> {
        let row = query(SCOPE_USAGE_TOTALS_SQL)
            .bind(scope.partner)
            .bind(scope.organization)
            .bind(scope.from.map(SqlxTimestamp::from))
            .bind(scope.until.map(SqlxTimestamp::from))
            .bind(SqlxTimestamp::from(at))
            .fetch_one(&mut **tx)
            .await?;

        usage_totals_from_row(&row)
    }

    pub(crate) async fn top_coupons(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        scope: AnalyticsScope,
        limit: u8,
    ) -> Result<Vec<TopCoupon>, sqlx::Error> {
        let rows = query(TOP_COUPONS_SQL)
            .bind(scope.partner)
            .bind(scope.organization)
            .bind(scope.from.map(SqlxTimestamp::from))
            .bind(scope.until.map(SqlxTimestamp::from))
            .bind(i64::from(limit))
            .fetch_all(&mut **tx)
            .await?;

        rows.iter()
            .map(|row| -> Result<TopCoupon, sqlx::Error> {
                Ok(TopCoupon {
                    coupon: CouponUuid::from_uuid(row.try_get("uuid")?),
                    code: row.try_get("code")?,
                    name: row.try_get("name")?,
                    usages: try_get_u64(row, "usages")?,
                })
            })
            .collect()
    }

    pub(crate) async fn scope_coupon_counts(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        scope: AnalyticsScope,
        at: Timestamp,
    ) -> Result<CouponCounts, sqlx::Error> {
        let row = query(SCOPE_COUPON_COUNTS_SQL)
            .bind(scope.partner)
            .bind(scope.organization)
            .bind(SqlxTimestamp::from(at))
            .fetch_one(&mut **tx)
            .await?;

        Ok(CouponCounts {
            total_coupons: try_get_u64(&row, "total_coupons")?,
            active_coupons: try_get_u64(&row, "active_coupons")?,
            expired_coupons: try_get_u64(&row, "expired_coupons")?,
        })
    }
}

fn usage_totals_from_row(row: &PgRow) -> Result<UsageTotals, sqlx::Error> {
    Ok(UsageTotals {
        total_usages: try_get_u64(row, "total_usages")?,
        total_refunds: try_get_u64(row, "total_refunds")?,
        total_discount_given: try_get_u64(row, "total_discount_given")?,
        total_order_value: try_get_u64(row, "total_order_value")?,
        recent_usages: try_get_u64(row, "recent_usages")?,
    })
}
