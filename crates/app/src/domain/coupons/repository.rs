//! Coupons Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};
use uuid::Uuid;

use crate::{
    database::{
        try_get_optional_u64, try_get_parsed, try_get_u64, try_i64_from_u64,
        try_optional_i64_from_u64, try_u64_from_i64,
    },
    domain::{
        coupons::{
            data::{
                ApplicableAsset, CouponFilter, GlobalApplication, NewCoupon,
                assets::{AssetKind, AssetRef},
                discounts::SimpleDiscount,
            },
            records::{CouponRecord, CouponUuid},
        },
        users::UserId,
    },
    uuids::TypedUuid,
};

const COLUMN_DISCOUNT_AMOUNT: &str = "discount_amount";
const COLUMN_USAGE_LIMIT: &str = "usage_limit";
const COLUMN_USER_USAGE_LIMIT: &str = "user_usage_limit";
const COLUMN_MINIMUM_ORDER_VALUE: &str = "minimum_order_value";
const COLUMN_MAXIMUM_ORDER_VALUE: &str = "maximum_order_value";

const CREATE_COUPON_SQL: &str = include_str!("sql/create_coupon.sql");
const CREATE_COUPON_ASSET_SQL: &str = include_str!("sql/create_coupon_asset.sql");
const FIND_COUPON_SQL: &str = include_str!("sql/find_coupon.sql");
const LOCK_COUPON_SQL: &str = include_str!("sql/lock_coupon.sql");
const FIND_COUPON_BY_CODE_SQL: &str = include_str!("sql/find_coupon_by_code.sql");
const LIST_COUPONS_SQL: &str = include_str!("sql/list_coupons.sql");
const LIST_COUPON_ASSETS_SQL: &str = include_str!("sql/list_coupon_assets.sql");
const DELETE_COUPON_SQL: &str = include_str!("sql/delete_coupon.sql");
const INCREMENT_USAGE_COUNT_SQL: &str = include_str!("sql/increment_usage_count.sql");
const DECREMENT_USAGE_COUNT_SQL: &str = include_str!("sql/decrement_usage_count.sql");

/// Applicable asset row marker, used only to type the row identifiers.
#[derive(Debug)]
pub(crate) struct CouponAssetRecord;

type CouponAssetUuid = TypedUuid<CouponAssetRecord>;

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCouponsRepository;

impl PgCouponsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_coupon(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        coupon: NewCoupon,
    ) -> Result<CouponRecord, sqlx::Error> {
        let (discount_kind, discount_percentage, discount_amount) =
            to_discount_sql_values(&coupon.discount)?;

        let allowed_users: Vec<String> = coupon
            .allowed_users
            .into_iter()
            .map(UserId::into_string)
            .collect();

        let global_asset_kinds: Vec<&'static str> = coupon
            .global_application
            .asset_kinds
            .iter()
            .map(|kind| kind.as_str())
            .collect();

        let mut record = query_as::<Postgres, CouponRecord>(CREATE_COUPON_SQL)
            .bind(coupon.uuid.into_uuid())
            .bind(coupon.code)
            .bind(coupon.name)
            .bind(coupon.description)
            .bind(coupon.kind.as_str())
            .bind(discount_kind)
            .bind(discount_percentage)
            .bind(discount_amount)
            .bind(coupon.is_active)
            .bind(SqlxTimestamp::from(coupon.valid_from))
            .bind(SqlxTimestamp::from(coupon.valid_until))
            .bind(try_optional_i64_from_u64(
                coupon.usage_limit,
                COLUMN_USAGE_LIMIT,
            )?)
            .bind(try_optional_i64_from_u64(
                coupon.user_usage_limit,
                COLUMN_USER_USAGE_LIMIT,
            )?)
            .bind(try_optional_i64_from_u64(
                coupon.minimum_order_value,
                COLUMN_MINIMUM_ORDER_VALUE,
            )?)
            .bind(try_optional_i64_from_u64(
                coupon.maximum_order_value,
                COLUMN_MAXIMUM_ORDER_VALUE,
            )?)
            .bind(allowed_users)
            .bind(coupon.global_application.is_global)
            .bind(global_asset_kinds)
            .bind(coupon.partner)
            .bind(coupon.organization)
            .fetch_one(&mut **tx)
            .await?;

        for (position, asset) in (0_i32..).zip(coupon.applicable_assets.iter()) {
            query(CREATE_COUPON_ASSET_SQL)
                .bind(CouponAssetUuid::new().into_uuid())
                .bind(record.uuid.into_uuid())
                .bind(position)
                .bind(asset.asset.kind().as_str())
                .bind(asset.asset.id())
                .bind(asset.is_active)
                .execute(&mut **tx)
                .await?;
        }

        record.applicable_assets = coupon.applicable_assets;

        Ok(record)
    }

    /// Fetch a live coupon and hold its row lock until the transaction ends.
    pub(crate) async fn lock_coupon(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        coupon: CouponUuid,
    ) -> Result<Option<CouponRecord>, sqlx::Error> {
        let record = query_as::<Postgres, CouponRecord>(LOCK_COUPON_SQL)
            .bind(coupon.into_uuid())
            .fetch_optional(&mut **tx)
            .await?;

        match record {
            Some(record) => Ok(Some(self.with_assets(tx, record).await?)),
            None => Ok(None),
        }
    }

    pub(crate) async fn find_coupon_by_code(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &str,
    ) -> Result<Option<CouponRecord>, sqlx::Error> {
        let record = query_as::<Postgres, CouponRecord>(FIND_COUPON_BY_CODE_SQL)
            .bind(code)
            .fetch_optional(&mut **tx)
            .await?;

        match record {
            Some(record) => Ok(Some(self.with_assets(tx, record).await?)),
            None => Ok(None),
        }
    }

    pub(crate) async fn find_coupon(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        coupon: CouponUuid,
    ) -> Result<Option<CouponRecord>, sqlx::Error> {
        let record = query_as::<Postgres, CouponRecord>(FIND_COUPON_SQL)
            .bind(coupon.into_uuid())
            .fetch_optional(&mut **tx)
            .await?;

        match record {
            Some(record) => Ok(Some(self.with_assets(tx, record).await?)),
            None => Ok(None),
        }
    }

    pub(crate) async fn list_coupons(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        filter: CouponFilter,
    ) -> Result<Vec<CouponRecord>, sqlx::Error> {
        let mut records = query_as::<Postgres, CouponRecord>(LIST_COUPONS_SQL)
            .bind(filter.partner)
            .bind(filter.organization)
            .fetch_all(&mut **tx)
            .await?;

        let uuids: Vec<Uuid> = records.iter().map(|r| r.uuid.into_uuid()).collect();

        let mut assets = self.list_coupon_assets(tx, &uuids).await?;

        for record in &mut records {
            record.applicable_assets = assets
                .remove(&record.uuid.into_uuid())
                .unwrap_or_default();
        }

        Ok(records)
    }

    pub(crate) async fn delete_coupon(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        coupon: CouponUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_COUPON_SQL)
            .bind(coupon.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    /// Consume one unit of capacity. `None` means the guard refused the increment.
    pub(crate) async fn increment_usage_count(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        coupon: CouponUuid,
    ) -> Result<Option<u64>, sqlx::Error> {
        let count: Option<i64> = query_scalar(INCREMENT_USAGE_COUNT_SQL)
            .bind(coupon.into_uuid())
            .fetch_optional(&mut **tx)
            .await?;

        count.map(|c| try_u64_from_i64(c, "usage_count")).transpose()
    }

    /// Release one unit of capacity. `None` means the counter was already zero.
    pub(crate) async fn decrement_usage_count(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        coupon: CouponUuid,
    ) -> Result<Option<u64>, sqlx::Error> {
        let count: Option<i64> = query_scalar(DECREMENT_USAGE_COUNT_SQL)
            .bind(coupon.into_uuid())
            .fetch_optional(&mut **tx)
            .await?;

        count.map(|c| try_u64_from_i64(c, "usage_count")).transpose()
    }

    async fn with_assets(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        mut record: CouponRecord,
    ) -> Result<CouponRecord, sqlx::Error> {
        let mut assets = self
            .list_coupon_assets(tx, &[record.uuid.into_uuid()])
            .await?;

        record.applicable_assets = assets
            .remove(&record.uuid.into_uuid())
            .unwrap_or_default();

        Ok(record)
    }

    async fn list_coupon_assets(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        coupons: &[Uuid],
    ) -> Result<FxHashMap<Uuid, Vec<ApplicableAsset>>, sqlx::Error> {
        let rows = query(LIST_COUPON_ASSETS_SQL)
            .bind(coupons)
            .fetch_all(&mut **tx)
            .await?;

        let mut assets: FxHashMap<Uuid, Vec<ApplicableAsset>> = FxHashMap::default();

        for row in rows {
            let coupon: Uuid = row.try_get("coupon_uuid")?;
            let kind: AssetKind = try_get_parsed(&row, "asset_kind")?;
            let asset_id: String = row.try_get("asset_id")?;

            assets.entry(coupon).or_default().push(ApplicableAsset {
                asset: AssetRef::new(kind, asset_id),
                is_active: row.try_get("is_active")?,
            });
        }

        Ok(assets)
    }
}

fn to_discount_sql_values(
    discount: &SimpleDiscount,
) -> Result<(&'static str, Option<i64>, Option<i64>), sqlx::Error> {
    let discount_kind = discount.to_str();

    match discount {
        SimpleDiscount::PercentageOff { percentage } => {
            Ok((discount_kind, Some(i64::from(*percentage)), None))
        }
        SimpleDiscount::FixedAmountOff { amount } => Ok((
            discount_kind,
            None,
            Some(try_i64_from_u64(*amount, COLUMN_DISCOUNT_AMOUNT)?),
        )),
    }
}

fn discount_from_row(row: &PgRow) -> Result<SimpleDiscount, sqlx::Error> {
    let kind: String = row.try_get("discount_kind")?;

    match kind.as_str() {
        "percentage_off" => {
            let percentage: i64 = row.try_get("discount_percentage")?;

            let percentage = u16::try_from(percentage).map_err(|e| sqlx::Error::ColumnDecode {
                index: "discount_percentage".to_string(),
                source: Box::new(e),
            })?;

            Ok(SimpleDiscount::PercentageOff { percentage })
        }
        "amount_off" => Ok(SimpleDiscount::FixedAmountOff {
            amount: try_get_u64(row, COLUMN_DISCOUNT_AMOUNT)?,
        }),
        other => Err(sqlx::Error::ColumnDecode {
            index: "discount_kind".to_string(),
            source: format!("unknown discount kind `{other}`").into(),
        }),
    }
}

impl<'r> FromRow<'r, PgRow> for CouponRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let allowed_users: Vec<String> = row.try_get("allowed_users")?;
        let global_asset_kinds: Vec<String> = row.try_get("global_asset_kinds")?;

        let asset_kinds: SmallVec<[AssetKind; 5]> = global_asset_kinds
            .iter()
            .map(|kind| kind.parse::<AssetKind>())
            .collect::<Result<_, _>>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "global_asset_kinds".to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            uuid: CouponUuid::from_uuid(row.try_get("uuid")?),
            code: row.try_get("code")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            kind: try_get_parsed(row, "kind")?,
            discount: discount_from_row(row)?,
            is_active: row.try_get("is_active")?,
            valid_from: row.try_get::<SqlxTimestamp, _>("valid_from")?.to_jiff(),
            valid_until: row.try_get::<SqlxTimestamp, _>("valid_until")?.to_jiff(),
            usage_limit: try_get_optional_u64(row, COLUMN_USAGE_LIMIT)?,
            usage_count: try_get_u64(row, "usage_count")?,
            user_usage_limit: try_get_optional_u64(row, COLUMN_USER_USAGE_LIMIT)?,
            minimum_order_value: try_get_optional_u64(row, COLUMN_MINIMUM_ORDER_VALUE)?,
            maximum_order_value: try_get_optional_u64(row, COLUMN_MAXIMUM_ORDER_VALUE)?,
            allowed_users: allowed_users.into_iter().map(UserId::from).collect(),
            global_application: GlobalApplication {
                is_global: row.try_get("is_global")?,
                asset_kinds,
            },
            applicable_assets: Vec::new(),
            partner: row.try_get("partner_uuid")?,
            organization: row.try_get("organization_uuid")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
            deleted_at: row
                .try_get::<Option<SqlxTimestamp>, _>("deleted_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}
