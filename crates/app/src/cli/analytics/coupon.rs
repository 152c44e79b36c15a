use clap::Args;
use coupons_app::{
    database::{self, Db},
    domain::{
        analytics::{AnalyticsService, PgAnalyticsService},
        coupons::records::CouponUuid,
    },
};
use jiff::Timestamp;
use uuid::Uuid;

#[derive(Debug, Args)]
pub(crate) struct CouponArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Coupon to report on
    #[arg(long)]
    coupon_uuid: Uuid,

    /// Evaluation instant (RFC 3339); defaults to now
    #[arg(long)]
    at: Option<Timestamp>,

    /// Print the snapshot as JSON
    #[arg(long)]
    json: bool,
}

pub(crate) async fn run(args: CouponArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let snapshot = PgAnalyticsService::new(Db::new(pool))
        .coupon_analytics(
            CouponUuid::from_uuid(args.coupon_uuid),
            args.at.unwrap_or_else(Timestamp::now),
        )
        .await
        .map_err(|error| format!("failed to load analytics: {error}"))?;

    if args.json {
        let json = serde_json::to_string_pretty(&snapshot)
            .map_err(|error| format!("failed to encode snapshot: {error}"))?;

        println!("{json}");

        return Ok(());
    }

    println!("coupon_uuid: {}", args.coupon_uuid);
    println!("total_usages: {}", snapshot.total_usages);
    println!("total_refunds: {}", snapshot.total_refunds);
    println!("total_discount_given: {}", snapshot.total_discount_given);
    println!("total_order_value: {}", snapshot.total_order_value);
    println!("average_order_value: {}", snapshot.average_order_value);
    println!("average_discount_amount: {}", snapshot.average_discount_amount);
    println!(
        "usage_rate: {}",
        snapshot
            .usage_rate
            .map_or_else(|| "undefined".to_string(), |rate| format!("{rate:.4}"))
    );
    println!("recent_usages: {}", snapshot.recent_usages);

    Ok(())
}
