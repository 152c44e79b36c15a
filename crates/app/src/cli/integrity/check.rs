use clap::Args;
use coupons_app::{
    database::{self, Db},
    domain::redemptions::{PgRedemptionsService, RedemptionsService},
};

#[derive(Debug, Args)]
pub(crate) struct CheckArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

pub(crate) async fn run(args: CheckArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let drift = PgRedemptionsService::new(Db::new(pool))
        .find_usage_drift()
        .await
        .map_err(|error| format!("failed to scan usage ledger: {error}"))?;

    if drift.is_empty() {
        println!("usage counters match the ledger");
        return Ok(());
    }

    for entry in &drift {
        println!("coupon_uuid: {}", entry.coupon);
        println!("code: {}", entry.code);
        println!("usage_count: {}", entry.usage_count);
        println!(
            "usage_limit: {}",
            entry
                .usage_limit
                .map_or_else(|| "none".to_string(), |limit| limit.to_string())
        );
        println!("ledger_count: {}", entry.ledger_count);
        println!("exceeds_usage_limit: {}", entry.exceeds_usage_limit());
        println!();
    }

    Err(format!("{} coupon(s) disagree with the usage ledger", drift.len()))
}
