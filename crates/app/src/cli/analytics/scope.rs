use clap::Args;
use coupons_app::{
    database::{self, Db},
    domain::analytics::{AnalyticsService, PgAnalyticsService, data::AnalyticsScope},
};
use jiff::Timestamp;
use uuid::Uuid;

#[derive(Debug, Args)]
pub(crate) struct ScopeArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    #[arg(long)]
    partner_uuid: Option<Uuid>,

    #[arg(long)]
    organization_uuid: Option<Uuid>,

    /// Earliest redemption instant counted (RFC 3339)
    #[arg(long)]
    from: Option<Timestamp>,

    /// Latest redemption instant counted (RFC 3339)
    #[arg(long)]
    until: Option<Timestamp>,

    /// Evaluation instant (RFC 3339); defaults to now
    #[arg(long)]
    at: Option<Timestamp>,
}

/// Print a tenant report as JSON.
pub(crate) async fn run(args: ScopeArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let scope = AnalyticsScope {
        partner: args.partner_uuid,
        organization: args.organization_uuid,
        from: args.from,
        until: args.until,
    };

    let report = PgAnalyticsService::new(Db::new(pool))
        .scope_analytics(scope, args.at.unwrap_or_else(Timestamp::now))
        .await
        .map_err(|error| format!("failed to load analytics: {error}"))?;

    let json = serde_json::to_string_pretty(&report)
        .map_err(|error| format!("failed to encode report: {error}"))?;

    println!("{json}");

    Ok(())
}
