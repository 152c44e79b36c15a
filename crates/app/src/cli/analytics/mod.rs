use clap::{Args, Subcommand};

mod coupon;
mod scope;

#[derive(Debug, Args)]
pub(crate) struct AnalyticsCommand {
    #[command(subcommand)]
    command: AnalyticsSubcommand,
}

#[derive(Debug, Subcommand)]
enum AnalyticsSubcommand {
    /// Print usage metrics for one coupon
    Coupon(coupon::CouponArgs),

    /// Print a partner or organization report
    Scope(scope::ScopeArgs),
}

pub(crate) async fn run(command: AnalyticsCommand) -> Result<(), String> {
    match command.command {
        AnalyticsSubcommand::Coupon(args) => coupon::run(args).await,
        AnalyticsSubcommand::Scope(args) => scope::run(args).await,
    }
}
