use clap::{Parser, Subcommand};

mod analytics;
mod db;
mod integrity;

#[derive(Debug, Parser)]
#[command(name = "coupons-app", about = "Coupons operator CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Db(db::DbCommand),
    Integrity(integrity::IntegrityCommand),
    Analytics(analytics::AnalyticsCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Db(command) => db::run(command).await,
            Commands::Integrity(command) => integrity::run(command).await,
            Commands::Analytics(command) => analytics::run(command).await,
        }
    }
}
