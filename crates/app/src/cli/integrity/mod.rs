use clap::{Args, Subcommand};

mod check;

#[derive(Debug, Args)]
pub(crate) struct IntegrityCommand {
    #[command(subcommand)]
    command: IntegritySubcommand,
}

#[derive(Debug, Subcommand)]
enum IntegritySubcommand {
    /// Compare every coupon's usage counter with its ledger
    Check(check::CheckArgs),
}

pub(crate) async fn run(command: IntegrityCommand) -> Result<(), String> {
    match command.command {
        IntegritySubcommand::Check(args) => check::run(args).await,
    }
}
