use clap::{Args, Subcommand};
use jiff::Timestamp;
use urna::{context::AppContext, domain::elections::records::ElectionId};

use super::{current_session, fetch, output};

#[derive(Debug, Args)]
pub(crate) struct ResultsCommand {
    #[command(subcommand)]
    command: ResultsSubcommand,
}

#[derive(Debug, Subcommand)]
enum ResultsSubcommand {
    /// Finished elections with results available
    List,

    /// Ranked vote counts of an election
    Show(ElectionArgs),

    /// Save an election's results as CSV into the export directory
    Export(ElectionArgs),
}

#[derive(Debug, Args)]
struct ElectionArgs {
    /// Election id
    election: ElectionId,
}

pub(crate) async fn run(ctx: &AppContext, command: ResultsCommand) -> Result<(), String> {
    current_session(ctx).await?;

    match command.command {
        ResultsSubcommand::List => list(ctx).await,
        ResultsSubcommand::Show(args) => show(ctx, args.election).await,
        ResultsSubcommand::Export(args) => export(ctx, args.election).await,
    }
}

async fn list(ctx: &AppContext) -> Result<(), String> {
    let elections = fetch(
        ctx,
        "failed to list finished elections",
        ctx.results.finalized_elections(),
    )
    .await?;

    output::elections(&elections, Timestamp::now());

    Ok(())
}

async fn show(ctx: &AppContext, election: ElectionId) -> Result<(), String> {
    let results = fetch(
        ctx,
        "failed to tally votes",
        ctx.results.tally(election, Timestamp::now()),
    )
    .await?;

    output::results(&results);

    Ok(())
}

async fn export(ctx: &AppContext, election: ElectionId) -> Result<(), String> {
    let path = fetch(
        ctx,
        "failed to export results",
        ctx.results.export(election, Timestamp::now()),
    )
    .await?;

    output::message(&format!("exported to {}", path.display()));

    Ok(())
}
