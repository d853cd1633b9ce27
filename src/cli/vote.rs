use clap::{Args, Subcommand};
use jiff::Timestamp;
use urna::{
    context::AppContext,
    domain::{candidacies::records::CandidacyId, elections::records::ElectionId},
};

use super::{current_session, fetch, output};

#[derive(Debug, Args)]
pub(crate) struct VoteCommand {
    #[command(subcommand)]
    command: VoteSubcommand,
}

#[derive(Debug, Subcommand)]
enum VoteSubcommand {
    /// Vote for a candidacy
    Cast(CastArgs),

    /// Whether you already voted in an election
    Status(StatusArgs),
}

#[derive(Debug, Args)]
struct CastArgs {
    /// Election id
    #[arg(long)]
    election: ElectionId,

    /// Candidacy id
    #[arg(long)]
    candidacy: CandidacyId,
}

#[derive(Debug, Args)]
struct StatusArgs {
    /// Election id
    #[arg(long)]
    election: ElectionId,
}

pub(crate) async fn run(ctx: &AppContext, command: VoteCommand) -> Result<(), String> {
    match command.command {
        VoteSubcommand::Cast(args) => cast(ctx, args).await,
        VoteSubcommand::Status(args) => status(ctx, args.election).await,
    }
}

async fn cast(ctx: &AppContext, args: CastArgs) -> Result<(), String> {
    let session = current_session(ctx).await?;

    fetch(
        ctx,
        "vote rejected",
        ctx.voting.cast_vote(
            session.actor(),
            args.election,
            args.candidacy,
            Timestamp::now(),
        ),
    )
    .await?;

    output::message("vote recorded");

    Ok(())
}

async fn status(ctx: &AppContext, election: ElectionId) -> Result<(), String> {
    let session = current_session(ctx).await?;

    let voted = fetch(
        ctx,
        "failed to check vote",
        ctx.voting.has_voted(session.actor(), election),
    )
    .await?;

    output::message(if voted {
        "already voted"
    } else {
        "not voted yet"
    });

    Ok(())
}
