use clap::{Args, Subcommand};
use jiff::Timestamp;
use urna::{
    context::AppContext,
    domain::{
        candidacies::{data::CandidacyFields, records::CandidacyId},
        elections::records::ElectionId,
        users::records::UserId,
    },
};

use super::{current_session, fetch, output};

#[derive(Debug, Args)]
pub(crate) struct CandidaciesCommand {
    #[command(subcommand)]
    command: CandidaciesSubcommand,
}

#[derive(Debug, Subcommand)]
enum CandidaciesSubcommand {
    /// List candidacies with nominee and election
    List(ListArgs),

    /// Nominate a CANDIDATO user for an election
    Create(FieldArgs),

    /// Replace every field of a candidacy
    Update(UpdateArgs),

    /// Delete a candidacy
    Delete(DeleteArgs),
}

#[derive(Debug, Args)]
struct ListArgs {
    /// Only candidacies of this election
    #[arg(long)]
    election: Option<ElectionId>,
}

#[derive(Debug, Args)]
struct FieldArgs {
    /// Nominee user id
    #[arg(long)]
    user: UserId,

    /// Election id
    #[arg(long)]
    election: ElectionId,

    #[arg(long)]
    proposal: String,
}

impl FieldArgs {
    fn into_fields(self) -> CandidacyFields {
        CandidacyFields {
            user_id: self.user,
            election_id: self.election,
            proposal: self.proposal,
        }
    }
}

#[derive(Debug, Args)]
struct UpdateArgs {
    /// Candidacy id
    id: CandidacyId,

    #[command(flatten)]
    fields: FieldArgs,
}

#[derive(Debug, Args)]
struct DeleteArgs {
    /// Candidacy id
    id: CandidacyId,
}

pub(crate) async fn run(ctx: &AppContext, command: CandidaciesCommand) -> Result<(), String> {
    match command.command {
        CandidaciesSubcommand::List(args) => list(ctx, args.election).await,
        CandidaciesSubcommand::Create(args) => create(ctx, args).await,
        CandidaciesSubcommand::Update(args) => update(ctx, args).await,
        CandidaciesSubcommand::Delete(args) => delete(ctx, args.id).await,
    }
}

async fn list(ctx: &AppContext, election: Option<ElectionId>) -> Result<(), String> {
    let listings = fetch(
        ctx,
        "failed to list candidacies",
        ctx.candidacies.list_candidacies(election),
    )
    .await?;

    output::candidacies(&listings);

    Ok(())
}

async fn create(ctx: &AppContext, args: FieldArgs) -> Result<(), String> {
    let session = current_session(ctx).await?;

    let candidacy = fetch(
        ctx,
        "failed to create candidacy",
        ctx.candidacies
            .create_candidacy(session.actor(), args.into_fields(), Timestamp::now()),
    )
    .await?;

    output::message(&format!("created candidacy {}", candidacy.id));

    Ok(())
}

async fn update(ctx: &AppContext, args: UpdateArgs) -> Result<(), String> {
    let session = current_session(ctx).await?;

    let candidacy = fetch(
        ctx,
        "failed to update candidacy",
        ctx.candidacies.update_candidacy(
            session.actor(),
            args.id,
            args.fields.into_fields(),
            Timestamp::now(),
        ),
    )
    .await?;

    output::message(&format!("updated candidacy {}", candidacy.id));

    Ok(())
}

async fn delete(ctx: &AppContext, id: CandidacyId) -> Result<(), String> {
    let session = current_session(ctx).await?;

    fetch(
        ctx,
        "failed to delete candidacy",
        ctx.candidacies.delete_candidacy(session.actor(), id),
    )
    .await?;

    output::message(&format!("deleted candidacy {id}"));

    Ok(())
}
