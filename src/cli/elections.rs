use std::sync::Arc;

use clap::{Args, Subcommand, ValueEnum};
use jiff::Timestamp;
use tokio::sync::mpsc;
use tracing::{debug, info};
use urna::{
    changes::{ChangeEvent, Table},
    context::AppContext,
    domain::elections::{
        data::{ElectionFields, ElectionFilter},
        records::{ElectionId, ElectionState},
    },
};

use super::{current_session, fetch, output};

#[derive(Debug, Args)]
pub(crate) struct ElectionsCommand {
    #[command(subcommand)]
    command: ElectionsSubcommand,
}

#[derive(Debug, Subcommand)]
enum ElectionsSubcommand {
    /// List elections
    List(ListArgs),

    /// Show one election
    Show(ShowArgs),

    /// Create an election
    Create(FieldArgs),

    /// Replace every field of an election
    Update(UpdateArgs),

    /// Delete an election
    Delete(ShowArgs),

    /// Persist the state every election should be in now
    Reconcile,

    /// Print the election list again whenever it changes
    Watch(ListArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum View {
    /// Every election, earliest start first
    Available,

    /// Every election, latest start first, states reconciled first
    Management,

    /// Finished elections, latest start first
    Finalized,
}

impl View {
    fn filter(self) -> ElectionFilter {
        match self {
            Self::Available => ElectionFilter::available(),
            Self::Management => ElectionFilter::management(),
            Self::Finalized => ElectionFilter::finalized(),
        }
    }
}

#[derive(Debug, Args)]
struct ListArgs {
    #[arg(long, value_enum, default_value_t = View::Available)]
    view: View,
}

#[derive(Debug, Args)]
struct ShowArgs {
    /// Election id
    id: ElectionId,
}

#[derive(Debug, Args)]
struct FieldArgs {
    #[arg(long)]
    name: String,

    #[arg(long)]
    description: String,

    /// What the election appoints, e.g. "Estudiantes"
    #[arg(long)]
    representation: String,

    /// Opening instant, RFC 3339
    #[arg(long)]
    start: Timestamp,

    /// Closing instant, RFC 3339; votes are accepted up to and including it
    #[arg(long)]
    end: Timestamp,

    /// Stored state (PENDIENTE, ACTIVA, FINALIZADA)
    #[arg(long, default_value_t = ElectionState::Pendiente)]
    state: ElectionState,
}

impl FieldArgs {
    fn into_fields(self) -> ElectionFields {
        ElectionFields {
            name: self.name,
            description: self.description,
            representation_type: self.representation,
            start_date: self.start,
            end_date: self.end,
            state: self.state,
        }
    }
}

#[derive(Debug, Args)]
struct UpdateArgs {
    /// Election id
    id: ElectionId,

    #[command(flatten)]
    fields: FieldArgs,
}

pub(crate) async fn run(ctx: &AppContext, command: ElectionsCommand) -> Result<(), String> {
    match command.command {
        ElectionsSubcommand::List(args) => list(ctx, args.view).await,
        ElectionsSubcommand::Show(args) => show(ctx, args.id).await,
        ElectionsSubcommand::Create(args) => create(ctx, args).await,
        ElectionsSubcommand::Update(args) => update(ctx, args).await,
        ElectionsSubcommand::Delete(args) => delete(ctx, args.id).await,
        ElectionsSubcommand::Reconcile => reconcile(ctx).await,
        ElectionsSubcommand::Watch(args) => watch(ctx, args.view).await,
    }
}

async fn list(ctx: &AppContext, view: View) -> Result<(), String> {
    let now = Timestamp::now();

    let elections = if view == View::Management {
        let session = current_session(ctx).await?;

        fetch(
            ctx,
            "failed to reconcile elections",
            ctx.elections.reconcile_states(session.actor(), now),
        )
        .await?
    } else {
        fetch(
            ctx,
            "failed to list elections",
            ctx.elections.list_elections(view.filter()),
        )
        .await?
    };

    output::elections(&elections, now);

    Ok(())
}

async fn show(ctx: &AppContext, id: ElectionId) -> Result<(), String> {
    let election = fetch(
        ctx,
        "failed to load election",
        ctx.elections.get_election(id),
    )
    .await?;

    output::election(&election);

    Ok(())
}

async fn create(ctx: &AppContext, args: FieldArgs) -> Result<(), String> {
    let session = current_session(ctx).await?;

    let election = fetch(
        ctx,
        "failed to create election",
        ctx.elections
            .create_election(session.actor(), args.into_fields(), Timestamp::now()),
    )
    .await?;

    output::message(&format!("created election {}", election.id));

    Ok(())
}

async fn update(ctx: &AppContext, args: UpdateArgs) -> Result<(), String> {
    let session = current_session(ctx).await?;

    let election = fetch(
        ctx,
        "failed to update election",
        ctx.elections.update_election(
            session.actor(),
            args.id,
            args.fields.into_fields(),
            Timestamp::now(),
        ),
    )
    .await?;

    output::message(&format!("updated election {}", election.id));

    Ok(())
}

async fn delete(ctx: &AppContext, id: ElectionId) -> Result<(), String> {
    let session = current_session(ctx).await?;

    fetch(
        ctx,
        "failed to delete election",
        ctx.elections.delete_election(session.actor(), id),
    )
    .await?;

    output::message(&format!("deleted election {id}"));

    Ok(())
}

async fn reconcile(ctx: &AppContext) -> Result<(), String> {
    let session = current_session(ctx).await?;
    let now = Timestamp::now();

    let elections = fetch(
        ctx,
        "failed to reconcile elections",
        ctx.elections.reconcile_states(session.actor(), now),
    )
    .await?;

    output::elections(&elections, now);

    Ok(())
}

/// Lists once, then again after every change to `elections` until interrupted.
async fn watch(ctx: &AppContext, view: View) -> Result<(), String> {
    let (sender, mut changes) = mpsc::unbounded_channel();

    let subscription = ctx
        .changes
        .subscribe(
            Table::Elections,
            Arc::new(move |event: ChangeEvent| {
                if sender.send(event).is_err() {
                    debug!("change received after watch ended");
                }
            }),
        )
        .await
        .map_err(|error| output::describe("failed to watch elections", &error))?;

    let token = ctx.scope.token().clone();

    list(ctx, view).await?;

    loop {
        tokio::select! {
            () = token.cancelled() => break,
            change = changes.recv() => {
                let Some(change) = change else {
                    break;
                };

                info!(operation = ?change.operation, "elections changed");

                list(ctx, view).await?;
            }
        }
    }

    subscription.cancel();
    subscription.closed().await;

    Ok(())
}
