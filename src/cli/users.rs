use clap::{Args, Subcommand};
use urna::{
    context::AppContext,
    domain::users::{
        data::{NewUser, UserUpdate},
        records::{Role, UserId},
    },
};

use super::{current_session, fetch, output};

#[derive(Debug, Args)]
pub(crate) struct UsersCommand {
    #[command(subcommand)]
    command: UsersSubcommand,
}

#[derive(Debug, Subcommand)]
enum UsersSubcommand {
    /// List every user
    List,

    /// List CANDIDATO users that can be nominated
    Candidates,

    /// Create a user
    Create(CreateArgs),

    /// Edit a user
    Update(UpdateArgs),

    /// Delete a user
    Delete(DeleteArgs),
}

#[derive(Debug, Args)]
struct CreateArgs {
    #[arg(long)]
    identification: String,

    #[arg(long)]
    username: String,

    #[arg(long)]
    password: String,

    /// ADMINISTRATIVO, CANDIDATO or VOTANTE
    #[arg(long)]
    role: Role,
}

#[derive(Debug, Args)]
struct UpdateArgs {
    /// User id
    id: UserId,

    #[arg(long)]
    identification: String,

    #[arg(long)]
    username: String,

    /// New password; the current one is kept when omitted
    #[arg(long)]
    password: Option<String>,

    /// ADMINISTRATIVO, CANDIDATO or VOTANTE
    #[arg(long)]
    role: Role,
}

#[derive(Debug, Args)]
struct DeleteArgs {
    /// User id
    id: UserId,
}

pub(crate) async fn run(ctx: &AppContext, command: UsersCommand) -> Result<(), String> {
    let session = current_session(ctx).await?;
    let actor = session.actor();

    match command.command {
        UsersSubcommand::List => {
            let users = fetch(ctx, "failed to list users", ctx.users.list_users(actor)).await?;

            output::users(&users);
        }
        UsersSubcommand::Candidates => {
            let users = fetch(
                ctx,
                "failed to list candidates",
                ctx.users.list_candidates(actor),
            )
            .await?;

            output::users(&users);
        }
        UsersSubcommand::Create(args) => {
            let user = fetch(
                ctx,
                "failed to create user",
                ctx.users.create_user(
                    actor,
                    NewUser {
                        identification: args.identification,
                        username: args.username,
                        password: args.password,
                        role: args.role,
                    },
                ),
            )
            .await?;

            output::message(&format!("created user {} ({})", user.username, user.id));
        }
        UsersSubcommand::Update(args) => {
            let user = fetch(
                ctx,
                "failed to update user",
                ctx.users.update_user(
                    actor,
                    args.id,
                    UserUpdate {
                        identification: args.identification,
                        username: args.username,
                        password: args.password,
                        role: args.role,
                    },
                ),
            )
            .await?;

            output::message(&format!("updated user {} ({})", user.username, user.id));
        }
        UsersSubcommand::Delete(args) => {
            fetch(
                ctx,
                "failed to delete user",
                ctx.users.delete_user(actor, args.id),
            )
            .await?;

            output::message(&format!("deleted user {}", args.id));
        }
    }

    Ok(())
}
