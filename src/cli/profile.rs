use clap::{Args, Subcommand, ValueEnum};
use urna::{
    context::AppContext,
    domain::{
        profiles::data::{GenderSelection, ProfileUpdate},
        users::records::UserId,
    },
};

use super::{current_session, fetch, output};

#[derive(Debug, Args)]
pub(crate) struct ProfileCommand {
    #[command(subcommand)]
    command: ProfileSubcommand,
}

#[derive(Debug, Subcommand)]
enum ProfileSubcommand {
    /// Show a profile, yours by default
    Show(ShowArgs),

    /// Save a profile, yours by default
    Set(SetArgs),
}

#[derive(Debug, Args)]
struct ShowArgs {
    /// Another user's id; ADMIN only
    #[arg(long)]
    user: Option<UserId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Gender {
    Masculino,
    Femenino,
    Otro,

    /// Free text given with --custom-gender
    Personalizado,
}

#[derive(Debug, Args)]
struct SetArgs {
    /// Another user's id; ADMIN only
    #[arg(long)]
    user: Option<UserId>,

    #[arg(long)]
    first_name: String,

    #[arg(long)]
    last_name: String,

    #[arg(long)]
    age: i32,

    #[arg(long, value_enum)]
    gender: Gender,

    /// Required when --gender is personalizado
    #[arg(long, required_if_eq("gender", "personalizado"))]
    custom_gender: Option<String>,
}

impl SetArgs {
    fn gender_selection(&self) -> GenderSelection {
        match self.gender {
            Gender::Masculino => GenderSelection::Masculino,
            Gender::Femenino => GenderSelection::Femenino,
            Gender::Otro => GenderSelection::Otro,
            Gender::Personalizado => {
                GenderSelection::Personalizado(self.custom_gender.clone().unwrap_or_default())
            }
        }
    }
}

pub(crate) async fn run(ctx: &AppContext, command: ProfileCommand) -> Result<(), String> {
    match command.command {
        ProfileSubcommand::Show(args) => show(ctx, args.user).await,
        ProfileSubcommand::Set(args) => set(ctx, args).await,
    }
}

async fn show(ctx: &AppContext, user: Option<UserId>) -> Result<(), String> {
    let session = current_session(ctx).await?;

    let Some(user) = user.filter(|user| *user != session.user.id) else {
        output::profile(session.profile.as_ref());

        return Ok(());
    };

    if !session.user.role.manages_users() {
        return Err("only ADMIN users may view other profiles".to_string());
    }

    let profile = fetch(ctx, "failed to load profile", ctx.profiles.get_profile(user)).await?;

    output::profile(profile.as_ref());

    Ok(())
}

async fn set(ctx: &AppContext, args: SetArgs) -> Result<(), String> {
    let session = current_session(ctx).await?;
    let user = args.user.unwrap_or(session.user.id);

    let update = ProfileUpdate {
        gender: args.gender_selection(),
        first_name: args.first_name,
        last_name: args.last_name,
        age: args.age,
    };

    let profile = fetch(
        ctx,
        "failed to save profile",
        ctx.profiles.upsert_profile(session.actor(), user, update),
    )
    .await?;

    if profile.user_id == session.user.id {
        ctx.sessions
            .cache_profile(&profile)
            .await
            .map_err(|error| output::describe("failed to cache profile", &error))?;
    }

    output::message("profile saved");

    Ok(())
}
