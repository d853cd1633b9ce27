use clap::Args;
use urna::{context::AppContext, navigation::sections_for};

use super::{current_session, fetch, output};

#[derive(Debug, Args)]
pub(crate) struct LoginArgs {
    /// Username to log in as
    #[arg(long)]
    username: String,

    /// Password; read from URNA_PASSWORD when omitted
    #[arg(long, env = "URNA_PASSWORD", hide_env_values = true)]
    password: String,
}

pub(crate) async fn login(ctx: &AppContext, args: LoginArgs) -> Result<(), String> {
    let session = fetch(
        ctx,
        "failed to log in",
        ctx.sessions.login(&args.username, &args.password),
    )
    .await?;

    output::message(&format!(
        "logged in as {} ({})",
        session.user.username, session.user.role
    ));

    if session.profile.is_none() {
        output::message("no profile saved yet, set one with `urna profile set`");
    }

    Ok(())
}

pub(crate) async fn logout(ctx: &AppContext) -> Result<(), String> {
    ctx.sessions
        .logout()
        .await
        .map_err(|error| output::describe("failed to log out", &error))?;

    output::message("logged out");

    Ok(())
}

pub(crate) async fn whoami(ctx: &AppContext) -> Result<(), String> {
    let session = current_session(ctx).await?;

    output::session(&session);
    output::profile(session.profile.as_ref());

    Ok(())
}

pub(crate) async fn sections(ctx: &AppContext) -> Result<(), String> {
    let session = current_session(ctx).await?;

    let has_finalized = fetch(
        ctx,
        "failed to check for finished elections",
        ctx.elections.has_finalized_elections(),
    )
    .await?;

    output::sections(&sections_for(session.user.role, has_finalized));

    Ok(())
}
