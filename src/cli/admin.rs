use clap::{Args, Subcommand};
use urna::context::AppContext;

use super::{fetch, output};

#[derive(Debug, Args)]
pub(crate) struct AdminCommand {
    #[command(subcommand)]
    command: AdminSubcommand,
}

#[derive(Debug, Subcommand)]
enum AdminSubcommand {
    /// Create the first ADMIN account unless the username is taken
    Bootstrap(BootstrapArgs),
}

#[derive(Debug, Args)]
struct BootstrapArgs {
    #[arg(long, default_value = "0000000000")]
    identification: String,

    #[arg(long, default_value = "admin")]
    username: String,

    #[arg(long, env = "URNA_ADMIN_PASSWORD", hide_env_values = true)]
    password: String,
}

pub(crate) async fn run(ctx: &AppContext, command: AdminCommand) -> Result<(), String> {
    match command.command {
        AdminSubcommand::Bootstrap(args) => bootstrap(ctx, args).await,
    }
}

async fn bootstrap(ctx: &AppContext, args: BootstrapArgs) -> Result<(), String> {
    let created = fetch(
        ctx,
        "failed to create admin user",
        ctx.users
            .bootstrap_admin(args.identification, args.username.clone(), args.password),
    )
    .await?;

    match created {
        Some(user) => output::message(&format!(
            "created admin user {} ({})",
            user.username, user.id
        )),
        None => output::message(&format!("user {} already exists", args.username)),
    }

    Ok(())
}
