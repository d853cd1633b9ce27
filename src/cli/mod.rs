use std::error::Error;

use clap::{Parser, Subcommand};
use tracing::debug;
use urna::{config::AppConfig, context::AppContext, session::Session};

mod admin;
mod candidacies;
mod elections;
pub(crate) mod output;
mod profile;
mod results;
mod session;
mod users;
mod vote;

#[derive(Debug, Parser)]
#[command(name = "urna", about = "Urna voting CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) config: AppConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Log in and remember the session
    Login(session::LoginArgs),

    /// Forget the current session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// List the sections the current user may open
    Sections,

    Elections(elections::ElectionsCommand),
    Candidacies(candidacies::CandidaciesCommand),
    Vote(vote::VoteCommand),
    Results(results::ResultsCommand),
    Users(users::UsersCommand),
    Profile(profile::ProfileCommand),
    Admin(admin::AdminCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        let ctx = AppContext::from_config(&self.config)
            .await
            .map_err(|error| output::describe("failed to start", &error))?;

        let scope = ctx.scope.clone();

        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                debug!("interrupted");
                scope.cancel();
            }
        });

        match self.command {
            Commands::Login(args) => session::login(&ctx, args).await,
            Commands::Logout => session::logout(&ctx).await,
            Commands::Whoami => session::whoami(&ctx).await,
            Commands::Sections => session::sections(&ctx).await,
            Commands::Elections(command) => elections::run(&ctx, command).await,
            Commands::Candidacies(command) => candidacies::run(&ctx, command).await,
            Commands::Vote(command) => vote::run(&ctx, command).await,
            Commands::Results(command) => results::run(&ctx, command).await,
            Commands::Users(command) => users::run(&ctx, command).await,
            Commands::Profile(command) => profile::run(&ctx, command).await,
            Commands::Admin(command) => admin::run(&ctx, command).await,
        }
    }
}

/// Runs a backend request inside the context's scope.
pub(crate) async fn fetch<T, E, F>(ctx: &AppContext, what: &str, request: F) -> Result<T, String>
where
    F: Future<Output = Result<T, E>>,
    E: Error,
{
    ctx.scope
        .run(request)
        .await
        .map_err(|error| output::describe(what, &error))?
        .map_err(|error| output::describe(what, &error))
}

/// The logged-in session, or an error asking the user to log in.
pub(crate) async fn current_session(ctx: &AppContext) -> Result<Session, String> {
    ctx.sessions
        .require()
        .await
        .map_err(|error| output::describe("no usable session, run `urna login`", &error))
}
