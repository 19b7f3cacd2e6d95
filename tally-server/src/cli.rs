//! Tally server command-line interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use anyhow::Error;

use crate::{app::AppState, routes::scoreboard, store::users};

/// The command line arguments.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Subcommands.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Operational commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Lists every registered user.
    Users,
    /// Hides the votes and clears every logged-in user's vote.
    Reset,
    /// Logs every user out.
    LogoutAll,
}

/// Runs a command.
pub async fn run_command(command: &Command, state: &AppState) -> Result<(), Error> {
    match command {
        Command::Users => list_users(state).await,
        Command::Reset => reset(state).await,
        Command::LogoutAll => logout_all(state).await,
    }
}

async fn list_users(state: &AppState) -> Result<(), Error> {
    let users = users::all(&state.db).await?;

    for user in users {
        println!(
            "{}\t{}\t{}\t{}\t{}",
            user.id,
            user.username,
            if user.logged_in { "online" } else { "offline" },
            if user.is_master { "master" } else { "-" },
            user.vote.as_deref().unwrap_or("-"),
        );
    }

    Ok(())
}

async fn reset(state: &AppState) -> Result<(), Error> {
    let mut conn = state.db.acquire().await?;
    let cleared = scoreboard::reset(&mut conn).await?;

    tracing::info!(cleared, "votes reset from the command line");

    Ok(())
}

async fn logout_all(state: &AppState) -> Result<(), Error> {
    let count = users::logout_all(&state.db).await?;

    tracing::info!(count, "logged out every user");

    Ok(())
}
