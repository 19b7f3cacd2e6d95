//! The shared scoreboard.

use axum::{
    debug_handler,
    extract::State,
    response::{Html, Redirect},
};

use serde::Deserialize;

use sqlx::SqliteConnection;

use tally_model::{scoreboard::Scoreboard, user::User};

use crate::{
    app::{AppError, AppForm, AppJson, AppState},
    auth::Authenticated,
    store::{options, users},
    templates::scoreboard_page,
};

/// Body of `POST /scoreboard`.
///
/// Every field is a presence flag.
#[derive(Debug, Default, Deserialize)]
pub struct ScoreboardForm {
    #[serde(default)]
    pub show: Option<String>,
    #[serde(default)]
    pub reset: Option<String>,
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Shows the scoreboard.
#[debug_handler]
pub async fn show(
    State(state): State<AppState>,
    auth: Authenticated,
) -> Result<Html<String>, AppError> {
    let mut conn = state.db.acquire().await?;
    let board = load(&mut conn).await?;

    Ok(Html(scoreboard_page(&auth, &board.redacted())))
}

/// Gets the scoreboard as JSON.
///
/// Votes and stats are stripped while the scoreboard is hidden.
#[debug_handler]
pub async fn api(
    State(state): State<AppState>,
    _auth: Authenticated,
) -> Result<AppJson<Scoreboard>, AppError> {
    let mut conn = state.db.acquire().await?;
    let board = load(&mut conn).await?;

    Ok(AppJson(board.redacted()))
}

/// Applies master actions to the scoreboard.
///
/// `show` reveals the votes; `reset` hides them and clears every vote.
/// Non-masters can post here, but their actions are ignored.
#[debug_handler]
pub async fn update(
    State(state): State<AppState>,
    auth: Authenticated,
    AppForm(form): AppForm<ScoreboardForm>,
) -> Result<Redirect, AppError> {
    let requested = form.show.is_some() || form.reset.is_some();

    if requested && !auth.is_master {
        tracing::warn!(
            id = auth.id,
            username = %auth.username,
            ?form,
            "ignoring scoreboard action from non-master",
        );
    } else if requested {
        let mut conn = state.db.acquire().await?;

        if form.show.is_some() {
            options::show_votes(&mut conn, Some(true)).await?;
            tracing::info!(id = auth.id, "votes revealed");
        }

        if form.reset.is_some() {
            reset(&mut conn).await?;
            tracing::info!(id = auth.id, "votes reset");
        }
    }

    Ok(Redirect::to("/scoreboard"))
}

/// Loads the scoreboard of every logged-in user.
///
/// This reveals the scoreboard if everyone has voted.
pub async fn load(conn: &mut SqliteConnection) -> Result<Scoreboard, sqlx::Error> {
    let show = options::show_votes(&mut *conn, None).await?;
    let users = users::logged_in(&mut *conn).await?;

    Ok(Scoreboard::new(users.into_iter().map(User::from), show))
}

/// Hides the scoreboard and clears every logged-in user's vote.
///
/// Returns how many votes were cleared.
pub async fn reset(conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    options::show_votes(&mut *conn, Some(false)).await?;
    users::clear_votes(&mut *conn).await
}
