//! Casting votes.

use axum::{
    debug_handler,
    extract::State,
    response::{Html, Redirect},
};

use serde::Deserialize;

use crate::{
    app::{AppError, AppForm, AppState},
    auth::Authenticated,
    store::users,
    templates::vote_page,
};

/// Body of `POST /vote`.
#[derive(Debug, Deserialize)]
pub struct VoteForm {
    #[serde(default)]
    pub vote: Option<String>,
}

/// Shows the voting form.
#[debug_handler(state = AppState)]
pub async fn page(auth: Authenticated) -> Html<String> {
    Html(vote_page(&auth))
}

/// Overwrites the current user's vote.
///
/// Any string is accepted; votes are only parsed when aggregated.
#[debug_handler]
pub async fn submit(
    State(state): State<AppState>,
    auth: Authenticated,
    AppForm(form): AppForm<VoteForm>,
) -> Result<Redirect, AppError> {
    users::set_vote(&state.db, auth.id, form.vote.as_deref()).await?;

    tracing::debug!(id = auth.id, vote = ?form.vote, "vote cast");

    Ok(Redirect::to("/scoreboard"))
}
