//! Logging in and out.

use axum::{
    debug_handler,
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};

use serde::Deserialize;

use tower_cookies::Cookies;

use crate::{
    app::{AppError, AppForm, AppState},
    auth::{
        CurrentUser,
        session::{Claims, end_session, start_session},
    },
    store::users,
    templates::login_page,
};

/// The error shown when a password does not match.
pub const WRONG_PASSWORD: &str = "Wrong password!";

/// The error shown when the username is blank.
pub const MISSING_USERNAME: &str = "Username required!";

/// Body of `POST /login`.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Present if the user asks to be a master.
    #[serde(default)]
    pub is_master: Option<String>,
}

/// Shows the login form.
#[debug_handler]
pub async fn page() -> Html<String> {
    Html(login_page(None, None))
}

/// Logs a user in.
///
/// Usernames that were never seen before are registered on the spot with the
/// given password.
#[debug_handler]
pub async fn submit(
    State(state): State<AppState>,
    cookies: Cookies,
    AppForm(form): AppForm<LoginForm>,
) -> Result<Response, AppError> {
    if form.username.trim().is_empty() {
        return Ok(Html(login_page(Some(MISSING_USERNAME), None)).into_response());
    }

    let mut conn = state.db.acquire().await?;

    let user = users::find_by_username(&mut *conn, &form.username).await?;

    let (user, logged_in) = match user {
        None => {
            let digest = state.hasher.digest(&form.password);
            let user = users::register(&mut *conn, &form.username, &digest).await?;

            tracing::info!(id = user.id, username = %user.username, "registered new user");

            (user, true)
        }
        Some(user) => {
            let logged_in = state.hasher.verify(&form.password, &user.password_digest);
            (user, logged_in)
        }
    };

    let is_master = logged_in && form.is_master.is_some();
    users::set_login_state(&mut *conn, user.id, logged_in, is_master).await?;

    if !logged_in {
        tracing::info!(id = user.id, username = %user.username, "login refused: wrong password");

        return Ok(Html(login_page(Some(WRONG_PASSWORD), Some(&user.username))).into_response());
    }

    tracing::info!(id = user.id, username = %user.username, is_master, "user logged in");

    let token = Claims::builder(user.id)
        .master(is_master)
        .exp(state.session_lifetime)
        .build()
        .encode(&state.keys)?;
    start_session(&cookies, token);

    Ok(Redirect::to("/").into_response())
}

/// Logs the current user out and clears the session.
#[debug_handler]
pub async fn logout(
    State(state): State<AppState>,
    cookies: Cookies,
    CurrentUser(user): CurrentUser,
) -> Result<Redirect, AppError> {
    if let Some(user) = user {
        users::set_login_state(&state.db, user.id, false, user.is_master).await?;

        tracing::info!(id = user.id, username = %user.username, "user logged out");
    }

    end_session(&cookies);

    Ok(Redirect::to("/login"))
}
