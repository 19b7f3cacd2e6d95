//! HTTP routes.

use axum::response::{IntoResponse, Redirect};

use http::header;

use crate::templates::STYLESHEET;

pub mod login;
pub mod scoreboard;
pub mod vote;

/// Sends the index to the scoreboard.
pub async fn index() -> Redirect {
    Redirect::to("/scoreboard")
}

/// Serves the stylesheet.
pub async fn stylesheet() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], STYLESHEET)
}
