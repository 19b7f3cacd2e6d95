//! Tally, a small planning-poker scoreboard.
//!
//! Users log in, cast a vote and watch the shared scoreboard. A master user
//! may reveal the votes early or reset the round.

pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod routes;
pub mod store;
pub mod templates;

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware::{from_fn, from_fn_with_state},
    routing::get,
};

use tower_cookies::CookieManagerLayer;

use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::app::AppState;

/// Builds the app router.
pub fn router(state: AppState) -> Router {
    Router::<AppState>::new()
        .route("/", get(routes::index))
        .route("/css/style.css", get(routes::stylesheet))
        .route(
            "/login",
            get(routes::login::page).post(routes::login::submit),
        )
        .route("/logout", get(routes::login::logout))
        .route("/vote", get(routes::vote::page).post(routes::vote::submit))
        .route(
            "/scoreboard",
            get(routes::scoreboard::show).post(routes::scoreboard::update),
        )
        .route("/api/scoreboard", get(routes::scoreboard::api))
        .layer(from_fn_with_state(state.clone(), auth::require_login))
        .layer(CookieManagerLayer::new())
        .layer(from_fn(app::app_headers))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &Request| {
                    let method = req.method();
                    let uri = req.uri();

                    // axum automatically adds this extension.
                    let matched_path = req
                        .extensions()
                        .get::<MatchedPath>()
                        .map(|matched_path| matched_path.as_str());

                    tracing::debug_span!("request", %method, %uri, matched_path)
                })
                // By default `TraceLayer` will log 5xx responses but we're doing our specific
                // logging of errors so disable that
                .on_failure(()),
        )
        .layer(from_fn(app::log_app_errors))
        .layer(CompressionLayer::new())
        .with_state(state)
}
