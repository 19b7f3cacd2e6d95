//! Session authentication.
//!
//! Every request goes through [`require_login`], which resolves the session
//! cookie into a [`CurrentUser`] exactly once. Handlers then extract either
//! [`CurrentUser`] when a user is optional, or [`Authenticated`] when one is
//! required.

pub mod hasher;
pub mod session;

use axum::{
    RequestPartsExt,
    extract::{FromRef, FromRequestParts, Request},
    middleware::Next,
    response::{IntoResponse as _, Redirect, Response},
};

use derive_more::Deref;

use http::request::Parts;

use tower_cookies::Cookies;

use crate::{
    app::{AppError, AppErrorKind, AppState},
    store::users::{self, UserRecord},
};

use session::{Claims, SESSION_COOKIE};

/// Routes reachable without a session.
pub const PUBLIC_ROUTES: &[&str] = &["/login"];

/// Route prefixes reachable without a session.
pub const PUBLIC_PREFIXES: &[&str] = &["/css/"];

/// Checks if a path is reachable without logging in.
pub fn is_public_path(path: &str) -> bool {
    PUBLIC_ROUTES.contains(&path)
        || PUBLIC_PREFIXES
            .iter()
            .any(|prefix| path.starts_with(prefix))
}

/// The user attached to the request's session, if any.
///
/// The user may have logged out from another session, so check
/// [`UserRecord::logged_in`] or use [`Authenticated`].
#[derive(Clone, Debug)]
pub struct CurrentUser(pub Option<UserRecord>);

impl CurrentUser {
    /// Resolves a session token to its user.
    ///
    /// Bad or expired tokens, and tokens for users that no longer exist,
    /// resolve to no user.
    pub async fn resolve(state: &AppState, token: &str) -> Result<CurrentUser, AppError> {
        let claims = match Claims::decode(token, &state.keys) {
            Ok(claims) => claims,
            Err(err) => {
                tracing::debug!(%err, "ignoring invalid session token");
                return Ok(CurrentUser(None));
            }
        };

        let user = users::find_by_id(&state.db, claims.uid).await?;
        Ok(CurrentUser(user))
    }

    /// Gets the user if they are logged in.
    pub fn logged_in(&self) -> Option<&UserRecord> {
        self.0.as_ref().filter(|user| user.logged_in)
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // if the result was cached, simply return the cached value
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let cookies = parts
            .extract::<Cookies>()
            .await
            .map_err(|_| AppErrorKind::MissingCookies)?;

        let user = match cookies.get(SESSION_COOKIE) {
            Some(cookie) => {
                let state = AppState::from_ref(state);
                CurrentUser::resolve(&state, cookie.value()).await?
            }
            None => CurrentUser(None),
        };

        // cache to extensions
        parts.extensions.insert(user.clone());

        Ok(user)
    }
}

/// Authentication guard.
///
/// Rejects with a redirect to the login page unless a logged-in user is
/// attached to the request.
#[derive(Clone, Debug, Deref)]
pub struct Authenticated(UserRecord);

impl<S> FromRequestParts<S> for Authenticated
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = parts.extract_with_state::<CurrentUser, S>(state).await?;

        match user.0 {
            Some(user) if user.logged_in => Ok(Authenticated(user)),
            _ => Err(AppErrorKind::Unauthenticated.into()),
        }
    }
}

/// Auth gate.
///
/// Lets public routes through, and everything else only if a logged-in user
/// is attached. Other traffic is redirected to the login page.
pub async fn require_login(user: CurrentUser, request: Request, next: Next) -> Response {
    if is_public_path(request.uri().path()) || user.logged_in().is_some() {
        next.run(request).await
    } else {
        let path = request.uri().path();
        tracing::debug!(path, "redirecting unauthenticated request to login");
        Redirect::to("/login").into_response()
    }
}
