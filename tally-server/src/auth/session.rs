//! Session tokens.
//!
//! A session is a signed JWT kept in a cookie. It carries the ID of the
//! logged-in user and whether they asked to be a master when logging in.

use chrono::{TimeDelta, Utc};

use jsonwebtoken::{Header, Validation, errors::Error as JwtError};

use serde::{Deserialize, Serialize};

use tower_cookies::{Cookie, Cookies};

use crate::app::SigningKeys;

/// The name of the session cookie.
pub const SESSION_COOKIE: &str = "tally_session";

/// Session token claims.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Claims {
    /// The ID of the logged-in user.
    pub uid: i64,
    /// Whether the user was a master when the session started.
    pub is_master: bool,
    /// Issued at, in seconds since the epoch.
    pub iat: i64,
    /// Expiry, in seconds since the epoch.
    pub exp: i64,
}

impl Claims {
    /// Creates a new [`ClaimsBuilder`] for a user.
    pub fn builder(uid: i64) -> ClaimsBuilder {
        ClaimsBuilder {
            uid,
            is_master: false,
            exp: TimeDelta::hours(1),
        }
    }

    /// Signs the claims.
    pub fn encode(&self, keys: &SigningKeys) -> Result<String, JwtError> {
        jsonwebtoken::encode(&Header::default(), self, &keys.encoding)
    }

    /// Verifies and decodes a token.
    ///
    /// Fails if the token was tampered with or has expired.
    pub fn decode(token: &str, keys: &SigningKeys) -> Result<Claims, JwtError> {
        jsonwebtoken::decode::<Claims>(token, &keys.decoding, &Validation::default())
            .map(|data| data.claims)
    }
}

/// Builds [`Claims`].
#[derive(Clone, Debug)]
pub struct ClaimsBuilder {
    uid: i64,
    is_master: bool,
    exp: TimeDelta,
}

impl ClaimsBuilder {
    /// Marks the session as a master session.
    pub fn master(self, is_master: bool) -> ClaimsBuilder {
        ClaimsBuilder { is_master, ..self }
    }

    /// Sets how long the session is valid for.
    pub fn exp(self, exp: TimeDelta) -> ClaimsBuilder {
        ClaimsBuilder { exp, ..self }
    }

    /// Builds the claims, starting now.
    pub fn build(self) -> Claims {
        let now = Utc::now();

        Claims {
            uid: self.uid,
            is_master: self.is_master,
            iat: now.timestamp(),
            exp: (now + self.exp).timestamp(),
        }
    }
}

/// Stores a signed session in the session cookie.
pub fn start_session(cookies: &Cookies, token: String) {
    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_http_only(true);
    cookie.set_path("/");
    cookies.add(cookie);
}

/// Clears the session cookie.
pub fn end_session(cookies: &Cookies) {
    let mut cookie = Cookie::from(SESSION_COOKIE);
    cookie.set_path("/");
    cookies.remove(cookie);
}
