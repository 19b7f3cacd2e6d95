//! Tally general application items.

use std::fmt::{self, Debug, Display, Formatter};
use std::sync::Arc;

use anyhow::Error;

use axum::extract::rejection::FormRejection;
use axum::extract::{FromRequest, Request};
use axum::middleware::Next;
use axum::{
    Form, Json,
    response::{IntoResponse, Redirect, Response},
};

use chrono::TimeDelta;

use http::{HeaderValue, StatusCode, header};

use tally_model::{Error as ApiError, ErrorCode};

use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

use derive_more::{Deref, Display, From};

use jsonwebtoken::{DecodingKey, EncodingKey, errors::Error as JwtError};

use rand::{Rng as _, SeedableRng as _, rngs::StdRng};

use base16::encode_lower;

use crate::auth::hasher::{CredentialHasher, Sha256Hasher};
use crate::config::ServerConfig;
use crate::store;

/// Shared server state.
///
/// Cheaply cloneable.
#[derive(Clone)]
pub struct AppState {
    /// The port the server is binded to.
    pub port: u16,
    /// A database connection pool.
    pub db: SqlitePool,
    /// The secret signing keys for session tokens.
    pub keys: Arc<SigningKeys>,
    /// The password digest used to register and verify users.
    pub hasher: Arc<dyn CredentialHasher>,
    /// How long a session token stays valid.
    pub session_lifetime: TimeDelta,
}

impl AppState {
    /// Creates a new `AppState`, connecting to the configured database.
    ///
    /// See [`ServerConfig`] to learn more on what the options do.
    pub async fn new(config: ServerConfig) -> Result<AppState, Error> {
        let options = config
            .database_url
            .parse::<SqliteConnectOptions>()?
            .create_if_missing(true);

        // establish database connection
        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        AppState::with_pool(config, pool).await
    }

    /// Creates a new `AppState` over an existing pool.
    ///
    /// The schema is created if it does not exist yet.
    pub async fn with_pool(config: ServerConfig, pool: SqlitePool) -> Result<AppState, Error> {
        // schema failures are not fatal
        if let Err(err) = store::schema::create_all(&pool).await {
            tracing::error!(?err, "failed to create database schema");
        }

        // randomly generate JWT secret
        let keys = match config.signing_key.as_ref() {
            Some(key) => Arc::from(SigningKeys::new(key)?),
            None => Arc::from(SigningKeys::new_random()),
        };

        let hasher = Sha256Hasher::new(config.password_key.clone());

        Ok(AppState {
            port: config.port,
            db: pool,
            keys,
            hasher: Arc::new(hasher),
            session_lifetime: TimeDelta::hours(config.session_lifetime_hours),
        })
    }
}

impl Debug for AppState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("port", &self.port)
            .field("session_lifetime", &self.session_lifetime)
            .finish_non_exhaustive()
    }
}

/// App response headers.
pub async fn app_headers(request: Request, next: Next) -> Response {
    let mut res = next.run(request).await;

    // apply additional headers for page safety
    res.headers_mut().extend([
        (header::CACHE_CONTROL, HeaderValue::from_static("no-store")),
        (
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static("frame-ancestors 'none'"),
        ),
        (
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ),
        (header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY")),
    ]);

    res
}

// Stolen from: https://github.com/tokio-rs/axum/blob/main/examples/error-handling/src/main.rs
// Our middleware is responsible for logging error details internally
pub async fn log_app_errors(request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    // If the response contains an AppError Extension, log it.
    if let Some(err) = response.extensions().get::<Arc<AppError>>() {
        tracing::error!(?err, "an unexpected error occurred inside a handler");
    }
    response
}

/// App Form extractor.
#[derive(Deref, FromRequest)]
#[from_request(via(Form), rejection(AppError))]
pub struct AppForm<T>(pub T);

/// App JSON responder.
pub struct AppJson<T>(pub T);

impl<T> IntoResponse for AppJson<T>
where
    Json<T>: IntoResponse,
{
    fn into_response(self) -> Response {
        Json(self.0).into_response()
    }
}

/// An app error.
#[derive(Debug)]
pub struct AppError {
    kind: AppErrorKind,
    /// An optional override message.
    message: Option<String>,
}

impl AppError {
    /// The kind of the error.
    pub fn kind(&self) -> &AppErrorKind {
        &self.kind
    }

    /// Attachs an override message to the error.
    pub fn with_message(self, message: impl Into<String>) -> AppError {
        AppError {
            message: Some(message.into()),
            ..self
        }
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(message) = self.message.as_ref() {
            f.write_str(message)
        } else {
            Display::fmt(&self.kind, f)
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            AppErrorKind::Form(err) => Some(err),
            AppErrorKind::Session(err) => Some(err),
            AppErrorKind::Database(err) => Some(err),
            _ => None,
        }
    }
}

impl<T> From<T> for AppError
where
    AppErrorKind: From<T>,
{
    fn from(value: T) -> Self {
        AppError {
            kind: AppErrorKind::from(value),
            message: None,
        }
    }
}

#[derive(Debug, Display, From)]
pub enum AppErrorKind {
    /// The request's urlencoded body was malformed or unexpected.
    #[display("{_0}")]
    Form(FormRejection),
    /// The username is already registered.
    #[display("Username `{_0}` is already taken")]
    #[from(ignore)]
    Conflict(String),
    /// No logged-in user is attached to the request.
    #[display("Request unauthenticated")]
    #[from(ignore)]
    Unauthenticated,
    /// The cookie layer is not installed.
    #[display("Session cookies are unavailable")]
    #[from(ignore)]
    MissingCookies,
    /// A session token could not be created.
    #[display("{_0}")]
    Session(JwtError),
    /// An internal database error happened that was unhandled.
    #[display("{_0}")]
    Database(sqlx::Error),
}

impl IntoResponse for AppError {
    fn into_response(mut self) -> Response {
        let (status, mut error, internal_error) = match self.kind {
            // unauthenticated traffic is always sent back to the login page
            AppErrorKind::Unauthenticated => return Redirect::to("/login").into_response(),
            // FORM errors
            AppErrorKind::Form(FormRejection::FailedToDeserializeForm(error)) => (
                StatusCode::BAD_REQUEST,
                ApiError {
                    code: ErrorCode::InvalidData,
                    message: error.to_string(),
                },
                None,
            ),
            AppErrorKind::Form(FormRejection::FailedToDeserializeFormBody(error)) => (
                StatusCode::BAD_REQUEST,
                ApiError {
                    code: ErrorCode::InvalidData,
                    message: error.to_string(),
                },
                None,
            ),
            AppErrorKind::Form(FormRejection::InvalidFormContentType(_)) => (
                StatusCode::BAD_REQUEST,
                ApiError {
                    code: ErrorCode::UnsupportedContentType,
                    message: "No supported content type.".into(),
                },
                None,
            ),
            AppErrorKind::Conflict(username) => (
                StatusCode::CONFLICT,
                ApiError {
                    code: ErrorCode::UsernameTaken,
                    message: format!("The username `{}` is already taken.", username),
                },
                None,
            ),
            // create a generic internal error
            error_kind => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError {
                    code: ErrorCode::InternalServerError,
                    message: "An internal server error occured.".into(),
                },
                Some(AppError {
                    kind: error_kind,
                    message: self.message.take(),
                }),
            ),
        };

        if let Some(message) = self.message {
            error.message = message;
        }

        let mut response = (status, AppJson(error)).into_response();
        if let Some(error) = internal_error {
            response.extensions_mut().insert(Arc::new(error));
        }
        response
    }
}

/// Signing keys.
#[derive(Clone)]
pub struct SigningKeys {
    /// The encoding key.
    pub encoding: EncodingKey,
    /// The decoding key.
    pub decoding: DecodingKey,
    is_random: bool,
}

impl SigningKeys {
    /// Creates a new set of `SigningKeys` from a base64 secret.
    pub fn new(secret: impl Into<String>) -> Result<SigningKeys, JwtError> {
        let secret = secret.into();

        Ok(SigningKeys {
            encoding: EncodingKey::from_base64_secret(&secret)?,
            decoding: DecodingKey::from_base64_secret(&secret)?,
            is_random: false,
        })
    }

    /// Creates a new set of random `SigningKeys`.
    ///
    /// Sessions signed with these keys do not survive a restart.
    pub fn new_random() -> SigningKeys {
        let secret = random_signing_key();
        let keys = SigningKeys::new(secret).expect("valid format HMAC keys");

        SigningKeys {
            is_random: true,
            ..keys
        }
    }

    /// If the keys were randomly generated at runtime.
    pub fn is_random(&self) -> bool {
        self.is_random
    }
}

impl Debug for SigningKeys {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SigningKeys").finish_non_exhaustive()
    }
}

/// Creates a random HMAC signing key and returns it as a [`String`]
pub fn random_signing_key() -> String {
    let mut rng = StdRng::from_os_rng();
    let mut bytes = [0u8; 256];
    rng.fill(&mut bytes);

    encode_lower(&bytes)
}
