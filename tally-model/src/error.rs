//! API error representations.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use derive_more::Error as DeriveError;

/// API error.
#[derive(Clone, Debug, Deserialize, Serialize, DeriveError)]
pub struct Error {
    /// An API error code.
    pub code: ErrorCode,
    /// A user-friendly message of the error.
    pub message: String,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.message.fmt(f)
    }
}

/// An API error code.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(from = "u32", into = "u32")]
pub enum ErrorCode {
    /// The request had a well-formed body, but the data was otherwise
    /// unexpected.
    InvalidData,
    /// The server refuses to serve that content type.
    UnsupportedContentType,
    /// The username is already taken by another user.
    UsernameTaken,
    /// An internal server error occured.
    ///
    /// This is a bug, usually.
    InternalServerError,
    /// Any other error code.
    Other(u32),
}

impl From<u32> for ErrorCode {
    fn from(value: u32) -> Self {
        match value {
            4001 => ErrorCode::InvalidData,
            4002 => ErrorCode::UnsupportedContentType,
            4009 => ErrorCode::UsernameTaken,
            5000 => ErrorCode::InternalServerError,
            other => ErrorCode::Other(other),
        }
    }
}

impl From<ErrorCode> for u32 {
    fn from(value: ErrorCode) -> Self {
        match value {
            ErrorCode::InvalidData => 4001,
            ErrorCode::UnsupportedContentType => 4002,
            ErrorCode::UsernameTaken => 4009,
            ErrorCode::InternalServerError => 5000,
            ErrorCode::Other(other) => other,
        }
    }
}
