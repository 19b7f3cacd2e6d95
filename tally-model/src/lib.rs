//! Tally data representations.

pub mod error;
pub mod scoreboard;
pub mod user;

pub use error::{Error, ErrorCode};
