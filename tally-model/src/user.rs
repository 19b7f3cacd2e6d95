//! User data models.

use serde::{Deserialize, Serialize};

/// A single user, as seen by other users.
///
/// The password digest never leaves the server.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize, Hash)]
pub struct User {
    /// The unique ID of the user.
    pub id: i64,
    /// The username of the user.
    pub username: String,
    /// Whether the user is currently logged in.
    pub logged_in: bool,
    /// The last vote the user submitted, as typed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote: Option<String>,
    /// Whether the user may reveal or reset the scoreboard.
    pub is_master: bool,
}

impl User {
    /// Checks if the user has submitted a vote since the last reset.
    pub fn has_voted(&self) -> bool {
        self.vote.is_some()
    }
}
