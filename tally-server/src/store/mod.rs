//! Persistent state.
//!
//! Users live in the `user` table; the scoreboard visibility flag is the
//! single `show_votes` row of the `option` table.

pub mod options;
pub mod schema;
pub mod users;
