//! Scoreboard data models and vote aggregation.

use serde::{Deserialize, Serialize};

use crate::user::User;

/// Aggregated statistics over every vote that parses as a number.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct Stats {
    /// The smallest vote.
    pub min: f64,
    /// The largest vote.
    pub max: f64,
    /// The arithmetic mean of all votes.
    pub avg: f64,
}

impl Stats {
    /// Aggregates a set of raw vote strings.
    ///
    /// Missing votes and votes that are not a finite number are skipped.
    /// Returns `None` if nothing is left to aggregate.
    pub fn from_votes<'a, I>(votes: I) -> Option<Stats>
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;

        for value in votes.into_iter().flatten().filter_map(parse_vote) {
            count += 1;
            sum += value;
            min = min.min(value);
            max = max.max(value);
        }

        if count > 0 {
            Some(Stats {
                min,
                max,
                avg: sum / count as f64,
            })
        } else {
            None
        }
    }
}

/// Parses a single vote, tolerating surrounding whitespace.
pub fn parse_vote(vote: &str) -> Option<f64> {
    vote.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// A single user's row on the scoreboard.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Ballot {
    /// The ID of the voter.
    pub id: i64,
    /// The voter's username.
    pub username: String,
    /// Whether the voter has voted since the last reset.
    ///
    /// This is always present, even when votes are hidden.
    pub voted: bool,
    /// The raw vote, if it is revealed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote: Option<String>,
    /// Whether the voter is a master.
    pub is_master: bool,
}

impl From<User> for Ballot {
    fn from(user: User) -> Self {
        let voted = user.has_voted();

        Ballot {
            id: user.id,
            username: user.username,
            voted,
            vote: user.vote,
            is_master: user.is_master,
        }
    }
}

/// The shared scoreboard of every logged-in user.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Scoreboard {
    /// Whether votes and stats are revealed.
    pub show: bool,
    /// Every logged-in user.
    pub users: Vec<Ballot>,
    /// Vote statistics, absent if no vote could be aggregated or the votes
    /// are hidden.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<Stats>,
}

impl Scoreboard {
    /// Creates a new scoreboard from the logged-in users.
    pub fn new(users: impl IntoIterator<Item = User>, show: bool) -> Scoreboard {
        let users = users.into_iter().map(Ballot::from).collect::<Vec<_>>();
        let stats = Stats::from_votes(users.iter().map(|ballot| ballot.vote.as_deref()));

        Scoreboard { show, users, stats }
    }

    /// Strips every vote value and the stats if the scoreboard is hidden.
    pub fn redacted(mut self) -> Scoreboard {
        if !self.show {
            for ballot in self.users.iter_mut() {
                ballot.vote = None;
            }
            self.stats = None;
        }

        self
    }
}
