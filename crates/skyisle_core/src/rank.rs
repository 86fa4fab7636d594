//! Island membership ranks.
//!
//! Ranks form a total order by level. `Visitor` is the "no membership"
//! sentinel: demoting a member to it is an eviction, not a rank change.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rank {
    Visitor,
    Member,
    Moderator,
    CoOwner,
    Owner,
}

impl Rank {
    pub const ALL: [Rank; 5] = [
        Rank::Visitor,
        Rank::Member,
        Rank::Moderator,
        Rank::CoOwner,
        Rank::Owner,
    ];

    pub fn level(self) -> i32 {
        match self {
            Rank::Visitor => 0,
            Rank::Member => 1,
            Rank::Moderator => 2,
            Rank::CoOwner => 3,
            Rank::Owner => 4,
        }
    }

    pub fn from_level(level: i32) -> Option<Rank> {
        Rank::ALL.into_iter().find(|rank| rank.level() == level)
    }

    pub fn lowest() -> Rank {
        Rank::Visitor
    }

    pub fn highest() -> Rank {
        Rank::Owner
    }

    /// The rank one level above, if any.
    pub fn next(self) -> Option<Rank> {
        Rank::from_level(self.level() + 1)
    }

    /// The rank one level below, if any.
    pub fn previous(self) -> Option<Rank> {
        Rank::from_level(self.level() - 1)
    }

    pub fn compare(self, other: Rank) -> Ordering {
        self.level().cmp(&other.level())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Rank::Visitor => "VISITOR",
            Rank::Member => "MEMBER",
            Rank::Moderator => "MODERATOR",
            Rank::CoOwner => "CO_OWNER",
            Rank::Owner => "OWNER",
        }
    }
}

impl PartialOrd for Rank {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rank {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(*other)
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of lowering a member by one level.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Demotion {
    To(Rank),
    Evict,
}

/// Rank a target would reach when promoted by `acting`.
///
/// Nobody can lift a peer to or above their own level.
pub fn promotion(acting: Rank, target: Rank) -> Option<Rank> {
    target
        .next()
        .filter(|next| next.level() < acting.level())
}

/// Step applied when `acting` demotes `target`; `None` when the target is not
/// strictly below the actor.
pub fn demotion(acting: Rank, target: Rank) -> Option<Demotion> {
    if target.level() >= acting.level() {
        return None;
    }
    match target.previous() {
        Some(rank) if rank != Rank::Visitor => Some(Demotion::To(rank)),
        _ => Some(Demotion::Evict),
    }
}
