//! Plain result values handed back to callers for user-facing messaging.

use std::fmt;

use skyisle_core::{Capability, Rank};

/// Why an island action was refused. A normal negative outcome, not an error.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Denial {
    NoSuchUser,
    NoSuchIsland,
    NotInIsland,
    TargetNotInIsland,
    MissingCapability(Capability),
    RankTooLow,
    OwnerCannotLeave,
    AlreadyInIsland,
    NoInvite,
    InviteExpired,
    InsufficientFunds,
    InvalidAmount,
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Denial::NoSuchUser => f.write_str("unknown user"),
            Denial::NoSuchIsland => f.write_str("unknown island"),
            Denial::NotInIsland => f.write_str("not a member of this island"),
            Denial::TargetNotInIsland => f.write_str("target is not a member of this island"),
            Denial::MissingCapability(capability) => {
                write!(f, "missing permission '{capability}'")
            }
            Denial::RankTooLow => f.write_str("rank too low for this target"),
            Denial::OwnerCannotLeave => f.write_str("the owner cannot leave their island"),
            Denial::AlreadyInIsland => f.write_str("already a member of an island"),
            Denial::NoInvite => f.write_str("no pending invite"),
            Denial::InviteExpired => f.write_str("invite expired"),
            Denial::InsufficientFunds => f.write_str("insufficient funds"),
            Denial::InvalidAmount => f.write_str("amount must be positive"),
        }
    }
}

pub type Outcome<T> = Result<T, Denial>;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DemoteOutcome {
    Demoted(Rank),
    Evicted,
}

/// Counter and island value after a block change.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlockTally {
    pub amount: i64,
    pub island_value: f64,
}

/// Result of a permitted placement. `tally` is `None` for untracked
/// materials.
#[derive(Clone, Debug, PartialEq)]
pub struct Placement {
    pub tally: Option<BlockTally>,
    pub completed_missions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denial_messages_name_the_capability() {
        assert_eq!(
            Denial::MissingCapability(Capability::Promote).to_string(),
            "missing permission 'promote'"
        );
        assert_eq!(Denial::NoInvite.to_string(), "no pending invite");
    }
}
