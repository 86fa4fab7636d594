//! Two-tier capability resolution.
//!
//! A per-island override, when present, decides outright. Otherwise the
//! actor's rank is compared against the capability's global minimum rank.
//! Non-members are always denied.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::User;
use crate::rank::Rank;
use crate::IslandId;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    BlockPlace,
    BlockBreak,
    Promote,
    Demote,
    Kick,
    Invite,
    WithdrawBank,
    ChangePermissions,
}

impl Capability {
    pub const ALL: [Capability; 8] = [
        Capability::BlockPlace,
        Capability::BlockBreak,
        Capability::Promote,
        Capability::Demote,
        Capability::Kick,
        Capability::Invite,
        Capability::WithdrawBank,
        Capability::ChangePermissions,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Capability::BlockPlace => "blockPlace",
            Capability::BlockBreak => "blockBreak",
            Capability::Promote => "promote",
            Capability::Demote => "demote",
            Capability::Kick => "kick",
            Capability::Invite => "invite",
            Capability::WithdrawBank => "withdrawBank",
            Capability::ChangePermissions => "changePermissions",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Capability::ALL
            .into_iter()
            .find(|capability| capability.as_str() == value)
    }

    /// Minimum rank used when neither config nor an override says otherwise.
    pub fn builtin_minimum(self) -> Rank {
        match self {
            Capability::BlockPlace | Capability::BlockBreak => Rank::Member,
            Capability::Invite | Capability::Kick | Capability::WithdrawBank => Rank::Moderator,
            Capability::Promote | Capability::Demote => Rank::CoOwner,
            Capability::ChangePermissions => Rank::Owner,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug)]
pub struct PermissionResolver {
    minimums: HashMap<Capability, Rank>,
}

impl PermissionResolver {
    /// Builds the global default table; `configured` entries replace the
    /// built-in minimums.
    pub fn new(configured: &HashMap<Capability, Rank>) -> Self {
        let minimums = Capability::ALL
            .into_iter()
            .map(|capability| {
                let rank = configured
                    .get(&capability)
                    .copied()
                    .unwrap_or_else(|| capability.builtin_minimum());
                (capability, rank)
            })
            .collect();
        Self { minimums }
    }

    pub fn minimum_rank(&self, capability: Capability) -> Rank {
        self.minimums
            .get(&capability)
            .copied()
            .unwrap_or_else(|| capability.builtin_minimum())
    }

    pub fn resolve(
        &self,
        island: IslandId,
        user: &User,
        capability: Capability,
        override_value: Option<bool>,
    ) -> bool {
        if !user.is_member_of(island) {
            return false;
        }
        if let Some(allowed) = override_value {
            return allowed;
        }
        user.rank.level() >= self.minimum_rank(capability).level()
    }
}

impl Default for PermissionResolver {
    fn default() -> Self {
        Self::new(&HashMap::new())
    }
}

#[cfg(test)]
mod tests {
    use super::{Capability, PermissionResolver};
    use crate::model::User;
    use crate::rank::Rank;
    use crate::{IslandId, UserId};
    use std::collections::HashMap;

    fn member(island: IslandId, rank: Rank) -> User {
        let mut user = User::new(UserId::new(), "member");
        user.join(island, rank);
        user
    }

    #[test]
    fn outsiders_are_denied_even_with_allow_override() {
        let resolver = PermissionResolver::default();
        let island = IslandId(1);
        let outsider = member(IslandId(2), Rank::Owner);
        assert!(!resolver.resolve(island, &outsider, Capability::BlockPlace, Some(true)));
        assert!(!resolver.resolve(island, &outsider, Capability::BlockPlace, None));
    }

    #[test]
    fn override_is_authoritative_for_every_rank() {
        let resolver = PermissionResolver::default();
        let island = IslandId(7);
        for capability in Capability::ALL {
            for rank in Rank::ALL {
                let user = member(island, rank);
                assert!(resolver.resolve(island, &user, capability, Some(true)));
                assert!(!resolver.resolve(island, &user, capability, Some(false)));
            }
        }
    }

    #[test]
    fn defaults_compare_rank_levels() {
        let resolver = PermissionResolver::default();
        let island = IslandId(1);
        assert!(resolver.resolve(island, &member(island, Rank::Member), Capability::BlockPlace, None));
        assert!(!resolver.resolve(island, &member(island, Rank::Moderator), Capability::Promote, None));
        assert!(resolver.resolve(island, &member(island, Rank::CoOwner), Capability::Promote, None));
        assert!(resolver.resolve(island, &member(island, Rank::Owner), Capability::ChangePermissions, None));
    }

    #[test]
    fn configured_minimums_replace_builtins() {
        let mut configured = HashMap::new();
        configured.insert(Capability::BlockPlace, Rank::Moderator);
        let resolver = PermissionResolver::new(&configured);
        let island = IslandId(1);
        assert_eq!(resolver.minimum_rank(Capability::BlockPlace), Rank::Moderator);
        assert_eq!(resolver.minimum_rank(Capability::Kick), Rank::Moderator);
        assert!(!resolver.resolve(island, &member(island, Rank::Member), Capability::BlockPlace, None));
    }

    #[test]
    fn capability_names_parse_back() {
        for capability in Capability::ALL {
            assert_eq!(Capability::parse(capability.as_str()), Some(capability));
        }
        assert_eq!(Capability::parse("fly"), None);
    }
}
