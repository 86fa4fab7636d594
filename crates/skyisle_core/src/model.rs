use serde::{Deserialize, Serialize};

use crate::permission::Capability;
use crate::rank::Rank;
use crate::{IslandId, UserId};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub island_id: Option<IslandId>,
    pub rank: Rank,
}

impl User {
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            island_id: None,
            rank: Rank::Visitor,
        }
    }

    pub fn is_member_of(&self, island: IslandId) -> bool {
        self.island_id == Some(island)
    }

    /// Rank on `island`; anyone outside it is a visitor there.
    pub fn rank_on(&self, island: IslandId) -> Rank {
        if self.is_member_of(island) {
            self.rank
        } else {
            Rank::Visitor
        }
    }

    pub fn join(&mut self, island: IslandId, rank: Rank) {
        self.island_id = Some(island);
        self.rank = rank;
    }

    /// Drops membership; the rank has no meaning without an island.
    pub fn clear_island(&mut self) {
        self.island_id = None;
        self.rank = Rank::Visitor;
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Island {
    pub id: IslandId,
    pub name: String,
    pub value: f64,
}

impl Island {
    pub fn new(id: IslandId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            value: 0.0,
        }
    }

    /// Applies a worth delta, never letting the total drop below zero.
    pub fn add_value(&mut self, delta: f64) {
        self.value = (self.value + delta).max(0.0);
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IslandInvite {
    pub island_id: IslandId,
    pub user_id: UserId,
    pub inviter_id: UserId,
    pub created_at_ms: i64,
}

impl IslandInvite {
    pub fn is_expired(&self, now_ms: i64, ttl_ms: Option<i64>) -> bool {
        match ttl_ms {
            Some(ttl) => now_ms.saturating_sub(self.created_at_ms) > ttl,
            None => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IslandPermissionOverride {
    pub island_id: IslandId,
    pub capability: Capability,
    pub allowed: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IslandBlockCount {
    pub island_id: IslandId,
    pub material: String,
    pub amount: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IslandBank {
    pub island_id: IslandId,
    pub item: String,
    pub amount: f64,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MissionKind {
    Once,
    Daily,
}

impl MissionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MissionKind::Once => "ONCE",
            MissionKind::Daily => "DAILY",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ONCE" => Some(MissionKind::Once),
            "DAILY" => Some(MissionKind::Daily),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IslandMission {
    pub island_id: IslandId,
    pub name: String,
    pub kind: MissionKind,
    pub progress: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchematicRecord {
    pub name: String,
    pub data: Vec<u8>,
}
