use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::model::MissionKind;
use crate::permission::{Capability, PermissionResolver};
use crate::rank::Rank;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MissionDef {
    pub kind: MissionKind,
    /// Event key such as `PLACE:COBBLESTONE`.
    pub trigger: String,
    pub amount: i64,
}

/// Gameplay tables shared by every island.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct IslandRules {
    pub permissions: HashMap<Capability, Rank>,
    pub block_values: HashMap<String, f64>,
    pub missions: BTreeMap<String, MissionDef>,
    /// Leaderboard position (1-based) to display slot.
    pub island_top_slots: BTreeMap<usize, usize>,
    pub invite_ttl_ms: Option<i64>,
}

impl IslandRules {
    pub fn resolver(&self) -> PermissionResolver {
        PermissionResolver::new(&self.permissions)
    }

    pub fn block_value(&self, material: &str) -> Option<f64> {
        self.block_values.get(material).copied()
    }

    pub fn missions_triggered_by<'a>(
        &'a self,
        trigger: &'a str,
    ) -> impl Iterator<Item = (&'a String, &'a MissionDef)> + 'a {
        self.missions
            .iter()
            .filter(move |(_, mission)| mission.trigger == trigger)
    }
}

impl Default for IslandRules {
    fn default() -> Self {
        let block_values = [
            ("IRON_BLOCK", 3.0),
            ("GOLD_BLOCK", 5.0),
            ("EMERALD_BLOCK", 20.0),
            ("DIAMOND_BLOCK", 10.0),
            ("NETHERITE_BLOCK", 150.0),
        ]
        .into_iter()
        .map(|(material, value)| (material.to_string(), value))
        .collect();
        let mut missions = BTreeMap::new();
        missions.insert(
            "cobblestone_builder".to_string(),
            MissionDef {
                kind: MissionKind::Daily,
                trigger: "PLACE:COBBLESTONE".to_string(),
                amount: 64,
            },
        );
        let island_top_slots = [
            (1, 4),
            (2, 12),
            (3, 14),
            (4, 19),
            (5, 20),
            (6, 21),
            (7, 22),
            (8, 23),
            (9, 24),
            (10, 25),
        ]
        .into_iter()
        .collect();
        Self {
            permissions: HashMap::new(),
            block_values,
            missions,
            island_top_slots,
            invite_ttl_ms: None,
        }
    }
}
