//! Domain model for shared player islands: entities, the rank hierarchy,
//! capability resolution, gameplay rules and the leaderboard projection.

pub mod error;
pub mod ids;
pub mod leaderboard;
pub mod model;
pub mod permission;
pub mod rank;
pub mod rules;
pub mod time;

pub use error::{IsleError, IsleResult};
pub use ids::*;
pub use leaderboard::{fill_slots, top_n, TopSlot};
pub use model::*;
pub use permission::{Capability, PermissionResolver};
pub use rank::{demotion, promotion, Demotion, Rank};
pub use rules::{IslandRules, MissionDef};
pub use time::now_millis;
