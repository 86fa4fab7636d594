use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{IsleError, IsleResult};

/// Backend-assigned surrogate key of an island.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IslandId(pub i32);

impl IslandId {
    pub fn as_i32(self) -> i32 {
        self.0
    }

    /// Ids below 1 are never handed out by the backend; they mark islands
    /// still waiting for a real id.
    pub fn is_provisional(self) -> bool {
        self.0 < 1
    }
}

impl fmt::Display for IslandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Stable player identity.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid_str(value: &str) -> IsleResult<Self> {
        let uuid = Uuid::parse_str(value)
            .map_err(|err| IsleError::invalid(format!("invalid uuid '{value}': {err}")))?;
        Ok(Self(uuid))
    }

    pub fn to_uuid_string(self) -> String {
        self.0.to_string()
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{IslandId, UserId};

    #[test]
    fn only_backend_ids_are_durable() {
        assert!(IslandId(-3).is_provisional());
        assert!(IslandId(0).is_provisional());
        assert!(!IslandId(1).is_provisional());
    }

    #[test]
    fn user_id_parses_its_own_string_form() {
        let id = UserId::new();
        let parsed = UserId::from_uuid_str(&id.to_uuid_string()).expect("parse");
        assert_eq!(parsed, id);
    }

    #[test]
    fn user_id_rejects_garbage() {
        assert!(UserId::from_uuid_str("not-a-uuid").is_err());
    }
}
