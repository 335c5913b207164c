use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default grid: 3x3.
pub const DEFAULT_GARDEN_SIZE: i32 = 9;

/// A user's plot. Owns its plants; deleting a garden cascades to them.
///
/// Soil, water and fertilizer levels belong to garden-level actions and are
/// carried here only so the row round-trips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Garden {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: String,
    /// Number of grid cells; valid plant positions are `0..size`.
    pub size: i32,
    pub soil_quality: i32,
    pub water_level: i32,
    pub fertilizer_level: i32,
    pub created_at: DateTime<Utc>,
}

impl Garden {
    pub fn new(user_id: Uuid, name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            name: name.into(),
            description: String::new(),
            size: DEFAULT_GARDEN_SIZE,
            soil_quality: 50,
            water_level: 50,
            fertilizer_level: 0,
            created_at: now,
        }
    }

    pub fn contains_position(&self, position: i32) -> bool {
        (0..self.size).contains(&position)
    }
}
