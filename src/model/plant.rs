use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Growth-progress thresholds at which a plant enters the next stage.
pub const SPROUT_AT: f64 = 20.0;
pub const GROWING_AT: f64 = 40.0;
pub const MATURE_AT: f64 = 70.0;
pub const HARVESTABLE_AT: f64 = 100.0;

pub const MAX_HEALTH: i32 = 100;
pub const MAX_WATER: i32 = 100;
pub const DEFAULT_WATER: i32 = 50;

/// Lifecycle phase of a plant.
///
/// `Harvestable` and `Withered` are terminal for the growth tick; only a
/// harvest action moves a plant out of `Harvestable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlantStage {
    Seed,
    Sprout,
    Growing,
    Mature,
    Harvestable,
    Withered,
}

impl PlantStage {
    /// Map raw growth progress onto a stage. Never yields `Withered`.
    pub fn from_progress(progress: f64) -> Self {
        if progress < SPROUT_AT {
            PlantStage::Seed
        } else if progress < GROWING_AT {
            PlantStage::Sprout
        } else if progress < MATURE_AT {
            PlantStage::Growing
        } else if progress < HARVESTABLE_AT {
            PlantStage::Mature
        } else {
            PlantStage::Harvestable
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PlantStage::Harvestable | PlantStage::Withered)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PlantStage::Seed => "seed",
            PlantStage::Sprout => "sprout",
            PlantStage::Growing => "growing",
            PlantStage::Mature => "mature",
            PlantStage::Harvestable => "harvestable",
            PlantStage::Withered => "withered",
        }
    }

    pub const TERMINAL: [PlantStage; 2] = [PlantStage::Harvestable, PlantStage::Withered];
}

impl fmt::Display for PlantStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlantStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "seed" => Ok(PlantStage::Seed),
            "sprout" => Ok(PlantStage::Sprout),
            "growing" => Ok(PlantStage::Growing),
            "mature" => Ok(PlantStage::Mature),
            "harvestable" => Ok(PlantStage::Harvestable),
            "withered" => Ok(PlantStage::Withered),
            other => Err(other.to_string()),
        }
    }
}

/// Immutable catalog entry shared by every plant of the same kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantType {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub icon: String,
    /// Growth time in minutes; the growth rate is `1 / growth_time` per minute.
    pub growth_time: i32,
    pub water_needs: i32,
    pub fertilizer_needs: i32,
    /// Items per harvest.
    pub yield_amount: i32,
    /// Coins per harvested item.
    pub harvest_value: i32,
    pub experience_value: i32,
    pub min_level: i32,
    /// `spring`, `summer`, `autumn`, `winter` or `all`. Informational only.
    pub season: String,
    /// A weather condition name or `all`. Informational only.
    pub weather: String,
    pub rarity: String,
}

/// A plant growing in one garden cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plant {
    pub id: Uuid,
    pub garden_id: Uuid,
    pub plant_type_id: Uuid,
    pub position: i32,
    pub stage: PlantStage,
    pub health: i32,
    pub water_level: i32,
    pub growth_progress: f64,
    pub planted_at: DateTime<Utc>,
    pub last_watered_at: Option<DateTime<Utc>>,
    pub last_fertilized_at: Option<DateTime<Utc>>,
    pub harvested_at: Option<DateTime<Utc>>,
    /// Bumped by the store on every successful write.
    #[serde(skip)]
    pub version: i64,
}

impl Plant {
    /// A freshly planted seed with default health and water.
    pub fn sown(garden_id: Uuid, plant_type_id: Uuid, position: i32, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            garden_id,
            plant_type_id,
            position,
            stage: PlantStage::Seed,
            health: MAX_HEALTH,
            water_level: DEFAULT_WATER,
            growth_progress: 0.0,
            planted_at: now,
            last_watered_at: None,
            last_fertilized_at: None,
            harvested_at: None,
            version: 0,
        }
    }

    /// Withered by harvest rather than by neglect.
    pub fn is_harvested(&self) -> bool {
        self.harvested_at.is_some()
    }
}
