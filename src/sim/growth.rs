use crate::model::plant::{MAX_HEALTH, MAX_WATER};
use crate::model::{Plant, PlantStage, PlantType, Weather};

/// Water level above which growth is boosted and health recovers.
const WELL_WATERED: i32 = 70;
/// Water level below which growth is slowed.
const DRY: i32 = 30;
/// Water level below which a plant loses health.
const PARCHED: i32 = 20;
/// Water level above which a plant regains health.
const SOAKED: i32 = 80;

const DROUGHT_DAMAGE: i32 = 5;
const RECOVERY: i32 = 2;

/// Growth multiplier from soil moisture.
pub fn water_bonus(water_level: i32) -> f64 {
    if water_level > WELL_WATERED {
        1.2
    } else if water_level < DRY {
        0.8
    } else {
        1.0
    }
}

/// Advance one plant by `tick_minutes` of simulated time under `weather`.
///
/// Pure: the caller decides whether and how to persist the result. Plants in
/// a terminal stage come back unchanged. Stage is always re-derived from
/// `growth_progress`, so re-running a tick against a persisted plant is safe.
pub fn advance(plant: &Plant, plant_type: &PlantType, weather: &Weather, tick_minutes: f64) -> Plant {
    let mut next = plant.clone();
    if plant.stage.is_terminal() {
        return next;
    }

    let base_rate = 1.0 / f64::from(plant_type.growth_time.max(1));
    let increment =
        base_rate * weather.growth_multiplier * water_bonus(plant.water_level) * tick_minutes;
    next.growth_progress += increment;
    next.stage = PlantStage::from_progress(next.growth_progress);

    let evaporation = weather.water_evaporation_rate * tick_minutes / 60.0;
    let lost = (evaporation * 10.0).round() as i32;
    next.water_level = (next.water_level - lost).clamp(0, MAX_WATER);

    if next.water_level < PARCHED {
        next.health = (next.health - DROUGHT_DAMAGE).max(0);
    } else if next.water_level > SOAKED {
        next.health = (next.health + RECOVERY).min(MAX_HEALTH);
    }

    if next.health <= 0 {
        next.health = 0;
        next.stage = PlantStage::Withered;
    }

    next
}
