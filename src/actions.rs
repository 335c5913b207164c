//! User-triggered mutations.
//!
//! Every plant mutation goes through [`update_plant`], the same atomic
//! read-modify-write the growth tick uses, so a player action and a tick
//! landing on the same plant never overwrite each other.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::db::{GardenStore, update_plant};
use crate::error::{GardenError, Result};
use crate::model::plant::MAX_WATER;
use crate::model::{Garden, Plant, PlantStage};

const AMOUNT_RANGE: std::ops::RangeInclusive<i32> = 1..=100;
const XP_PER_LEVEL: i32 = 100;

/// What a successful harvest yields. Crediting the player is the caller's job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Harvest {
    pub plant: Plant,
    pub coins_earned: i32,
    pub experience_earned: i32,
}

/// Player level for a total experience count: one level per 100 XP, from 1.
pub fn calculate_level(experience: i32) -> i32 {
    experience.max(0) / XP_PER_LEVEL + 1
}

fn check_amount(amount: i32) -> Result<()> {
    if AMOUNT_RANGE.contains(&amount) {
        Ok(())
    } else {
        Err(GardenError::InvalidAmount(amount))
    }
}

pub async fn create_garden<S: GardenStore>(
    store: &S,
    user_id: Uuid,
    name: &str,
    description: &str,
    now: DateTime<Utc>,
) -> Result<Garden> {
    let mut garden = Garden::new(user_id, name, now);
    garden.description = description.to_string();
    store.insert_garden(&garden).await?;
    tracing::info!(garden = %garden.id, user = %user_id, "garden created");
    Ok(garden)
}

/// Sow a seed of `plant_type_id` into an empty cell.
pub async fn plant_seed<S: GardenStore>(
    store: &S,
    garden_id: Uuid,
    plant_type_id: Uuid,
    position: i32,
    now: DateTime<Utc>,
) -> Result<Plant> {
    let garden = store.garden(garden_id).await?;
    if !garden.contains_position(position) {
        return Err(GardenError::InvalidPosition {
            position,
            size: garden.size,
        });
    }
    // Surface a missing type as NotFound before touching the grid.
    let plant_type = store.plant_type(plant_type_id).await?;

    let plant = Plant::sown(garden.id, plant_type.id, position, now);
    // The store's uniqueness check is authoritative; two concurrent sowings
    // into one cell leave exactly one plant.
    store.insert_plant(&plant).await?;
    tracing::info!(plant = %plant.id, garden = %garden.id, position, kind = %plant_type.name, "seed planted");
    Ok(plant)
}

pub async fn water_plant<S: GardenStore>(
    store: &S,
    plant_id: Uuid,
    amount: i32,
    now: DateTime<Utc>,
) -> Result<Plant> {
    check_amount(amount)?;
    let plant = update_plant(store, plant_id, |p| {
        p.water_level = (p.water_level + amount).min(MAX_WATER);
        p.last_watered_at = Some(now);
        Ok(())
    })
    .await?;
    tracing::debug!(plant = %plant_id, water = plant.water_level, "plant watered");
    Ok(plant)
}

/// Record a fertilizer application. Fertilizer does not feed the growth
/// formula; only the timestamp is kept.
pub async fn fertilize_plant<S: GardenStore>(
    store: &S,
    plant_id: Uuid,
    amount: i32,
    now: DateTime<Utc>,
) -> Result<Plant> {
    check_amount(amount)?;
    update_plant(store, plant_id, |p| {
        p.last_fertilized_at = Some(now);
        Ok(())
    })
    .await
}

/// Harvest a ripe plant. Fails with `NotHarvestable` and leaves the row
/// untouched unless the stage read inside the atomic update is `Harvestable`.
/// The plant type is read before the harvest is written.
pub async fn harvest_plant<S: GardenStore>(
    store: &S,
    plant_id: Uuid,
    now: DateTime<Utc>,
) -> Result<Harvest> {
    let plant_type_id = store.plant(plant_id).await?.plant_type_id;
    let plant_type = store.plant_type(plant_type_id).await?;

    let plant = update_plant(store, plant_id, |p| {
        if p.stage != PlantStage::Harvestable {
            return Err(GardenError::NotHarvestable { stage: p.stage });
        }
        p.stage = PlantStage::Withered;
        p.harvested_at = Some(now);
        Ok(())
    })
    .await?;

    let harvest = Harvest {
        coins_earned: plant_type.harvest_value * plant_type.yield_amount,
        experience_earned: plant_type.experience_value,
        plant,
    };
    tracing::info!(
        plant = %plant_id,
        coins = harvest.coins_earned,
        xp = harvest.experience_earned,
        "plant harvested"
    );
    Ok(harvest)
}

pub async fn remove_plant<S: GardenStore>(store: &S, plant_id: Uuid) -> Result<()> {
    store.delete_plant(plant_id).await?;
    tracing::info!(plant = %plant_id, "plant removed");
    Ok(())
}
