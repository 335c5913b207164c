use std::collections::HashMap;

use parking_lot::Mutex;
use uuid::Uuid;

use super::GardenStore;
use crate::error::{GardenError, Result};
use crate::model::{Garden, Plant, PlantType, Weather};

#[derive(Debug, Default)]
struct Tables {
    gardens: HashMap<Uuid, Garden>,
    plant_types: HashMap<Uuid, PlantType>,
    plants: HashMap<Uuid, Plant>,
    /// Append-only, in insertion order.
    weather: Vec<Weather>,
}

/// In-process store with the same semantics as [`PgStore`](super::PgStore),
/// including version-checked plant writes. Reads and writes take the lock
/// separately, so concurrent read-modify-write cycles can genuinely race.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GardenStore for MemoryStore {
    async fn insert_garden(&self, garden: &Garden) -> Result<()> {
        self.tables.lock().gardens.insert(garden.id, garden.clone());
        Ok(())
    }

    async fn garden(&self, id: Uuid) -> Result<Garden> {
        self.tables
            .lock()
            .gardens
            .get(&id)
            .cloned()
            .ok_or_else(|| GardenError::not_found("garden", id))
    }

    async fn delete_garden(&self, id: Uuid) -> Result<()> {
        let mut tables = self.tables.lock();
        if tables.gardens.remove(&id).is_none() {
            return Err(GardenError::not_found("garden", id));
        }
        tables.plants.retain(|_, p| p.garden_id != id);
        Ok(())
    }

    async fn ensure_plant_type(&self, plant_type: &PlantType) -> Result<PlantType> {
        let mut tables = self.tables.lock();
        if let Some(existing) = tables
            .plant_types
            .values()
            .find(|t| t.name == plant_type.name)
        {
            return Ok(existing.clone());
        }
        tables
            .plant_types
            .insert(plant_type.id, plant_type.clone());
        Ok(plant_type.clone())
    }

    async fn plant_type(&self, id: Uuid) -> Result<PlantType> {
        self.tables
            .lock()
            .plant_types
            .get(&id)
            .cloned()
            .ok_or_else(|| GardenError::not_found("plant type", id))
    }

    async fn plant_types(&self) -> Result<Vec<PlantType>> {
        let mut types: Vec<PlantType> = self.tables.lock().plant_types.values().cloned().collect();
        types.sort_by(|a, b| a.min_level.cmp(&b.min_level).then_with(|| a.name.cmp(&b.name)));
        Ok(types)
    }

    async fn insert_plant(&self, plant: &Plant) -> Result<()> {
        let mut tables = self.tables.lock();
        if !tables.gardens.contains_key(&plant.garden_id) {
            return Err(GardenError::not_found("garden", plant.garden_id));
        }
        if !tables.plant_types.contains_key(&plant.plant_type_id) {
            return Err(GardenError::not_found("plant type", plant.plant_type_id));
        }
        let occupied = tables
            .plants
            .values()
            .any(|p| p.garden_id == plant.garden_id && p.position == plant.position);
        if occupied {
            return Err(GardenError::PositionOccupied {
                position: plant.position,
            });
        }
        tables.plants.insert(plant.id, plant.clone());
        Ok(())
    }

    async fn plant(&self, id: Uuid) -> Result<Plant> {
        self.tables
            .lock()
            .plants
            .get(&id)
            .cloned()
            .ok_or_else(|| GardenError::not_found("plant", id))
    }

    async fn plants_in_garden(&self, garden_id: Uuid) -> Result<Vec<Plant>> {
        let mut plants: Vec<Plant> = self
            .tables
            .lock()
            .plants
            .values()
            .filter(|p| p.garden_id == garden_id)
            .cloned()
            .collect();
        plants.sort_by_key(|p| p.position);
        Ok(plants)
    }

    async fn growing_plants(&self) -> Result<Vec<(Plant, PlantType)>> {
        let tables = self.tables.lock();
        let mut growing: Vec<(Plant, PlantType)> = tables
            .plants
            .values()
            .filter(|p| !p.stage.is_terminal())
            .filter_map(|p| {
                let plant_type = tables.plant_types.get(&p.plant_type_id)?;
                Some((p.clone(), plant_type.clone()))
            })
            .collect();
        growing.sort_by_key(|(p, _)| p.planted_at);
        Ok(growing)
    }

    async fn save_plant(&self, plant: &Plant) -> Result<Plant> {
        let mut tables = self.tables.lock();
        let stored = tables
            .plants
            .get_mut(&plant.id)
            .ok_or_else(|| GardenError::not_found("plant", plant.id))?;
        if stored.version != plant.version {
            return Err(GardenError::Conflict(plant.id));
        }
        *stored = plant.clone();
        stored.version += 1;
        Ok(stored.clone())
    }

    async fn delete_plant(&self, id: Uuid) -> Result<()> {
        match self.tables.lock().plants.remove(&id) {
            Some(_) => Ok(()),
            None => Err(GardenError::not_found("plant", id)),
        }
    }

    async fn insert_weather(&self, weather: &Weather) -> Result<()> {
        self.tables.lock().weather.push(weather.clone());
        Ok(())
    }

    async fn latest_weather(&self) -> Result<Option<Weather>> {
        Ok(self
            .tables
            .lock()
            .weather
            .iter()
            .max_by_key(|w| w.created_at)
            .cloned())
    }

    async fn weather_history(&self, limit: usize) -> Result<Vec<Weather>> {
        let mut history = self.tables.lock().weather.clone();
        history.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        history.truncate(limit);
        Ok(history)
    }
}
