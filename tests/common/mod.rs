use std::sync::atomic::{AtomicBool, AtomicI32, AtomicUsize, Ordering};

use chrono::{DateTime, Duration, TimeZone, Utc};
use garden_sim::catalog;
use garden_sim::db::{GardenStore, MemoryStore};
use garden_sim::model::*;
use garden_sim::{GardenError, Result};
use uuid::Uuid;

/// Mid-July noon: summer, and far from any hour-of-day edge.
pub fn summer_noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 7, 15, 12, 0, 0).unwrap()
}

/// A store holding the seeded catalog and one empty 3×3 garden.
pub async fn build_test_garden<S: GardenStore>(store: &S) -> (Garden, Vec<PlantType>) {
    let catalog = catalog::seed_catalog(store).await.unwrap();
    let garden = Garden::new(Uuid::new_v4(), "Backyard", summer_noon());
    store.insert_garden(&garden).await.unwrap();
    (garden, catalog)
}

pub async fn memory_garden() -> (MemoryStore, Garden, PlantType) {
    let store = MemoryStore::new();
    let (garden, catalog) = build_test_garden(&store).await;
    let tomato = catalog.into_iter().find(|t| t.name == "Tomato").unwrap();
    (store, garden, tomato)
}

/// Sow a plant directly through the store, bypassing the action checks.
pub async fn sow<S: GardenStore>(
    store: &S,
    garden: &Garden,
    plant_type: &PlantType,
    position: i32,
    edit: impl FnOnce(&mut Plant),
) -> Plant {
    let mut plant = Plant::sown(garden.id, plant_type.id, position, summer_noon());
    edit(&mut plant);
    store.insert_plant(&plant).await.unwrap();
    plant
}

/// A weather snapshot with the condition's standard effects.
pub fn weather(condition: WeatherCondition, created_at: DateTime<Utc>) -> Weather {
    let effects = condition.effects();
    Weather {
        id: Uuid::new_v4(),
        condition,
        temperature: 20.0,
        humidity: 50,
        wind_speed: 5.0,
        pressure: STANDARD_PRESSURE,
        growth_multiplier: effects.growth_multiplier,
        water_evaporation_rate: effects.evaporation_rate,
        created_at,
        valid_until: created_at + Duration::minutes(10),
    }
}

// ---------------------------------------------------------------------------
// Fault injection
// ---------------------------------------------------------------------------

/// A [`MemoryStore`] with switchable faults.
///
/// `interfere_saves` makes the next N `save_plant` calls first commit a
/// competing write that lowers the stored water level by `competing_drain`,
/// so the caller's write lands on a stale version.
#[derive(Default)]
pub struct FaultyStore {
    pub inner: MemoryStore,
    pub fail_plant_type: AtomicBool,
    pub interfere_saves: AtomicUsize,
    pub competing_drain: AtomicI32,
    pub conflicts: AtomicUsize,
}

impl FaultyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GardenStore for FaultyStore {
    async fn insert_garden(&self, garden: &Garden) -> Result<()> {
        self.inner.insert_garden(garden).await
    }

    async fn garden(&self, id: Uuid) -> Result<Garden> {
        self.inner.garden(id).await
    }

    async fn delete_garden(&self, id: Uuid) -> Result<()> {
        self.inner.delete_garden(id).await
    }

    async fn ensure_plant_type(&self, plant_type: &PlantType) -> Result<PlantType> {
        self.inner.ensure_plant_type(plant_type).await
    }

    async fn plant_type(&self, id: Uuid) -> Result<PlantType> {
        if self.fail_plant_type.load(Ordering::SeqCst) {
            return Err(GardenError::Store(sqlx::Error::PoolTimedOut));
        }
        self.inner.plant_type(id).await
    }

    async fn plant_types(&self) -> Result<Vec<PlantType>> {
        self.inner.plant_types().await
    }

    async fn insert_plant(&self, plant: &Plant) -> Result<()> {
        self.inner.insert_plant(plant).await
    }

    async fn plant(&self, id: Uuid) -> Result<Plant> {
        self.inner.plant(id).await
    }

    async fn plants_in_garden(&self, garden_id: Uuid) -> Result<Vec<Plant>> {
        self.inner.plants_in_garden(garden_id).await
    }

    async fn growing_plants(&self) -> Result<Vec<(Plant, PlantType)>> {
        self.inner.growing_plants().await
    }

    async fn save_plant(&self, plant: &Plant) -> Result<Plant> {
        let interfere = self
            .interfere_saves
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if interfere {
            let mut competing = self.inner.plant(plant.id).await?;
            competing.water_level -= self.competing_drain.load(Ordering::SeqCst);
            self.inner.save_plant(&competing).await?;
        }
        let result = self.inner.save_plant(plant).await;
        if matches!(result, Err(GardenError::Conflict(_))) {
            self.conflicts.fetch_add(1, Ordering::SeqCst);
        }
        result
    }

    async fn delete_plant(&self, id: Uuid) -> Result<()> {
        self.inner.delete_plant(id).await
    }

    async fn insert_weather(&self, weather: &Weather) -> Result<()> {
        self.inner.insert_weather(weather).await
    }

    async fn latest_weather(&self) -> Result<Option<Weather>> {
        self.inner.latest_weather().await
    }

    async fn weather_history(&self, limit: usize) -> Result<Vec<Weather>> {
        self.inner.weather_history(limit).await
    }
}
