mod memory;
mod migrate;
mod postgres;

use std::future::Future;

use uuid::Uuid;

use crate::error::Result;
use crate::model::{Garden, Plant, PlantType, Weather};

pub use memory::MemoryStore;
pub use migrate::migrate;
pub use postgres::PgStore;

/// How many times a plant mutation is re-read and re-applied after losing a
/// write race before the conflict is surfaced to the caller.
pub const MAX_WRITE_ATTEMPTS: usize = 5;

/// Persistent store shared by the scheduler and the action handlers.
///
/// The store is the single source of truth for plant state. Plant writes are
/// conditional on `Plant::version`: `save_plant` fails with
/// [`GardenError::Conflict`](crate::GardenError::Conflict) when the row moved
/// on since it was read. Use [`update_plant`] rather than calling
/// `plant` + `save_plant` by hand.
pub trait GardenStore: Send + Sync + 'static {
    fn insert_garden(&self, garden: &Garden) -> impl Future<Output = Result<()>> + Send;
    fn garden(&self, id: Uuid) -> impl Future<Output = Result<Garden>> + Send;
    /// Deletes the garden and every plant in it.
    fn delete_garden(&self, id: Uuid) -> impl Future<Output = Result<()>> + Send;

    /// Insert a catalog entry unless one with the same name exists. Returns
    /// the stored entry either way.
    fn ensure_plant_type(
        &self,
        plant_type: &PlantType,
    ) -> impl Future<Output = Result<PlantType>> + Send;
    fn plant_type(&self, id: Uuid) -> impl Future<Output = Result<PlantType>> + Send;
    fn plant_types(&self) -> impl Future<Output = Result<Vec<PlantType>>> + Send;

    /// Fails with `PositionOccupied` if the garden cell is taken.
    fn insert_plant(&self, plant: &Plant) -> impl Future<Output = Result<()>> + Send;
    fn plant(&self, id: Uuid) -> impl Future<Output = Result<Plant>> + Send;
    fn plants_in_garden(&self, garden_id: Uuid) -> impl Future<Output = Result<Vec<Plant>>> + Send;
    /// Every plant outside the terminal stages, paired with its type.
    fn growing_plants(&self) -> impl Future<Output = Result<Vec<(Plant, PlantType)>>> + Send;
    /// Write `plant` if the stored row still has `plant.version`. Returns the
    /// row as stored, with its version bumped.
    fn save_plant(&self, plant: &Plant) -> impl Future<Output = Result<Plant>> + Send;
    fn delete_plant(&self, id: Uuid) -> impl Future<Output = Result<()>> + Send;

    /// Append to the weather log. Snapshots are never updated or deleted.
    fn insert_weather(&self, weather: &Weather) -> impl Future<Output = Result<()>> + Send;
    /// The snapshot with the greatest `created_at`.
    fn latest_weather(&self) -> impl Future<Output = Result<Option<Weather>>> + Send;
    /// Up to `limit` snapshots, newest first.
    fn weather_history(&self, limit: usize) -> impl Future<Output = Result<Vec<Weather>>> + Send;
}

/// Atomic read-modify-write of one plant row.
///
/// Reads the current row, applies `mutate` to a copy and writes it back
/// conditionally on the version that was read. On a lost race the whole
/// cycle runs again against a fresh read, up to [`MAX_WRITE_ATTEMPTS`] times.
/// An error from `mutate` aborts without writing. If `mutate` leaves the
/// plant unchanged nothing is written.
pub async fn update_plant<S, F>(store: &S, id: Uuid, mut mutate: F) -> Result<Plant>
where
    S: GardenStore,
    F: FnMut(&mut Plant) -> Result<()>,
{
    let mut attempt = 1;
    loop {
        let current = store.plant(id).await?;
        let mut next = current.clone();
        mutate(&mut next)?;
        if next == current {
            return Ok(current);
        }

        match store.save_plant(&next).await {
            Ok(saved) => return Ok(saved),
            Err(e) if e.is_conflict() && attempt < MAX_WRITE_ATTEMPTS => {
                tracing::debug!(plant = %id, attempt, "plant write conflict, retrying");
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
