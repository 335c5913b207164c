use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::GardenStore;
use crate::error::{GardenError, Result};
use crate::model::{Garden, Plant, PlantStage, PlantType, Weather};

/// Postgres-backed store. Plant writes use an optimistic `version` column.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

fn parse_stage(raw: String) -> Result<PlantStage> {
    raw.parse().map_err(|value| GardenError::Corrupt {
        column: "plants.stage",
        value,
    })
}

fn garden_from_row(row: &PgRow) -> Result<Garden> {
    Ok(Garden {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        size: row.try_get("size")?,
        soil_quality: row.try_get("soil_quality")?,
        water_level: row.try_get("water_level")?,
        fertilizer_level: row.try_get("fertilizer_level")?,
        created_at: row.try_get("created_at")?,
    })
}

/// `id_column` differs when the type is joined onto a plant row.
fn plant_type_from_row(row: &PgRow, id_column: &str) -> Result<PlantType> {
    Ok(PlantType {
        id: row.try_get(id_column)?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        icon: row.try_get("icon")?,
        growth_time: row.try_get("growth_time")?,
        water_needs: row.try_get("water_needs")?,
        fertilizer_needs: row.try_get("fertilizer_needs")?,
        yield_amount: row.try_get("yield_amount")?,
        harvest_value: row.try_get("harvest_value")?,
        experience_value: row.try_get("experience_value")?,
        min_level: row.try_get("min_level")?,
        season: row.try_get("season")?,
        weather: row.try_get("weather")?,
        rarity: row.try_get("rarity")?,
    })
}

fn plant_from_row(row: &PgRow) -> Result<Plant> {
    Ok(Plant {
        id: row.try_get("id")?,
        garden_id: row.try_get("garden_id")?,
        plant_type_id: row.try_get("plant_type_id")?,
        position: row.try_get("position")?,
        stage: parse_stage(row.try_get("stage")?)?,
        health: row.try_get("health")?,
        water_level: row.try_get("water_level")?,
        growth_progress: row.try_get("growth_progress")?,
        planted_at: row.try_get("planted_at")?,
        last_watered_at: row.try_get("last_watered_at")?,
        last_fertilized_at: row.try_get("last_fertilized_at")?,
        harvested_at: row.try_get("harvested_at")?,
        version: row.try_get("version")?,
    })
}

fn weather_from_row(row: &PgRow) -> Result<Weather> {
    let condition: String = row.try_get("condition")?;
    Ok(Weather {
        id: row.try_get("id")?,
        condition: condition.parse().map_err(|value| GardenError::Corrupt {
            column: "weather.condition",
            value,
        })?,
        temperature: row.try_get("temperature")?,
        humidity: row.try_get("humidity")?,
        wind_speed: row.try_get("wind_speed")?,
        pressure: row.try_get("pressure")?,
        growth_multiplier: row.try_get("growth_multiplier")?,
        water_evaporation_rate: row.try_get("water_evaporation_rate")?,
        created_at: row.try_get("created_at")?,
        valid_until: row.try_get("valid_until")?,
    })
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

impl GardenStore for PgStore {
    async fn insert_garden(&self, garden: &Garden) -> Result<()> {
        sqlx::query(
            "INSERT INTO gardens \
             (id, user_id, name, description, size, soil_quality, water_level, fertilizer_level, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(garden.id)
        .bind(garden.user_id)
        .bind(&garden.name)
        .bind(&garden.description)
        .bind(garden.size)
        .bind(garden.soil_quality)
        .bind(garden.water_level)
        .bind(garden.fertilizer_level)
        .bind(garden.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn garden(&self, id: Uuid) -> Result<Garden> {
        let row = sqlx::query("SELECT * FROM gardens WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| GardenError::not_found("garden", id))?;
        garden_from_row(&row)
    }

    async fn delete_garden(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM gardens WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(GardenError::not_found("garden", id));
        }
        Ok(())
    }

    async fn ensure_plant_type(&self, plant_type: &PlantType) -> Result<PlantType> {
        sqlx::query(
            "INSERT INTO plant_types \
             (id, name, description, icon, growth_time, water_needs, fertilizer_needs, \
              yield_amount, harvest_value, experience_value, min_level, season, weather, rarity) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             ON CONFLICT (name) DO NOTHING",
        )
        .bind(plant_type.id)
        .bind(&plant_type.name)
        .bind(&plant_type.description)
        .bind(&plant_type.icon)
        .bind(plant_type.growth_time)
        .bind(plant_type.water_needs)
        .bind(plant_type.fertilizer_needs)
        .bind(plant_type.yield_amount)
        .bind(plant_type.harvest_value)
        .bind(plant_type.experience_value)
        .bind(plant_type.min_level)
        .bind(&plant_type.season)
        .bind(&plant_type.weather)
        .bind(&plant_type.rarity)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query("SELECT * FROM plant_types WHERE name = $1")
            .bind(&plant_type.name)
            .fetch_one(&self.pool)
            .await?;
        plant_type_from_row(&row, "id")
    }

    async fn plant_type(&self, id: Uuid) -> Result<PlantType> {
        let row = sqlx::query("SELECT * FROM plant_types WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| GardenError::not_found("plant type", id))?;
        plant_type_from_row(&row, "id")
    }

    async fn plant_types(&self) -> Result<Vec<PlantType>> {
        let rows = sqlx::query("SELECT * FROM plant_types ORDER BY min_level, name")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(|row| plant_type_from_row(row, "id")).collect()
    }

    async fn insert_plant(&self, plant: &Plant) -> Result<()> {
        let result = sqlx::query(
            "INSERT INTO plants \
             (id, garden_id, plant_type_id, position, stage, health, water_level, growth_progress, \
              planted_at, last_watered_at, last_fertilized_at, harvested_at, version) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(plant.id)
        .bind(plant.garden_id)
        .bind(plant.plant_type_id)
        .bind(plant.position)
        .bind(plant.stage.as_str())
        .bind(plant.health)
        .bind(plant.water_level)
        .bind(plant.growth_progress)
        .bind(plant.planted_at)
        .bind(plant.last_watered_at)
        .bind(plant.last_fertilized_at)
        .bind(plant.harvested_at)
        .bind(plant.version)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(GardenError::PositionOccupied {
                    position: plant.position,
                })
            }
            Err(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => {
                if db.constraint() == Some("plants_plant_type_id_fkey") {
                    Err(GardenError::not_found("plant type", plant.plant_type_id))
                } else {
                    Err(GardenError::not_found("garden", plant.garden_id))
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn plant(&self, id: Uuid) -> Result<Plant> {
        let row = sqlx::query("SELECT * FROM plants WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| GardenError::not_found("plant", id))?;
        plant_from_row(&row)
    }

    async fn plants_in_garden(&self, garden_id: Uuid) -> Result<Vec<Plant>> {
        let rows = sqlx::query("SELECT * FROM plants WHERE garden_id = $1 ORDER BY position")
            .bind(garden_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(plant_from_row).collect()
    }

    async fn growing_plants(&self) -> Result<Vec<(Plant, PlantType)>> {
        let terminal: Vec<&str> = PlantStage::TERMINAL.iter().map(|s| s.as_str()).collect();
        let rows = sqlx::query(
            "SELECT p.*, t.id AS type_id, t.name, t.description, t.icon, t.growth_time, \
                    t.water_needs, t.fertilizer_needs, t.yield_amount, t.harvest_value, \
                    t.experience_value, t.min_level, t.season, t.weather, t.rarity \
             FROM plants p JOIN plant_types t ON t.id = p.plant_type_id \
             WHERE NOT (p.stage = ANY($1)) \
             ORDER BY p.planted_at",
        )
        .bind(terminal)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Ok((plant_from_row(row)?, plant_type_from_row(row, "type_id")?)))
            .collect()
    }

    async fn save_plant(&self, plant: &Plant) -> Result<Plant> {
        let result = sqlx::query(
            "UPDATE plants SET \
               stage = $3, health = $4, water_level = $5, growth_progress = $6, \
               last_watered_at = $7, last_fertilized_at = $8, harvested_at = $9, \
               version = version + 1 \
             WHERE id = $1 AND version = $2",
        )
        .bind(plant.id)
        .bind(plant.version)
        .bind(plant.stage.as_str())
        .bind(plant.health)
        .bind(plant.water_level)
        .bind(plant.growth_progress)
        .bind(plant.last_watered_at)
        .bind(plant.last_fertilized_at)
        .bind(plant.harvested_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM plants WHERE id = $1)")
                    .bind(plant.id)
                    .fetch_one(&self.pool)
                    .await?;
            return Err(if exists {
                GardenError::Conflict(plant.id)
            } else {
                GardenError::not_found("plant", plant.id)
            });
        }

        let mut saved = plant.clone();
        saved.version += 1;
        Ok(saved)
    }

    async fn delete_plant(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM plants WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(GardenError::not_found("plant", id));
        }
        Ok(())
    }

    async fn insert_weather(&self, weather: &Weather) -> Result<()> {
        sqlx::query(
            "INSERT INTO weather \
             (id, condition, temperature, humidity, wind_speed, pressure, growth_multiplier, \
              water_evaporation_rate, created_at, valid_until) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(weather.id)
        .bind(weather.condition.as_str())
        .bind(weather.temperature)
        .bind(weather.humidity)
        .bind(weather.wind_speed)
        .bind(weather.pressure)
        .bind(weather.growth_multiplier)
        .bind(weather.water_evaporation_rate)
        .bind(weather.created_at)
        .bind(weather.valid_until)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn latest_weather(&self) -> Result<Option<Weather>> {
        let row = sqlx::query("SELECT * FROM weather ORDER BY created_at DESC LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(weather_from_row).transpose()
    }

    async fn weather_history(&self, limit: usize) -> Result<Vec<Weather>> {
        let rows = sqlx::query("SELECT * FROM weather ORDER BY created_at DESC LIMIT $1")
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(weather_from_row).collect()
    }
}
