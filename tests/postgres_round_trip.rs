mod common;

use chrono::Duration;
use garden_sim::actions::{harvest_plant, plant_seed, water_plant};
use garden_sim::cache::MemoryCache;
use garden_sim::catalog;
use garden_sim::config::SimConfig;
use garden_sim::db::{GardenStore, PgStore, migrate, update_plant};
use garden_sim::model::*;
use garden_sim::sim::Simulation;
use garden_sim::GardenError;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use testcontainers::ContainerAsync;
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::postgres::Postgres;
use uuid::Uuid;

use common::{build_test_garden, sow, summer_noon, weather};

async fn setup() -> (PgPool, ContainerAsync<Postgres>) {
    let container = Postgres::default().start().await.unwrap();
    let host = container.get_host().await.unwrap();
    let port = container.get_host_port_ipv4(5432).await.unwrap();
    let pool = PgPoolOptions::new()
        .connect(&format!(
            "postgres://postgres:postgres@{}:{}/postgres",
            host, port
        ))
        .await
        .unwrap();
    migrate(&pool).await.unwrap();
    (pool, container)
}

async fn tomato_garden(store: &PgStore) -> (Garden, PlantType) {
    let (garden, catalog) = build_test_garden(store).await;
    let tomato = catalog.into_iter().find(|t| t.name == "Tomato").unwrap();
    (garden, tomato)
}

#[tokio::test]
#[ignore]
async fn migrate_and_seed_are_idempotent() {
    let (pool, _container) = setup().await;
    migrate(&pool).await.unwrap();
    let store = PgStore::new(pool);

    let first = catalog::seed_catalog(&store).await.unwrap();
    let second = catalog::seed_catalog(&store).await.unwrap();
    assert_eq!(first, second);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM plant_types")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(count, 5);

    let types = store.plant_types().await.unwrap();
    assert_eq!(types.len(), 5);
    assert_eq!(types.last().unwrap().name, "Golden Apple");
}

#[tokio::test]
#[ignore]
async fn rows_read_back_as_written() {
    let (pool, _container) = setup().await;
    let store = PgStore::new(pool);
    let (garden, tomato) = tomato_garden(&store).await;

    assert_eq!(store.garden(garden.id).await.unwrap(), garden);
    assert_eq!(store.plant_type(tomato.id).await.unwrap(), tomato);

    let plant = sow(&store, &garden, &tomato, 4, |p| {
        p.growth_progress = 42.5;
        p.stage = PlantStage::Growing;
        p.last_watered_at = Some(summer_noon() + Duration::minutes(1));
    })
    .await;
    assert_eq!(store.plant(plant.id).await.unwrap(), plant);
    assert_eq!(store.plants_in_garden(garden.id).await.unwrap(), vec![plant]);
}

#[tokio::test]
#[ignore]
async fn stale_plant_write_is_a_conflict() {
    let (pool, _container) = setup().await;
    let store = PgStore::new(pool);
    let (garden, tomato) = tomato_garden(&store).await;
    let plant = sow(&store, &garden, &tomato, 0, |_| {}).await;

    let mut first = store.plant(plant.id).await.unwrap();
    let mut second = first.clone();
    first.water_level = 45;
    assert_eq!(store.save_plant(&first).await.unwrap().version, 1);

    second.water_level = 80;
    assert!(store.save_plant(&second).await.unwrap_err().is_conflict());

    let ghost = Plant::sown(garden.id, tomato.id, 1, summer_noon());
    assert!(matches!(
        store.save_plant(&ghost).await,
        Err(GardenError::NotFound { kind: "plant", .. })
    ));

    let updated = update_plant(&store, plant.id, |p| {
        p.water_level += 10;
        Ok(())
    })
    .await
    .unwrap();
    assert_eq!(updated.water_level, 55);
    assert_eq!(updated.version, 2);
}

#[tokio::test]
#[ignore]
async fn constraint_violations_map_to_domain_errors() {
    let (pool, _container) = setup().await;
    let store = PgStore::new(pool);
    let (garden, tomato) = tomato_garden(&store).await;
    let now = summer_noon();

    plant_seed(&store, garden.id, tomato.id, 3, now).await.unwrap();
    let err = plant_seed(&store, garden.id, tomato.id, 3, now).await.unwrap_err();
    assert!(matches!(err, GardenError::PositionOccupied { position: 3 }));

    let orphan = Plant::sown(garden.id, Uuid::new_v4(), 4, now);
    assert!(matches!(
        store.insert_plant(&orphan).await,
        Err(GardenError::NotFound { kind: "plant type", .. })
    ));
    let homeless = Plant::sown(Uuid::new_v4(), tomato.id, 4, now);
    assert!(matches!(
        store.insert_plant(&homeless).await,
        Err(GardenError::NotFound { kind: "garden", .. })
    ));
}

#[tokio::test]
#[ignore]
async fn deleting_a_garden_removes_its_plants() {
    let (pool, _container) = setup().await;
    let store = PgStore::new(pool);
    let (garden, tomato) = tomato_garden(&store).await;
    let plant = sow(&store, &garden, &tomato, 0, |_| {}).await;

    store.delete_garden(garden.id).await.unwrap();
    assert!(matches!(
        store.plant(plant.id).await,
        Err(GardenError::NotFound { kind: "plant", .. })
    ));
    assert!(matches!(
        store.delete_garden(garden.id).await,
        Err(GardenError::NotFound { kind: "garden", .. })
    ));
}

#[tokio::test]
#[ignore]
async fn weather_log_is_ordered_newest_first() {
    let (pool, _container) = setup().await;
    let store = PgStore::new(pool);
    assert_eq!(store.latest_weather().await.unwrap(), None);

    let base = summer_noon();
    let snapshots: Vec<Weather> = [
        (WeatherCondition::Sunny, 0),
        (WeatherCondition::Rainy, 20),
        (WeatherCondition::Windy, 10),
    ]
    .into_iter()
    .map(|(condition, minutes)| weather(condition, base + Duration::minutes(minutes)))
    .collect();
    for w in &snapshots {
        store.insert_weather(w).await.unwrap();
    }

    assert_eq!(store.latest_weather().await.unwrap().as_ref(), Some(&snapshots[1]));
    let history = store.weather_history(2).await.unwrap();
    assert_eq!(history, vec![snapshots[1].clone(), snapshots[2].clone()]);
}

#[tokio::test]
#[ignore]
async fn unknown_stored_condition_is_reported_as_corrupt() {
    let (pool, _container) = setup().await;
    sqlx::query(
        "INSERT INTO weather (id, condition, temperature, humidity, created_at, valid_until)
         VALUES ($1, 'hail', 3.0, 90, now(), now())",
    )
    .bind(Uuid::new_v4())
    .execute(&pool)
    .await
    .unwrap();

    let store = PgStore::new(pool);
    assert!(matches!(
        store.latest_weather().await,
        Err(GardenError::Corrupt { column: "weather.condition", .. })
    ));
}

#[tokio::test]
#[ignore]
async fn simulation_runs_against_postgres() {
    let (pool, _container) = setup().await;
    let store = PgStore::new(pool);
    let (garden, tomato) = tomato_garden(&store).await;
    let growing = sow(&store, &garden, &tomato, 0, |_| {}).await;
    let ripe = sow(&store, &garden, &tomato, 1, |p| {
        p.growth_progress = 100.0;
        p.stage = PlantStage::Harvestable;
    })
    .await;

    let sim = Simulation::new(store, MemoryCache::new(), SimConfig::default().with_seed(3));
    sim.run_weather_tick(summer_noon()).await.unwrap();
    let report = sim.run_growth_tick().await.unwrap();
    assert_eq!(report.advanced, 1);

    let store = sim.store();
    assert!(store.plant(growing.id).await.unwrap().growth_progress > 0.0);
    assert_eq!(store.plant(ripe.id).await.unwrap(), ripe);

    water_plant(store, growing.id, 20, summer_noon()).await.unwrap();
    let harvest = harvest_plant(store, ripe.id, summer_noon()).await.unwrap();
    assert_eq!(harvest.coins_earned, 45);
    assert_eq!(harvest.plant.version, ripe.version + 1);
}
