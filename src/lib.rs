pub mod actions;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod sim;

pub use cache::{MemoryCache, WeatherCache};
pub use config::{AppConfig, SimConfig};
pub use db::{GardenStore, MemoryStore, PgStore};
pub use error::{GardenError, Result};
pub use model::{
    CurrentWeather, Forecast, Garden, Plant, PlantStage, PlantType, Season, Weather,
    WeatherCondition,
};
pub use sim::{GrowthTickReport, Scheduler, Simulation};
