pub mod garden;
pub mod plant;
pub mod weather;

pub use garden::{DEFAULT_GARDEN_SIZE, Garden};
pub use plant::{Plant, PlantStage, PlantType};
pub use weather::{
    CurrentWeather, Forecast, STANDARD_PRESSURE, Season, Weather, WeatherCondition,
    WeatherEffects, effects_of_name,
};
