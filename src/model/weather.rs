use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Standard sea-level pressure in hPa; generated snapshots never vary it.
pub const STANDARD_PRESSURE: f64 = 1013.25;

// ---------------------------------------------------------------------------
// Season
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    /// Meteorological season for a calendar month (1–12).
    pub fn from_month(month: u32) -> Self {
        match month {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Autumn,
            _ => Season::Winter,
        }
    }

    pub fn of(date: DateTime<Utc>) -> Self {
        Self::from_month(date.month())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Autumn => "autumn",
            Season::Winter => "winter",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Weather condition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    Sunny,
    Cloudy,
    Rainy,
    Stormy,
    Foggy,
    Windy,
    Snowy,
}

/// How a condition bends plant growth and soil moisture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherEffects {
    pub growth_multiplier: f64,
    pub evaporation_rate: f64,
}

impl WeatherEffects {
    pub const NEUTRAL: WeatherEffects = WeatherEffects {
        growth_multiplier: 1.0,
        evaporation_rate: 1.0,
    };

    const fn new(growth_multiplier: f64, evaporation_rate: f64) -> Self {
        Self {
            growth_multiplier,
            evaporation_rate,
        }
    }
}

impl WeatherCondition {
    pub const ALL: [WeatherCondition; 7] = [
        WeatherCondition::Sunny,
        WeatherCondition::Cloudy,
        WeatherCondition::Rainy,
        WeatherCondition::Stormy,
        WeatherCondition::Foggy,
        WeatherCondition::Windy,
        WeatherCondition::Snowy,
    ];

    pub fn effects(self) -> WeatherEffects {
        match self {
            WeatherCondition::Sunny => WeatherEffects::new(1.2, 1.5),
            WeatherCondition::Cloudy => WeatherEffects::new(1.0, 1.0),
            WeatherCondition::Rainy => WeatherEffects::new(1.1, 0.3),
            WeatherCondition::Stormy => WeatherEffects::new(0.8, 0.1),
            WeatherCondition::Foggy => WeatherEffects::new(0.9, 0.8),
            WeatherCondition::Windy => WeatherEffects::new(0.95, 1.3),
            WeatherCondition::Snowy => WeatherEffects::new(0.5, 0.2),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WeatherCondition::Sunny => "sunny",
            WeatherCondition::Cloudy => "cloudy",
            WeatherCondition::Rainy => "rainy",
            WeatherCondition::Stormy => "stormy",
            WeatherCondition::Foggy => "foggy",
            WeatherCondition::Windy => "windy",
            WeatherCondition::Snowy => "snowy",
        }
    }
}

/// Effects for a condition name as stored; unrecognised names are neutral.
pub fn effects_of_name(name: &str) -> WeatherEffects {
    name.parse::<WeatherCondition>()
        .map(WeatherCondition::effects)
        .unwrap_or(WeatherEffects::NEUTRAL)
}

impl fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeatherCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WeatherCondition::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// One immutable entry in the weather log. The newest by `created_at` is current.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    pub id: Uuid,
    pub condition: WeatherCondition,
    /// Degrees Celsius.
    pub temperature: f64,
    /// Percent, 0–100.
    pub humidity: i32,
    /// km/h.
    pub wind_speed: f64,
    /// hPa.
    pub pressure: f64,
    pub growth_multiplier: f64,
    pub water_evaporation_rate: f64,
    pub created_at: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
}

/// Current weather as handed to read-side callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentWeather {
    pub weather: Weather,
    pub season: Season,
}

/// One period of a display forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub condition: WeatherCondition,
    pub temperature: f64,
    pub humidity: i32,
    /// Confidence, 0–100.
    pub probability: i32,
    pub forecast_for: DateTime<Utc>,
}
