use std::ops::Range;

use chrono::{DateTime, Duration, Timelike, Utc};
use rand::{Rng, RngCore};
use uuid::Uuid;

use crate::model::{Forecast, STANDARD_PRESSURE, Season, Weather, WeatherCondition};

const HUMIDITY_RANGE: Range<i32> = 30..70;
const WIND_RANGE: Range<f64> = 0.0..20.0;

/// Conditions that can occur in a season. Selection is uniform over the slice.
pub fn conditions_for(season: Season) -> &'static [WeatherCondition] {
    use WeatherCondition::*;
    match season {
        Season::Spring => &[Sunny, Cloudy, Rainy, Foggy, Windy],
        Season::Summer => &[Sunny, Cloudy, Stormy, Windy],
        Season::Autumn => &[Cloudy, Rainy, Foggy, Windy, Sunny],
        Season::Winter => &[Cloudy, Snowy, Foggy, Windy],
    }
}

/// Seasonal baseline temperature in °C.
pub fn base_temperature(season: Season) -> f64 {
    match season {
        Season::Spring => 15.0,
        Season::Summer => 25.0,
        Season::Autumn => 15.0,
        Season::Winter => 5.0,
    }
}

/// Half-open range of the temperature offset a condition adds to the baseline.
pub fn temperature_offset(condition: WeatherCondition) -> Range<f64> {
    match condition {
        WeatherCondition::Sunny => 2.0..7.0,
        WeatherCondition::Cloudy => -1.0..2.0,
        WeatherCondition::Rainy => -2.0..0.0,
        WeatherCondition::Stormy => -3.0..0.0,
        WeatherCondition::Foggy => -1.0..1.0,
        WeatherCondition::Windy => -1.0..1.0,
        WeatherCondition::Snowy => -5.0..-2.0,
    }
}

/// Generate the next weather snapshot for `now`, valid for `valid_for`.
///
/// All randomness comes from `rng`, so a seeded generator reproduces the
/// same sequence of snapshots.
pub fn generate(now: DateTime<Utc>, valid_for: Duration, rng: &mut dyn RngCore) -> Weather {
    let season = Season::of(now);
    let candidates = conditions_for(season);
    let condition = candidates[rng.random_range(0..candidates.len())];

    let temperature = base_temperature(season) + rng.random_range(temperature_offset(condition));
    let humidity = rng.random_range(HUMIDITY_RANGE);
    let wind_speed = rng.random_range(WIND_RANGE);
    let effects = condition.effects();

    Weather {
        id: Uuid::new_v4(),
        condition,
        temperature,
        humidity,
        wind_speed,
        pressure: STANDARD_PRESSURE,
        growth_multiplier: effects.growth_multiplier,
        water_evaporation_rate: effects.evaporation_rate,
        created_at: now,
        valid_until: now.checked_add_signed(valid_for).unwrap_or(DateTime::<Utc>::MAX_UTC),
    }
}

// ---------------------------------------------------------------------------
// Display forecast
// ---------------------------------------------------------------------------

pub const FORECAST_PERIODS: i64 = 4;
pub const FORECAST_STEP_HOURS: i64 = 6;
const FORECAST_CONFIDENCE: i32 = 85;

/// Stand-in used when no snapshot exists yet.
const FALLBACK_BASIS: (WeatherCondition, f64, i32) = (WeatherCondition::Cloudy, 20.0, 50);

/// Four six-hourly periods derived from the current snapshot.
///
/// Not a simulation: the condition carries over and temperature/humidity
/// follow a fixed time-of-day curve.
pub fn forecast(current: Option<&Weather>, now: DateTime<Utc>) -> Vec<Forecast> {
    let (condition, temperature, humidity) = match current {
        Some(w) => (w.condition, w.temperature, w.humidity),
        None => FALLBACK_BASIS,
    };

    (1..=FORECAST_PERIODS)
        .map(|i| {
            let forecast_for = now + Duration::hours(i * FORECAST_STEP_HOURS);
            let (temperature, humidity) = match forecast_for.hour() {
                6..=12 => (temperature + 2.0, (humidity - 10).max(30)),
                13..=18 => (temperature + 5.0, (humidity - 20).max(20)),
                19..=23 => (temperature - 2.0, (humidity + 10).min(80)),
                _ => (temperature - 5.0, (humidity + 20).min(90)),
            };
            Forecast {
                condition,
                temperature,
                humidity,
                probability: FORECAST_CONFIDENCE,
                forecast_for,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn at(month: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, month, 10, hour, 0, 0).unwrap()
    }

    #[test]
    fn winter_never_produces_warm_conditions() {
        let mut rng = SmallRng::seed_from_u64(42);
        let allowed = conditions_for(Season::Winter);
        for _ in 0..1000 {
            let w = generate(at(1, 12), Duration::minutes(10), &mut rng);
            assert!(allowed.contains(&w.condition), "got {}", w.condition);
            assert!(!matches!(
                w.condition,
                WeatherCondition::Sunny | WeatherCondition::Rainy | WeatherCondition::Stormy
            ));
        }
    }

    #[test]
    fn every_season_only_draws_its_own_conditions() {
        let mut rng = SmallRng::seed_from_u64(7);
        for month in 1..=12 {
            let season = Season::from_month(month);
            for _ in 0..200 {
                let w = generate(at(month, 0), Duration::minutes(10), &mut rng);
                assert!(conditions_for(season).contains(&w.condition));
            }
        }
    }

    #[test]
    fn generated_values_stay_in_range() {
        let mut rng = SmallRng::seed_from_u64(99);
        for month in 1..=12 {
            let season = Season::from_month(month);
            for _ in 0..200 {
                let w = generate(at(month, 9), Duration::minutes(10), &mut rng);
                let offset = temperature_offset(w.condition);
                let base = base_temperature(season);
                assert!(w.temperature >= base + offset.start && w.temperature < base + offset.end);
                assert!((30..70).contains(&w.humidity));
                assert!((0.0..20.0).contains(&w.wind_speed));
                assert_eq!(w.pressure, 1013.25);
                assert_eq!(w.growth_multiplier, w.condition.effects().growth_multiplier);
                assert_eq!(w.water_evaporation_rate, w.condition.effects().evaporation_rate);
            }
        }
    }

    #[test]
    fn validity_window_follows_interval() {
        let mut rng = SmallRng::seed_from_u64(1);
        let now = at(6, 8);
        let w = generate(now, Duration::minutes(10), &mut rng);
        assert_eq!(w.created_at, now);
        assert_eq!(w.valid_until, now + Duration::minutes(10));
    }

    #[test]
    fn validity_saturates_instead_of_overflowing() {
        let mut rng = SmallRng::seed_from_u64(1);
        let w = generate(at(6, 8), Duration::MAX, &mut rng);
        assert_eq!(w.valid_until, DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn same_seed_same_weather() {
        let now = at(4, 12);
        let a = generate(now, Duration::minutes(10), &mut SmallRng::seed_from_u64(5));
        let b = generate(now, Duration::minutes(10), &mut SmallRng::seed_from_u64(5));
        assert_eq!(a.condition, b.condition);
        assert_eq!(a.temperature, b.temperature);
        assert_eq!(a.humidity, b.humidity);
        assert_eq!(a.wind_speed, b.wind_speed);
    }

    #[test]
    fn forecast_follows_time_of_day_curve() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut current = generate(at(7, 0), Duration::minutes(10), &mut rng);
        current.temperature = 20.0;
        current.humidity = 50;

        // 00:00 -> 06:00, 12:00, 18:00, 00:00
        let periods = forecast(Some(&current), at(7, 0));
        assert_eq!(periods.len(), 4);
        assert_eq!(periods[0].temperature, 22.0);
        assert_eq!(periods[0].humidity, 40);
        assert_eq!(periods[1].temperature, 22.0);
        assert_eq!(periods[2].temperature, 25.0);
        assert_eq!(periods[2].humidity, 30);
        assert_eq!(periods[3].temperature, 15.0);
        assert_eq!(periods[3].humidity, 70);
        assert!(periods.iter().all(|p| p.condition == current.condition));
        assert!(periods.iter().all(|p| p.probability == 85));
    }

    #[test]
    fn forecast_without_weather_uses_fallback() {
        let periods = forecast(None, at(1, 19));
        // 19:00 -> 01:00 (night)
        assert_eq!(periods[0].condition, WeatherCondition::Cloudy);
        assert_eq!(periods[0].temperature, 15.0);
        assert_eq!(periods[0].humidity, 70);
    }
}
