use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::{growth, weather};
use crate::cache::{CURRENT_WEATHER_KEY, WeatherCache};
use crate::config::SimConfig;
use crate::db::{GardenStore, update_plant};
use crate::error::{GardenError, Result};
use crate::model::{CurrentWeather, Forecast, PlantStage, Season, Weather, WeatherCondition};

pub const DEFAULT_HISTORY_LIMIT: usize = 24;

/// Outcome of one growth tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GrowthTickReport {
    /// Plants whose row was read and written back.
    pub advanced: usize,
    /// Plants that died of drought this tick.
    pub withered: usize,
    pub became_harvestable: usize,
    /// Plants skipped because their update failed.
    pub failed: usize,
}

/// The two simulation ticks and the read side over the weather log.
///
/// Holds no plant state: every tick reads from and writes to the store.
pub struct Simulation<S, C> {
    store: S,
    cache: C,
    config: SimConfig,
    rng: Mutex<SmallRng>,
}

impl<S: GardenStore, C: WeatherCache> Simulation<S, C> {
    /// `config` is validated here, so out-of-range intervals are clamped.
    pub fn new(store: S, cache: C, mut config: SimConfig) -> Self {
        config.validate();
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        Self {
            store,
            cache,
            config,
            rng: Mutex::new(rng),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Advance every growing plant by one growth interval under the current weather.
    ///
    /// Each plant is updated atomically on its own; a failing plant is logged
    /// and counted, never aborting the rest. With no weather recorded yet the
    /// tick is skipped.
    pub async fn run_growth_tick(&self) -> Result<GrowthTickReport> {
        let mut report = GrowthTickReport::default();
        let Some(weather) = self.store.latest_weather().await? else {
            tracing::warn!("no weather recorded yet, skipping growth tick");
            return Ok(report);
        };

        let minutes = self.config.tick_minutes();
        let growing = self.store.growing_plants().await?;
        for (listed, plant_type) in growing {
            let result = update_plant(&self.store, listed.id, |plant| {
                *plant = growth::advance(plant, &plant_type, &weather, minutes);
                Ok(())
            })
            .await;

            match result {
                Ok(plant) => {
                    report.advanced += 1;
                    tracing::debug!(
                        plant = %plant.id,
                        stage = %plant.stage,
                        progress = plant.growth_progress,
                        water = plant.water_level,
                        health = plant.health,
                        "plant advanced"
                    );
                    if plant.stage != listed.stage {
                        match plant.stage {
                            PlantStage::Withered if !plant.is_harvested() => report.withered += 1,
                            PlantStage::Harvestable => report.became_harvestable += 1,
                            _ => {}
                        }
                    }
                }
                Err(GardenError::NotFound { .. }) => {
                    tracing::debug!(plant = %listed.id, "plant removed before its growth update");
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(plant = %listed.id, "growth update failed: {e}");
                }
            }
        }

        tracing::info!(
            weather = %weather.condition,
            advanced = report.advanced,
            withered = report.withered,
            harvestable = report.became_harvestable,
            failed = report.failed,
            "growth tick complete"
        );
        Ok(report)
    }

    /// Generate, persist and publish a new weather snapshot for `now`.
    ///
    /// Only the store write can fail; the cache is best effort.
    pub async fn run_weather_tick(&self, now: DateTime<Utc>) -> Result<Weather> {
        let valid_for =
            chrono::Duration::from_std(self.config.weather_interval()).unwrap_or(chrono::Duration::MAX);
        let snapshot = {
            let mut rng = self.rng.lock();
            weather::generate(now, valid_for, &mut *rng)
        };
        self.store.insert_weather(&snapshot).await?;
        self.cache.set(
            CURRENT_WEATHER_KEY,
            snapshot.condition.as_str(),
            self.config.weather_interval(),
        );
        tracing::info!(
            condition = %snapshot.condition,
            temperature = snapshot.temperature,
            humidity = snapshot.humidity,
            "weather updated"
        );
        Ok(snapshot)
    }

    /// The newest snapshot in the log.
    pub async fn current_weather(&self) -> Result<CurrentWeather> {
        let weather = self.store.latest_weather().await?.ok_or(GardenError::NoWeather)?;
        Ok(CurrentWeather {
            season: Season::of(weather.created_at),
            weather,
        })
    }

    /// Condition last published to the cache, if still live.
    pub fn cached_condition(&self) -> Option<WeatherCondition> {
        self.cache.get(CURRENT_WEATHER_KEY)?.parse().ok()
    }

    pub async fn weather_history(&self, limit: usize) -> Result<Vec<Weather>> {
        self.store.weather_history(limit).await
    }

    pub async fn forecast(&self, now: DateTime<Utc>) -> Result<Vec<Forecast>> {
        let current = self.store.latest_weather().await?;
        Ok(weather::forecast(current.as_ref(), now))
    }
}

// ---------------------------------------------------------------------------
// Background timers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    /// Waiting for the next tick.
    Idle,
    /// A tick is in progress.
    Running,
    /// Shut down; no further ticks.
    Stopped,
}

struct Timer {
    handle: JoinHandle<()>,
    state: Arc<Mutex<TimerState>>,
}

/// Owns the growth and weather loops. Dropping it also ends the loops after
/// their current tick, but only [`stop`](Scheduler::stop) waits for them.
pub struct Scheduler {
    shutdown: watch::Sender<bool>,
    growth: Timer,
    weather: Timer,
}

impl Scheduler {
    /// Spawn both loops on the current runtime. The weather loop ticks
    /// immediately so a snapshot exists before the first growth tick.
    pub fn start<S: GardenStore, C: WeatherCache>(sim: Arc<Simulation<S, C>>) -> Self {
        let (shutdown, _) = watch::channel(false);
        let growth_period = sim.config.growth_interval();
        let weather_period = sim.config.weather_interval();

        let growth = {
            let sim = Arc::clone(&sim);
            spawn_timer(
                "growth",
                Instant::now() + growth_period,
                growth_period,
                shutdown.subscribe(),
                move || {
                    let sim = Arc::clone(&sim);
                    async move {
                        if let Err(e) = sim.run_growth_tick().await {
                            tracing::error!("growth tick failed: {e}");
                        }
                    }
                },
            )
        };

        let weather = spawn_timer(
            "weather",
            Instant::now(),
            weather_period,
            shutdown.subscribe(),
            move || {
                let sim = Arc::clone(&sim);
                async move {
                    if let Err(e) = sim.run_weather_tick(Utc::now()).await {
                        tracing::error!("weather tick failed: {e}");
                    }
                }
            },
        );

        Self {
            shutdown,
            growth,
            weather,
        }
    }

    pub fn growth_state(&self) -> TimerState {
        *self.growth.state.lock()
    }

    pub fn weather_state(&self) -> TimerState {
        *self.weather.state.lock()
    }

    /// Signal both loops and wait for them. A tick in progress runs to completion.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        for (name, timer) in [("growth", self.growth), ("weather", self.weather)] {
            if let Err(e) = timer.handle.await {
                tracing::error!("{name} timer task ended abnormally: {e}");
            }
        }
        tracing::info!("scheduler stopped");
    }
}

fn spawn_timer<F, Fut>(
    name: &'static str,
    first: Instant,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
    mut tick: F,
) -> Timer
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let state = Arc::new(Mutex::new(TimerState::Idle));
    let task_state = Arc::clone(&state);
    let handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(first, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!("{name} timer started (interval {period:?})");

        loop {
            tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                _ = interval.tick() => {}
            }
            *task_state.lock() = TimerState::Running;
            tick().await;
            *task_state.lock() = TimerState::Idle;
        }

        *task_state.lock() = TimerState::Stopped;
        tracing::info!("{name} timer stopped");
    });
    Timer { handle, state }
}
