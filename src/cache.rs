use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Key under which the current weather condition is published.
pub const CURRENT_WEATHER_KEY: &str = "weather:current";

/// Best-effort key/value cache with per-entry expiry.
///
/// Only ever an accelerator: readers that need the authoritative current
/// weather go to the store.
pub trait WeatherCache: Send + Sync + 'static {
    fn set(&self, key: &str, value: &str, ttl: Duration);
    /// `None` if absent or expired.
    fn get(&self, key: &str) -> Option<String>;
}

#[derive(Debug)]
struct Entry {
    value: String,
    expires_at: Instant,
}

/// Process-local cache. Expired entries are dropped lazily on read.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WeatherCache for MemoryCache {
    fn set(&self, key: &str, value: &str, ttl: Duration) {
        let entry = Entry {
            value: value.to_string(),
            expires_at: Instant::now() + ttl,
        };
        self.entries.lock().insert(key.to_string(), entry);
    }

    fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }
}
