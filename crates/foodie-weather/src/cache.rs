//! Time-bounded geocode cache

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

use crate::api::Coordinates;

/// Geocode hits keyed by case-folded city name.
///
/// Entries expire `ttl` after insertion; expiry is measured on the tokio
/// clock so paused-time tests can advance it.
#[derive(Debug)]
pub struct GeocodeCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, (Coordinates, Instant)>>,
}

impl GeocodeCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn key(city: &str) -> String {
        city.trim().to_lowercase()
    }

    /// Cached coordinates for `city` if present and not expired
    pub fn get(&self, city: &str) -> Option<Coordinates> {
        let key = Self::key(city);
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        match entries.get(&key) {
            Some((coords, inserted)) if inserted.elapsed() < self.ttl => Some(*coords),
            Some(_) => {
                entries.remove(&key);
                None
            }
            None => None,
        }
    }

    /// Store `coords` for `city`, dropping every entry that has expired
    pub fn insert(&self, city: &str, coords: Coordinates) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.retain(|_, (_, inserted)| inserted.elapsed() < self.ttl);
        entries.insert(Self::key(city), (coords, Instant::now()));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
