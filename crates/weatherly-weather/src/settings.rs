//! User settings shared by every consumer.
//!
//! [`Settings`] is created once at the composition root and passed to
//! whatever needs the unit preference. Clones share the same handle.

use std::sync::Arc;

use weatherly_storage::{LocalStore, Loaded, Storage};

use crate::types::TemperatureUnit;

pub const UNIT_STORAGE_KEY: &str = "weatherly_temp_unit";

/// Persisted temperature unit, `Celsius` until set.
#[derive(Debug)]
pub struct UnitPreference {
    store: LocalStore<TemperatureUnit>,
}

impl UnitPreference {
    pub fn new(storage: &Storage) -> Self {
        Self {
            store: LocalStore::bind(storage, UNIT_STORAGE_KEY, TemperatureUnit::default()),
        }
    }

    /// Whether the saved unit could be read when this preference was created.
    pub fn load_status(&self) -> &Loaded<()> {
        self.store.load_status()
    }

    pub fn get(&self) -> TemperatureUnit {
        self.store.get()
    }

    pub fn set(&self, unit: TemperatureUnit) {
        tracing::debug!("Temperature unit set to {}", unit);
        self.store.set(unit);
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    unit: Arc<UnitPreference>,
}

impl Settings {
    pub fn new(storage: &Storage) -> Self {
        Self {
            unit: Arc::new(UnitPreference::new(storage)),
        }
    }

    pub fn temperature_unit(&self) -> TemperatureUnit {
        self.unit.get()
    }

    pub fn set_temperature_unit(&self, unit: TemperatureUnit) {
        self.unit.set(unit);
    }

    pub fn unit_load_status(&self) -> &Loaded<()> {
        self.unit.load_status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_celsius() {
        let prefs = UnitPreference::new(&Storage::in_memory());
        assert_eq!(prefs.get(), TemperatureUnit::Celsius);
    }

    #[test]
    fn test_set_persists_string() {
        let storage = Storage::in_memory();
        UnitPreference::new(&storage).set(TemperatureUnit::Fahrenheit);

        assert_eq!(
            storage.read_raw(UNIT_STORAGE_KEY).unwrap().as_deref(),
            Some("\"fahrenheit\"")
        );
        assert_eq!(
            UnitPreference::new(&storage).get(),
            TemperatureUnit::Fahrenheit
        );
    }

    #[test]
    fn test_unknown_stored_unit_falls_back() {
        let storage = Storage::in_memory();
        storage.write_raw(UNIT_STORAGE_KEY, "\"kelvin\"", 0).unwrap();
        let prefs = UnitPreference::new(&storage);
        assert_eq!(prefs.get(), TemperatureUnit::Celsius);
        assert!(prefs.load_status().is_degraded());
    }

    #[test]
    fn test_settings_clones_share_state() {
        let settings = Settings::new(&Storage::in_memory());
        let for_forecast = settings.clone();
        settings.set_temperature_unit(TemperatureUnit::Fahrenheit);
        assert_eq!(for_forecast.temperature_unit(), TemperatureUnit::Fahrenheit);
    }
}
