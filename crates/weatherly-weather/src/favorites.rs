//! Saved locations, newest first, capped at [`MAX_FAVORITES`].

use chrono::Utc;
use weatherly_storage::{LocalStore, Loaded, Storage};

use crate::types::{FavoriteLocation, LocationOption};

pub const MAX_FAVORITES: usize = 10;
pub const FAVORITES_STORAGE_KEY: &str = "weatherly_favorites";

#[derive(Debug)]
pub struct Favorites {
    store: LocalStore<Vec<FavoriteLocation>>,
}

impl Favorites {
    pub fn new(storage: &Storage) -> Self {
        Self {
            store: LocalStore::bind(storage, FAVORITES_STORAGE_KEY, Vec::new()),
        }
    }

    /// Whether the saved list could be read when this manager was created.
    pub fn load_status(&self) -> &Loaded<()> {
        self.store.load_status()
    }

    pub fn list(&self) -> Vec<FavoriteLocation> {
        self.store.get()
    }

    /// Save `location` at the front of the list.
    ///
    /// Does nothing if a favorite with the same `value` exists. The oldest
    /// entries beyond [`MAX_FAVORITES`] are dropped.
    pub fn add(&self, location: &LocationOption) {
        self.store.update(|prev| {
            if prev.iter().any(|fav| fav.value == location.value) {
                return prev.clone();
            }

            let favorite = FavoriteLocation {
                id: uuid::Uuid::new_v4().to_string(),
                label: location.label.clone(),
                value: location.value.clone(),
                saved_at: Utc::now().timestamp_millis(),
            };
            tracing::debug!("Adding favorite {}", favorite.label);

            std::iter::once(favorite)
                .chain(prev.iter().cloned())
                .take(MAX_FAVORITES)
                .collect()
        });
    }

    pub fn remove(&self, id: &str) {
        self.store
            .update(|prev| prev.iter().filter(|fav| fav.id != id).cloned().collect());
    }

    pub fn is_favorite(&self, value: &str) -> bool {
        self.store.get().iter().any(|fav| fav.value == value)
    }

    /// Remove `location` if saved, otherwise add it.
    pub fn toggle(&self, location: &LocationOption) {
        let existing = self
            .store
            .get()
            .into_iter()
            .find(|fav| fav.value == location.value);

        match existing {
            Some(fav) => self.remove(&fav.id),
            None => self.add(location),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn city(n: usize) -> LocationOption {
        LocationOption::new(format!("{}.5 {}.25", n, n), format!("City {}", n))
    }

    #[test]
    fn test_add_is_idempotent() {
        let favorites = Favorites::new(&Storage::in_memory());
        favorites.add(&city(1));
        favorites.add(&city(1));
        assert_eq!(favorites.list().len(), 1);
    }

    #[test]
    fn test_newest_first() {
        let favorites = Favorites::new(&Storage::in_memory());
        favorites.add(&city(1));
        favorites.add(&city(2));
        let labels: Vec<_> = favorites.list().into_iter().map(|f| f.label).collect();
        assert_eq!(labels, vec!["City 2", "City 1"]);
    }

    #[test]
    fn test_capped_at_ten_keeping_newest() {
        let favorites = Favorites::new(&Storage::in_memory());
        for n in 0..15 {
            favorites.add(&city(n));
            assert!(favorites.list().len() <= MAX_FAVORITES);
        }

        let list = favorites.list();
        assert_eq!(list.len(), MAX_FAVORITES);
        let expected: Vec<String> = (5..15).rev().map(|n| city(n).value).collect();
        let actual: Vec<String> = list.into_iter().map(|f| f.value).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_remove_by_id() {
        let favorites = Favorites::new(&Storage::in_memory());
        favorites.add(&city(1));
        favorites.add(&city(2));

        let id = favorites.list()[1].id.clone();
        favorites.remove(&id);
        assert_eq!(favorites.list().len(), 1);
        assert!(!favorites.is_favorite(&city(1).value));

        favorites.remove("missing");
        assert_eq!(favorites.list().len(), 1);
    }

    #[test]
    fn test_is_favorite_is_exact_match() {
        let favorites = Favorites::new(&Storage::in_memory());
        favorites.add(&LocationOption::new("45.0 -122.0", "Somewhere"));
        assert!(favorites.is_favorite("45.0 -122.0"));
        assert!(!favorites.is_favorite("45 -122"));
    }

    #[test]
    fn test_toggle_round_trip() {
        let favorites = Favorites::new(&Storage::in_memory());
        favorites.add(&city(1));
        let before = favorites.list();

        favorites.toggle(&city(2));
        assert!(favorites.is_favorite(&city(2).value));
        favorites.toggle(&city(2));

        assert_eq!(favorites.list(), before);
    }

    #[test]
    fn test_ids_are_unique() {
        let favorites = Favorites::new(&Storage::in_memory());
        favorites.add(&city(1));
        favorites.add(&city(2));
        let list = favorites.list();
        assert_ne!(list[0].id, list[1].id);
    }

    #[test]
    fn test_two_managers_share_favorites() {
        let storage = Storage::in_memory();
        let header = Favorites::new(&storage);
        let panel = Favorites::new(&storage);

        header.toggle(&city(3));
        assert!(panel.is_favorite(&city(3).value));

        let id = panel.list()[0].id.clone();
        panel.remove(&id);
        assert!(header.list().is_empty());
    }

    #[test]
    fn test_separate_storages_keep_both_favorites() {
        let dir = tempfile::tempdir().unwrap();
        let window = Favorites::new(&Storage::file(dir.path()));
        let other_window = Favorites::new(&Storage::file(dir.path()));

        other_window.add(&city(1));
        window.add(&city(2));

        let values: Vec<_> = window.list().into_iter().map(|f| f.value).collect();
        assert_eq!(values, vec![city(2).value, city(1).value]);
        assert!(other_window.is_favorite(&city(2).value));
    }

    #[test]
    fn test_malformed_list_reports_degraded() {
        let storage = Storage::in_memory();
        storage.write_raw(FAVORITES_STORAGE_KEY, "{\"oops\"", 0).unwrap();

        let favorites = Favorites::new(&storage);
        assert!(favorites.list().is_empty());
        assert!(favorites.load_status().is_degraded());
    }

    #[test]
    fn test_persisted_as_json_array() {
        let storage = Storage::in_memory();
        Favorites::new(&storage).add(&city(7));

        let raw = storage.read_raw(FAVORITES_STORAGE_KEY).unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json[0]["value"], "7.5 7.25");
        assert!(json[0]["savedAt"].is_i64());
    }
}
