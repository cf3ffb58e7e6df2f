//! Game settings and preferences
//!
//! Persisted as JSON through a `PreferenceStore` (LocalStorage on web).

use serde::{Deserialize, Serialize};

use crate::platform::PreferenceStore;
use crate::sim::GameMode;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Stored as the mode string so hand-edited values can be validated
    pub mode: String,
    pub sound_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: GameMode::Normal.as_str().to_string(),
            sound_enabled: true,
        }
    }
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "column_drop_settings";

    /// Preferred game mode; unknown strings fall back to normal
    pub fn game_mode(&self) -> GameMode {
        GameMode::from_str(&self.mode).unwrap_or_default()
    }

    pub fn set_game_mode(&mut self, mode: GameMode) {
        self.mode = mode.as_str().to_string();
    }

    /// Load settings, falling back to defaults on missing or corrupt data
    pub fn load(store: &impl PreferenceStore) -> Self {
        let Some(json) = store.get_item(Self::STORAGE_KEY) else {
            log::info!("Using default settings");
            return Self::default();
        };

        let mut settings: Settings = match serde_json::from_str(&json) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Ignoring corrupt settings: {}", e);
                return Self::default();
            }
        };

        match GameMode::from_str(&settings.mode) {
            Some(mode) => settings.set_game_mode(mode),
            None => {
                log::warn!("Unknown game mode {:?}, using normal", settings.mode);
                settings.set_game_mode(GameMode::Normal);
            }
        }
        log::info!("Loaded settings ({} mode)", settings.mode);
        settings
    }

    pub fn save(&self, store: &mut impl PreferenceStore) {
        match serde_json::to_string(self) {
            Ok(json) => {
                store.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
            Err(e) => log::warn!("Failed to serialize settings: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStore;

    #[test]
    fn test_defaults_when_missing() {
        let store = MemoryStore::new();
        let settings = Settings::load(&store);
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.game_mode(), GameMode::Normal);
    }

    #[test]
    fn test_save_and_load() {
        let mut store = MemoryStore::new();
        let mut settings = Settings::default();
        settings.set_game_mode(GameMode::HardMode);
        settings.sound_enabled = false;
        settings.save(&mut store);

        let loaded = Settings::load(&store);
        assert_eq!(loaded.game_mode(), GameMode::HardMode);
        assert!(!loaded.sound_enabled);
    }

    #[test]
    fn test_mode_string_normalized() {
        let mut store = MemoryStore::new();
        store.set_item(Settings::STORAGE_KEY, r#"{"mode":" HardMode ","sound_enabled":true}"#);
        assert_eq!(Settings::load(&store).mode, "hard");
    }

    #[test]
    fn test_corrupt_values_fall_back() {
        let mut store = MemoryStore::new();
        store.set_item(Settings::STORAGE_KEY, r#"{"mode":"nightmare","sound_enabled":false}"#);
        let settings = Settings::load(&store);
        assert_eq!(settings.game_mode(), GameMode::Normal);
        assert_eq!(settings.mode, "normal");
        assert!(!settings.sound_enabled);

        store.set_item(Settings::STORAGE_KEY, "not json");
        assert_eq!(Settings::load(&store), Settings::default());
    }
}
