//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Preference storage (LocalStorage on web, in-memory natively)
//! - The wasm-bindgen facade used by the browser front end

use std::collections::HashMap;

#[cfg(target_arch = "wasm32")]
pub mod web;

/// Key/value string storage for preferences
pub trait PreferenceStore {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&mut self, key: &str, value: &str);
}

/// Process-local store, used natively and in tests
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    items: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: &str) {
        self.items.insert(key.to_string(), value.to_string());
    }
}
