//! Browser bindings
//!
//! The front end owns rendering, input and animation. It talks to the game
//! through `WebGame`, which hands back JSON strings (paths, snapshots,
//! events) for the page to animate.

use wasm_bindgen::prelude::*;
use web_sys::Storage;

use super::PreferenceStore;
use crate::audio::cues_for_path;
use crate::settings::Settings;
use crate::sim::{Game, GameMode, Player};
use crate::tuning::GameConfig;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        return;
    }
    log::info!("Column Drop starting...");
}

/// LocalStorage-backed preferences
pub struct LocalStore {
    storage: Option<Storage>,
}

impl LocalStore {
    pub fn new() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();
        if storage.is_none() {
            log::warn!("LocalStorage unavailable, preferences will not persist");
        }
        Self { storage }
    }
}

impl Default for LocalStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PreferenceStore for LocalStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok().flatten()
    }

    fn set_item(&mut self, key: &str, value: &str) {
        if let Some(storage) = &self.storage {
            let _ = storage.set_item(key, value);
        }
    }
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn err_to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn player_from_index(index: u8) -> Result<Player, JsValue> {
    match index {
        1 => Ok(Player::One),
        2 => Ok(Player::Two),
        _ => Err(JsValue::from_str("player must be 1 or 2")),
    }
}

/// Game handle exported to JavaScript
#[wasm_bindgen]
pub struct WebGame {
    game: Game,
    store: LocalStore,
}

#[wasm_bindgen]
impl WebGame {
    /// Start a game in the stored preferred mode with a clock-derived seed
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<WebGame, JsValue> {
        let store = LocalStore::new();
        let mode = Settings::load(&store).game_mode();
        let seed = js_sys::Date::now() as u64;
        let game = Game::new(mode, GameConfig::default(), seed).map_err(err_to_js)?;
        Ok(WebGame { game, store })
    }

    /// Start a game from a JSON `GameConfig`
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(mode: &str, config_json: &str, seed: f64) -> Result<WebGame, JsValue> {
        let mode = GameMode::from_str(mode).unwrap_or_default();
        let config: GameConfig = serde_json::from_str(config_json).map_err(err_to_js)?;
        let game = Game::new(mode, config, seed as u64).map_err(err_to_js)?;
        Ok(WebGame {
            game,
            store: LocalStore::new(),
        })
    }

    /// Drop for the current player; returns the path as JSON
    #[wasm_bindgen(js_name = dropBall)]
    pub fn drop_ball(&mut self, column: usize) -> Result<String, JsValue> {
        let path = self.game.drop_ball(column).map_err(err_to_js)?;
        to_js(&path)
    }

    /// Path the current player's ball would take, without moving it
    #[wasm_bindgen(js_name = previewPath)]
    pub fn preview_path(&self, column: usize) -> Result<String, JsValue> {
        let path = self
            .game
            .grid()
            .preview_path(column, self.game.current_player())
            .map_err(err_to_js)?;
        to_js(&path)
    }

    /// Sound cue names aligned with each step of the path
    #[wasm_bindgen(js_name = pathCues)]
    pub fn path_cues(&self, column: usize) -> Result<String, JsValue> {
        let path = self
            .game
            .grid()
            .preview_path(column, self.game.current_player())
            .map_err(err_to_js)?;
        let cues: Vec<Option<String>> = cues_for_path(&path)
            .into_iter()
            .map(|cue| cue.map(|c| format!("{:?}", c)))
            .collect();
        to_js(&cues)
    }

    #[wasm_bindgen(js_name = reserveColumn)]
    pub fn reserve_column(&mut self, column: usize, player: u8) -> Result<(), JsValue> {
        let player = player_from_index(player)?;
        self.game.reserve_column(column, player).map_err(err_to_js)
    }

    #[wasm_bindgen(js_name = placeDormantBall)]
    pub fn place_dormant_ball(&mut self, column: usize, player: u8) -> Result<(), JsValue> {
        let player = player_from_index(player)?;
        self.game.place_dormant_ball(column, player).map_err(err_to_js)
    }

    #[wasm_bindgen(js_name = releaseReservedBall)]
    pub fn release_reserved_ball(&mut self, column: usize) -> Result<String, JsValue> {
        let path = self.game.release_reserved_ball(column).map_err(err_to_js)?;
        to_js(&path)
    }

    #[wasm_bindgen(js_name = canDropInColumn)]
    pub fn can_drop_in_column(&self, column: usize) -> bool {
        self.game.can_drop_in_column(column)
    }

    #[wasm_bindgen(js_name = canReserveColumn)]
    pub fn can_reserve_column(&self, column: usize) -> bool {
        self.game.can_reserve_column(column)
    }

    /// Full game snapshot as JSON
    pub fn snapshot(&self) -> Result<String, JsValue> {
        to_js(&self.game)
    }

    /// Events since the last call, as JSON
    #[wasm_bindgen(js_name = drainEvents)]
    pub fn drain_events(&mut self) -> Result<String, JsValue> {
        to_js(&self.game.drain_events())
    }

    #[wasm_bindgen(js_name = isOver)]
    pub fn is_over(&self) -> bool {
        self.game.is_over()
    }

    /// Remember `mode` for the next game
    #[wasm_bindgen(js_name = savePreferredMode)]
    pub fn save_preferred_mode(&mut self, mode: &str) {
        let mut settings = Settings::load(&self.store);
        settings.set_game_mode(GameMode::from_str(mode).unwrap_or_default());
        settings.save(&mut self.store);
    }
}
