//! Column Drop - A two-player gravity-drop column game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (grid, ball trajectories, turn/phase state machine)
//! - `tuning`: Data-driven game configuration
//! - `settings`: Mode preference loaded through an injected store
//! - `platform`: Browser/native platform abstraction (preference storage, wasm bindings)
//! - `audio`: Sound cues derived from game events, played by an injected sink

pub mod audio;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use settings::Settings;
pub use sim::{BallPath, Game, GameMode, GamePhase, Grid, MoveError, Player};
pub use tuning::GameConfig;

/// Game configuration constants
pub mod consts {
    /// Default board size (N x N)
    pub const DEFAULT_GRID_SIZE: usize = 6;
    /// Smallest playable board
    pub const MIN_GRID_SIZE: usize = 2;
    /// Largest supported board
    pub const MAX_GRID_SIZE: usize = 16;

    /// Balls each player starts with
    pub const DEFAULT_BALLS_PER_PLAYER: u32 = 12;

    /// Default board features
    pub const DEFAULT_BOX_COUNT: usize = 6;
    pub const DEFAULT_PORTAL_PAIRS: usize = 1;

    /// Portal ids are written as single digits in text layouts
    pub const MAX_PORTAL_PAIRS: usize = 10;
}
