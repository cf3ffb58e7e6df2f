//! Data-driven game configuration
//!
//! Board size, ball supply, feature counts and the hard-mode round loop.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::BoardError;

/// Everything that shapes a game before the first move
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Board is `grid_size` x `grid_size`
    pub grid_size: usize,
    /// Balls each player may drop over the whole game
    pub balls_per_player: u32,
    /// Directional boxes placed by board generation
    pub box_count: usize,
    /// Portal pairs placed by board generation
    pub portal_pairs: usize,
    /// Hard mode: reservation rounds before plain play (None = keep going)
    #[serde(default)]
    pub reservation_rounds: Option<u32>,
    /// Hard mode: unreserved columns accept plain drops while releasing
    #[serde(default)]
    pub open_drops_during_release: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            balls_per_player: DEFAULT_BALLS_PER_PLAYER,
            box_count: DEFAULT_BOX_COUNT,
            portal_pairs: DEFAULT_PORTAL_PAIRS,
            reservation_rounds: None,
            open_drops_during_release: false,
        }
    }
}

impl GameConfig {
    /// Plain board with no features
    pub fn empty_board(grid_size: usize) -> Self {
        Self {
            grid_size,
            box_count: 0,
            portal_pairs: 0,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_balls(mut self, balls_per_player: u32) -> Self {
        self.balls_per_player = balls_per_player;
        self
    }

    #[must_use]
    pub fn with_reservation_rounds(mut self, rounds: u32) -> Self {
        self.reservation_rounds = Some(rounds);
        self
    }

    #[must_use]
    pub fn with_open_drops(mut self) -> Self {
        self.open_drops_during_release = true;
        self
    }

    /// Reject configurations that cannot produce a playable board
    pub fn validate(&self) -> Result<(), BoardError> {
        if !(MIN_GRID_SIZE..=MAX_GRID_SIZE).contains(&self.grid_size) {
            return Err(BoardError::InvalidSize {
                size: self.grid_size,
                min: MIN_GRID_SIZE,
                max: MAX_GRID_SIZE,
            });
        }
        if self.balls_per_player == 0 {
            return Err(BoardError::NoBalls);
        }
        if self.portal_pairs > MAX_PORTAL_PAIRS {
            return Err(BoardError::TooManyPortals {
                pairs: self.portal_pairs,
                max: MAX_PORTAL_PAIRS,
            });
        }
        // Portal pairs need two free cells in one row
        if self.portal_pairs > 0 && self.grid_size < 3 {
            return Err(BoardError::TooManyFeatures {
                features: self.box_count + 2 * self.portal_pairs,
                size: self.grid_size,
            });
        }
        let features = self.box_count + 2 * self.portal_pairs;
        let room = (self.grid_size - 1) * self.grid_size;
        if features > room / 2 {
            return Err(BoardError::TooManyFeatures {
                features,
                size: self.grid_size,
            });
        }
        Ok(())
    }
}
