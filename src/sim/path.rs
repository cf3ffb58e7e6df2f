//! Ball trajectories as discrete steps
//!
//! A `BallPath` is what the animation layer plays back. It is a plain owned
//! value and never refers back into the grid.

use serde::{Deserialize, Serialize};

use super::cell::{Player, Position};

/// What happened on a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepAction {
    /// Plain one-row descent
    Fall,
    /// Sideways push by a box or teleport through a portal
    Redirect,
    /// Ball comes to rest here
    Settle,
}

/// One step of a trajectory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub position: Position,
    pub action: StepAction,
}

impl Step {
    pub const fn fall(position: Position) -> Self {
        Self { position, action: StepAction::Fall }
    }

    pub const fn redirect(position: Position) -> Self {
        Self { position, action: StepAction::Redirect }
    }

    pub const fn settle(position: Position) -> Self {
        Self { position, action: StepAction::Settle }
    }
}

/// Full trajectory of one dropped ball
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallPath {
    pub player: Player,
    pub start_column: usize,
    pub steps: Vec<Step>,
}

impl BallPath {
    /// Where the ball came to rest
    pub fn resting_position(&self) -> Position {
        self.steps
            .last()
            .map(|s| s.position)
            .unwrap_or(Position::new(0, self.start_column))
    }

    /// Number of redirects along the way
    pub fn redirect_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.action == StepAction::Redirect)
            .count()
    }
}
